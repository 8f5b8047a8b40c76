//! Client-held cart
//!
//! - [`Cart`] - insertion-ordered food id → quantity mapping
//! - [`codec`] - signed token encode/decode
//! - [`hydrator`] - pricing a cart against the live catalog

pub mod codec;
pub mod hydrator;

pub use codec::{CartCodec, CartDirective, DecodedCart};
pub use hydrator::{Catalog, CartSummary, cart_summary, hydrate, merge_lines};

/// Upper bound for one line's quantity when mutating a cart
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Food id → quantity, in the order items were first added.
///
/// Only mutated at the HTTP boundary; core code reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<(i64, u32)>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw pairs; a repeated id keeps its first position and
    /// takes the later quantity.
    pub fn from_entries(entries: impl IntoIterator<Item = (i64, u32)>) -> Self {
        let mut cart = Self::new();
        for (food_id, quantity) in entries {
            match cart.position(food_id) {
                Some(idx) => cart.entries[idx].1 = quantity,
                None => cart.entries.push((food_id, quantity)),
            }
        }
        cart
    }

    fn position(&self, food_id: i64) -> Option<usize> {
        self.entries.iter().position(|(id, _)| *id == food_id)
    }

    /// Add `quantity` of a food, incrementing an existing entry
    pub fn add(&mut self, food_id: i64, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.position(food_id) {
            Some(idx) => {
                let entry = &mut self.entries[idx].1;
                *entry = entry.saturating_add(quantity);
            }
            None => self.entries.push((food_id, quantity)),
        }
    }

    /// Set an entry's quantity; 0 removes it
    pub fn set_quantity(&mut self, food_id: i64, quantity: u32) {
        if quantity == 0 {
            self.remove(food_id);
            return;
        }
        match self.position(food_id) {
            Some(idx) => self.entries[idx].1 = quantity,
            None => self.entries.push((food_id, quantity)),
        }
    }

    /// Remove an entry; returns whether it was present
    pub fn remove(&mut self, food_id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != food_id);
        self.entries.len() != before
    }

    pub fn quantity_of(&self, food_id: i64) -> Option<u32> {
        self.position(food_id).map(|idx| self.entries[idx].1)
    }

    /// Total number of items (sum of quantities)
    pub fn size(&self) -> u64 {
        self.entries.iter().map(|(_, q)| u64::from(*q)).sum()
    }

    /// Number of distinct foods
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, u32)> + '_ {
        self.entries.iter().copied()
    }
}
