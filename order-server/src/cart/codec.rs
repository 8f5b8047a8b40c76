//! Cart token codec
//!
//! Token layout: `base64url(json) "." base64url(hmac_sha256(json))`, where the
//! JSON payload is an object of string food ids to integer quantities, e.g.
//! `{"12":2,"7":1}`.
//!
//! Decoding never fails: anything that is not a well-formed, correctly signed
//! token becomes an empty cart plus [`CartDirective::Clear`].

use super::Cart;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// What the boundary should do with the stored token after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartDirective {
    /// Token absent or valid: leave the slot as it is
    Keep,
    /// Token was undecodable: delete the slot
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCart {
    pub cart: Cart,
    pub directive: CartDirective,
}

/// Why a token was rejected (logged, never returned to callers of `decode`)
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing signature separator")]
    MissingSeparator,
    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("signature mismatch")]
    Signature,
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Signs and verifies cart tokens with a server secret
#[derive(Clone)]
pub struct CartCodec {
    mac: HmacSha256,
}

impl fmt::Debug for CartCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartCodec").finish_non_exhaustive()
    }
}

impl CartCodec {
    pub fn new(secret: &[u8]) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
        })
    }

    fn tag(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    /// Sign an arbitrary payload into token form
    pub fn seal(&self, payload: &[u8]) -> String {
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(self.tag(payload))
        )
    }

    pub fn encode(&self, cart: &Cart) -> Result<String, serde_json::Error> {
        let payload = serde_json::to_vec(cart)?;
        Ok(self.seal(&payload))
    }

    /// Verify and parse a token
    pub fn open(&self, token: &str) -> Result<Cart, TokenError> {
        let (payload_b64, tag_b64) = token.split_once('.').ok_or(TokenError::MissingSeparator)?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64)?;
        let tag = URL_SAFE_NO_PAD.decode(tag_b64)?;

        let mut mac = self.mac.clone();
        mac.update(&payload);
        mac.verify_slice(&tag).map_err(|_| TokenError::Signature)?;

        Ok(serde_json::from_slice(&payload)?)
    }

    /// Decode the stored token; absent or blank means an empty cart
    pub fn decode(&self, token: Option<&str>) -> DecodedCart {
        let token = match token.map(str::trim) {
            None | Some("") => {
                return DecodedCart {
                    cart: Cart::new(),
                    directive: CartDirective::Keep,
                };
            }
            Some(t) => t,
        };

        match self.open(token) {
            Ok(cart) => DecodedCart {
                cart,
                directive: CartDirective::Keep,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable cart token");
                DecodedCart {
                    cart: Cart::new(),
                    directive: CartDirective::Clear,
                }
            }
        }
    }
}

// ===== Payload format =====

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (food_id, quantity) in self.iter() {
            map.serialize_entry(&food_id.to_string(), &quantity)?;
        }
        map.end()
    }
}

struct CartVisitor;

impl<'de> Visitor<'de> for CartVisitor {
    type Value = Cart;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of integer food ids to non-negative integer quantities")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Cart, A::Error> {
        let mut entries = Vec::new();
        while let Some((key, quantity)) = map.next_entry::<String, u32>()? {
            let food_id: i64 = key
                .parse()
                .map_err(|_| de::Error::custom(format!("food id is not an integer: {key:?}")))?;
            entries.push((food_id, quantity));
        }
        Ok(Cart::from_entries(entries))
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CartVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> CartCodec {
        CartCodec::new(b"unit-test-secret").unwrap()
    }

    fn cleared(decoded: DecodedCart) -> bool {
        decoded.cart.is_empty() && decoded.directive == CartDirective::Clear
    }

    #[test]
    fn test_roundtrip_keeps_entries_and_order() {
        let codec = codec();
        let cart = Cart::from_entries([(12, 2), (3, 1), (100_000, 7), (4, 0)]);

        let token = codec.encode(&cart).unwrap();
        let decoded = codec.decode(Some(&token));

        assert_eq!(decoded.cart, cart);
        assert_eq!(decoded.directive, CartDirective::Keep);
    }

    #[test]
    fn test_absent_or_blank_token_is_empty_without_cleanup() {
        let codec = codec();
        for token in [None, Some(""), Some("   ")] {
            let decoded = codec.decode(token);
            assert!(decoded.cart.is_empty());
            assert_eq!(decoded.directive, CartDirective::Keep);
        }
    }

    #[test]
    fn test_garbage_tokens_clear() {
        let codec = codec();
        assert!(cleared(codec.decode(Some("not-a-token"))));
        assert!(cleared(codec.decode(Some("%%%.###"))));
        assert!(cleared(codec.decode(Some("eyJ9.abc"))));
    }

    #[test]
    fn test_tampered_payload_clears() {
        let codec = codec();
        let token = codec.encode(&Cart::from_entries([(1, 1)])).unwrap();
        let (_, tag) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(br#"{"1":50}"#), tag);

        assert!(cleared(codec.decode(Some(&forged))));
    }

    #[test]
    fn test_other_secret_clears() {
        let token = codec().encode(&Cart::from_entries([(1, 1)])).unwrap();
        let other = CartCodec::new(b"another-secret").unwrap();
        assert!(cleared(other.decode(Some(&token))));
    }

    #[test]
    fn test_signed_but_malformed_payloads_clear() {
        let codec = codec();
        let payloads: [&[u8]; 7] = [
            b"[1,2]",
            b"\"cart\"",
            br#"{"1":-2}"#,
            br#"{"1":1.5}"#,
            br#"{"one":1}"#,
            br#"{"1":"2"}"#,
            br#"{"1":99999999999}"#,
        ];
        for payload in payloads {
            let token = codec.seal(payload);
            assert!(
                cleared(codec.decode(Some(&token))),
                "payload should be rejected: {}",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn test_duplicate_keys_later_value_wins() {
        let codec = codec();
        let token = codec.seal(br#"{"5":1,"6":2,"5":4}"#);
        let decoded = codec.decode(Some(&token));
        assert_eq!(decoded.cart.iter().collect::<Vec<_>>(), vec![(5, 4), (6, 2)]);
        assert_eq!(decoded.directive, CartDirective::Keep);
    }

    #[test]
    fn test_empty_object_is_valid_empty_cart() {
        let codec = codec();
        let decoded = codec.decode(Some(&codec.seal(b"{}")));
        assert!(decoded.cart.is_empty());
        assert_eq!(decoded.directive, CartDirective::Keep);
    }

    fn arb_cart() -> impl Strategy<Value = Cart> {
        prop::collection::vec((any::<i64>(), any::<u32>()), 0..24).prop_map(Cart::from_entries)
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(cart in arb_cart()) {
            let codec = codec();
            let token = codec.encode(&cart).unwrap();
            let decoded = codec.decode(Some(&token));
            prop_assert_eq!(decoded.directive, CartDirective::Keep);
            prop_assert_eq!(decoded.cart, cart);
        }

        #[test]
        fn prop_cleared_tokens_carry_no_items(token in ".{0,64}") {
            let decoded = codec().decode(Some(&token));
            if decoded.directive == CartDirective::Clear {
                prop_assert!(decoded.cart.is_empty());
            }
        }

        #[test]
        fn prop_signed_garbage_never_decodes_to_items(payload in prop::collection::vec(any::<u8>(), 0..48)) {
            let codec = codec();
            let decoded = codec.decode(Some(&codec.seal(&payload)));
            let parsed: Result<Cart, _> = serde_json::from_slice(&payload);
            match parsed {
                Ok(cart) => prop_assert_eq!(decoded.cart, cart),
                Err(_) => prop_assert!(decoded.cart.is_empty() && decoded.directive == CartDirective::Clear),
            }
        }
    }
}
