//! Request extractors and cookie helpers

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::response::{IntoResponse, Response};
use http::header::{COOKIE, SET_COOKIE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue};
use std::convert::Infallible;

use crate::cart::CartDirective;
use crate::utils::AppError;

/// Header carrying the authenticated client id
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Cookie slot holding the cart token
pub const CART_COOKIE: &str = "shopping_cart";

/// The calling client, as identified by the upstream authenticator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

fn client_id_from(parts: &Parts) -> Option<ClientId> {
    parts
        .headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| ClientId(s.to_string()))
}

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        client_id_from(parts).ok_or_else(AppError::not_authenticated)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(client_id_from(parts))
    }
}

/// Read the cart token from the request cookies
pub fn cart_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CART_COOKIE)
        .map(|(_, value)| value.trim().to_string())
}

/// What to do with the `shopping_cart` cookie on the way out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieUpdate {
    Leave,
    Set(String),
    Delete,
}

impl From<CartDirective> for CookieUpdate {
    fn from(directive: CartDirective) -> Self {
        match directive {
            CartDirective::Keep => CookieUpdate::Leave,
            CartDirective::Clear => CookieUpdate::Delete,
        }
    }
}

impl CookieUpdate {
    fn header(&self) -> Option<HeaderValue> {
        let value = match self {
            CookieUpdate::Leave => return None,
            CookieUpdate::Set(token) => {
                format!("{CART_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
            }
            CookieUpdate::Delete => format!("{CART_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
        };
        // tokens are base64url, always a valid header value
        HeaderValue::from_str(&value).ok()
    }

    /// Attach the cookie change to a response (success or error alike)
    pub fn apply(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if let Some(value) = self.header() {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response
    }
}
