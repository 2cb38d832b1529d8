//! Caller identity
//!
//! Credentials are handled by an external identity provider; by the time a
//! request reaches us it carries the caller's stable user id.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use pageflip_core::{OwnerId, PageflipError};
use std::convert::Infallible;

/// Resolves the authenticated caller of a request
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Option<OwnerId>;
}

/// Trusts a header set by an authenticating reverse proxy
pub struct TrustedHeader {
    header: HeaderName,
}

impl TrustedHeader {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl IdentityProvider for TrustedHeader {
    fn identify(&self, headers: &HeaderMap) -> Option<OwnerId> {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(OwnerId::new)
    }
}

/// The caller of the current request, if authenticated
#[derive(Debug, Clone)]
pub struct Caller(pub Option<OwnerId>);

impl Caller {
    pub fn owner(&self) -> Option<&OwnerId> {
        self.0.as_ref()
    }

    /// The caller's id, or a 401
    pub fn require(&self) -> Result<&OwnerId, ApiError> {
        self.owner()
            .ok_or(ApiError::Core(PageflipError::Authentication))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller(state.identity.identify(&parts.headers)))
    }
}
