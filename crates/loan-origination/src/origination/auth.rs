use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{TenantId, TenantScope};
use crate::config::AuthConfig;

/// Authenticated principal for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub user: String,
    pub tenant: TenantId,
}

impl CallerContext {
    pub fn new(user: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            tenant: TenantId(tenant.into()),
        }
    }

    pub fn scope(&self) -> TenantScope {
        TenantScope {
            tenant: self.tenant.clone(),
        }
    }
}

/// Resolves bearer tokens to callers.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    tokens: HashMap<String, CallerContext>,
}

impl Authenticator {
    pub fn new<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = (String, CallerContext)>,
    {
        Self {
            tokens: grants.into_iter().collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.grants.iter().map(|grant| {
            (
                grant.token.clone(),
                CallerContext::new(grant.user.clone(), grant.tenant.clone()),
            )
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn authenticate(&self, authorization: Option<&str>) -> Result<CallerContext, AuthError> {
        let header = authorization.ok_or(AuthError::MissingCredentials)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("Token "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("Invalid token.")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.to_string() }));
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, "Bearer")],
            body,
        )
            .into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
    Arc<Authenticator>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<Authenticator>::from_ref(state);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        authenticator.authenticate(header)
    }
}
