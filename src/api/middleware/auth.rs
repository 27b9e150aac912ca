//! Authentication middleware.
//!
//! Resolves the optional bearer credential into a caller identity. On the
//! trip surface a missing or invalid credential means "anonymous", never an
//! error; the operator surface requires a valid admin credential.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::models::trip::TripOwner;
use crate::services::identity::{Claims, IdentityService};

/// Extension that holds the resolved caller identity
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl From<Claims> for AuthIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

/// The record scope a caller resolves to: their own records when
/// authenticated, the anonymous scope otherwise.
pub fn requester_from(auth: &Option<AuthIdentity>) -> TripOwner {
    TripOwner::from_identity(auth.as_ref().map(|a| a.user_id))
}

/// Extract the bearer token from the Authorization header
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Optional authentication middleware - allows unauthenticated requests
///
/// Always inserts `Option<AuthIdentity>` into request extensions so handlers
/// can distinguish an authenticated caller from an anonymous one.
pub async fn optional_auth_middleware(
    State(identity): State<Arc<IdentityService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = bearer_token(&request)
        .and_then(|token| identity.resolve_bearer(token).ok())
        .map(AuthIdentity::from);

    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Admin-only middleware - requires an authenticated operator
pub async fn admin_middleware(
    State(identity): State<Arc<IdentityService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match bearer_token(&request) {
        Some(token) => match identity.resolve_bearer(token) {
            Ok(claims) => claims,
            Err(_) => {
                return (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
            }
        },
        None => {
            return (StatusCode::UNAUTHORIZED, "Missing authorization header").into_response()
        }
    };

    if !claims.is_admin {
        return (StatusCode::FORBIDDEN, "Operator access required").into_response();
    }

    request
        .extensions_mut()
        .insert(Some(AuthIdentity::from(claims)));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request {
        axum::http::Request::builder()
            .header(AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_token_extracted() {
        let request = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&request), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let request = request_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&request), None);
    }

    #[test]
    fn test_bearer_token_absent() {
        let request = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&request), None);
    }

    #[test]
    fn test_requester_from_authenticated() {
        let user_id = Uuid::new_v4();
        let auth = Some(AuthIdentity {
            user_id,
            is_admin: false,
        });
        assert_eq!(requester_from(&auth), TripOwner::User(user_id));
    }

    #[test]
    fn test_requester_from_anonymous() {
        assert_eq!(requester_from(&None), TripOwner::Public);
    }
}
