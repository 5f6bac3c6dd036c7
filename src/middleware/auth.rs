use crate::{
    error::{AppError, AppResult},
    models::{User, UserRole},
    utils::{
        cookie::{extract_cookie, AUTH_TOKEN_COOKIE},
        jwt::verify_token,
    },
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// The caller resolved from the session token. Role and name come from the
/// stored user, not from the token claims.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Caller identity on routes that also serve anonymous visitors.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn is_staff(&self) -> bool {
        self.0.as_ref().is_some_and(AuthUser::is_staff)
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

/// Cookie first, then `Authorization: Bearer`.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, AUTH_TOKEN_COOKIE).or_else(|| extract_bearer_token(headers))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve the current user. Missing, expired or forged tokens and deleted
/// users all yield `None`.
pub async fn resolve_user(db: &DatabaseConnection, headers: &HeaderMap) -> Option<AuthUser> {
    let token = extract_token(headers)?;
    let claims = match verify_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            return None;
        }
    };

    let user = match User::find_by_id(claims.user_id).one(db).await {
        Ok(user) => user?,
        Err(e) => {
            tracing::warn!("User lookup failed during authentication: {:?}", e);
            return None;
        }
    };

    Some(AuthUser {
        user_id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

/// Rejects requests without a valid session with 401.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = resolve_user(&db, &headers)
        .await
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Attaches the caller when a valid session is present and lets anonymous
/// requests through unchanged.
pub async fn optional_auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(auth_user) = resolve_user(&db, &headers).await {
        request.extensions_mut().insert(auth_user);
    }
    next.run(request).await
}

/// 403 unless the caller holds one of `roles`.
pub fn require_role(auth_user: &AuthUser, roles: &[UserRole]) -> AppResult<()> {
    if roles.contains(&auth_user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Forbidden: Insufficient permissions".to_string(),
        ))
    }
}

pub fn require_staff(auth_user: &AuthUser) -> AppResult<()> {
    require_role(auth_user, UserRole::STAFF)
}

/// 403 with an action-specific message unless the caller is an ADMIN.
pub fn require_admin_to(auth_user: &AuthUser, action: &str) -> AppResult<()> {
    if auth_user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Forbidden: Only admins can {}",
            action
        )))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: 1,
            email: "staff@example.org".to_string(),
            name: "Staff".to_string(),
            role,
        }
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("auth-token=from-cookie"));
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_is_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn role_checks() {
        assert!(require_staff(&user(UserRole::Editor)).is_ok());
        assert!(require_staff(&user(UserRole::User)).is_err());

        match require_admin_to(&user(UserRole::Editor), "delete stories") {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "Forbidden: Only admins can delete stories")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(require_admin_to(&user(UserRole::Admin), "delete stories").is_ok());
    }

    #[test]
    fn anonymous_is_not_staff() {
        assert!(!MaybeAuthUser(None).is_staff());
        assert!(MaybeAuthUser(Some(user(UserRole::Admin))).is_staff());
    }
}
