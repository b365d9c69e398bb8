use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::UserRole;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = authenticate(request.headers(), &state.config.security)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Route-level guard: handlers taking `AuthUser` reject anonymous requests.
/// Reuses the context when the middleware already ran.
#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(&parts.headers, &state.config.security)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

pub fn authenticate(headers: &HeaderMap, security: &SecurityConfig) -> Result<AuthUser, ApiError> {
    let token = extract_jwt_from_headers(headers).map_err(ApiError::unauthorized)?;
    let claims = validate_jwt(security, token)?;
    Ok(AuthUser::from(claims))
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers.get(AUTHORIZATION).ok_or("Access token required")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str.split_once(' ').ok_or("Access token required")?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Access token required");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use crate::config::AppConfig;
    use crate::database::models::UserProfile;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let security = AppConfig::development().security;
        let err = authenticate(&HeaderMap::new(), &security).unwrap_err();
        assert_eq!(err.message(), "Access token required");
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        assert!(extract_jwt_from_headers(&headers("Basic abc")).is_err());
        assert!(extract_jwt_from_headers(&headers("Bearer ")).is_err());
        assert_eq!(extract_jwt_from_headers(&headers("bearer abc")), Ok("abc"));
    }

    #[test]
    fn valid_token_yields_user() {
        let security = AppConfig::development().security;
        let profile = UserProfile {
            id: 7,
            username: "demo".to_string(),
            email: "demo@company.com".to_string(),
            role: UserRole::User,
        };
        let token = generate_jwt(&security, &profile).unwrap();
        let user = authenticate(&headers(&format!("Bearer {}", token)), &security).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn tampered_token_is_unauthorized() {
        let security = AppConfig::development().security;
        let err = authenticate(&headers("Bearer abc.def.ghi"), &security).unwrap_err();
        assert_eq!(err.message(), "Invalid token");
    }
}
