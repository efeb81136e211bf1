pub mod password;
pub mod token;

use axum::http::{header, HeaderMap};

use crate::core::errors::ApiError;

pub use token::{Claims, TokenService};

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

pub fn require_user(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let token = header_value.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    let claims = tokens.verify(token)?;
    Ok(AuthUser {
        id: claims.sub,
        username: claims.username,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn tokens() -> TokenService {
        TokenService::new("test-secret", 60)
    }

    #[test]
    fn require_user_accepts_valid_bearer_token() {
        let tokens = tokens();
        let token = tokens.issue(7, "alice").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let user = require_user(&headers, &tokens).unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn require_user_rejects_missing_or_malformed_header() {
        let tokens = tokens();

        let missing = require_user(&HeaderMap::new(), &tokens);
        assert!(matches!(missing, Err(ApiError::Unauthorized)));

        let mut bare = HeaderMap::new();
        bare.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            require_user(&bare, &tokens),
            Err(ApiError::Unauthorized)
        ));

        let mut garbage = HeaderMap::new();
        garbage.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer not-a-token"),
        );
        assert!(matches!(
            require_user(&garbage, &tokens),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn require_user_rejects_token_signed_with_other_secret() {
        let token = TokenService::new("other-secret", 60).issue(1, "alice").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let result = require_user(&headers, &tokens());

        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
