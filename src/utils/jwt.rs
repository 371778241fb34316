//! JWT helpers
//!
//! Bearer tokens are issued by the identity provider in front of this
//! service; we only need to verify them and turn the claims into an
//! [`ActorContext`]. `generate_token` exists for tooling and tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    config::environment::EnvironmentConfig,
    models::{auth::JwtClaims, ActorContext, UserRole},
    utils::errors::AppError,
};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Generate a token for a user
pub fn generate_token(user_id: Uuid, role: UserRole, config: &JwtConfig) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Could not sign token: {}", e)))
}

/// Verify and decode a token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Build the request actor from verified claims
pub fn actor_from_claims(claims: &JwtClaims) -> Result<ActorContext, AppError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid subject in token".to_string()))?;
    let role = UserRole::from_str(&claims.role)
        .ok_or_else(|| AppError::Unauthorized(format!("Unknown role '{}'", claims.role)))?;

    Ok(ActorContext::new(user_id, role))
}

/// Extract the token from an Authorization header value
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn test_token_carries_actor() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, UserRole::Admin, &config()).unwrap();

        let claims = verify_token(&token, &config()).unwrap();
        let actor = actor_from_claims(&claims).unwrap();

        assert_eq!(actor, ActorContext::admin(user_id));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(Uuid::new_v4(), UserRole::Customer, &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            expiration: 3600,
        };

        assert!(matches!(verify_token(&token, &other), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_unknown_role_is_unauthorized() {
        let claims = JwtClaims {
            sub: Uuid::new_v4().to_string(),
            role: "superuser".to_string(),
            exp: 0,
            iat: 0,
        };

        assert!(matches!(actor_from_claims(&claims), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
    }
}
