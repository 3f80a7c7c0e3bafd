use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header::AUTHORIZATION, web};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::api::error::ServiceError;

/// Claims carried by identity tokens. The identity provider mints
/// them; this service only verifies the signature and expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Administrator flag
    #[serde(default)]
    pub admin: bool,
    /// Expiry as a unix timestamp
    pub exp: usize,
}

/// Verifies HS256 identity tokens against the shared secret.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        TokenVerifier {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// The authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub admin: bool,
}

impl Identity {
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.admin {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Identity, actix_web::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result: Result<Identity, ServiceError> = (|| {
            let verifier = req
                .app_data::<web::Data<TokenVerifier>>()
                .ok_or(ServiceError::Unauthorized("Token verifier not configured"))?;
            let token = bearer_token(req).ok_or(ServiceError::Unauthorized("No token provided"))?;
            let claims = verifier
                .verify(token)
                .map_err(|_| ServiceError::Unauthorized("Invalid token"))?;
            Ok(Identity {
                uid: claims.sub,
                admin: claims.admin,
            })
        })();

        ready(result.map_err(actix_web::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn mint(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn valid_token_roundtrips_claims() {
        let verifier = TokenVerifier::new("secret");
        let token = mint(
            "secret",
            &Claims {
                sub: "uid-42".to_string(),
                admin: true,
                exp: future_exp(),
            },
        );

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "uid-42");
        assert!(claims.admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = TokenVerifier::new("secret");
        let token = mint(
            "other-secret",
            &Claims {
                sub: "uid-42".to_string(),
                admin: false,
                exp: future_exp(),
            },
        );
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = TokenVerifier::new("secret");
        let token = mint(
            "secret",
            &Claims {
                sub: "uid-42".to_string(),
                admin: false,
                exp: 1_000_000,
            },
        );
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn admin_defaults_to_false() {
        let verifier = TokenVerifier::new("secret");
        let raw = serde_json::json!({ "sub": "uid-7", "exp": future_exp() });
        let token = encode(
            &Header::default(),
            &raw,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert!(!claims.admin);
        assert!(
            Identity {
                uid: claims.sub,
                admin: claims.admin
            }
            .require_admin()
            .is_err()
        );
    }
}
