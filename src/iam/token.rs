//! Session token encoding and verification (HS256 JWT).

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::TokenError;
use crate::models::Session;

/// Claims carried by a session token. Mirrors the session at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Session id.
    pub sid: u64,
    pub iat: i64,
    pub exp: i64,
}

/// Turns sessions into signed tokens and back.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, session: &Session) -> Result<String, TokenError>;

    /// Verifies the signature and the embedded expiry, then parses claims.
    /// The live session's expiry is still checked by the caller.
    fn decode(&self, token: &str) -> Result<Claims, TokenError>;
}

#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, session: &Session) -> Result<String, TokenError> {
        let claims = Claims {
            sub: session.subject.clone(),
            sid: session.id,
            iat: session.created_at.timestamp(),
            exp: session.expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }
}
