use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::claims::UserClaims;
use crate::repos::users::UserSummary;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Lifetime of a user token in seconds.
pub const USER_TOKEN_TTL_SECS: i64 = 30 * 60;

/// Mint a HS256 user token with a 30-minute TTL.
pub fn mint_user_token(
    user: &UserSummary,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs() as i64;

    let claims = UserClaims {
        id: user.id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email_address: user.email_address.clone(),
        iat,
        exp: iat + USER_TOKEN_TTL_SECS,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify a user token and return its claims.
///
/// Expired tokens and bad signatures get distinct messages; any other decode
/// failure is reported as an invalid token.
pub fn verify_user_token(token: &str, security: &SecurityConfig) -> Result<UserClaims, AppError> {
    let validation = Validation::new(security.algorithm);

    decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized("Token expired"),
        ErrorKind::InvalidSignature => AppError::unauthorized("Invalid token signature"),
        _ => AppError::unauthorized("Invalid token"),
    })
}
