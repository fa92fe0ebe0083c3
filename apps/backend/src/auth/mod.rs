pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::UserClaims;
