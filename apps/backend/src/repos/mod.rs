//! Repositories composing the query executor and transaction coordinator
//! into user and profile operations.

use time::macros::format_description;
use time::OffsetDateTime;

use crate::errors::domain::DomainError;

pub mod profiles;
pub mod users;

/// Current UTC time as `YYYY-MM-DD HH:MM:SS`, the text stored in
/// `created_at`/`updated_at` and used as the password salt.
pub fn db_timestamp() -> Result<String, DomainError> {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|e| DomainError::internal(format!("Failed to format timestamp: {e}")))
}
