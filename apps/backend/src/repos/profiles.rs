use std::sync::Arc;

use db_infra::{QueryExecutor, QueryRequest, TransactionContext};
use tracing::debug;

use super::db_timestamp;
use crate::errors::domain::DomainError;

/// Profiles are private only when the user opts in.
pub const DEFAULT_IS_PRIVATE: i64 = 0;

pub struct ProfileRepository {
    executor: Arc<QueryExecutor>,
}

impl ProfileRepository {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Insert the profile row for `user_id`.
    ///
    /// Runs on `ctx`'s connection when a transaction is active there.
    pub async fn create_profile(
        &self,
        ctx: &mut TransactionContext,
        user_id: i64,
    ) -> Result<(), DomainError> {
        let now = db_timestamp()?;
        let request = QueryRequest::new(
            "Profile Model | createProfile",
            "INSERT INTO profiles (user_id, is_private, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(DEFAULT_IS_PRIVATE)
        .bind(now.as_str())
        .bind(now.as_str());

        self.executor
            .execute(Some(ctx), &request)
            .await
            .map_err(DomainError::ProfileInsertFailed)?;

        debug!(user_id, "Profile created");
        Ok(())
    }
}
