//! User repository: signup (user + profile in one transaction), lookup and sign-in.

use std::sync::Arc;

use db_infra::{
    DbError, QueryExecutor, QueryRequest, Row, SqlValue, TransactionContext,
    TransactionCoordinator, WherePredicate,
};
use serde::Serialize;
use tracing::{debug, info};

use super::db_timestamp;
use super::profiles::ProfileRepository;
use crate::auth::password::{hash_password, verify_password};
use crate::errors::domain::{DomainError, INVALID_CREDENTIALS_MESSAGE};

pub const SIGNUP_TRANSACTION: &str = "Signup User Transaction";

/// Columns `get_user` accepts in a filter.
pub const USER_LOOKUP_COLUMNS: &[&str] = &["id", "first_name", "last_name", "email_address"];

/// New users are active immediately.
const ACTIVE: i64 = 1;

/// Fields submitted at signup. `password` is `None` for identity-provider
/// signups, which skip the duplicate-email check.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: Option<String>,
}

/// Public fields of a user, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

pub struct UserRepository {
    executor: Arc<QueryExecutor>,
    txns: Arc<TransactionCoordinator>,
    profiles: Arc<ProfileRepository>,
}

impl UserRepository {
    pub fn new(
        executor: Arc<QueryExecutor>,
        txns: Arc<TransactionCoordinator>,
        profiles: Arc<ProfileRepository>,
    ) -> Self {
        Self {
            executor,
            txns,
            profiles,
        }
    }

    /// Create a user and its profile atomically.
    ///
    /// Any failure after `begin` rolls the whole transaction back before the
    /// error is returned, so either both rows exist or neither does.
    pub async fn create_user_with_profile(
        &self,
        new_user: &NewUser,
    ) -> Result<UserSummary, DomainError> {
        let mut ctx = TransactionContext::new();
        self.txns.begin(&mut ctx, SIGNUP_TRANSACTION).await?;

        match self.signup_steps(&mut ctx, new_user).await {
            Ok(user) => {
                self.txns.commit(&mut ctx).await?;
                info!(user_id = user.id, "User signed up");
                Ok(user)
            }
            Err(err) => {
                self.txns.rollback(&mut ctx).await;
                debug!(error = %err, "Signup rolled back");
                Err(err)
            }
        }
    }

    async fn signup_steps(
        &self,
        ctx: &mut TransactionContext,
        new_user: &NewUser,
    ) -> Result<UserSummary, DomainError> {
        let password = new_user.password.as_deref().filter(|p| !p.is_empty());

        let existing = self
            .get_user(
                Some(&mut *ctx),
                &[("email_address", SqlValue::from(&new_user.email_address))],
            )
            .await?;
        if existing.is_some() && password.is_some() {
            return Err(DomainError::DuplicateEmail);
        }

        let created_at = db_timestamp()?;
        let insert = QueryRequest::new(
            "User Model | signupUser",
            "INSERT INTO users (first_name, last_name, email_address, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email_address)
        .bind(ACTIVE)
        .bind(created_at.as_str())
        .bind(created_at.as_str());

        let inserted = self
            .executor
            .execute(Some(&mut *ctx), &insert)
            .await
            .map_err(DomainError::InsertFailed)?;
        let user_id = inserted
            .last_insert_id
            .ok_or_else(|| DomainError::internal("User insert returned no id"))?;

        if let Some(password) = password {
            self.set_password(ctx, user_id, &created_at, password).await?;
        }

        self.profiles.create_profile(ctx, user_id).await?;

        Ok(UserSummary {
            id: user_id,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email_address: new_user.email_address.clone(),
        })
    }

    async fn set_password(
        &self,
        ctx: &mut TransactionContext,
        user_id: i64,
        salt: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        let request = QueryRequest::new(
            "UserModel | _hashPassword",
            "UPDATE users SET password = ? WHERE id = ?",
        )
        .bind(hash_password(salt, password))
        .bind(user_id);

        self.executor
            .execute(Some(ctx), &request)
            .await
            .map_err(DomainError::PasswordUpdateFailed)?;
        Ok(())
    }

    /// Find the id of the first user matching every `(column, value)` pair.
    ///
    /// The filter must be non-empty and use only [`USER_LOOKUP_COLUMNS`].
    pub async fn get_user(
        &self,
        ctx: Option<&mut TransactionContext>,
        filter: &[(&str, SqlValue)],
    ) -> Result<Option<i64>, DomainError> {
        if filter.is_empty() {
            return Err(DomainError::validation(
                "User lookup requires at least one field.",
            ));
        }
        if let Some((column, _)) = filter
            .iter()
            .find(|(column, _)| !USER_LOOKUP_COLUMNS.contains(column))
        {
            return Err(DomainError::validation(format!(
                "Unknown user field: {column}"
            )));
        }

        let label = "User Model | getUser";
        let predicate = WherePredicate::build(filter.iter().map(|(c, v)| (*c, v.clone())));
        let request = QueryRequest::new(
            label,
            format!(
                "SELECT id FROM users WHERE {} ORDER BY id LIMIT 1",
                predicate.clause()
            ),
        )
        .bind_all(predicate.into_args());

        let result = self.executor.execute(ctx, &request).await?;
        let id = result
            .first_row()
            .map(|row| row.try_get::<i64, _>("id"))
            .transpose()
            .map_err(|e| DbError::driver(label, e))?;
        Ok(id)
    }

    /// Check an email/password pair against the stored salted digest.
    pub async fn signin_user(
        &self,
        email_address: &str,
        password: &str,
    ) -> Result<UserSummary, DomainError> {
        let label = "UserModel | SigninUser";
        let request = QueryRequest::new(
            label,
            "SELECT id, first_name, last_name, password, CAST(created_at AS CHAR) AS created_at \
             FROM users WHERE email_address = ? AND password IS NOT NULL ORDER BY id LIMIT 1",
        )
        .bind(email_address)
        .require_rows(INVALID_CREDENTIALS_MESSAGE);

        let result = match self.executor.execute(None, &request).await {
            Ok(result) => result,
            Err(DbError::EmptyResult { .. }) => return Err(DomainError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };
        let row = result
            .first_row()
            .ok_or(DomainError::InvalidCredentials)?;

        let decode = |e| DomainError::from(DbError::driver(label, e));
        let stored: String = row.try_get("password").map_err(decode)?;
        let salt: String = row.try_get("created_at").map_err(decode)?;
        if !verify_password(&salt, password, &stored) {
            return Err(DomainError::InvalidCredentials);
        }

        Ok(UserSummary {
            id: row.try_get("id").map_err(decode)?,
            first_name: row.try_get("first_name").map_err(decode)?,
            last_name: row.try_get("last_name").map_err(decode)?,
            email_address: email_address.to_string(),
        })
    }
}
