use std::future::Future;

use super::error::StoreError;
use crate::types::{Email, NewUser, User, UserId};

/// Backing storage for local users.
///
/// Users are keyed by email. Implementations must make [`create`] atomic:
/// two concurrent first logins for the same email end up with one row.
///
/// # Example
///
/// ```rust,ignore
/// impl UserStore for PgUsers {
///     async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
///         Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
///             .bind(email.as_str())
///             .fetch_optional(&self.pool)
///             .await?)
///     }
///
///     async fn create(&self, user: NewUser) -> Result<User, StoreError> {
///         // ON CONFLICT keeps the first row and hands it back to every caller.
///         Ok(sqlx::query_as(
///             "INSERT INTO users (email, subject, name) VALUES ($1, $2, $3)
///              ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
///              RETURNING *",
///         )
///         .bind(user.email.as_str())
///         .bind(&user.subject)
///         .bind(&user.name)
///         .fetch_one(&self.pool)
///         .await?)
///     }
///     // ...
/// }
/// ```
///
/// [`create`]: UserStore::create
pub trait UserStore: Send + Sync + 'static {
    /// Look up a user by email.
    fn find_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Insert `user` unless a user with the same email exists.
    ///
    /// Returns the stored user in both cases.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// Look up the user a session's `user_id` refers to.
    fn find_by_id(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send {
        let email = Email(id.as_str().to_owned());
        async move { self.find_by_email(&email).await }
    }
}
