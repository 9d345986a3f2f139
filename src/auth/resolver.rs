use super::error::StoreError;
use super::traits::UserStore;
use crate::oauth::Profile;
use crate::types::{Email, NewUser, User};

/// Map a provider profile to a local user, creating the user on first login.
///
/// The lookup is only a fast path; correctness under concurrent first logins
/// rests on [`UserStore::create`] being insert-if-absent.
pub async fn resolve_user<U: UserStore>(store: &U, profile: &Profile) -> Result<User, StoreError> {
    let email = Email::from(profile);
    if let Some(user) = store.find_by_email(&email).await? {
        return Ok(user);
    }

    let user = store.create(NewUser::from(profile)).await?;
    tracing::info!(user_id = %user.id(), "Provisioned local user");
    Ok(user)
}
