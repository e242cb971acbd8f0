//! Credential check against the in-state user list.

use crate::error::AuthError;
use crate::types::User;

/// Find the user matching `uid` and `password`.
///
/// The UID comparison is case-insensitive; the password comparison is
/// exact. Every failure (unknown UID, missing password on the account, or
/// a wrong password) yields the same generic error, and there is no
/// lockout or throttling.
pub fn authenticate<'a>(
    users: &'a [User],
    uid: &str,
    password: &str,
) -> Result<&'a User, AuthError> {
    let user = users.iter().find(|u| u.uid.eq_ignore_ascii_case(uid));
    match user {
        Some(u) if u.password.as_deref() == Some(password) => Ok(u),
        _ => Err(AuthError::InvalidCredentials),
    }
}
