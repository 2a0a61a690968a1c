use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput};
use super::errors::AuthError;
use super::token::TokenCodec;
use crate::storage::RecordStore;

/// Issues bearer tokens for users of the `users` table.
pub struct AuthService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    codec: TokenCodec,
}

impl<S: RecordStore + ?Sized> AuthService<S> {
    pub fn new(store: Arc<S>, codec: TokenCodec) -> Self { Self { store, codec } }

    /// Authenticate by email and password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, token::TokenCodec, domain::LoginInput};
    /// use service::model::{Role, User};
    /// use service::storage::MemoryRecordStore;
    /// use std::sync::Arc;
    /// let store = Arc::new(MemoryRecordStore::with_data(
    ///     vec![User::new("user1", "Alice", "alice@example.com", "password", Role::User)],
    ///     vec![],
    /// ));
    /// let svc = AuthService::new(store, TokenCodec::new("secret", 3600));
    /// let input = LoginInput { email: "alice@example.com".into(), password: "password".into() };
    /// let session = tokio_test::block_on(svc.login(input)).unwrap();
    /// assert_eq!(session.user.id, "user1");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }
        let users = self.store.load_users().await?;
        let user = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(input.email.trim()))
            .ok_or(AuthError::Unauthorized)?;
        if user.password != input.password {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let (token, expires_at) = self.codec.issue(user)?;
        info!(user_id = %user.id, role = user.role.as_str(), "token_issued");
        Ok(AuthSession { user: AuthUser::from(user), token, expires_at })
    }
}
