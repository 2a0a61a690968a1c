use std::sync::Arc;

use tracing::debug;

use crate::auth::{bearer_token, TokenCodec};
use crate::errors::ServiceError;
use crate::model::User;
use crate::storage::RecordStore;

/// Maps an `Authorization` header value to a row of the `users` table.
pub struct IdentityResolver<S: RecordStore + ?Sized> {
    store: Arc<S>,
    codec: TokenCodec,
}

impl<S: RecordStore + ?Sized> IdentityResolver<S> {
    pub fn new(store: Arc<S>, codec: TokenCodec) -> Self { Self { store, codec } }

    /// `Ok(None)` for a missing, malformed, expired or unknown credential.
    /// Only storage failures are errors.
    pub async fn resolve(&self, header: Option<&str>) -> Result<Option<User>, ServiceError> {
        let Some(token) = bearer_token(header) else {
            debug!("no bearer credential");
            return Ok(None);
        };
        let claims = match self.codec.verify(token) {
            Ok(c) => c,
            Err(e) => {
                debug!(err = %e, "credential rejected");
                return Ok(None);
            }
        };
        let Some(user_id) = claims.user_id.filter(|id| !id.is_empty()) else {
            debug!("credential carries no userId");
            return Ok(None);
        };

        let users = self.store.load_users().await?;
        let user = users.into_iter().find(|u| u.id == user_id);
        if user.is_none() {
            debug!(%user_id, "credential names an unknown user");
        }
        Ok(user)
    }
}
