//! Identity provider: who is filling in the profile.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityError;
use crate::store::{ProfileStore, UserRecord};

/// The authenticated user's basic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo_url: Option<String>,
}

impl From<UserRecord> for Identity {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.unwrap_or_default(),
            last_name: user.last_name.unwrap_or_default(),
            profile_photo_url: user.profile_photo_url.filter(|url| !url.is_empty()),
        }
    }
}

/// Source of the current identity. `Ok(None)` means nobody is signed in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<Identity>, IdentityError>;
}

/// Resolves a session's user id against the `users` record.
pub struct SessionIdentity {
    store: Arc<dyn ProfileStore>,
    user_id: Option<Uuid>,
}

impl SessionIdentity {
    pub fn new(store: Arc<dyn ProfileStore>, user_id: Option<Uuid>) -> Self {
        Self { store, user_id }
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn current_user(&self) -> Result<Option<Identity>, IdentityError> {
        let Some(user_id) = self.user_id else {
            return Ok(None);
        };
        let user = self.store.get_user(user_id).await?;
        Ok(user.map(Identity::from))
    }
}
