//! Sample data for a fresh data directory.

use tracing::info;

use crate::errors::ServiceError;
use crate::model::{Pet, Role, User};
use crate::storage::RecordStore;

pub fn sample_users() -> Vec<User> {
    vec![
        User::new("admin1", "Admin", "admin@example.com", "password", Role::Admin),
        User::new("user1", "Alice", "alice@example.com", "password", Role::User),
    ]
}

pub fn sample_pets() -> Vec<Pet> {
    vec![Pet::new("pet1", "user1", "Rex", "dog", Some(4), "labrador")]
}

/// Fill whichever tables are empty with the sample rows; tables that already
/// have rows are not rewritten. Returns whether anything was written.
pub async fn seed_if_empty<S: RecordStore + ?Sized>(store: &S) -> Result<bool, ServiceError> {
    let mut changed = false;
    if store.load_users().await?.is_empty() {
        let users = sample_users();
        store.save_users(&users).await?;
        info!(users = users.len(), "seeded sample users");
        changed = true;
    }
    if store.load_pets().await?.is_empty() {
        let pets = sample_pets();
        store.save_pets(&pets).await?;
        info!(pets = pets.len(), "seeded sample pets");
        changed = true;
    }
    Ok(changed)
}
