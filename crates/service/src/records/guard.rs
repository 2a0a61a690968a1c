use tracing::warn;

use super::errors::RecordError;
use crate::errors::ServiceError;
use crate::model::{Pet, User};
use crate::storage::RecordStore;

/// Outcome of an access check on one pet.
#[derive(Debug, Clone, PartialEq)]
pub enum PetAccess<T> {
    Granted(T),
    NotFound,
    Denied,
}

impl<T> PetAccess<T> {
    /// Read-path mapping: absent and forbidden look the same to the caller.
    pub fn collapsed(self) -> Result<T, RecordError> {
        match self {
            PetAccess::Granted(v) => Ok(v),
            PetAccess::NotFound | PetAccess::Denied => Err(RecordError::NotFoundOrDenied),
        }
    }

    /// Write-path mapping.
    pub fn distinguished(self) -> Result<T, RecordError> {
        match self {
            PetAccess::Granted(v) => Ok(v),
            PetAccess::NotFound => Err(RecordError::PetNotFound),
            PetAccess::Denied => Err(RecordError::AccessDenied),
        }
    }
}

/// Admins may touch every pet; everyone else only the pets they own.
pub fn can_access(pet: &Pet, user: &User) -> bool {
    user.is_admin() || (!pet.user.is_empty() && pet.user == user.id)
}

/// Index of `pet_id` in `pets`, subject to the access rule.
pub fn locate(pets: &[Pet], pet_id: &str, user: &User) -> PetAccess<usize> {
    match pets.iter().position(|p| p.id == pet_id) {
        None => PetAccess::NotFound,
        Some(idx) if can_access(&pets[idx], user) => PetAccess::Granted(idx),
        Some(_) => {
            warn!(%pet_id, user_id = %user.id, "pet access denied");
            PetAccess::Denied
        }
    }
}

/// Load the pets table and return `pet_id` if `user` may access it.
pub async fn find_pet_with_access<S: RecordStore + ?Sized>(
    store: &S,
    pet_id: &str,
    user: &User,
) -> Result<PetAccess<Pet>, ServiceError> {
    let mut pets = store.load_pets().await?;
    Ok(match locate(&pets, pet_id, user) {
        PetAccess::Granted(idx) => PetAccess::Granted(pets.swap_remove(idx)),
        PetAccess::NotFound => PetAccess::NotFound,
        PetAccess::Denied => PetAccess::Denied,
    })
}
