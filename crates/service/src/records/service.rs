use std::sync::Arc;

use common::types::Message;
use tracing::{error, info, instrument};

use super::domain::{HealthRecordInput, HealthRecordResponse, HealthRecordView};
use super::errors::RecordError;
use super::guard::{self, find_pet_with_access};
use super::identity::IdentityResolver;
use super::ids::generate_id;
use crate::auth::TokenCodec;
use crate::model::{Pet, User};
use crate::storage::RecordStore;

const RECORD_ID_PREFIX: &str = "rec_";

/// Health-record operations over a pet's `medicalHistory`.
///
/// Every operation resolves the caller from the raw `Authorization` header,
/// checks pet access, then reads (list/get) or runs one read-modify-write of
/// the pets table (add/update/delete).
pub struct HealthRecordService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    identity: IdentityResolver<S>,
}

impl<S: RecordStore + ?Sized> HealthRecordService<S> {
    pub fn new(store: Arc<S>, codec: TokenCodec) -> Self {
        let identity = IdentityResolver::new(Arc::clone(&store), codec);
        Self { store, identity }
    }

    async fn authenticate(&self, credential: Option<&str>) -> Result<User, RecordError> {
        self.identity.resolve(credential).await?.ok_or(RecordError::Unauthorized)
    }

    async fn readable_pet(&self, pet_id: &str, user: &User) -> Result<Pet, RecordError> {
        Ok(find_pet_with_access(self.store.as_ref(), pet_id, user).await?.collapsed()?)
    }

    /// Run `f` on the pet under the pets write lock and persist the table if it succeeds.
    async fn mutate_pet<T, F>(&self, pet_id: &str, user: &User, f: F) -> Result<T, RecordError>
    where
        F: FnOnce(&mut Pet) -> Result<T, RecordError>,
    {
        let _guard = self.store.pets_write_lock().lock().await;
        let mut pets = self.store.load_pets().await?;
        let idx = guard::locate(&pets, pet_id, user).distinguished()?;
        let out = f(&mut pets[idx])?;
        self.store.save_pets(&pets).await.map_err(|e| {
            error!(%pet_id, err = %e, "failed to persist pets table");
            e
        })?;
        Ok(out)
    }

    #[instrument(skip(self, credential))]
    pub async fn list_records(&self, pet_id: &str, credential: Option<&str>) -> Result<Vec<HealthRecordView>, RecordError> {
        let user = self.authenticate(credential).await?;
        let pet = self.readable_pet(pet_id, &user).await?;
        Ok(pet.medical_history.iter().map(HealthRecordView::from).collect())
    }

    #[instrument(skip(self, credential))]
    pub async fn get_record(
        &self,
        pet_id: &str,
        record_id: &str,
        credential: Option<&str>,
    ) -> Result<HealthRecordView, RecordError> {
        let user = self.authenticate(credential).await?;
        let pet = self.readable_pet(pet_id, &user).await?;
        pet.find_record(record_id).map(HealthRecordView::from).ok_or(RecordError::RecordNotFound)
    }

    #[instrument(skip(self, input, credential))]
    pub async fn add_record(
        &self,
        pet_id: &str,
        input: HealthRecordInput,
        credential: Option<&str>,
    ) -> Result<HealthRecordResponse, RecordError> {
        let user = self.authenticate(credential).await?;
        let record = self
            .mutate_pet(pet_id, &user, |pet| {
                let mut id = generate_id(RECORD_ID_PREFIX);
                while pet.has_record(&id) {
                    id = generate_id(RECORD_ID_PREFIX);
                }
                let record = input.into_record(id)?;
                pet.medical_history.push(record.clone());
                Ok(record)
            })
            .await?;
        info!(%pet_id, record_id = %record.id, user_id = %user.id, "health_record_added");
        Ok(HealthRecordResponse {
            message: "Health record added successfully".into(),
            health_record: HealthRecordView::from(&record),
        })
    }

    #[instrument(skip(self, input, credential))]
    pub async fn update_record(
        &self,
        pet_id: &str,
        record_id: &str,
        input: HealthRecordInput,
        credential: Option<&str>,
    ) -> Result<HealthRecordResponse, RecordError> {
        let user = self.authenticate(credential).await?;
        let record = self
            .mutate_pet(pet_id, &user, |pet| {
                let idx = pet.record_position(record_id).ok_or(RecordError::RecordNotFound)?;
                let record = &mut pet.medical_history[idx];
                input.apply_to(record)?;
                Ok(record.clone())
            })
            .await?;
        info!(%pet_id, %record_id, user_id = %user.id, "health_record_updated");
        Ok(HealthRecordResponse {
            message: "Health record updated successfully".into(),
            health_record: HealthRecordView::from(&record),
        })
    }

    #[instrument(skip(self, credential))]
    pub async fn delete_record(
        &self,
        pet_id: &str,
        record_id: &str,
        credential: Option<&str>,
    ) -> Result<Message, RecordError> {
        let user = self.authenticate(credential).await?;
        self.mutate_pet(pet_id, &user, |pet| {
            let idx = pet.record_position(record_id).ok_or(RecordError::RecordNotFound)?;
            pet.medical_history.remove(idx);
            Ok(())
        })
        .await?;
        info!(%pet_id, %record_id, user_id = %user.id, "health_record_deleted");
        Ok(Message::new("Health record deleted successfully"))
    }
}
