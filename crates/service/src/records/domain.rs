use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::dates;
use super::errors::RecordError;
use crate::model::ids::present;
use crate::model::HealthRecord;

/// Client input for add/update.
///
/// Each field is `None` when absent and `Some(None)` when explicitly `null`,
/// so an update can clear a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordInput {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub vet: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub vaccine: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date_administered: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<Option<String>>,
}

impl HealthRecordInput {
    /// Build a new record with id `id`; dates are normalized to ISO.
    pub fn into_record(self, id: String) -> Result<HealthRecord, RecordError> {
        let date_administered = dates::normalize_input("dateAdministered", self.date_administered.flatten().as_deref())?;
        let next_due_date = dates::normalize_input("nextDueDate", self.next_due_date.flatten().as_deref())?;
        Ok(HealthRecord {
            id,
            description: self.description.flatten(),
            vet: self.vet.flatten(),
            vaccine: self.vaccine.flatten(),
            date_administered,
            next_due_date,
            extra: Map::new(),
        })
    }

    /// Overwrite every field present in the input. Nothing is written if a date is invalid.
    pub fn apply_to(self, record: &mut HealthRecord) -> Result<(), RecordError> {
        let date_administered = self
            .date_administered
            .map(|v| dates::normalize_input("dateAdministered", v.as_deref()))
            .transpose()?;
        let next_due_date = self
            .next_due_date
            .map(|v| dates::normalize_input("nextDueDate", v.as_deref()))
            .transpose()?;

        if let Some(v) = self.description { record.description = v; }
        if let Some(v) = self.vet { record.vet = v; }
        if let Some(v) = self.vaccine { record.vaccine = v; }
        if let Some(v) = date_administered { record.date_administered = v; }
        if let Some(v) = next_due_date { record.next_due_date = v; }
        Ok(())
    }
}

/// Public shape of a health record. Missing fields are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordView {
    #[serde(rename = "_id")]
    pub id: String,
    pub description: Option<String>,
    pub vet: Option<String>,
    pub vaccine: Option<String>,
    pub date_administered: Option<String>,
    pub next_due_date: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

impl From<&HealthRecord> for HealthRecordView {
    fn from(r: &HealthRecord) -> Self {
        Self {
            id: r.id.clone(),
            description: non_empty(&r.description),
            vet: non_empty(&r.vet),
            vaccine: non_empty(&r.vaccine),
            date_administered: dates::display(r.date_administered.as_deref()),
            next_due_date: dates::display(r.next_due_date.as_deref()),
        }
    }
}

/// Result of add/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordResponse {
    pub message: String,
    pub health_record: HealthRecordView,
}
