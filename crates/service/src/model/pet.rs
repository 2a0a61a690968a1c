use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::ids::{id_from_value, id_string};

const HISTORY_KEY: &str = "medicalHistory";

/// A row of the `pets` table.
///
/// Only the id, the owner and `medicalHistory` are interpreted. Every other
/// key (name, species, age, ...) stays in `document` exactly as stored, and
/// the row is written back with its original keys in their original order, so
/// saving the table leaves pets that were not touched unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    /// `id` (or legacy `_id`) normalized to a string; empty when missing.
    pub id: String,
    /// Owning `User.id`; a lookup key only.
    pub user: String,
    pub medical_history: Vec<HealthRecord>,
    document: Map<String, Value>,
}

impl Pet {
    pub fn new(id: &str, owner: &str, name: &str, species: &str, age: Option<u32>, breed: &str) -> Self {
        let mut document = Map::new();
        document.insert("id".into(), Value::from(id));
        document.insert("user".into(), Value::from(owner));
        document.insert("name".into(), Value::from(name));
        document.insert("species".into(), Value::from(species));
        if let Some(age) = age {
            document.insert("age".into(), Value::from(age));
        }
        document.insert("breed".into(), Value::from(breed));
        document.insert(HISTORY_KEY.into(), Value::Null);
        Self { id: id.to_string(), user: owner.to_string(), medical_history: Vec::new(), document }
    }

    /// A stored key other than `medicalHistory`, as found in the file.
    pub fn field(&self, key: &str) -> Option<&Value> {
        if key == HISTORY_KEY {
            return None;
        }
        self.document.get(key)
    }

    pub fn record_position(&self, record_id: &str) -> Option<usize> {
        self.medical_history.iter().position(|r| r.id == record_id)
    }

    pub fn find_record(&self, record_id: &str) -> Option<&HealthRecord> {
        self.medical_history.iter().find(|r| r.id == record_id)
    }

    pub fn has_record(&self, record_id: &str) -> bool {
        self.record_position(record_id).is_some()
    }
}

impl<'de> Deserialize<'de> for Pet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut document = Map::<String, Value>::deserialize(deserializer)?;
        let id = document.get("id").or_else(|| document.get("_id")).and_then(id_from_value).unwrap_or_default();
        let user = document.get("user").and_then(id_from_value).unwrap_or_default();
        // the history is held in `medical_history`; its key keeps its slot as a placeholder
        let medical_history = match document.get_mut(HISTORY_KEY).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(history) => serde_json::from_value(history).map_err(D::Error::custom)?,
        };
        Ok(Self { id, user, medical_history, document })
    }
}

impl Serialize for Pet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keep_history = self.document.contains_key(HISTORY_KEY) || !self.medical_history.is_empty();
        let extra_entry = usize::from(keep_history && !self.document.contains_key(HISTORY_KEY));
        let mut map = serializer.serialize_map(Some(self.document.len() + extra_entry))?;
        for (key, value) in &self.document {
            if key == HISTORY_KEY {
                map.serialize_entry(key, &self.medical_history)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        if extra_entry == 1 {
            map.serialize_entry(HISTORY_KEY, &self.medical_history)?;
        }
        map.end()
    }
}

/// One entry of a pet's medical history. Dates are stored as ISO-8601 strings.
///
/// Unset fields are not written. Keys this service does not manage are kept in
/// `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    #[serde(default, alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vaccine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_administered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
