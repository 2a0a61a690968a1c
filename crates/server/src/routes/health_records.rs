use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use common::types::Message;
use service::records::{HealthRecordInput, HealthRecordResponse, HealthRecordView};

use super::auth::{credential, ServerState};
use crate::errors::JsonApiError;

pub async fn list(
    State(state): State<ServerState>,
    Path(pet_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<HealthRecordView>>, JsonApiError> {
    let records = state.records.list_records(&pet_id, credential(&headers)).await?;
    Ok(Json(records))
}

pub async fn get(
    State(state): State<ServerState>,
    Path((pet_id, record_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<HealthRecordView>, JsonApiError> {
    let record = state.records.get_record(&pet_id, &record_id, credential(&headers)).await?;
    Ok(Json(record))
}

pub async fn create(
    State(state): State<ServerState>,
    Path(pet_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<HealthRecordInput>, JsonRejection>,
) -> Result<(StatusCode, Json<HealthRecordResponse>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.records.add_record(&pet_id, input, credential(&headers)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((pet_id, record_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<HealthRecordInput>, JsonRejection>,
) -> Result<Json<HealthRecordResponse>, JsonApiError> {
    let Json(input) = payload?;
    let updated = state.records.update_record(&pet_id, &record_id, input, credential(&headers)).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((pet_id, record_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Message>, JsonApiError> {
    let msg = state.records.delete_record(&pet_id, &record_id, credential(&headers)).await?;
    Ok(Json(msg))
}
