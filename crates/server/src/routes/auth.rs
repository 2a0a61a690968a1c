use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use service::auth::{domain::{AuthSession, LoginInput}, AuthService, TokenCodec};
use service::records::HealthRecordService;
use service::storage::RecordStore;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub records: Arc<HealthRecordService<dyn RecordStore>>,
    pub auth: Arc<AuthService<dyn RecordStore>>,
}

impl ServerState {
    pub fn new(store: Arc<dyn RecordStore>, codec: TokenCodec) -> Self {
        Self {
            records: Arc::new(HealthRecordService::new(Arc::clone(&store), codec.clone())),
            auth: Arc::new(AuthService::new(store, codec)),
        }
    }
}

/// Raw `Authorization` header value, handed to the service untouched.
pub fn credential(headers: &HeaderMap) -> Option<&str> {
    headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok())
}

pub async fn issue_token(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<AuthSession>, JsonApiError> {
    let Json(input) = payload?;
    let session = state.auth.login(input).await?;
    Ok(Json(session))
}
