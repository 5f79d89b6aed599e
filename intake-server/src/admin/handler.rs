//! Data provider handlers

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use crate::admin::provider::{DataProvider, ListParams};
use crate::core::ServerState;
use crate::utils::AppResult;

pub async fn list(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Value>> {
    let page = DataProvider::new(&state)
        .list(&resource, ListParams::from_query(query))
        .await?;
    Ok(Json(json!({ "data": page.data, "total": page.total })))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Path((resource, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let row = DataProvider::new(&state).get_one(&resource, &id).await?;
    Ok(Json(json!({ "data": row })))
}

pub async fn create(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let row = DataProvider::new(&state).create(&resource, body).await?;
    Ok(Json(json!({ "data": row })))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let row = DataProvider::new(&state).update(&resource, &id, body).await?;
    Ok(Json(json!({ "data": row })))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((resource, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    DataProvider::new(&state).delete(&resource, &id).await?;
    Ok(Json(json!({ "data": { "id": id } })))
}
