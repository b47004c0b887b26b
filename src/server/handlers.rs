//! Generic CRUD handlers
//!
//! One set of handlers serves every entity kind. Each request opens its own
//! store session and drops it before the response is written.

use crate::core::error::{EntityError, LabError};
use crate::core::mapping::Mapped;
use crate::core::query::{QueryExecutor, QueryModel, QueryParams};
use crate::core::service::Writable;
use crate::storage::{InMemoryStore, Stored, WriteSession};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use std::collections::HashMap;
use validator::Validate;

/// Everything a kind needs to be served over HTTP
pub trait Resource: QueryModel + Mapped + Stored {}

impl<E: QueryModel + Mapped + Stored> Resource for E {}

/// Response for list endpoints
#[derive(Debug, Serialize)]
pub struct ListResponse<D> {
    pub items: Vec<D>,
    pub count: usize,
}

fn not_found<E: Resource>(id: i64) -> LabError {
    EntityError::NotFound {
        entity_type: E::resource_name_singular().to_string(),
        id,
    }
    .into()
}

/// Reload a freshly written row with its related names attached
async fn reload<E: Resource>(session: &WriteSession, row: E) -> Result<E, LabError> {
    Ok(QueryExecutor::find::<E, _>(session, row.id())
        .await?
        .unwrap_or(row))
}

/// `GET /api/{plural}`
pub async fn list<E: Resource>(
    State(store): State<InMemoryStore>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<E::Dto>>, LabError> {
    let params = QueryParams::from_query_map(query);
    let session = store.session().await?;
    let rows = QueryExecutor::execute::<E, _>(&session, &params).await?;
    drop(session);

    let items: Vec<E::Dto> = rows.iter().map(Mapped::to_dto).collect();
    Ok(Json(ListResponse {
        count: items.len(),
        items,
    }))
}

/// `GET /api/{plural}/{id}`
pub async fn get<E: Resource>(
    State(store): State<InMemoryStore>,
    Path(id): Path<i64>,
) -> Result<Json<E::Dto>, LabError> {
    let session = store.session().await?;
    let row = QueryExecutor::find::<E, _>(&session, id)
        .await?
        .ok_or_else(|| not_found::<E>(id))?;
    Ok(Json(row.to_dto()))
}

/// `POST /api/{plural}`
pub async fn create<E: Resource>(
    State(store): State<InMemoryStore>,
    Json(input): Json<E::Input>,
) -> Result<(StatusCode, Json<E::Dto>), LabError> {
    input.validate()?;
    let entity = E::from_input(input)?;

    let mut session = store.write_session().await?;
    let created = Writable::<E>::insert(&mut session, entity).await?;
    let created = reload(&session, created).await?;

    tracing::info!(
        entity = E::resource_name_singular(),
        id = created.id(),
        "created"
    );
    Ok((StatusCode::CREATED, Json(created.to_dto())))
}

/// `PUT /api/{plural}/{id}`: fields absent from the body are left unchanged
///
/// An explicit `null` clears nullable references (`customerId`, `batchId`,
/// `productId` on KPIs) and optional timestamps or durations. On other
/// optional fields `null` reads as absent.
pub async fn update<E: Resource>(
    State(store): State<InMemoryStore>,
    Path(id): Path<i64>,
    Json(input): Json<E::Input>,
) -> Result<Json<E::Dto>, LabError> {
    input.validate()?;

    let mut session = store.write_session().await?;
    let mut entity = QueryExecutor::find::<E, _>(&session, id)
        .await?
        .ok_or_else(|| not_found::<E>(id))?;
    entity.apply_input(input)?;

    let updated = Writable::<E>::update(&mut session, id, entity)
        .await?
        .ok_or_else(|| not_found::<E>(id))?;
    let updated = reload(&session, updated).await?;
    Ok(Json(updated.to_dto()))
}

/// `DELETE /api/{plural}/{id}`
pub async fn delete<E: Resource>(
    State(store): State<InMemoryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, LabError> {
    let mut session = store.write_session().await?;
    if Writable::<E>::delete(&mut session, id).await? {
        tracing::info!(entity = E::resource_name_singular(), id, "deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<E>(id))
    }
}
