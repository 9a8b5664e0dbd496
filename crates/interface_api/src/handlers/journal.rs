//! Journal entry handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use core_kernel::JournalEntryId;
use domain_ledger::{EntryType, JournalEntry};

use crate::auth::Claims;
use crate::dto::journal::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a draft journal entry
pub async fn create_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let currency = engine.currency();

    let mut entry = JournalEntry::new(
        request.entry_date,
        request.entry_type.unwrap_or(EntryType::Standard),
        request.description,
    );
    for line in request.lines {
        entry = entry.line(line.into_line(currency));
    }
    if let Some(recurrence) = request.recurrence {
        entry = entry.with_recurrence(recurrence.frequency, recurrence.end_date);
    }
    if let Some(reversal_date) = request.auto_reversal_date {
        entry = entry.with_auto_reversal(reversal_date);
    }
    if let Some(number) = request.entry_number {
        entry = entry.with_entry_number(number);
    }

    let id = engine.ledger.create_entry(entry)?;
    let entry = lookup(&engine, &id)?;
    Ok(Json(EntryResponse::from_entry(entry, currency)))
}

/// Lists all journal entries in creation order
pub async fn list_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let engine = state.engine.read().await;
    let currency = engine.currency();
    let entries = engine
        .ledger
        .entries()
        .map(|e| EntryResponse::from_entry(e, currency))
        .collect();
    Ok(Json(entries))
}

/// Gets a journal entry by ID
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    let engine = state.engine.read().await;
    let entry = lookup(&engine, &JournalEntryId::from(id))?;
    Ok(Json(EntryResponse::from_entry(entry, engine.currency())))
}

/// Replaces a draft entry's date, description, and lines
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let entry_id = JournalEntryId::from(id);
    engine.ledger.ensure_version(&entry_id, request.version)?;

    let lines = request
        .lines
        .into_iter()
        .map(|l| l.into_line(currency))
        .collect();
    engine
        .ledger
        .update_draft(&entry_id, request.entry_date, request.description, lines)?;

    let entry = lookup(&engine, &entry_id)?;
    Ok(Json(EntryResponse::from_entry(entry, currency)))
}

/// Hard-deletes a draft entry
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut engine = state.engine.write().await;
    engine.ledger.delete_draft(&JournalEntryId::from(id))?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Posts a draft entry to the ledger
pub async fn post_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostEntryResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let entry_id = JournalEntryId::from(id);

    let reversal = engine.ledger.post(&entry_id, claims.sub.as_str())?;

    let entry = lookup(&engine, &entry_id)?;
    Ok(Json(PostEntryResponse {
        entry: EntryResponse::from_entry(entry, currency),
        auto_reversal_entry_id: reversal.map(|id| *id.as_uuid()),
    }))
}

/// Voids a posted entry
pub async fn void_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VoidEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let entry_id = JournalEntryId::from(id);
    engine.ledger.ensure_version(&entry_id, request.version)?;

    let reason = request.reason.unwrap_or_else(|| "voided".to_string());
    engine.ledger.void(&entry_id, reason)?;

    let entry = lookup(&engine, &entry_id)?;
    Ok(Json(EntryResponse::from_entry(entry, currency)))
}

/// Creates the swapped-lines mirror draft for a posted entry
pub async fn reverse_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let currency = engine.currency();

    let mirror_id = engine.ledger.reverse(&JournalEntryId::from(id))?;
    let mirror = lookup(&engine, &mirror_id)?;
    Ok(Json(EntryResponse::from_entry(mirror, currency)))
}

/// Creates a fresh draft copy of an entry
pub async fn duplicate_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    let mut engine = state.engine.write().await;
    let currency = engine.currency();

    let copy_id = engine.ledger.duplicate(&JournalEntryId::from(id))?;
    let copy = lookup(&engine, &copy_id)?;
    Ok(Json(EntryResponse::from_entry(copy, currency)))
}

#[derive(Serialize)]
pub struct NextNumberResponse {
    pub next_number: String,
}

/// The number the next posted entry would receive
pub async fn next_number(
    State(state): State<AppState>,
) -> Result<Json<NextNumberResponse>, ApiError> {
    let engine = state.engine.read().await;
    Ok(Json(NextNumberResponse {
        next_number: engine.ledger.next_entry_number(),
    }))
}

fn lookup<'a>(
    engine: &'a crate::state::Engine,
    id: &JournalEntryId,
) -> Result<&'a JournalEntry, ApiError> {
    engine
        .ledger
        .get_entry(id)
        .ok_or_else(|| ApiError::NotFound(format!("Journal entry not found: {id}")))
}
