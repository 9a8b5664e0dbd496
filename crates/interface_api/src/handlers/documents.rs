//! Document lifecycle handlers
//!
//! One handler set serves all four document kinds; the `:kind` path
//! segment selects the family (invoices, bills, credit-notes,
//! debit-notes).

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use core_kernel::{DocumentId, Money, PartyId};
use domain_documents::{
    AllocationTarget, Document, DocumentFilter, DocumentKind, SortField,
};

use crate::auth::Claims;
use crate::dto::documents::*;
use crate::dto::PageResponse;
use crate::error::ApiError;
use crate::AppState;

fn parse_kind(kind: &str) -> Result<DocumentKind, ApiError> {
    match kind {
        "invoices" => Ok(DocumentKind::Invoice),
        "bills" => Ok(DocumentKind::Bill),
        "credit-notes" => Ok(DocumentKind::CreditNote),
        "debit-notes" => Ok(DocumentKind::DebitNote),
        other => Err(ApiError::NotFound(format!("Unknown document family: {other}"))),
    }
}

fn parse_sort(sort: Option<&str>) -> SortField {
    match sort {
        Some("number") => SortField::Number,
        Some("total") => SortField::Total,
        Some("remaining_balance") => SortField::RemainingBalance,
        _ => SortField::DocumentDate,
    }
}

/// Creates a draft document
pub async fn create_document(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let currency = engine.currency();

    let mut doc = Document::new(
        kind,
        PartyId::from(request.party_id),
        request.document_date,
        currency,
    );
    doc.lines = request
        .lines
        .into_iter()
        .map(|l| l.into_line(currency))
        .collect();
    doc.discount = request.discount;
    doc.due_date = request.due_date;
    doc.reference = request.reference;
    doc.number = request.number;

    let id = engine.registry.create_document(doc)?;
    let doc = lookup(&engine, kind, &id)?;
    Ok(Json(DocumentResponse::from_document(doc)))
}

/// Filtered, sorted, paginated listing for one document family
pub async fn list_documents(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<PageResponse<DocumentResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;

    let filter = DocumentFilter {
        kind: Some(kind),
        phase: query.phase,
        party_id: query.party_id.map(PartyId::from),
        from: query.from,
        to: query.to,
        search: query.search,
    };
    let descending = query.order.as_deref() == Some("desc");
    let page = engine.registry.list(
        &filter,
        parse_sort(query.sort.as_deref()),
        descending,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(25),
    );

    Ok(Json(PageResponse {
        items: page.items.iter().map(DocumentResponse::from_document).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
    }))
}

/// Gets a document by ID
pub async fn get_document(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;
    let doc = lookup(&engine, kind, &DocumentId::from(id))?;
    Ok(Json(DocumentResponse::from_document(doc)))
}

/// Replaces a draft's editable content
pub async fn update_document(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;
    engine.registry.ensure_version(&doc_id, request.version)?;

    let lines = request
        .lines
        .into_iter()
        .map(|l| l.into_line(currency))
        .collect();
    engine.registry.update_draft(
        &doc_id,
        lines,
        request.discount,
        request.due_date,
        request.reference,
    )?;

    let doc = lookup(&engine, kind, &doc_id)?;
    Ok(Json(DocumentResponse::from_document(doc)))
}

/// Hard-deletes a draft with no allocations
pub async fn delete_document(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;
    engine.registry.delete_draft(&doc_id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Issues a draft: assigns a number, posts journal lines, opens the
/// document for settlement
pub async fn issue_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;

    let engine = &mut *engine;
    engine.registry.issue(&mut engine.ledger, &doc_id, &claims.sub)?;

    let doc = engine
        .registry
        .get(&doc_id)
        .ok_or_else(|| ApiError::NotFound(format!("Document not found: {doc_id}")))?;
    Ok(Json(DocumentResponse::from_document(doc)))
}

/// Voids a document, detaching allocations and reversing postings
pub async fn void_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<VoidDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;
    engine.registry.ensure_version(&doc_id, request.version)?;
    let reason = request.reason.unwrap_or_else(|| "voided".to_string());

    let engine = &mut *engine;
    engine
        .registry
        .void_document(&mut engine.ledger, &doc_id, reason, &claims.sub)?;

    let doc = engine
        .registry
        .get(&doc_id)
        .ok_or_else(|| ApiError::NotFound(format!("Document not found: {doc_id}")))?;
    Ok(Json(DocumentResponse::from_document(doc)))
}

/// Creates a fresh draft copy of a document
pub async fn duplicate_document(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;

    let copy_id = engine.registry.duplicate(&doc_id)?;
    let copy = lookup(&engine, kind, &copy_id)?;
    Ok(Json(DocumentResponse::from_document(copy)))
}

/// Capability set for one document
pub async fn allowed_actions(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<CapabilityResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;
    let doc_id = DocumentId::from(id);

    let doc = lookup(&engine, kind, &doc_id)?;
    let actions = doc.allowed_actions();
    Ok(Json(CapabilityResponse::new(
        doc.status_label().to_string(),
        actions,
    )))
}

/// Records a payment against an invoice or bill
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;

    let engine = &mut *engine;
    let payment_id = engine.registry.record_payment(
        &mut engine.ledger,
        &doc_id,
        request.payment_date,
        Money::new(request.amount, currency),
        request.method,
        request.reference,
        &claims.sub,
    )?;

    let payment = engine
        .registry
        .get_payment(&payment_id)
        .ok_or_else(|| ApiError::Internal("Payment vanished after insert".to_string()))?;
    Ok(Json(PaymentResponse::from_payment(payment)))
}

/// Applies a note's balance against invoices or bills
pub async fn allocate(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<AllocateRequest>,
) -> Result<Json<Vec<AllocationResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;

    let targets: Vec<AllocationTarget> = request
        .targets
        .into_iter()
        .map(|t| AllocationTarget {
            document_id: DocumentId::from(t.target_id),
            amount: Money::new(t.amount, currency),
        })
        .collect();

    let created = engine.registry.allocate(&doc_id, &targets)?;
    Ok(Json(
        created.iter().map(AllocationResponse::from_allocation).collect(),
    ))
}

/// Lists every allocation a document is party to
pub async fn list_allocations(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<AllocationResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;

    Ok(Json(
        engine
            .registry
            .allocations_for(&doc_id)
            .into_iter()
            .map(AllocationResponse::from_allocation)
            .collect(),
    ))
}

/// Pays out (or collects) a note's remaining balance as cash
pub async fn refund(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mut engine = state.engine.write().await;
    let currency = engine.currency();
    let doc_id = DocumentId::from(id);
    lookup(&engine, kind, &doc_id)?;

    let engine = &mut *engine;
    let refund_id = engine.registry.refund(
        &mut engine.ledger,
        &doc_id,
        Money::new(request.amount, currency),
        request.method,
        request.refund_date,
        &claims.sub,
    )?;

    let refund = engine
        .registry
        .get_refund(&refund_id)
        .ok_or_else(|| ApiError::Internal("Refund vanished after insert".to_string()))?;
    Ok(Json(RefundResponse {
        id: *refund.id.as_uuid(),
        document_id: *refund.document_id.as_uuid(),
        amount: refund.amount.amount(),
        method: refund.method,
        refund_date: refund.refund_date,
        journal_entry_id: *refund.journal_entry.as_uuid(),
    }))
}

/// Aggregate counts and open balances for the family
pub async fn summary(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;
    let summary = engine.registry.summary(
        kind,
        chrono::Utc::now().date_naive(),
        engine.currency(),
    );
    Ok(Json(SummaryResponse::from_summary(&summary)))
}

#[derive(Serialize)]
pub struct NextNumberResponse {
    pub next_number: String,
}

/// The number the next issued document would receive
pub async fn next_number(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<NextNumberResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;
    Ok(Json(NextNumberResponse {
        next_number: engine.registry.next_number(kind),
    }))
}

/// Materialized capability table: what each status value of this
/// family permits
pub async fn capabilities(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<CapabilityResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let engine = state.engine.read().await;
    Ok(Json(
        engine
            .registry
            .status_capabilities(kind)
            .into_iter()
            .map(|(status, actions)| CapabilityResponse::new(status, actions))
            .collect(),
    ))
}

/// A document is only reachable through its own family's routes; an
/// invoice fetched via /bills/:id is a 404, not a leak
fn lookup<'a>(
    engine: &'a crate::state::Engine,
    kind: DocumentKind,
    id: &DocumentId,
) -> Result<&'a Document, ApiError> {
    engine
        .registry
        .get(id)
        .filter(|doc| doc.kind == kind)
        .ok_or_else(|| ApiError::NotFound(format!("Document not found: {id}")))
}
