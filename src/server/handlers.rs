// file: src/server/handlers.rs
// description: http handlers for upload, listing, search and pdf viewing
// reference: https://docs.rs/axum

use crate::database::DocumentQueries;
use crate::error::RepositoryError;
use crate::models::{Document, DocumentSummary, PageRecord, SearchMatch, UploadReceipt};
use crate::pipeline::PreUploadedDocument;
use crate::server::AppState;
use crate::server::error::{ApiError, ViewError};
use crate::server::views;
use crate::storage::{OpenedBinary, SignedUpload};
use crate::utils::telemetry::database_check;
use crate::utils::validation::PDF_CONTENT_TYPE;
use crate::utils::{HealthCheck, HealthReport, Validator};
use axum::extract::{FromRequest, Multipart, Path, Query, Request};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const UPLOAD_FIELD: &str = "pdfFile";

#[derive(Debug, Deserialize)]
pub struct SerialQuery {
    pub serial: Option<String>,
    #[serde(rename = "documentoId")]
    pub documento_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "documentoId")]
    pub documento_id: Option<String>,
    pub pagina: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub pagina: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
    #[serde(rename = "fileType")]
    pub file_type: Option<String>,
}

pub async fn index(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let documents = match state.processor.list().await {
        Ok(documents) => documents,
        Err(e) => {
            error!("Could not load documents for the index page: {}", e);
            Vec::new()
        }
    };

    Html(views::render_document_list(&documents))
}

/// Always answers with an array so list consumers never break.
pub async fn list_documents(
    Extension(state): Extension<Arc<AppState>>,
) -> (StatusCode, Json<Vec<DocumentSummary>>) {
    match state.processor.list().await {
        Ok(documents) => (StatusCode::OK, Json(documents)),
        Err(e) => {
            error!("Could not list documents: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()))
        }
    }
}

/// Multipart bodies carry a PDF to extract; JSON bodies register an object
/// already pushed to the bucket.
pub async fn upload(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
) -> Result<Json<UploadReceipt>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let receipt = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        upload_multipart(&state, multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(upload) = Json::<PreUploadedDocument>::from_request(request, &())
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        state
            .processor
            .register_object(upload)
            .await
            .map_err(|e| ApiError::from_repository(e, "Could not register the document"))?
    } else {
        return Err(ApiError::bad_request("No file was uploaded"));
    };

    Ok(Json(receipt))
}

async fn upload_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadReceipt, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;

        Validator::validate_pdf_upload(
            content_type.as_deref(),
            bytes.len(),
            state.max_upload_bytes,
        )?;

        return state
            .processor
            .upload_pdf(&file_name, bytes.to_vec())
            .await
            .map_err(|e| ApiError::from_repository(e, "Could not process the PDF"));
    }

    Err(ApiError::bad_request("No file was uploaded"))
}

pub async fn delete_document(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = Validator::parse_document_id(&id)?;

    state
        .processor
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository(e, "Could not delete the document"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Document deleted"
    })))
}

pub async fn search_serial(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SerialQuery>,
) -> Result<Json<Vec<SearchMatch>>, ApiError> {
    let serial = Validator::validate_serial(query.serial.as_deref())?;
    let document = match query.documento_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(Validator::parse_document_id(raw)?),
        _ => None,
    };

    let results = state
        .search
        .search(&serial, document)
        .await
        .map_err(|e| ApiError::from_repository(e, "Serial search failed"))?;

    Ok(Json(results))
}

/// Answers with a one-element array holding the requested page.
pub async fn search_page(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<PageRecord>>, ApiError> {
    let (document, page) = parse_page_query(&query)?;

    let record = state
        .pages
        .get_page(document, page)
        .await
        .map_err(|e| ApiError::from_repository(e, "Page lookup failed"))?;

    Ok(Json(vec![record]))
}

pub async fn search_redirect(Query(query): Query<PageQuery>) -> Result<Redirect, ApiError> {
    if query.documento_id.is_none() || query.pagina.is_none() {
        return Err(ApiError::bad_request(
            "Free-text search is disabled; use /buscar/serial or /buscar/pagina",
        ));
    }

    let (document, page) = parse_page_query(&query)?;
    Ok(Redirect::to(&format!(
        "/buscar/pagina?documentoId={}&pagina={}",
        document, page
    )))
}

fn parse_page_query(query: &PageQuery) -> Result<(i64, u32), ApiError> {
    let document = query
        .documento_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Query parameter 'documentoId' is required"))?;
    let page = query
        .pagina
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Query parameter 'pagina' is required"))?;

    Ok((
        Validator::parse_document_id(document)?,
        Validator::parse_page_number(page)?,
    ))
}

/// An optional `?pagina=` adds the same page hint as `view_pdf_page`.
pub async fn view_pdf(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, ViewError> {
    let document = load_document(&state, &id).await?;
    let file_name = match query.pagina.as_deref() {
        Some(pagina) => page_file_name(&document, pagina),
        None => document.download_name(),
    };
    open_pdf(&state, &document, &file_name).await
}

/// Same binary as `view_pdf`; the page travels as a filename fragment.
pub async fn view_pdf_page(
    Extension(state): Extension<Arc<AppState>>,
    Path((id, pagina)): Path<(String, String)>,
) -> Result<Response, ViewError> {
    let document = load_document(&state, &id).await?;
    let file_name = page_file_name(&document, &pagina);
    open_pdf(&state, &document, &file_name).await
}

/// Invalid or zero pages fall back to the first page.
fn page_file_name(document: &Document, pagina: &str) -> String {
    let page = pagina
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|page| *page > 0)
        .unwrap_or(1);

    format!("{}#page={}", document.download_name(), page)
}

async fn load_document(state: &AppState, raw_id: &str) -> Result<Document, ViewError> {
    let id = Validator::parse_document_id(raw_id)?;
    DocumentQueries::new(&state.client)
        .get(id)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Document {} not found", id)).into()
        })
}

async fn open_pdf(
    state: &AppState,
    document: &Document,
    file_name: &str,
) -> Result<Response, ViewError> {
    let queries = DocumentQueries::new(&state.client);

    match state.store.open_binary(document, &queries).await? {
        OpenedBinary::Bytes(bytes) => {
            info!("Serving PDF of document {} ({} bytes)", document.id, bytes.len());
            let disposition = format!("inline; filename=\"{}\"", header_safe(file_name));
            Ok((
                [
                    (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        OpenedBinary::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
    }
}

fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect()
}

pub async fn signed_upload_url(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<SignedUpload>, ApiError> {
    let (Some(file_name), Some(file_type)) = (query.file_name, query.file_type) else {
        return Err(ApiError::bad_request(
            "Query parameters 'fileName' and 'fileType' are required",
        ));
    };

    if !file_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        return Err(ApiError::bad_request("Only PDF files are accepted"));
    }

    let file_name = Validator::sanitize_file_name(&file_name);
    let upload = state
        .store
        .signed_upload_url(&file_name)
        .map_err(|e| ApiError::from_repository(e, "Could not sign the upload url"))?;

    Ok(Json(upload))
}

pub async fn health(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let storage = HealthCheck::healthy("storage", Duration::ZERO)
        .with_message(format!("{:?} backend", state.store.kind()));
    let report = HealthReport::new(vec![database_check(&state.client).await, storage]);

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}
