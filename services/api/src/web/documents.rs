//! services/api/src/web/documents.rs
//!
//! Handlers for uploading, pasting, listing and removing study material.

use crate::{
    error::ApiError,
    web::{
        protocol::{
            ContextResponse, DocumentListResponse, DocumentView, PasteTextRequest, RejectedFile,
            UploadResponse,
        },
        extract::AppJson,
        state::AppState,
    },
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use study_assistant_core::domain::DocumentKind;
use tracing::{info, warn};
use uuid::Uuid;

const PASTED_TEXT_NAME: &str = "Pasted Text";

/// Decides how an uploaded file is read from its declared type and extension.
fn classify_upload(file_name: &str, content_type: Option<&str>) -> Option<DocumentKind> {
    let lower_name = file_name.to_lowercase();
    match content_type {
        Some("application/pdf") => Some(DocumentKind::Pdf),
        Some(ct) if ct.starts_with("text/plain") => Some(DocumentKind::Text),
        _ if lower_name.ends_with(".pdf") => Some(DocumentKind::Pdf),
        _ if lower_name.ends_with(".txt") => Some(DocumentKind::Text),
        _ => None,
    }
}

/// List every uploaded document in upload order.
#[utoipa::path(
    get,
    path = "/documents",
    responses((status = 200, description = "All stored documents", body = DocumentListResponse))
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
) -> Json<DocumentListResponse> {
    let workspace = state.workspace.lock().await;
    Json(DocumentListResponse {
        documents: workspace.documents.list().iter().map(DocumentView::from).collect(),
    })
}

/// Upload one or more files.
///
/// PDF and plain-text files are accepted; anything else is reported back under
/// `rejected`. A request in which no file could be stored is answered with 415.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(
        content_type = "multipart/form-data",
        description = "One or more files to upload."
    ),
    responses(
        (status = 201, description = "Files stored", body = UploadResponse),
        (status = 400, description = "No file in the request"),
        (status = 415, description = "None of the files has a supported type")
    )
)]
pub async fn upload_documents_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut accepted: Vec<(String, String, DocumentKind)> = Vec::new();
    let mut notes = Vec::new();
    let mut rejected = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read multipart data: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read file bytes: {}", e)))?;

        match classify_upload(&file_name, content_type.as_deref()) {
            Some(DocumentKind::Text) => match String::from_utf8(data.to_vec()) {
                Ok(text) => accepted.push((file_name, text, DocumentKind::Text)),
                Err(_) => rejected.push(RejectedFile {
                    name: file_name,
                    reason: "File is not valid UTF-8 text".to_string(),
                }),
            },
            Some(DocumentKind::Pdf) => match state.pdf_extractor.extract(&file_name, &data).await {
                Ok(extracted) => {
                    if let Some(note) = extracted.note {
                        notes.push(format!("{}: {}", file_name, note));
                    }
                    accepted.push((file_name, extracted.content, DocumentKind::Pdf));
                }
                Err(e) => {
                    warn!(file_name = %file_name, "PDF processing failed: {}", e);
                    rejected.push(RejectedFile {
                        name: file_name,
                        reason: format!("Failed to process PDF: {}", e),
                    });
                }
            },
            None => {
                info!(
                    file_name = %file_name,
                    content_type = ?content_type,
                    "Skipping unsupported upload"
                );
                rejected.push(RejectedFile {
                    name: file_name,
                    reason: "Please upload PDF or text files only".to_string(),
                });
            }
        }
    }

    if accepted.is_empty() {
        return match rejected.first() {
            Some(first) => Err(ApiError::UnsupportedMedia(format!(
                "{}: {}",
                first.name, first.reason
            ))),
            None => Err(ApiError::Validation("No file provided".to_string())),
        };
    }

    let mut workspace = state.workspace.lock().await;
    let documents = accepted
        .into_iter()
        .map(|(name, content, kind)| {
            DocumentView::from(workspace.documents.add(name, content, kind))
        })
        .collect::<Vec<_>>();
    info!(stored = documents.len(), rejected = rejected.len(), "Documents uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            documents,
            notes,
            rejected,
        }),
    ))
}

/// Store pasted text as a document.
#[utoipa::path(
    post,
    path = "/documents/text",
    request_body = PasteTextRequest,
    responses(
        (status = 201, description = "Text stored", body = DocumentView),
        (status = 400, description = "The text is blank")
    )
)]
pub async fn paste_text_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<PasteTextRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("Please enter some text".to_string()));
    }
    let name = req
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| PASTED_TEXT_NAME.to_string());

    let mut workspace = state.workspace.lock().await;
    let document =
        DocumentView::from(workspace.documents.add(name, req.content, DocumentKind::Text));
    Ok((StatusCode::CREATED, Json(document)))
}

/// Remove one document. Unknown ids are ignored.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "The document to remove.")),
    responses((status = 204, description = "Document removed (or never existed)"))
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    let mut workspace = state.workspace.lock().await;
    if !workspace.documents.remove(id) {
        info!(%id, "Delete requested for unknown document");
    }
    StatusCode::NO_CONTENT
}

/// Remove every document.
#[utoipa::path(
    delete,
    path = "/documents",
    responses((status = 204, description = "All documents removed"))
)]
pub async fn clear_documents_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.workspace.lock().await.documents.clear();
    StatusCode::NO_CONTENT
}

/// The combined text the chat and quiz features use as context.
#[utoipa::path(
    get,
    path = "/documents/context",
    responses((status = 200, description = "Combined document content", body = ContextResponse))
)]
pub async fn context_handler(State(state): State<Arc<AppState>>) -> Json<ContextResponse> {
    let workspace = state.workspace.lock().await;
    Json(ContextResponse {
        content: workspace.documents.combined_content(),
        document_count: workspace.documents.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_are_classified_by_type_then_extension() {
        assert_eq!(classify_upload("a.bin", Some("application/pdf")), Some(DocumentKind::Pdf));
        assert_eq!(
            classify_upload("a.bin", Some("text/plain; charset=utf-8")),
            Some(DocumentKind::Text)
        );
        assert_eq!(
            classify_upload("Notes.TXT", Some("application/octet-stream")),
            Some(DocumentKind::Text)
        );
        assert_eq!(classify_upload("paper.pdf", None), Some(DocumentKind::Pdf));
        assert_eq!(classify_upload("slides.pptx", Some("application/vnd.ms-powerpoint")), None);
    }
}
