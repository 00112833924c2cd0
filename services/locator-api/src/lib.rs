//! HTTP shell over the chunk-location engine. Handlers translate wire DTOs
//! to facade calls and back; the matching itself lives in `shared`.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::json;
use shared::document::{artifact_id_from_pdf_path, MineruArtifactProvider};
use shared::dto::{
    AnalyzeRequest, AnalyzeResponse, InvalidateRequest, InvalidateResponse, LocateRequest,
    LocateResponse, MineruLocateRequest, MineruLocateResponse,
};
use shared::error::LocateError;
use shared::locator::{LocateMode, Locator};
use shared::normalize::normalize;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<Locator<MineruArtifactProvider>>,
}

impl AppState {
    pub fn new(data_dir: impl Into<std::path::PathBuf>) -> Self {
        AppState {
            locator: Arc::new(Locator::new(MineruArtifactProvider::new(data_dir))),
        }
    }
}

fn to_http_error(e: LocateError) -> actix_web::Error {
    match e {
        LocateError::InvalidArgument(_) => actix_web::error::ErrorBadRequest(e),
        LocateError::DocumentNotFound(_) => actix_web::error::ErrorNotFound(e),
        _ => actix_web::error::ErrorInternalServerError(e),
    }
}

async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": "chunk locator",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "locate": "/locate - POST - locate a chunk in a PDF (best match)",
            "mineru-locate": "/mineru-locate - POST - locate text in a layout artifact (all matches)",
            "analyze": "/analyze - POST - analyze chunk content",
            "invalidate": "/invalidate - POST - drop a cached document",
            "health": "/health - GET - health check"
        }
    }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "healthy"}))
}

/// Best-match lookup for a chunk inside a PDF. The PDF is never parsed here;
/// its path resolves to the layout artifact produced by the extractor.
async fn locate(
    data: web::Data<AppState>,
    web::Json(req): web::Json<LocateRequest>,
) -> actix_web::Result<HttpResponse> {
    let Some(document_id) = artifact_id_from_pdf_path(&req.pdf_path) else {
        return Err(actix_web::error::ErrorBadRequest(format!(
            "not a PDF path: {}",
            req.pdf_path
        )));
    };
    info!(id = %document_id, threshold = req.similarity_threshold, "locate request");

    let locator = data.locator.clone();
    let results = web::block(move || {
        locator.locate(
            &document_id,
            &req.chunk_text,
            req.similarity_threshold,
            LocateMode::Single,
        )
    })
    .await
    .map_err(actix_web::error::ErrorInternalServerError)?
    .map_err(to_http_error)?;

    let body = match results.first() {
        Some(best) => LocateResponse::found(best),
        None => LocateResponse::not_found(),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Multi-match lookup against a MinerU layout artifact by filename.
async fn mineru_locate(
    data: web::Data<AppState>,
    web::Json(req): web::Json<MineruLocateRequest>,
) -> actix_web::Result<HttpResponse> {
    info!(file = %req.filename, threshold = req.similarity_threshold, "mineru-locate request");

    let locator = data.locator.clone();
    let filename = req.filename.clone();
    let text = req.text.clone();
    let threshold = req.similarity_threshold;
    let results = web::block(move || locator.locate(&filename, &text, threshold, LocateMode::Multi))
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?
        .map_err(to_http_error)?;

    let cleaned = normalize(&req.text);
    Ok(HttpResponse::Ok().json(MineruLocateResponse::new(&req, cleaned, results)))
}

async fn analyze(web::Json(req): web::Json<AnalyzeRequest>) -> actix_web::Result<HttpResponse> {
    let text = req.chunk_text.trim();
    if text.is_empty() {
        return Err(actix_web::error::ErrorBadRequest("chunk text is empty"));
    }
    Ok(HttpResponse::Ok().json(analyze_chunk(text)))
}

async fn invalidate(
    data: web::Data<AppState>,
    web::Json(req): web::Json<InvalidateRequest>,
) -> actix_web::Result<HttpResponse> {
    let invalidated = data.locator.invalidate(&req.filename);
    info!(file = %req.filename, invalidated, "cache invalidation");
    Ok(HttpResponse::Ok().json(InvalidateResponse { invalidated }))
}

/// Surface-level content features of a chunk, independent of any document.
pub fn analyze_chunk(text: &str) -> AnalyzeResponse {
    let length = text.chars().count();
    let sentences = text
        .split(['。', '！', '？', '.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let clause_punct = text.chars().filter(|c| matches!(c, ',' | ';' | ':')).count();
    let complexity =
        (length as f64 / 1000.0 + sentences as f64 / 10.0 + clause_punct as f64 / 20.0).min(1.0);
    AnalyzeResponse {
        length,
        sentences,
        has_numbers: text.chars().any(|c| c.is_numeric()),
        has_punctuation: text
            .chars()
            .any(|c| matches!(c, '.' | '!' | '?' | '。' | '！' | '？')),
        // Script detection is out of scope; chunks are routinely mixed
        // Chinese/ASCII, so report that directly.
        language_detected: "mixed",
        complexity_score: shared::dto::round3(complexity),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/locate", web::post().to(locate))
        .route("/mineru-locate", web::post().to(mineru_locate))
        .route("/analyze", web::post().to(analyze))
        .route("/invalidate", web::post().to(invalidate));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_counts_sentences_and_punctuation() {
        let a = analyze_chunk("深度学习是机器学习的子集。它使用多层神经网络！共有3层, 或更多。");
        assert_eq!(a.sentences, 3);
        assert!(a.has_numbers);
        assert!(a.has_punctuation);
        assert_eq!(a.language_detected, "mixed");
        assert!(a.complexity_score > 0.0 && a.complexity_score <= 1.0);
    }

    #[test]
    fn analyze_short_plain_text() {
        let a = analyze_chunk("no punctuation here");
        assert_eq!(a.sentences, 1);
        assert!(!a.has_numbers);
        assert!(!a.has_punctuation);
    }

    #[test]
    fn analyze_clause_punctuation_does_not_count_as_sentence_punctuation() {
        let a = analyze_chunk("第一项, 第二项; 第三项");
        assert!(!a.has_punctuation);
        assert_eq!(a.sentences, 1);
    }
}
