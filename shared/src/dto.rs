//! Wire-format request/response structs for the locator service. These map
//! [`crate::locator::LocateResult`] structurally; no matching logic lives
//! here.

use serde::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::locator::LocateResult;
use crate::matcher::MatchType;

fn default_locate_threshold() -> f64 {
    0.5
}

fn default_mineru_threshold() -> f64 {
    0.6
}

/// Round for the wire the way the original service did.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[derive(Debug, Deserialize)]
pub struct LocateRequest {
    pub chunk_text: String,
    pub pdf_path: String,
    #[serde(default = "default_locate_threshold")]
    pub similarity_threshold: f64,
}

/// Single-result response for `/locate`; `page` is 1-based.
#[derive(Debug, Serialize)]
pub struct LocateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_text_preview: Option<String>,
    pub message: String,
}

impl LocateResponse {
    pub fn found(result: &LocateResult) -> Self {
        let page = result.page_index + 1;
        LocateResponse {
            success: true,
            page: Some(page),
            bbox: Some(result.bbox),
            similarity: Some(round3(result.similarity)),
            match_type: Some(result.match_type),
            found_text_preview: Some(result.matched_text_preview.clone()),
            message: format!("located on page {page}"),
        }
    }

    pub fn not_found() -> Self {
        LocateResponse {
            success: false,
            page: None,
            bbox: None,
            similarity: None,
            match_type: None,
            found_text_preview: None,
            message: "no matching region found, consider lowering the similarity threshold".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MineruLocateRequest {
    pub filename: String,
    pub text: String,
    #[serde(default = "default_mineru_threshold")]
    pub similarity_threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct MineruMatch {
    pub page_idx: usize,
    pub page_size: [f64; 2],
    pub bbox: BBox,
    pub similarity: f64,
    pub match_type: MatchType,
    pub block_count: usize,
    pub matched_text_preview: String,
    pub block_details: Vec<MineruBlockDetail>,
}

#[derive(Debug, Serialize)]
pub struct MineruBlockDetail {
    pub bbox: BBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox_fs: Option<BBox>,
    pub index: i64,
}

#[derive(Debug, Serialize)]
pub struct MineruLocateResponse {
    pub success: bool,
    pub message: String,
    pub query_text: String,
    pub cleaned_text: String,
    pub similarity_threshold: f64,
    pub results: Vec<MineruMatch>,
}

impl MineruLocateResponse {
    pub fn new(request: &MineruLocateRequest, cleaned_text: String, results: Vec<LocateResult>) -> Self {
        let results: Vec<MineruMatch> = results
            .iter()
            .map(|r| MineruMatch {
                page_idx: r.page_index,
                page_size: r.page_size,
                bbox: r.bbox,
                similarity: round3(r.similarity),
                match_type: r.match_type,
                block_count: r.block_count,
                matched_text_preview: r.matched_text_preview.clone(),
                block_details: r
                    .blocks
                    .iter()
                    .map(|b| MineruBlockDetail {
                        bbox: b.bbox,
                        bbox_fs: b.bbox_precise,
                        index: b.index,
                    })
                    .collect(),
            })
            .collect();
        let success = !results.is_empty();
        let message = if success {
            format!("found {} matching regions", results.len())
        } else {
            "no matching text region found, consider lowering the similarity threshold".into()
        };
        MineruLocateResponse {
            success,
            message,
            query_text: request.text.clone(),
            cleaned_text,
            similarity_threshold: request.similarity_threshold,
            results,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub chunk_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub length: usize,
    pub sentences: usize,
    pub has_numbers: bool,
    pub has_punctuation: bool,
    pub language_detected: &'static str,
    pub complexity_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: bool,
}
