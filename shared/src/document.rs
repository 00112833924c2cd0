//! Document model consumed by the matching engine, the provider seam that
//! supplies it, and the mapping from MinerU `*_middle.json` layout artifacts.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::bbox::BBox;
use crate::error::{LocateError, Result};

/// An atomic unit of extracted text in layout order. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub text: String,
    pub bbox: BBox,
    /// Tighter per-block geometry when the extractor supplies one
    /// (`bbox_fs` in MinerU artifacts).
    pub bbox_precise: Option<BBox>,
    /// Reading-order index assigned by the extractor.
    pub index: i64,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub page_index: usize,
    pub size: [f64; 2],
    pub blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub document_id: String,
    pub pages: Vec<Page>,
}

/// External document-model provider. The engine never parses raw document
/// bytes itself; implementations resolve an identifier to a fully built
/// [`Document`].
pub trait DocumentProvider: Send + Sync {
    fn load(&self, document_id: &str) -> Result<Document>;
}

// Raw shapes of the MinerU middle.json artifact. Only the fields the
// engine needs are deserialized.

#[derive(Deserialize)]
struct RawMiddle {
    #[serde(default)]
    pdf_info: Vec<RawPage>,
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    para_blocks: Vec<RawBlock>,
    #[serde(default)]
    page_size: Option<[f64; 2]>,
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    bbox_fs: Option<[f64; 4]>,
    /// MinerU sometimes emits this as a float.
    #[serde(default)]
    index: Option<f64>,
    #[serde(default)]
    lines: Vec<RawLine>,
}

#[derive(Deserialize)]
struct RawLine {
    #[serde(default)]
    spans: Vec<RawSpan>,
}

#[derive(Deserialize)]
struct RawSpan {
    #[serde(default)]
    content: String,
}

impl RawBlock {
    fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            for span in &line.spans {
                out.push_str(&span.content);
            }
        }
        out
    }
}

fn map_document(document_id: &str, raw: RawMiddle) -> Document {
    let pages = raw
        .pdf_info
        .into_iter()
        .enumerate()
        .map(|(page_index, page)| {
            let blocks = page
                .para_blocks
                .into_iter()
                .enumerate()
                .filter(|(_, b)| b.kind == "text")
                .filter_map(|(pos, b)| {
                    let text = b.text();
                    if text.trim().is_empty() {
                        return None;
                    }
                    let bbox = b.bbox.or(b.bbox_fs)?;
                    Some(TextBlock {
                        text,
                        bbox: bbox.into(),
                        bbox_precise: b.bbox_fs.map(Into::into),
                        index: b.index.map(|i| i as i64).unwrap_or(pos as i64),
                    })
                })
                .collect();
            Page {
                page_index,
                size: page.page_size.unwrap_or([0.0, 0.0]),
                blocks,
            }
        })
        .collect();
    Document {
        document_id: document_id.to_string(),
        pages,
    }
}

/// Loads MinerU layout artifacts (`<data_dir>/<id>_middle.json`) from disk.
pub struct MineruArtifactProvider {
    data_dir: PathBuf,
}

impl MineruArtifactProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        MineruArtifactProvider {
            data_dir: data_dir.into(),
        }
    }

    fn artifact_path(&self, document_id: &str) -> PathBuf {
        self.data_dir.join(format!("{document_id}_middle.json"))
    }
}

impl DocumentProvider for MineruArtifactProvider {
    fn load(&self, document_id: &str) -> Result<Document> {
        let path = self.artifact_path(document_id);
        let data = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LocateError::DocumentNotFound(format!("{document_id}_middle.json"))
            } else {
                LocateError::Io(e.to_string())
            }
        })?;
        let raw: RawMiddle = serde_json::from_str(&data)
            .map_err(|e| LocateError::Io(format!("malformed layout artifact {path:?}: {e}")))?;
        let doc = map_document(document_id, raw);
        info!(
            id = document_id,
            pages = doc.pages.len(),
            blocks = doc.pages.iter().map(|p| p.blocks.len()).sum::<usize>(),
            "loaded layout artifact"
        );
        Ok(doc)
    }
}

/// Strip a `.pdf` path down to the artifact identifier used by the provider.
pub fn artifact_id_from_pdf_path(pdf_path: &str) -> Option<String> {
    let path = Path::new(pdf_path);
    if !path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
    {
        return None;
    }
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
