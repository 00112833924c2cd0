//! Facade tying the cache, matcher and geometry aggregation together.

use std::sync::Arc;

use tracing::info;

use crate::bbox::BBox;
use crate::document::{Document, DocumentProvider};
use crate::error::{LocateError, Result};
use crate::index::BlockIndex;
use crate::matcher::{self, MatchParams, MatchType, QueryProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateMode {
    /// Best single candidate only.
    Single,
    /// Every deduplicated candidate above threshold, capped.
    Multi,
}

#[derive(Debug, Clone)]
pub struct BlockDetail {
    pub bbox: BBox,
    pub bbox_precise: Option<BBox>,
    pub index: i64,
}

#[derive(Debug, Clone)]
pub struct LocateResult {
    pub page_index: usize,
    pub page_size: [f64; 2],
    pub bbox: BBox,
    pub bbox_precise: Option<BBox>,
    pub similarity: f64,
    pub match_type: MatchType,
    pub matched_text_preview: String,
    pub block_count: usize,
    pub blocks: Vec<BlockDetail>,
}

pub struct Locator<P> {
    index: BlockIndex<P>,
    params: MatchParams,
}

impl<P: DocumentProvider> Locator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_params(provider, MatchParams::default())
    }

    pub fn with_params(provider: P, params: MatchParams) -> Self {
        Locator {
            index: BlockIndex::new(provider),
            params,
        }
    }

    pub fn invalidate(&self, document_id: &str) -> bool {
        self.index.invalidate(document_id)
    }

    /// Locate `query_text` inside the document. An empty vec means no region
    /// reached the threshold; that is a normal outcome, not an error.
    pub fn locate(
        &self,
        document_id: &str,
        query_text: &str,
        threshold: f64,
        mode: LocateMode,
    ) -> Result<Vec<LocateResult>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LocateError::InvalidArgument(format!(
                "similarity threshold must be within 0..=1, got {threshold}"
            )));
        }
        let query = QueryProfile::new(query_text, &self.params);
        if query.norm.is_empty() {
            return Err(LocateError::InvalidArgument(
                "query text is empty after normalization".into(),
            ));
        }

        let doc = self.index.get_or_load(document_id)?;
        let strategy = query.strategy(&self.params);

        let mut candidates = Vec::new();
        for page in &doc.pages {
            candidates.extend(matcher::match_page(
                &query,
                page,
                threshold,
                strategy,
                &self.params,
            ));
        }
        let ranked = matcher::rank_and_dedup(candidates);

        let cap = match mode {
            LocateMode::Single => 1,
            LocateMode::Multi => self.params.max_results,
        };
        let results: Vec<LocateResult> = ranked
            .into_iter()
            .take(cap)
            .map(|c| self.render(&doc, c))
            .collect();

        info!(
            id = document_id,
            query_chars = query.char_len,
            strategy = ?strategy,
            matches = results.len(),
            "locate finished"
        );
        Ok(results)
    }

    fn render(&self, doc: &Arc<Document>, cand: matcher::MatchCandidate) -> LocateResult {
        let page = &doc.pages[cand.page_index];
        let blocks = page.blocks[cand.start_block..=cand.end_block]
            .iter()
            .map(|b| BlockDetail {
                bbox: b.bbox,
                bbox_precise: b.bbox_precise,
                index: b.index,
            })
            .collect::<Vec<_>>();
        LocateResult {
            page_index: cand.page_index,
            page_size: page.size,
            bbox: cand.bbox,
            bbox_precise: cand.bbox_precise,
            similarity: cand.similarity,
            match_type: cand.match_type,
            matched_text_preview: preview(&cand.merged_text, self.params.preview_chars),
            block_count: blocks.len(),
            blocks,
        }
    }
}

fn preview(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    if text.chars().count() > limit {
        out.push_str("...");
    }
    out
}
