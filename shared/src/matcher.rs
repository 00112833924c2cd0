//! Contiguous-window matching: for every starting block on a page, greedily
//! grow a window of adjacent blocks, track the similarity peak, and keep
//! windows that clear the caller's threshold. Short queries get a keyword
//! fallback when direct matching fails.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::bbox::{self, BBox};
use crate::document::Page;
use crate::normalize::normalize;
use crate::similarity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum MatchType {
    #[serde(rename = "direct_text_match")]
    #[strum(serialize = "direct_text_match")]
    DirectText,
    #[serde(rename = "keyword_match")]
    #[strum(serialize = "keyword_match")]
    Keyword,
    #[serde(rename = "fuzzy_match")]
    #[strum(serialize = "fuzzy_match")]
    Fuzzy,
}

/// Tuning parameters. The source behavior never pinned these down, so they
/// are explicit here instead of being scattered through the algorithm.
#[derive(Debug, Clone)]
pub struct MatchParams {
    /// Normalized query length below which the short-text strategy applies.
    pub short_text_cutoff: usize,
    /// Allowed window overrun past the query length, as a ratio of it.
    pub short_overrun: f64,
    pub long_overrun: f64,
    /// Flat overrun allowance on top of the ratio, in chars.
    pub overrun_slack: usize,
    /// Extension stops once similarity falls this far below the peak.
    pub hysteresis: f64,
    /// Similarity at or above which a candidate counts as a direct match;
    /// below it (but at or above the caller threshold) it is fuzzy.
    pub direct_floor: f64,
    /// Minimum keyword coverage for the short-text fallback.
    pub keyword_floor: f64,
    pub max_keywords: usize,
    /// Preview truncation length, in chars.
    pub preview_chars: usize,
    /// Result cap for multi-result mode.
    pub max_results: usize,
}

impl Default for MatchParams {
    fn default() -> Self {
        MatchParams {
            short_text_cutoff: 100,
            short_overrun: 1.0,
            long_overrun: 0.35,
            overrun_slack: 16,
            hysteresis: 0.15,
            direct_floor: 0.5,
            keyword_floor: 0.6,
            max_keywords: 10,
            preview_chars: 200,
            max_results: 10,
        }
    }
}

impl MatchParams {
    fn max_window_chars(&self, query_chars: usize, strategy: MatchStrategy) -> usize {
        let overrun = match strategy {
            MatchStrategy::Short => self.short_overrun,
            MatchStrategy::Long => self.long_overrun,
        };
        (query_chars as f64 * (1.0 + overrun)) as usize + self.overrun_slack
    }
}

/// Query text prepared once per request: normalized form plus the keyword
/// tokens the short-text fallback scores against.
#[derive(Debug, Clone)]
pub struct QueryProfile {
    pub norm: String,
    pub char_len: usize,
    pub keywords: Vec<String>,
}

impl QueryProfile {
    pub fn new(raw: &str, params: &MatchParams) -> Self {
        let norm = normalize(raw);
        let char_len = norm.chars().count();
        let keywords = similarity::extract_keywords(&norm, params.max_keywords);
        QueryProfile {
            norm,
            char_len,
            keywords,
        }
    }

    pub fn strategy(&self, params: &MatchParams) -> MatchStrategy {
        if self.char_len < params.short_text_cutoff {
            MatchStrategy::Short
        } else {
            MatchStrategy::Long
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub page_index: usize,
    pub start_block: usize,
    /// Inclusive.
    pub end_block: usize,
    /// Raw text of the matched run, for previews.
    pub merged_text: String,
    pub similarity: f64,
    pub match_type: MatchType,
    pub bbox: BBox,
    pub bbox_precise: Option<BBox>,
}

/// A peak-scored window, kept even below threshold so the keyword fallback
/// can rescore it.
struct Window {
    start: usize,
    end: usize,
    similarity: f64,
}

/// Find every contiguous run of blocks on `page` whose peak similarity to
/// the query reaches `threshold`. Absence of a match yields an empty vec,
/// never an error.
pub fn match_page(
    query: &QueryProfile,
    page: &Page,
    threshold: f64,
    strategy: MatchStrategy,
    params: &MatchParams,
) -> Vec<MatchCandidate> {
    if query.norm.is_empty() || page.blocks.is_empty() {
        return Vec::new();
    }

    let norms: Vec<String> = page.blocks.iter().map(|b| normalize(&b.text)).collect();
    let norm_lens: Vec<usize> = norms.iter().map(|n| n.chars().count()).collect();
    let max_chars = params.max_window_chars(query.char_len, strategy);

    let mut windows: Vec<Window> = Vec::new();
    for start in 0..page.blocks.len() {
        if norms[start].is_empty() {
            continue;
        }
        let mut merged = norms[start].clone();
        let mut merged_chars = norm_lens[start];
        let mut peak_sim = similarity::score(&query.norm, &merged);
        let mut peak_end = start;

        for end in start + 1..page.blocks.len() {
            if merged_chars + norm_lens[end] > max_chars {
                break;
            }
            merged.push_str(&norms[end]);
            merged_chars += norm_lens[end];
            let sim = similarity::score(&query.norm, &merged);
            if sim > peak_sim {
                peak_sim = sim;
                peak_end = end;
            } else if sim + params.hysteresis < peak_sim {
                // clearly ran past the match
                break;
            }
        }
        windows.push(Window {
            start,
            end: peak_end,
            similarity: peak_sim,
        });
    }

    let mut candidates: Vec<MatchCandidate> = Vec::new();
    for w in &windows {
        if w.similarity >= threshold {
            let match_type = if w.similarity >= params.direct_floor {
                MatchType::DirectText
            } else {
                MatchType::Fuzzy
            };
            candidates.push(build_candidate(page, w, w.similarity, match_type));
        }
    }

    // Keyword fallback: short queries only, and only when direct similarity
    // found nothing on this page.
    if candidates.is_empty() && strategy == MatchStrategy::Short && !query.keywords.is_empty() {
        let floor = params.keyword_floor.max(threshold);
        for w in &windows {
            let window_norm: String = norms[w.start..=w.end].concat();
            let coverage = similarity::keyword_coverage(&query.keywords, &window_norm);
            if coverage >= floor {
                candidates.push(build_candidate(page, w, coverage, MatchType::Keyword));
            }
        }
    }

    candidates
}

fn build_candidate(
    page: &Page,
    window: &Window,
    similarity: f64,
    match_type: MatchType,
) -> MatchCandidate {
    let run = &page.blocks[window.start..=window.end];
    let (bbox, bbox_precise) = bbox::merge(run).expect("matched window is never empty");
    let merged_text: String = run.iter().map(|b| b.text.as_str()).collect();
    debug_assert!((0.0..=1.0).contains(&similarity));
    MatchCandidate {
        page_index: page.page_index,
        start_block: window.start,
        end_block: window.end,
        merged_text,
        similarity,
        match_type,
        bbox,
        bbox_precise,
    }
}

/// Order candidates by descending similarity and drop any candidate that
/// shares a block with an already-kept one on the same page.
pub fn rank_and_dedup(mut candidates: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    let mut kept: Vec<MatchCandidate> = Vec::new();
    for cand in candidates {
        let overlaps = kept.iter().any(|k| {
            k.page_index == cand.page_index
                && cand.start_block <= k.end_block
                && k.start_block <= cand.end_block
        });
        if !overlaps {
            kept.push(cand);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextBlock;

    fn page(blocks: Vec<(&str, [f64; 4])>) -> Page {
        Page {
            page_index: 0,
            size: [612.0, 792.0],
            blocks: blocks
                .into_iter()
                .enumerate()
                .map(|(i, (text, bbox))| TextBlock {
                    text: text.to_string(),
                    bbox: bbox.into(),
                    bbox_precise: None,
                    index: i as i64,
                })
                .collect(),
        }
    }

    fn profile(text: &str) -> (QueryProfile, MatchParams) {
        let params = MatchParams::default();
        (QueryProfile::new(text, &params), params)
    }

    #[test]
    fn exact_single_block_match() {
        let page = page(vec![("航天科技图书出版基金资助出版", [122.0, 46.0, 315.0, 65.0])]);
        let (query, params) = profile("航天科技图书出版基金资助出版");
        let strategy = query.strategy(&params);
        assert_eq!(strategy, MatchStrategy::Short);

        let found = match_page(&query, &page, 0.6, strategy, &params);
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert!((m.similarity - 1.0).abs() < 1e-9);
        assert_eq!(m.match_type, MatchType::DirectText);
        assert_eq!(<[f64; 4]>::from(m.bbox), [122.0, 46.0, 315.0, 65.0]);
    }

    #[test]
    fn query_spanning_two_blocks_merges_their_boxes() {
        let page = page(vec![
            ("元器件安装孔与", [100.0, 200.0, 300.0, 220.0]),
            ("元器件引线不匹配", [100.0, 225.0, 320.0, 245.0]),
        ]);
        let (query, params) = profile("元器件安装孔与元器件引线不匹配");

        let found = rank_and_dedup(match_page(&query, &page, 0.5, MatchStrategy::Long, &params));
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!((m.start_block, m.end_block), (0, 1));
        assert!((m.similarity - 1.0).abs() < 1e-9);
        assert_eq!(<[f64; 4]>::from(m.bbox), [100.0, 200.0, 320.0, 245.0]);
    }

    #[test]
    fn peak_window_is_recorded_before_over_extension() {
        let page = page(vec![
            ("元器件安装孔与元器件引线不匹配", [100.0, 100.0, 300.0, 120.0]),
            ("航天科技图书出版", [100.0, 125.0, 300.0, 145.0]),
        ]);
        let (query, params) = profile("元器件安装孔与元器件引线不匹配");

        let found = rank_and_dedup(match_page(&query, &page, 0.5, MatchStrategy::Long, &params));
        let m = &found[0];
        // the peak is the first block alone, not the over-extended window
        assert_eq!((m.start_block, m.end_block), (0, 0));
        assert!((m.similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn short_strategy_falls_back_to_keywords() {
        // direct similarity stays well under the 0.5 direct floor while six
        // of the eight query keywords occur in the block
        let page = page(vec![(
            "人工智能深度学习神经网络模型训练数据元器件引线安装孔匹配焊接质量",
            [50.0, 50.0, 400.0, 80.0],
        )]);
        let (query, params) = profile("元器件的引线与安装孔的匹配和焊接的质量是检验的要求");
        assert_eq!(query.keywords.len(), 8);

        let found = match_page(&query, &page, 0.5, MatchStrategy::Short, &params);
        assert_eq!(found.len(), 1);
        let m = &found[0];
        assert_eq!(m.match_type, MatchType::Keyword);
        assert!((m.similarity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn long_strategy_has_no_keyword_fallback() {
        let page = page(vec![(
            "人工智能深度学习神经网络模型训练数据元器件引线安装孔匹配焊接质量",
            [50.0, 50.0, 400.0, 80.0],
        )]);
        let (query, params) = profile("元器件的引线与安装孔的匹配和焊接的质量是检验的要求");

        let found = match_page(&query, &page, 0.5, MatchStrategy::Long, &params);
        assert!(found.is_empty());
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let page = page(vec![("abcde", [0.0, 0.0, 10.0, 10.0])]);
        let (query, params) = profile("abcd");
        // normalized_levenshtein("abcd", "abcde") == 0.8 exactly in f64
        let at = match_page(&query, &page, 0.8, MatchStrategy::Long, &params);
        assert_eq!(at.len(), 1);
        let above = match_page(&query, &page, 0.81, MatchStrategy::Long, &params);
        assert!(above.is_empty());
    }

    #[test]
    fn unrelated_text_yields_no_candidates() {
        let page = page(vec![("完全无关的另一段说明文字", [0.0, 0.0, 10.0, 10.0])]);
        let (query, params) = profile("deep learning convolutional networks");
        let found = match_page(&query, &page, 0.9, query.strategy(&params), &params);
        assert!(found.is_empty());
    }

    #[test]
    fn dedup_keeps_the_best_of_overlapping_candidates() {
        let mk = |start: usize, end: usize, sim: f64| MatchCandidate {
            page_index: 0,
            start_block: start,
            end_block: end,
            merged_text: String::new(),
            similarity: sim,
            match_type: MatchType::DirectText,
            bbox: [0.0, 0.0, 1.0, 1.0].into(),
            bbox_precise: None,
        };
        let kept = rank_and_dedup(vec![mk(0, 1, 0.7), mk(1, 2, 0.9), mk(4, 5, 0.6)]);
        assert_eq!(kept.len(), 2);
        assert_eq!((kept[0].start_block, kept[0].end_block), (1, 2));
        assert_eq!((kept[1].start_block, kept[1].end_block), (4, 5));
    }

    #[test]
    fn match_type_strings() {
        assert_eq!(MatchType::DirectText.to_string(), "direct_text_match");
        assert_eq!(MatchType::Keyword.to_string(), "keyword_match");
        assert_eq!(MatchType::Fuzzy.to_string(), "fuzzy_match");
    }
}
