//! Similarity scoring between normalized strings, plus the keyword helpers
//! used by the short-text fallback.

use strsim::normalized_levenshtein;

/// Stopwords excluded from keyword extraction.
const STOPWORDS: &[&str] = &[
    "的", "和", "或", "及", "与", "对", "从", "在", "为", "是", "了", "到", "由", "有", "被",
    "所", "等", "这", "那", "一个", "可以", "应该",
];

/// Sequence-alignment similarity ratio in [0,1] between two normalized
/// strings. Both-empty scores 1.0 by convention, either-empty scores 0.0.
pub fn score(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let s = normalized_levenshtein(a, b);
    debug_assert!((0.0..=1.0).contains(&s));
    s
}

/// Single-character stopwords act as separators inside CJK runs, otherwise
/// an unpunctuated CJK sentence would collapse into one giant keyword.
fn is_cjk_separator(c: char) -> bool {
    let mut buf = [0u8; 4];
    let s: &str = c.encode_utf8(&mut buf);
    STOPWORDS.contains(&s)
}

/// Extract salient keyword tokens: runs of CJK characters (length ≥ 2,
/// split at single-character stopwords) and ASCII alphanumeric runs
/// (length ≥ 3), stopword-filtered, deduplicated in order of first
/// occurrence, capped at `max_keywords`.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    fn flush(run: &mut String, min_len: usize, keywords: &mut Vec<String>) {
        if run.chars().count() >= min_len
            && !STOPWORDS.contains(&run.as_str())
            && !keywords.iter().any(|k| k == run)
        {
            keywords.push(std::mem::take(run));
        } else {
            run.clear();
        }
    }

    let mut keywords: Vec<String> = Vec::new();
    let mut cjk_run = String::new();
    let mut ascii_run = String::new();

    for c in text.chars() {
        if ('\u{4e00}'..='\u{9fff}').contains(&c) {
            flush(&mut ascii_run, 3, &mut keywords);
            if is_cjk_separator(c) {
                flush(&mut cjk_run, 2, &mut keywords);
            } else {
                cjk_run.push(c);
            }
        } else if c.is_ascii_alphanumeric() {
            flush(&mut cjk_run, 2, &mut keywords);
            ascii_run.push(c);
        } else {
            flush(&mut cjk_run, 2, &mut keywords);
            flush(&mut ascii_run, 3, &mut keywords);
        }
    }
    flush(&mut cjk_run, 2, &mut keywords);
    flush(&mut ascii_run, 3, &mut keywords);

    keywords.truncate(max_keywords);
    keywords
}

/// Fraction of keywords contained in `haystack`; 0.0 for an empty keyword
/// list or empty haystack.
pub fn keyword_coverage(keywords: &[String], haystack: &str) -> f64 {
    if keywords.is_empty() || haystack.is_empty() {
        return 0.0;
    }
    let hit = keywords.iter().filter(|k| haystack.contains(k.as_str())).count();
    hit as f64 / keywords.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(score("航天科技图书出版基金资助出版", "航天科技图书出版基金资助出版"), 1.0);
        assert_eq!(score("abc", "abc"), 1.0);
    }

    #[test]
    fn empty_conventions() {
        assert_eq!(score("", ""), 1.0);
        assert_eq!(score("", "abc"), 0.0);
        assert_eq!(score("abc", ""), 0.0);
    }

    #[test]
    fn bounded_and_near_symmetric() {
        let pairs = [
            ("元器件安装孔", "元器件引线不匹配"),
            ("machine learning", "deep learning"),
            ("abc", "xyz"),
        ];
        for (a, b) in pairs {
            let ab = score(a, b);
            let ba = score(b, a);
            assert!((0.0..=1.0).contains(&ab));
            assert!((ab - ba).abs() < 1e-9);
        }
    }

    #[test]
    fn verbatim_containment_beats_unrelated_text() {
        let query = "元器件安装孔与元器件引线不匹配";
        let containing = format!("某章节{query}后续内容若干");
        let unrelated = "航天科技图书出版基金资助出版说明页";
        assert!(score(query, &containing) >= score(query, unrelated));
    }

    #[test]
    fn keyword_extraction_rules() {
        let kws = extract_keywords("元器件的安装 ai model v2", 10);
        assert!(kws.contains(&"元器件".to_string()));
        assert!(kws.contains(&"安装".to_string()));
        // "的" is a stopword, "ai" and "v2" are below the ASCII length floor
        assert!(!kws.iter().any(|k| k == "的" || k == "ai" || k == "v2"));
        assert!(kws.contains(&"model".to_string()));
    }

    #[test]
    fn keyword_coverage_fraction() {
        let kws = vec!["元器件".to_string(), "引线".to_string(), "焊接".to_string(), "缺陷".to_string()];
        let hay = "元器件引线不匹配导致缺陷";
        assert_eq!(keyword_coverage(&kws, hay), 0.75);
        assert_eq!(keyword_coverage(&[], hay), 0.0);
    }
}
