//! Normalizes raw extracted text into a canonical comparable form before any
//! similarity scoring. Total and deterministic; empty input yields empty
//! output.

/// Punctuation that survives normalization (sentence boundaries only).
fn is_kept_punctuation(c: char) -> bool {
    matches!(
        c,
        '，' | '。' | '！' | '？' | '；' | '：' | '、' | '.' | ',' | '!' | '?' | ';' | ':'
    )
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Apply the normalization steps:
/// - lowercase ASCII letters
/// - remove soft hyphen characters
/// - collapse hyphenation artifacts across line breaks
/// - map characters outside the kept set (CJK, ASCII alphanumerics,
///   sentence punctuation) to spaces
/// - reduce whitespace runs to single spaces and trim
pub fn normalize(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0usize;
    let mut prev_space = false;
    while i < chars.len() {
        let c = chars[i];

        // skip soft hyphen (U+00AD) characters
        if c == '\u{00AD}' {
            i += 1;
            continue;
        }

        // remove hyphenation: "-" + whitespace + alphanumeric → drop the hyphen and whitespace
        if c == '-' && i + 2 < chars.len() && chars[i + 1].is_whitespace() && chars[i + 2].is_alphanumeric() {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            prev_space = false;
            continue;
        }

        let keep = c.is_ascii_alphanumeric() || is_cjk(c) || is_kept_punctuation(c);
        if keep {
            out.push(c.to_ascii_lowercase());
            prev_space = false;
        } else if !prev_space {
            // whitespace and stripped symbols both collapse into one space
            out.push(' ');
            prev_space = true;
        }
        i += 1;
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("a  b\t\nc"), "a b c");
    }

    #[test]
    fn strips_symbols_keeps_cjk_and_punctuation() {
        assert_eq!(normalize("元器件★安装孔（与）"), "元器件 安装孔 与");
        assert_eq!(normalize("Hello, World!"), "hello, world!");
    }

    #[test]
    fn joins_hyphenation_across_line_breaks() {
        assert_eq!(normalize("compo-\nnent"), "component");
    }

    #[test]
    fn removes_soft_hyphens() {
        assert_eq!(normalize("ele\u{00AD}ment"), "element");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  \u{00AD} ★ "), "");
    }

    #[test]
    fn idempotent() {
        for s in ["  Foo\tBar!! ", "元器件安装孔与\n元器件引线不匹配", "a-\n b", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }
}
