use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;

/// Domain phrase expansions applied to user questions before retrieval.
/// Short statutory terms recall poorly on their own; the expanded
/// phrases match the vocabulary of the indexed passages.
static EXPANSIONS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("recuperação extrajudicial", "processo de recuperação extrajudicial"),
        ("recuperação judicial", "plano de recuperação judicial"),
        ("falência", "processo de falência"),
        ("cobrança", "ação de cobrança"),
        ("contrato", "contrato civil"),
    ]
});

/// Cleans and lightly rewrites a raw question into a canonical search
/// query. Never fails; empty or whitespace-only input yields an empty
/// string.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut text: String = trimmed
        .trim_end_matches(|c: char| c == '!' || c == '?')
        .trim_end()
        .nfkc()
        .collect();

    while text.contains("  ") {
        text = text.replace("  ", " ");
    }

    for (key, replacement) in EXPANSIONS.iter() {
        if let Some((start, end)) = find_ignore_case(&text, key) {
            text = format!("{}{}{}", &text[..start], replacement, &text[end..]);
        }
    }

    if text.split_whitespace().count() <= 3 {
        text = format!("explicação sobre {}", text);
    }

    text
}

/// First case-insensitive occurrence of `needle` in `haystack`, as a
/// byte range into `haystack`. Comparison is per-char so accented
/// uppercase forms match without assuming lowercase preserves byte
/// length.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle_chars: Vec<char> = needle.chars().collect();
    if needle_chars.is_empty() {
        return None;
    }

    let indices: Vec<(usize, char)> = haystack.char_indices().collect();
    for start in 0..indices.len() {
        let mut matched = 0;
        let mut end = indices[start].0;
        for (offset, c) in &indices[start..] {
            if matched == needle_chars.len() {
                break;
            }
            if !c.to_lowercase().eq(needle_chars[matched].to_lowercase()) {
                break;
            }
            matched += 1;
            end = offset + c.len_utf8();
        }
        if matched == needle_chars.len() {
            return Some((indices[start].0, end));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_input_stay_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn strips_trailing_punctuation_runs() {
        assert_eq!(
            normalize("o que diz a lei sobre recuperação judicial???"),
            "o que diz a lei sobre plano de recuperação judicial"
        );
    }

    #[test]
    fn expands_first_occurrence_case_insensitively() {
        let out = normalize("Como funciona a Falência de uma empresa em falência");
        assert_eq!(
            out,
            "Como funciona a processo de falência de uma empresa em falência"
        );
    }

    #[test]
    fn extrajudicial_key_wins_over_judicial_substring() {
        let out = normalize("dúvidas sobre recuperação extrajudicial de empresas");
        assert_eq!(
            out,
            "dúvidas sobre processo de recuperação extrajudicial de empresas"
        );
    }

    #[test]
    fn wraps_degenerate_short_queries() {
        assert_eq!(normalize("usucapião"), "explicação sobre usucapião");
    }

    #[test]
    fn expansion_may_lift_query_above_wrap_threshold() {
        // "cobrança!" is one token, but the expansion brings it to three,
        // which still gets wrapped.
        assert_eq!(normalize("cobrança!"), "explicação sobre ação de cobrança");
    }

    #[test]
    fn collapses_repeated_spaces() {
        assert_eq!(
            normalize("prazo   para  contestação civil no processo"),
            "prazo para contestação civil no processo"
        );
    }
}
