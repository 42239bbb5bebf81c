use crate::rerank::RankedPassage;

/// Cap on the passage text carried into the prompt context, so a long
/// article never blows the generation budget.
pub const DEFAULT_MAX_PASSAGE_CHARS: usize = 900;

const MISSING_FIELD: &str = "n/d";

/// Citation label for a passage: `<lei> art. <artigo>`. Missing
/// metadata renders as a placeholder instead of being dropped.
pub fn citation(passage: &RankedPassage) -> String {
    let lei = passage.passage.lei.as_deref().unwrap_or(MISSING_FIELD);
    let artigo = passage.passage.artigo.as_deref().unwrap_or(MISSING_FIELD);
    format!("{} art. {}", lei, artigo)
}

/// Formats the final ranked passages into the numbered context block
/// and the parallel citation list. Citations are de-duplicated
/// preserving first occurrence; passage text is truncated to
/// `max_passage_chars` with an ellipsis marker. Deterministic for the
/// same input, and tolerant of an empty one.
pub fn assemble(ranked: &[RankedPassage], max_passage_chars: usize) -> (String, Vec<String>) {
    let mut citations: Vec<String> = Vec::new();
    let mut blocks: Vec<String> = Vec::with_capacity(ranked.len());

    for (i, passage) in ranked.iter().enumerate() {
        let cite = citation(passage);
        blocks.push(
            format!(
                "CONTEXTO [{}]: {}\n\"{}\"",
                i + 1,
                cite,
                truncate_chars(passage.passage.texto.trim(), max_passage_chars)
            )
        );
        if !citations.contains(&cite) {
            citations.push(cite);
        }
    }

    (blocks.join("\n\n"), citations)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::RetrievedPassage;

    fn ranked(texto: &str, lei: Option<&str>, artigo: Option<&str>) -> RankedPassage {
        RankedPassage {
            passage: RetrievedPassage {
                texto: texto.to_string(),
                lei: lei.map(String::from),
                artigo: artigo.map(String::from),
                url_oficial: None,
                chunk_seq: None,
                score_vec: 0.8,
            },
            rerank_score: 0.9,
        }
    }

    #[test]
    fn empty_input_yields_empty_context_and_citations() {
        let (context, citations) = assemble(&[], DEFAULT_MAX_PASSAGE_CHARS);
        assert_eq!(context, "");
        assert!(citations.is_empty());
    }

    #[test]
    fn duplicate_citations_collapse_to_first_occurrence() {
        let passages = vec![
            ranked("O plano de recuperação judicial...", Some("11.101/2005"), Some("53")),
            ranked("...discriminação pormenorizada dos meios...", Some("11.101/2005"), Some("53"))
        ];
        let (context, citations) = assemble(&passages, DEFAULT_MAX_PASSAGE_CHARS);

        assert_eq!(citations, vec!["11.101/2005 art. 53".to_string()]);
        assert!(context.contains("CONTEXTO [1]: 11.101/2005 art. 53"));
        assert!(context.contains("CONTEXTO [2]: 11.101/2005 art. 53"));
    }

    #[test]
    fn missing_metadata_renders_placeholders() {
        let passages = vec![ranked("texto sem metadados", None, None)];
        let (context, citations) = assemble(&passages, DEFAULT_MAX_PASSAGE_CHARS);

        assert_eq!(citations, vec!["n/d art. n/d".to_string()]);
        assert!(context.starts_with("CONTEXTO [1]: n/d art. n/d"));
    }

    #[test]
    fn long_passages_are_truncated_with_marker() {
        let long = "a".repeat(1200);
        let passages = vec![ranked(&long, Some("10.406/2002"), Some("421"))];
        let (context, _) = assemble(&passages, DEFAULT_MAX_PASSAGE_CHARS);

        let body = context.split('"').nth(1).unwrap();
        assert_eq!(body.chars().count(), DEFAULT_MAX_PASSAGE_CHARS + 1);
        assert!(body.ends_with('…'));
    }

    #[test]
    fn assembly_is_idempotent() {
        let passages = vec![
            ranked("primeiro trecho", Some("11.101/2005"), Some("53")),
            ranked("segundo trecho", Some("10.406/2002"), Some("421"))
        ];
        let first = assemble(&passages, DEFAULT_MAX_PASSAGE_CHARS);
        let second = assemble(&passages, DEFAULT_MAX_PASSAGE_CHARS);
        assert_eq!(first, second);
    }
}
