pub mod http;

use async_trait::async_trait;
use serde::{ Serialize, Deserialize };
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::retrieval::RetrievedPassage;

/// A recalled passage with its precision score attached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedPassage {
    #[serde(flatten)]
    pub passage: RetrievedPassage,
    pub rerank_score: f32,
}

#[derive(Debug, Error)]
pub enum RerankError {
    #[error("rerank scorer unavailable: {0}")]
    Scorer(String),
    #[error("scorer returned {got} scores for {expected} passages")]
    ScoreCount {
        expected: usize,
        got: usize,
    },
}

/// Precision scorer for (query, passage) pairs. Scores must be
/// deterministic for identical inputs.
#[async_trait]
pub trait RerankScorer: Send + Sync {
    async fn score(
        &self,
        query: &str,
        texts: &[String]
    ) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>>;
}

type ScorerResult = Result<Arc<dyn RerankScorer>, Box<dyn StdError + Send + Sync>>;
type ScorerFactory = Box<dyn Fn() -> ScorerResult + Send + Sync>;

/// Re-ranks recalled passages against a reference query. The scorer is
/// an expensive process-wide resource and is only built on the first
/// non-empty call; concurrent first uses initialize it at most once.
pub struct Reranker {
    scorer: OnceCell<Arc<dyn RerankScorer>>,
    factory: ScorerFactory,
}

impl Reranker {
    pub fn new(factory: ScorerFactory) -> Self {
        Self {
            scorer: OnceCell::new(),
            factory,
        }
    }

    /// Reranker backed by an HTTP cross-encoder endpoint.
    pub fn over_http(base_url: String) -> Self {
        Self::new(
            Box::new(move || {
                Ok(Arc::new(http::HttpRerankScorer::new(base_url.clone())) as Arc<dyn RerankScorer>)
            })
        )
    }

    async fn scorer(&self) -> Result<&Arc<dyn RerankScorer>, RerankError> {
        self.scorer
            .get_or_try_init(|| async { (self.factory)() }).await
            .map_err(|e| RerankError::Scorer(e.to_string()))
    }

    /// Scores every passage against `query` and returns them sorted by
    /// rerank_score descending, ties keeping input order, truncated to
    /// `top_n` when given. Empty input returns empty output without
    /// touching the scorer.
    pub async fn rerank(
        &self,
        query: &str,
        passages: Vec<RetrievedPassage>,
        top_n: Option<usize>
    ) -> Result<Vec<RankedPassage>, RerankError> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = passages
            .iter()
            .map(|p| p.texto.clone())
            .collect();

        let scorer = self.scorer().await?;
        let scores = scorer
            .score(query, &texts).await
            .map_err(|e| RerankError::Scorer(e.to_string()))?;

        if scores.len() != passages.len() {
            return Err(RerankError::ScoreCount {
                expected: passages.len(),
                got: scores.len(),
            });
        }

        let mut ranked: Vec<RankedPassage> = passages
            .into_iter()
            .zip(scores)
            .map(|(passage, rerank_score)| RankedPassage { passage, rerank_score })
            .collect();

        // sort_by is stable, so ties keep input order; total_cmp stays
        // a total order even if a scorer emits NaN.
        ranked.sort_by(|a, b| b.rerank_score.total_cmp(&a.rerank_score));

        if let Some(n) = top_n {
            ranked.truncate(n);
        }
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{ AtomicUsize, Ordering as AtomicOrdering };

    struct FixedScorer {
        scores: Vec<f32>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RerankScorer for FixedScorer {
        async fn score(
            &self,
            _query: &str,
            texts: &[String]
        ) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.scores[..texts.len()].to_vec())
        }
    }

    fn passage(texto: &str) -> RetrievedPassage {
        RetrievedPassage {
            texto: texto.to_string(),
            lei: Some("11.101/2005".into()),
            artigo: Some("53".into()),
            url_oficial: None,
            chunk_seq: None,
            score_vec: 0.5,
        }
    }

    fn reranker_with(scores: Vec<f32>, built: Arc<AtomicUsize>, calls: Arc<AtomicUsize>) -> Reranker {
        Reranker::new(
            Box::new(move || {
                built.fetch_add(1, AtomicOrdering::SeqCst);
                Ok(
                    Arc::new(FixedScorer {
                        scores: scores.clone(),
                        calls: Arc::clone(&calls),
                    }) as Arc<dyn RerankScorer>
                )
            })
        )
    }

    #[tokio::test]
    async fn empty_input_never_instantiates_the_scorer() {
        let built = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let reranker = reranker_with(vec![], Arc::clone(&built), Arc::clone(&calls));

        let out = reranker.rerank("qualquer consulta", Vec::new(), Some(5)).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(built.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn output_is_sorted_permutation_with_stable_ties() {
        let built = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let reranker = reranker_with(
            vec![0.2, 0.9, 0.9, 0.1],
            Arc::clone(&built),
            Arc::clone(&calls)
        );

        let passages = vec![passage("a"), passage("b"), passage("c"), passage("d")];
        let ranked = reranker.rerank("consulta", passages, None).await.unwrap();

        let order: Vec<&str> = ranked
            .iter()
            .map(|r| r.passage.texto.as_str())
            .collect();
        // b and c tie at 0.9; b came first in the input and stays first.
        assert_eq!(order, vec!["b", "c", "a", "d"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].rerank_score >= pair[1].rerank_score);
        }
    }

    #[tokio::test]
    async fn truncates_to_top_n_after_sorting() {
        let built = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let reranker = reranker_with(
            vec![0.1, 0.8, 0.5],
            Arc::clone(&built),
            Arc::clone(&calls)
        );

        let passages = vec![passage("a"), passage("b"), passage("c")];
        let ranked = reranker.rerank("consulta", passages, Some(2)).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].passage.texto, "b");
        assert_eq!(ranked[1].passage.texto, "c");
    }

    #[tokio::test]
    async fn scorer_is_built_once_across_calls() {
        let built = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let reranker = reranker_with(
            vec![0.3, 0.7],
            Arc::clone(&built),
            Arc::clone(&calls)
        );

        for _ in 0..3 {
            let passages = vec![passage("a"), passage("b")];
            reranker.rerank("consulta", passages, None).await.unwrap();
        }
        assert_eq!(built.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 3);
    }

    #[tokio::test]
    async fn nan_scores_keep_the_sort_total_and_deterministic() {
        let built = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let reranker = reranker_with(
            vec![0.5, f32::NAN, 0.7],
            Arc::clone(&built),
            Arc::clone(&calls)
        );

        let passages = vec![passage("a"), passage("b"), passage("c")];
        let ranked = reranker.rerank("consulta", passages, None).await.unwrap();

        // total_cmp orders positive NaN above every real score.
        let order: Vec<&str> = ranked
            .iter()
            .map(|r| r.passage.texto.as_str())
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn score_count_mismatch_is_an_error() {
        struct ShortScorer;
        #[async_trait]
        impl RerankScorer for ShortScorer {
            async fn score(
                &self,
                _query: &str,
                _texts: &[String]
            ) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>> {
                Ok(vec![0.5])
            }
        }
        let reranker = Reranker::new(
            Box::new(|| Ok(Arc::new(ShortScorer) as Arc<dyn RerankScorer>))
        );

        let passages = vec![passage("a"), passage("b")];
        let err = reranker.rerank("consulta", passages, None).await.unwrap_err();
        assert!(matches!(err, RerankError::ScoreCount { expected: 2, got: 1 }));
    }
}
