//! # Evaluation
//! Metrics for judging generated answers, mostly in RAG settings.
//!
//! The cheap ones are pure math over things the endpoint already returned:
//! [mean_logprob] and [perplexity] over the token log-probabilities of a reply,
//! [cosine_similarity] over embedding vectors. [SemanticSimilarity] pairs the
//! cosine with an embedder. Faithfulness scoring, which needs its own model
//! calls, lives in [faithfulness].

pub mod faithfulness;

use anyhow::Result;
use crate::utils::embedding::AsyncSimplyEmbed;
use crate::utils::llm::openai::TokenLogprob;

/// Mean log-probability of a token sequence. `None` for an empty sequence.
pub fn mean_logprob(logprobs: &[TokenLogprob]) -> Option<f32> {
    if logprobs.is_empty() {
        return None;
    }
    let sum: f32 = logprobs.iter().map(|entry| entry.logprob).sum();
    Some(sum / logprobs.len() as f32)
}

/// Perplexity of a token sequence: the exponentiated negative mean log-probability,
/// an uncertainty proxy for the reply. `None` for an empty sequence.
pub fn perplexity(logprobs: &[TokenLogprob]) -> Option<f32> {
    mean_logprob(logprobs).map(|mean| (-mean).exp())
}

/// Cosine similarity of two vectors. 0.0 when either norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Semantic similarity of two texts: embed both, return their cosine.
pub struct SemanticSimilarity<E: AsyncSimplyEmbed> {
    embedder: E,
}

impl<E: AsyncSimplyEmbed> SemanticSimilarity<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    pub async fn score(&self, left: &str, right: &str) -> Result<f32> {
        let left = self.embedder.embed(left).await?;
        let right = self.embedder.embed(right).await?;
        Ok(cosine_similarity(&left, &right))
    }
}

#[cfg(test)]
mod test_eval {
    use crate::utils::llm::openai::TokenLogprob;
    use super::{cosine_similarity, mean_logprob, perplexity};

    fn logprobs(values: &[f32]) -> Vec<TokenLogprob> {
        values
            .iter()
            .map(|&logprob| TokenLogprob {
                token: "t".to_string(),
                logprob,
            })
            .collect()
    }

    #[test]
    fn test_mean_logprob() {
        assert_eq!(None, mean_logprob(&[]));
        let mean = mean_logprob(&logprobs(&[-1.0, -3.0])).unwrap();
        assert!((mean + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_perplexity() {
        assert_eq!(None, perplexity(&[]));
        // certain prediction: logprob 0 everywhere means perplexity 1
        let certain = perplexity(&logprobs(&[0.0, 0.0])).unwrap();
        assert!((certain - 1.0).abs() < 1e-6);
        let uncertain = perplexity(&logprobs(&[-1.0, -1.0])).unwrap();
        assert!((uncertain - std::f32::consts::E).abs() < 1e-5);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(0.0, cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]));
    }
}
