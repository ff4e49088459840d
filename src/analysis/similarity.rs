//! Similarity Ranker
//!
//! Symmetric lexical-overlap similarity between two texts, used by
//! clustering, chaining and the in-memory semantic search.
//!
//! Clustering and chaining are generic over [`Similarity`] so an
//! embedding-backed measure can replace the lexical one without touching
//! their algorithms.

use crate::analysis::text::token_set;

/// A symmetric similarity measure over texts, in [0, 1]
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Jaccard index of case-folded whitespace token sets
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardSimilarity;

impl Similarity for JaccardSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        jaccard(a, b)
    }
}

/// `|A ∩ B| / |A ∪ B|` over token sets, 0 when both are empty
pub fn jaccard(a: &str, b: &str) -> f64 {
    let left = token_set(a);
    let right = token_set(b);

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflexive_for_non_empty() {
        assert_eq!(jaccard("cats are great", "cats are great"), 1.0);
        assert_eq!(jaccard("Cats ARE great", "cats are GREAT"), 1.0);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(jaccard("", ""), 0.0);
        assert_eq!(jaccard("   ", ""), 0.0);
        assert_eq!(jaccard("something", ""), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("cats are great", "cats are wonderful"),
            ("rockets launch high", "cats are great"),
            ("a b c d", "c d e"),
            ("", "x"),
        ];
        for (a, b) in pairs {
            assert_eq!(jaccard(a, b), jaccard(b, a));
        }
    }

    #[test]
    fn test_partial_overlap() {
        // {cats, are} over {cats, are, great, wonderful}
        assert_eq!(jaccard("cats are great", "cats are wonderful"), 0.5);
        assert_eq!(jaccard("rockets launch high", "cats are great"), 0.0);
        // Repeated tokens collapse
        assert_eq!(jaccard("go go go", "go"), 1.0);
    }

    #[test]
    fn test_trait_object() {
        let measure: Box<dyn Similarity> = Box::new(JaccardSimilarity);
        assert_eq!(measure.similarity("x y", "y z"), 1.0 / 3.0);
    }
}
