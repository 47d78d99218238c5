//! Cosine similarity and exact top-k ranking.
//!
//! This module implements the similarity ranker shared by document and image
//! retrieval: given a query vector and an index-aligned candidate matrix, it
//! returns the top-k candidates by cosine similarity. Selection is exact
//! (full sort, no approximation) and deterministic: ties break by ascending
//! original index.

use serde::Serialize;

/// A single ranked candidate: the index into the candidate matrix (and the
/// collection aligned with it) plus the cosine similarity score in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityHit {
    /// Index of the candidate in the matrix it was ranked against
    pub index: usize,

    /// Cosine similarity to the query vector
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
///
/// Cosine similarity is the cosine of the angle between two vectors and
/// ranges from -1 to 1. If either vector has zero norm the score is defined
/// as 0.0 rather than raising a division error; documents with no usable
/// text embed to near-zero vectors and must still flow through ranking.
///
/// # Panics
/// Panics if the vectors have different lengths; the caller owns the
/// invariant that query and candidates share the model dimension.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have the same length");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Rank all candidates against a query vector and return the top k.
///
/// # Arguments
/// * `query` - The query embedding
/// * `matrix` - Candidate embeddings, index-aligned with the caller's items
/// * `k` - Maximum number of results to return
///
/// # Returns
/// At most `min(k, matrix.len())` hits, sorted descending by score with ties
/// broken by ascending index. For `k >= matrix.len()` every index appears
/// exactly once.
pub fn rank_top_k(query: &[f32], matrix: &[Vec<f32>], k: usize) -> Vec<SimilarityHit> {
    let mut hits: Vec<SimilarityHit> = matrix
        .iter()
        .enumerate()
        .map(|(index, candidate)| SimilarityHit {
            index,
            score: cosine_similarity(query, candidate),
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    hits.truncate(k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);

        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((cosine_similarity(&a, &b) - 0.0).abs() < 1e-6);

        let a = vec![1.0, 1.0];
        let b = vec![-1.0, -1.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_self_is_one() {
        let v = vec![0.3, -0.7, 2.5, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_norm_is_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_rank_sorted_descending() {
        let query = vec![1.0, 0.0];
        let matrix = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let hits = rank_top_k(&query, &matrix, 3);
        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(hits[0].index, 1);
    }

    #[test]
    fn test_rank_k_larger_than_matrix_returns_all_indices_once() {
        let query = vec![1.0, 0.0];
        let matrix = vec![vec![1.0, 0.0], vec![0.5, 0.5], vec![0.0, 1.0]];
        let hits = rank_top_k(&query, &matrix, 10);
        assert_eq!(hits.len(), 3);
        let mut indices: Vec<usize> = hits.iter().map(|h| h.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_rank_tie_breaks_by_ascending_index() {
        let query = vec![1.0, 0.0];
        // Candidates 0, 1, 2 all score identically.
        let matrix = vec![vec![2.0, 0.0], vec![1.0, 0.0], vec![4.0, 0.0]];
        let hits = rank_top_k(&query, &matrix, 3);
        let indices: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let query = vec![1.0];
        let matrix: Vec<Vec<f32>> = (0..20).map(|i| vec![i as f32]).collect();
        let hits = rank_top_k(&query, &matrix, 5);
        assert_eq!(hits.len(), 5);
    }

    #[test]
    fn test_rank_empty_matrix() {
        let hits = rank_top_k(&[1.0, 0.0], &[], 5);
        assert!(hits.is_empty());
    }
}
