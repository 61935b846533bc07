use crate::tfidf::TermVector;
use rayon::prelude::*;

/// Dense, row-major `N x N` cosine similarity matrix.
///
/// Symmetric by construction: only the upper triangle is computed and it is
/// mirrored into the lower one. The diagonal is always 1.0.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Pairwise dot products of unit-normalized vectors, rows computed in
    /// parallel.
    pub fn from_vectors(vectors: &[TermVector]) -> Self {
        let n = vectors.len();

        // upper[i] holds scores for columns i+1..n
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                vectors[i + 1..]
                    .iter()
                    .map(|other| {
                        // identical non-zero documents score exactly 1.0
                        if !other.is_zero() && vectors[i] == *other {
                            1.0
                        } else {
                            vectors[i].dot(other).clamp(0.0, 1.0)
                        }
                    })
                    .collect()
            })
            .collect();

        let mut scores = vec![0.0f32; n * n];
        for (i, row) in upper.iter().enumerate() {
            scores[i * n + i] = 1.0;
            for (offset, &score) in row.iter().enumerate() {
                let j = i + 1 + offset;
                scores[i * n + j] = score;
                scores[j * n + i] = score;
            }
        }

        Self { dim: n, scores }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.dim && j < self.dim {
            Some(self.scores[i * self.dim + j])
        } else {
            None
        }
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i < self.dim {
            Some(&self.scores[i * self.dim..(i + 1) * self.dim])
        } else {
            None
        }
    }
}
