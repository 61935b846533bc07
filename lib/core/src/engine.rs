use crate::error::{EngineError, Result};
use crate::matrix::SimilarityMatrix;
use crate::product::{Catalog, ProductRecord};
use crate::tfidf::TfidfModel;
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, info};

/// A ranked neighbour of a queried product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub row: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub products: usize,
    pub vocabulary: usize,
    pub non_zero_weights: usize,
}

/// Content-based similarity engine over an immutable catalog.
///
/// Everything is computed in [`Engine::build`]; queries only read the
/// similarity matrix, so a built engine can be shared freely across threads.
#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    model: TfidfModel,
    matrix: SimilarityMatrix,
    non_zero_weights: usize,
}

impl Engine {
    pub fn build(catalog: Catalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let start = Instant::now();
        let docs: Vec<String> = catalog.iter().map(ProductRecord::composite_document).collect();
        debug!("Built {} composite documents", docs.len());

        let (model, vectors) = TfidfModel::fit(docs.as_slice());
        let non_zero_weights = vectors.iter().map(|v| v.nnz()).sum();
        debug!(
            "Fitted TF-IDF: {} terms, {} non-zero weights",
            model.vocabulary().len(),
            non_zero_weights
        );

        let matrix = SimilarityMatrix::from_vectors(&vectors);
        debug!("Computed {}x{} similarity matrix", matrix.dim(), matrix.dim());

        info!(
            "Similarity engine built: {} products, {} terms in {:?}",
            catalog.len(),
            model.vocabulary().len(),
            start.elapsed()
        );

        Ok(Self {
            catalog,
            model,
            matrix,
            non_zero_weights,
        })
    }

    /// Ids of the `k` products most similar to `product_id`, best first.
    ///
    /// Unknown ids fail with [`EngineError::UnknownProduct`]; they are never
    /// turned into an empty result here.
    pub fn recommend(&self, product_id: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .recommend_scored(product_id, k)?
            .into_iter()
            .map(|rec| rec.id)
            .collect())
    }

    /// Same ranking as [`Engine::recommend`], with row and score attached.
    ///
    /// Other products are ordered by score descending, ties by ascending row.
    /// The queried product itself is always excluded.
    pub fn recommend_scored(&self, product_id: &str, k: usize) -> Result<Vec<Recommendation>> {
        let row = self.row_of(product_id)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let scores = self
            .matrix
            .row(row)
            .ok_or_else(|| EngineError::UnknownProduct(product_id.to_string()))?;

        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != row)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .filter_map(|(other, score)| {
                self.catalog.get(other).map(|record| Recommendation {
                    id: record.id.clone(),
                    row: other,
                    score,
                })
            })
            .collect())
    }

    /// Cosine similarity between two catalog products.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let i = self.row_of(a)?;
        let j = self.row_of(b)?;
        self.matrix
            .get(i, j)
            .ok_or_else(|| EngineError::UnknownProduct(b.to_string()))
    }

    pub fn product(&self, product_id: &str) -> Option<&ProductRecord> {
        self.catalog.by_id(product_id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> &TfidfModel {
        &self.model
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    /// Always false: empty catalogs are rejected at build time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.model.vocabulary().len()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            products: self.len(),
            vocabulary: self.vocabulary_size(),
            non_zero_weights: self.non_zero_weights,
        }
    }

    fn row_of(&self, product_id: &str) -> Result<usize> {
        self.catalog
            .position(product_id)
            .ok_or_else(|| EngineError::UnknownProduct(product_id.to_string()))
    }
}
