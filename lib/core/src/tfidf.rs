// TF-IDF vectorizer with smoothed idf and L2-normalized sparse vectors
use crate::text;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Frozen term -> column mapping, ordered lexicographically by term.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    columns: AHashMap<String, usize>,
}

impl Vocabulary {
    fn from_sorted(terms: Vec<String>) -> Self {
        let columns = terms
            .iter()
            .enumerate()
            .map(|(column, term)| (term.clone(), column))
            .collect();
        Self { terms, columns }
    }

    #[inline]
    pub fn column(&self, term: &str) -> Option<usize> {
        self.columns.get(term).copied()
    }

    #[inline]
    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get(column).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Sparse term-weight vector: strictly increasing column indices with
/// their weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    indices: Vec<u32>,
    weights: Vec<f32>,
}

impl TermVector {
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.weights.iter().map(|w| w * w).sum::<f32>().sqrt()
    }

    /// Merge-join dot product over the shared columns.
    pub fn dot(&self, other: &TermVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.weights[i] * other.weights[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for w in &mut self.weights {
                *w /= norm;
            }
        }
    }
}

/// A fitted TF-IDF model. The vocabulary and idf weights never change after
/// [`TfidfModel::fit`].
#[derive(Debug, Clone, Default)]
pub struct TfidfModel {
    vocabulary: Vocabulary,
    idf: Vec<f32>,
    n_docs: usize,
}

impl TfidfModel {
    /// Learn the vocabulary and idf weights from `docs` and return the
    /// weighted vector of every document, in input order.
    ///
    /// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, so a term present in every
    /// document still carries weight 1.
    pub fn fit<S: AsRef<str>>(docs: &[S]) -> (Self, Vec<TermVector>) {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|d| text::analyze(d.as_ref())).collect();

        // term -> document frequency, ordered so columns follow term order
        let mut dfs: BTreeMap<&str, u32> = BTreeMap::new();
        for tokens in &analyzed {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *dfs.entry(term).or_insert(0) += 1;
            }
        }

        let n = docs.len() as f32;
        let idf: Vec<f32> = dfs
            .values()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();
        let vocabulary = Vocabulary::from_sorted(dfs.keys().map(|t| t.to_string()).collect());

        let model = Self {
            vocabulary,
            idf,
            n_docs: docs.len(),
        };
        let vectors = analyzed.iter().map(|tokens| model.weigh(tokens)).collect();
        (model, vectors)
    }

    /// Vectorize new text against the frozen vocabulary. Terms the model
    /// has never seen are ignored.
    pub fn transform(&self, doc: &str) -> TermVector {
        self.weigh(&text::analyze(doc))
    }

    fn weigh(&self, tokens: &[String]) -> TermVector {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(column) = self.vocabulary.column(token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        let mut vector = TermVector {
            indices: Vec::with_capacity(counts.len()),
            weights: Vec::with_capacity(counts.len()),
        };
        for (column, tf) in counts {
            vector.indices.push(column as u32);
            vector.weights.push(tf as f32 * self.idf[column]);
        }
        vector.normalize();
        vector
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.column(term).map(|column| self.idf[column])
    }

    /// Number of documents the model was fitted on.
    pub fn n_docs(&self) -> usize {
        self.n_docs
    }
}
