// TF-IDF Vectorizer
// Maps raw text to L2-normalized, sublinear TF-IDF weighted n-gram vectors.
//
// weight(t, d) = (1 + ln(count(t, d))) * idf(t)
// idf(t)       = ln((1 + n_docs) / (1 + df(t))) + 1

use crate::models::ModelConfig;
use crate::services::text_processor::extract_terms;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::error::{DetectorError, Result};

// ============================================================================
// Sparse vectors
// ============================================================================

/// Sparse feature vector with indices kept in ascending order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Pairs are sorted, zero values and
    /// out-of-range indices are dropped, duplicate indices are summed.
    pub fn from_pairs(dim: usize, pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (idx, value) in pairs {
            if idx < dim {
                *merged.entry(idx).or_insert(0.0) += value;
            }
        }
        let (indices, values): (Vec<usize>, Vec<f64>) =
            merged.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { dim, indices, values }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn get(&self, idx: usize) -> f64 {
        self.indices
            .binary_search(&idx)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product against a dense row
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter()
            .filter_map(|(idx, v)| dense.get(idx).map(|w| v * w))
            .sum()
    }

    fn normalize_l2(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    pub sublinear_tf: bool,
    pub smooth_idf: bool,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for VectorizerParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_features: config.max_features,
            ngram_range: config.ngram_range,
            min_df: config.min_df,
            max_df: config.max_df,
            sublinear_tf: true,
            smooth_idf: true,
        }
    }
}

impl VectorizerParams {
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    #[must_use]
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }
}

// ============================================================================
// Vocabulary
// ============================================================================

/// Fitted vocabulary. Terms are stored in feature-index order so the
/// serialized form is stable across identical training runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VocabularyRepr", into = "VocabularyRepr")]
pub struct Vocabulary {
    terms: Vec<String>,
    idf: Vec<f64>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct VocabularyRepr {
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl TryFrom<VocabularyRepr> for Vocabulary {
    type Error = String;

    fn try_from(repr: VocabularyRepr) -> std::result::Result<Self, Self::Error> {
        Vocabulary::new(repr.terms, repr.idf)
    }
}

impl From<Vocabulary> for VocabularyRepr {
    fn from(vocab: Vocabulary) -> Self {
        Self {
            terms: vocab.terms,
            idf: vocab.idf,
        }
    }
}

impl Vocabulary {
    fn new(terms: Vec<String>, idf: Vec<f64>) -> std::result::Result<Self, String> {
        if terms.len() != idf.len() {
            return Err(format!(
                "vocabulary has {} terms but {} idf weights",
                terms.len(),
                idf.len()
            ));
        }
        if let Some(bad) = idf.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(format!("invalid idf weight {}", bad));
        }

        let vocab = Self::build(terms, idf);
        if vocab.index.len() != vocab.terms.len() {
            return Err("vocabulary contains duplicate terms".to_string());
        }
        Ok(vocab)
    }

    fn build(terms: Vec<String>, idf: Vec<f64>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, idf, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.get(term).map(|i| self.idf[i])
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

// ============================================================================
// Vectorizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    params: VectorizerParams,
    vocabulary: Option<Vocabulary>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(VectorizerParams::default())
    }
}

impl TfidfVectorizer {
    pub fn new(params: VectorizerParams) -> Self {
        Self {
            params,
            vocabulary: None,
        }
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, Vocabulary::len)
    }

    /// Learn the vocabulary and idf weights from a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(DetectorError::EmptyCorpus);
        }

        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = extract_terms(doc.as_ref(), self.params.ngram_range);
            let mut seen: HashSet<&str> = HashSet::with_capacity(terms.len());
            for term in &terms {
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
            for term in terms {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.params.max_df * n_docs as f64;
        let mut candidates: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                df >= self.params.min_df && (df as f64) <= max_doc_count
            })
            .collect();

        // Highest corpus frequency wins; term order breaks ties.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(self.params.max_features);

        let mut terms: Vec<String> = candidates.into_iter().map(|(t, _)| t).collect();
        if terms.is_empty() {
            return Err(DetectorError::EmptyVocabulary);
        }
        terms.sort();

        let idf: Vec<f64> = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0);
                self.idf_weight(n_docs, df)
            })
            .collect();

        self.vocabulary = Some(Vocabulary::build(terms, idf));
        Ok(())
    }

    fn idf_weight(&self, n_docs: usize, df: usize) -> f64 {
        let (n, df) = if self.params.smooth_idf {
            (n_docs as f64 + 1.0, df as f64 + 1.0)
        } else {
            (n_docs as f64, (df as f64).max(1.0))
        };
        (n / df).ln() + 1.0
    }

    /// Transform a single document into a TF-IDF vector
    pub fn transform_one(&self, document: &str) -> Result<SparseVector> {
        let vocab = self
            .vocabulary
            .as_ref()
            .ok_or(DetectorError::NotFitted("TfidfVectorizer"))?;

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in extract_terms(document, self.params.ngram_range) {
            if let Some(idx) = vocab.get(&term) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let sublinear = self.params.sublinear_tf;
        let pairs = counts.into_iter().map(|(idx, count)| {
            let tf = if sublinear {
                1.0 + (count as f64).ln()
            } else {
                count as f64
            };
            (idx, tf * vocab.idf[idx])
        });

        let mut vector = SparseVector::from_pairs(vocab.len(), pairs);
        vector.normalize_l2();
        Ok(vector)
    }

    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<SparseVector>> {
        documents
            .iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissive() -> VectorizerParams {
        VectorizerParams::default()
            .with_ngram_range(1, 1)
            .with_min_df(1)
            .with_max_df(1.0)
    }

    #[test]
    fn test_sparse_vector_from_pairs() {
        let v = SparseVector::from_pairs(5, vec![(3, 1.0), (1, 2.0), (3, 0.5), (9, 4.0), (2, 0.0)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(1), 2.0);
        assert_eq!(v.get(3), 1.5);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.dot(&[1.0, 1.0, 1.0, 2.0, 1.0]), 5.0);
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfidfVectorizer::default();
        let err = vectorizer.transform_one("hello world").unwrap_err();
        assert!(matches!(err, DetectorError::NotFitted(_)));
    }

    #[test]
    fn test_fit_empty_corpus() {
        let mut vectorizer = TfidfVectorizer::default();
        let docs: Vec<&str> = vec![];
        assert!(matches!(vectorizer.fit(&docs), Err(DetectorError::EmptyCorpus)));
    }

    #[test]
    fn test_smoothed_idf() {
        let docs = vec!["the cat sat", "the dog sat", "a cat ran"];
        let mut vectorizer = TfidfVectorizer::new(permissive());
        vectorizer.fit(&docs).unwrap();

        let vocab = vectorizer.vocabulary().unwrap();
        assert_eq!(vocab.terms(), &["cat", "dog", "ran", "sat", "the"]);
        let idf_dog = vocab.idf("dog").unwrap();
        assert!((idf_dog - (1.0 + 2f64.ln())).abs() < 1e-12);
        let idf_the = vocab.idf("the").unwrap();
        assert!((idf_the - (1.0 + (4.0f64 / 3.0).ln())).abs() < 1e-12);
    }

    #[test]
    fn test_min_df_prunes_rare_terms() {
        let docs = vec!["the cat sat", "the dog sat", "a cat ran"];
        let params = permissive().with_min_df(2);
        let mut vectorizer = TfidfVectorizer::new(params);
        vectorizer.fit(&docs).unwrap();

        let vocab = vectorizer.vocabulary().unwrap();
        assert!(vocab.contains("cat"));
        assert!(!vocab.contains("dog"));
        assert!(!vocab.contains("ran"));
    }

    #[test]
    fn test_max_df_prunes_ubiquitous_terms() {
        let docs = vec!["the cat", "the dog", "the cat dog"];
        let params = permissive().with_max_df(0.9);
        let mut vectorizer = TfidfVectorizer::new(params);
        vectorizer.fit(&docs).unwrap();

        let vocab = vectorizer.vocabulary().unwrap();
        assert!(!vocab.contains("the"));
        assert!(vocab.contains("cat"));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = vec!["apple apple banana", "apple cherry", "banana cherry cherry"];
        let params = permissive().with_max_features(2);
        let mut vectorizer = TfidfVectorizer::new(params);
        vectorizer.fit(&docs).unwrap();

        assert_eq!(vectorizer.vocabulary().unwrap().terms(), &["apple", "cherry"]);
    }

    #[test]
    fn test_pruning_everything_is_an_error() {
        let docs = vec!["alpha beta", "gamma delta"];
        let mut vectorizer = TfidfVectorizer::new(permissive().with_min_df(2));
        assert!(matches!(vectorizer.fit(&docs), Err(DetectorError::EmptyVocabulary)));
        assert!(!vectorizer.is_fitted());
    }

    #[test]
    fn test_ngrams_enter_vocabulary() {
        let docs = vec!["as an ai language model", "as an ai assistant"];
        let params = VectorizerParams::default().with_min_df(2).with_max_df(1.0);
        let mut vectorizer = TfidfVectorizer::new(params);
        vectorizer.fit(&docs).unwrap();

        let vocab = vectorizer.vocabulary().unwrap();
        assert!(vocab.contains("as an"));
        assert!(vocab.contains("as an ai"));
        assert!(!vocab.contains("language model"));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let docs = vec!["the cat sat on the mat", "the dog sat on the log", "cats and dogs"];
        let mut vectorizer = TfidfVectorizer::new(permissive());
        let vectors = vectorizer.fit_transform(&docs).unwrap();

        for v in &vectors {
            assert_eq!(v.dim(), vectorizer.vocabulary_size());
            assert!((v.norm() - 1.0).abs() < 1e-9);
            assert!(v.iter().all(|(_, w)| w > 0.0));
        }
    }

    #[test]
    fn test_sublinear_tf() {
        let docs = vec!["cat cat dog", "dog bird"];
        let mut vectorizer = TfidfVectorizer::new(permissive());
        vectorizer.fit(&docs).unwrap();
        let v = vectorizer.transform_one("cat cat dog").unwrap();

        let vocab = vectorizer.vocabulary().unwrap();
        let cat = (1.0 + 2f64.ln()) * vocab.idf("cat").unwrap();
        let dog = vocab.idf("dog").unwrap();
        let ratio = v.get(vocab.get("cat").unwrap()) / v.get(vocab.get("dog").unwrap());
        assert!((ratio - cat / dog).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_text_gives_zero_vector() {
        let docs = vec!["the cat sat", "the dog sat"];
        let mut vectorizer = TfidfVectorizer::new(permissive());
        vectorizer.fit(&docs).unwrap();
        let v = vectorizer.transform_one("zebra xylophone").unwrap();
        assert!(v.is_empty());
        assert_eq!(v.norm(), 0.0);
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let docs = vec!["the cat sat", "the dog sat"];
        let mut vectorizer = TfidfVectorizer::new(permissive());
        vectorizer.fit(&docs).unwrap();

        let json = serde_json::to_string(&vectorizer).unwrap();
        let restored: TfidfVectorizer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, vectorizer);
        assert_eq!(
            restored.transform_one("the cat").unwrap(),
            vectorizer.transform_one("the cat").unwrap()
        );
    }

    #[test]
    fn test_deserialize_rejects_mismatched_idf() {
        let json = r#"{"params":{"max_features":10,"ngram_range":[1,1],"min_df":1,"max_df":1.0,"sublinear_tf":true,"smooth_idf":true},"vocabulary":{"terms":["a","b"],"idf":[1.0]}}"#;
        assert!(serde_json::from_str::<TfidfVectorizer>(json).is_err());
    }
}
