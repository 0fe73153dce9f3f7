// Multinomial Naive Bayes
// Two-class generative model over TF-IDF feature vectors.
//
// log P(c | x) ∝ log P(c) + Σ_j x_j * log θ_cj
// θ_cj = (N_cj + alpha) / (N_c + alpha * n_features)

use crate::models::Label;
use serde::{Deserialize, Serialize};

use super::error::{DetectorError, Result};
use super::vectorizer::SparseVector;

/// Smallest smoothing value accepted; zero would allow log(0).
const MIN_ALPHA: f64 = 1e-10;

const N_CLASSES: usize = Label::ALL.len();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    fit_prior: bool,
    model: Option<NbModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NbModel {
    n_features: usize,
    /// Training examples per class, indexed by `Label::index`
    class_count: Vec<f64>,
    class_log_prior: Vec<f64>,
    /// `n_classes x n_features` smoothed log-likelihoods
    feature_log_prob: Vec<Vec<f64>>,
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl MultinomialNb {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fit_prior: true,
            model: None,
        }
    }

    /// Use a uniform class prior instead of the observed class frequencies
    #[must_use]
    pub fn with_fit_prior(mut self, fit_prior: bool) -> Self {
        self.fit_prior = fit_prior;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.model.as_ref().map(|m| m.n_features)
    }

    pub fn class_count(&self, label: Label) -> Option<f64> {
        self.model.as_ref().map(|m| m.class_count[label.index()])
    }

    pub fn feature_log_prob(&self, label: Label) -> Option<&[f64]> {
        self.model
            .as_ref()
            .map(|m| m.feature_log_prob[label.index()].as_slice())
    }

    pub fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()> {
        if features.len() != labels.len() {
            return Err(DetectorError::LengthMismatch {
                samples: features.len(),
                labels: labels.len(),
            });
        }
        let Some(first) = features.first() else {
            return Err(DetectorError::EmptyCorpus);
        };

        let n_features = first.dim();
        let mut class_count = vec![0.0; N_CLASSES];
        let mut feature_count = vec![vec![0.0; n_features]; N_CLASSES];

        for (x, label) in features.iter().zip(labels) {
            if x.dim() != n_features {
                return Err(DetectorError::DimensionMismatch {
                    expected: n_features,
                    actual: x.dim(),
                });
            }
            let c = label.index();
            class_count[c] += 1.0;
            for (j, v) in x.iter() {
                feature_count[c][j] += v;
            }
        }

        if let Some(missing) = Label::ALL.iter().find(|l| class_count[l.index()] == 0.0) {
            return Err(DetectorError::SingleClass(missing.as_str()));
        }

        let alpha = self.alpha.max(MIN_ALPHA);
        let feature_log_prob: Vec<Vec<f64>> = feature_count
            .iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + alpha * n_features as f64;
                let log_total = total.ln();
                counts
                    .iter()
                    .map(|c| (c + alpha).ln() - log_total)
                    .collect::<Vec<f64>>()
            })
            .collect();

        let n_samples = features.len() as f64;
        let class_log_prior: Vec<f64> = if self.fit_prior {
            class_count.iter().map(|c| (c / n_samples).ln()).collect()
        } else {
            vec![-(N_CLASSES as f64).ln(); N_CLASSES]
        };

        self.model = Some(NbModel {
            n_features,
            class_count,
            class_log_prior,
            feature_log_prob,
        });
        Ok(())
    }

    fn fitted(&self) -> Result<&NbModel> {
        self.model
            .as_ref()
            .ok_or(DetectorError::NotFitted("MultinomialNb"))
    }

    /// Unnormalized per-class log posterior
    pub fn joint_log_likelihood(&self, x: &SparseVector) -> Result<[f64; N_CLASSES]> {
        let model = self.fitted()?;
        if x.dim() != model.n_features {
            return Err(DetectorError::DimensionMismatch {
                expected: model.n_features,
                actual: x.dim(),
            });
        }

        let mut jll = [0.0; N_CLASSES];
        for (c, slot) in jll.iter_mut().enumerate() {
            *slot = model.class_log_prior[c] + x.dot(&model.feature_log_prob[c]);
        }
        Ok(jll)
    }

    /// Class probabilities indexed by `Label::index`; they always sum to 1.
    pub fn predict_proba_one(&self, x: &SparseVector) -> Result<[f64; N_CLASSES]> {
        let jll = self.joint_log_likelihood(x)?;
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut probs = [0.0; N_CLASSES];
        for (p, l) in probs.iter_mut().zip(jll.iter()) {
            *p = (l - max).exp();
        }
        let total: f64 = probs.iter().sum();
        for p in &mut probs {
            *p /= total;
        }
        Ok(probs)
    }

    pub fn predict_proba(&self, features: &[SparseVector]) -> Result<Vec<[f64; N_CLASSES]>> {
        features.iter().map(|x| self.predict_proba_one(x)).collect()
    }

    /// Most likely class; ties go to the lower label index.
    pub fn predict_one(&self, x: &SparseVector) -> Result<Label> {
        let jll = self.joint_log_likelihood(x)?;
        let mut best = 0;
        for c in 1..N_CLASSES {
            if jll[c] > jll[best] {
                best = c;
            }
        }
        Ok(Label::from_index(best).unwrap_or(Label::Human))
    }

    pub fn predict(&self, features: &[SparseVector]) -> Result<Vec<Label>> {
        features.iter().map(|x| self.predict_one(x)).collect()
    }

    /// Shape and finiteness checks for a deserialized model
    pub fn validate(&self) -> std::result::Result<(), String> {
        let model = self.fitted().map_err(|e| e.to_string())?;
        if model.class_count.len() != N_CLASSES
            || model.class_log_prior.len() != N_CLASSES
            || model.feature_log_prob.len() != N_CLASSES
        {
            return Err(format!("expected {} classes", N_CLASSES));
        }
        for row in &model.feature_log_prob {
            if row.len() != model.n_features {
                return Err(format!(
                    "feature_log_prob row has {} entries, expected {}",
                    row.len(),
                    model.n_features
                ));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err("feature_log_prob contains non-finite values".to_string());
            }
        }
        if model.class_log_prior.iter().any(|v| v.is_nan()) {
            return Err("class_log_prior contains NaN".to_string());
        }
        Ok(())
    }
}
