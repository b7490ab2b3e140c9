use std::path::Path;

use fiction_pre_processing::pre_processor::TfidfVectorizer;
use sprs::CsVecView;
use tracing::{debug, info};

use crate::error::ModelError;

/// Artifact format version this crate understands.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// A single linear scoring head over the shared TF-IDF feature space.
#[derive(Clone, Debug, bincode::Encode, bincode::Decode)]
pub struct LinearHead {
    label: String,
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearHead {
    pub fn new(label: impl Into<String>, weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            label: label.into(),
            weights,
            intercept,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Raw decision score for one TF-IDF row.
    pub(crate) fn score(&self, row: &CsVecView<'_, f64>) -> f64 {
        row.iter()
            .map(|(col_idx, &val)| self.weights[col_idx] * val)
            .sum::<f64>()
            + self.intercept
    }
}

/// The pre-trained genre model artifact.
///
/// Holds the fitted TF-IDF vectorizer, the binary verdict head (positive
/// scores lean non-fiction) and optional fine-grained genre heads used for
/// the probability ranking table. Instances are immutable after loading and
/// safe to share across threads.
#[derive(Clone, Debug, bincode::Encode, bincode::Decode)]
pub struct GenreModel {
    format_version: u32,
    model_version: String,
    vectorizer: TfidfVectorizer,
    verdict_head: LinearHead,
    genre_heads: Vec<LinearHead>,
}

impl GenreModel {
    /// Assemble a model from its parts, validating head shapes against the
    /// vectorizer's feature space.
    pub fn new(
        model_version: impl Into<String>,
        vectorizer: TfidfVectorizer,
        verdict_head: LinearHead,
        genre_heads: Vec<LinearHead>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            format_version: MODEL_FORMAT_VERSION,
            model_version: model_version.into(),
            vectorizer,
            verdict_head,
            genre_heads,
        };
        model.validate()?;
        Ok(model)
    }

    /// Decode a model from artifact bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let (model, _): (Self, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| ModelError::Malformed(e.to_string()))?;
        model.validate()?;
        debug!(
            version = %model.model_version,
            features = model.vectorizer.num_features(),
            genre_heads = model.genre_heads.len(),
            "decoded genre model"
        );
        Ok(model)
    }

    /// Encode the model to artifact bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ModelError::Malformed(e.to_string()))
    }

    /// Load the artifact from disk. Intended to run once at process
    /// startup; the returned model is immutable thereafter.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path)?;
        let model = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            version = %model.model_version,
            "loaded genre model"
        );
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::Malformed(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        let num_features = self.vectorizer.num_features();
        for head in std::iter::once(&self.verdict_head).chain(&self.genre_heads) {
            if head.weights.len() != num_features {
                return Err(ModelError::Malformed(format!(
                    "head {:?} has {} weights for {} features",
                    head.label,
                    head.weights.len(),
                    num_features
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.model_version
    }

    #[must_use]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    #[must_use]
    pub fn verdict_head(&self) -> &LinearHead {
        &self.verdict_head
    }

    #[must_use]
    pub fn genre_heads(&self) -> &[LinearHead] {
        &self.genre_heads
    }
}
