//! Classifier capability and the artifact it is loaded from.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::features::FeatureRecord;

/// Errors raised while loading or invoking a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error(
        "feature schema mismatch: model expects [{}], record has [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("classifier returned invalid probability {0}")]
    InvalidProbability(f64),
}

/// Pre-trained binary classifier over a feature record.
pub trait Classifier: Send + Sync {
    /// Probability mass of the default class (index 1 of a two-class output).
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError>;
}

/// Optional standardization applied before the linear term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardization {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

/// Logistic regression artifact exported alongside its training-time column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standardization: Option<Standardization>,
}

impl LogisticModel {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: LogisticModel =
            serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let width = self.feature_names.len();
        if width == 0 {
            return Err(ModelError::InvalidArtifact(
                "feature_names must not be empty".to_string(),
            ));
        }
        if self.coefficients.len() != width {
            return Err(ModelError::InvalidArtifact(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                width
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidArtifact(
                "coefficients must be finite".to_string(),
            ));
        }
        if let Some(scaling) = &self.standardization {
            if scaling.means.len() != width || scaling.scales.len() != width {
                return Err(ModelError::InvalidArtifact(format!(
                    "standardization covers {}/{} columns for {} features",
                    scaling.means.len(),
                    scaling.scales.len(),
                    width
                )));
            }
            if scaling
                .scales
                .iter()
                .any(|scale| !scale.is_finite() || *scale == 0.0)
            {
                return Err(ModelError::InvalidArtifact(
                    "standardization scales must be finite and non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn check_schema(&self, record: &FeatureRecord) -> Result<(), ModelError> {
        let matches = record.len() == self.feature_names.len()
            && record
                .names()
                .zip(&self.feature_names)
                .all(|(found, expected)| found == expected);
        if matches {
            return Ok(());
        }
        Err(ModelError::SchemaMismatch {
            expected: self.feature_names.clone(),
            found: record.names().map(str::to_string).collect(),
        })
    }

    fn linear_term(&self, record: &FeatureRecord) -> f64 {
        let terms = record.values().zip(&self.coefficients);
        let weighted: f64 = match &self.standardization {
            Some(scaling) => terms
                .zip(scaling.means.iter().zip(&scaling.scales))
                .map(|((x, coefficient), (mean, scale))| coefficient * (x - mean) / scale)
                .sum(),
            None => terms.map(|(x, coefficient)| coefficient * x).sum(),
        };
        self.intercept + weighted
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        // Models built in memory have not been through `from_path`.
        self.validate()?;
        self.check_schema(record)?;
        let z = self.linear_term(record);
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

/// Init-once holder for the process-wide classifier. The first successful load wins and
/// every later caller shares the same read-only instance.
pub struct ModelCell {
    path: PathBuf,
    model: OnceLock<Arc<dyn Classifier>>,
}

impl ModelCell {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceLock::new(),
        }
    }

    /// Cell that already holds a classifier, e.g. one built in memory.
    pub fn preloaded(path: impl Into<PathBuf>, classifier: Arc<dyn Classifier>) -> Self {
        let cell = Self::new(path);
        let _ = cell.model.set(classifier);
        cell
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn get_or_load(&self) -> Result<Arc<dyn Classifier>, ModelError> {
        if let Some(model) = self.model.get() {
            debug!(path = %self.path.display(), "reusing loaded credit risk model");
            return Ok(Arc::clone(model));
        }

        let loaded = LogisticModel::from_path(&self.path)?;
        info!(
            path = %self.path.display(),
            features = loaded.feature_names.len(),
            "loaded credit risk model"
        );
        let loaded: Arc<dyn Classifier> = Arc::new(loaded);
        Ok(Arc::clone(self.model.get_or_init(|| loaded)))
    }
}

impl std::fmt::Debug for ModelCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCell")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
