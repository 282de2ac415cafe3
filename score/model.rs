use crate::classifier;
use crate::scaler::{self, ScaleError};
use crate::types::{FeatureVector, Idea, NUM_FEATURES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

// --- Public Data Structures ---
// These structs define the public, human-readable format of the pretrained model
// when serialized to a JSON file.

/// The on-disk layout of a model file. Every field except `metadata` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub weights: Vec<f64>,
    pub scaler_means: Vec<f64>,
    pub scaler_stds: Vec<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A validated, read-only logistic model plus its standardization statistics.
///
/// Construction goes through [`Model::new`] (or deserialization, which calls it),
/// so a `Model` value always satisfies
/// `weights.len() == means.len() + 1 == stds.len() + 1 == NUM_FEATURES + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelFile", into = "ModelFile")]
pub struct Model {
    weights: Vec<f64>,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
    metadata: BTreeMap<String, String>,
}

/// Errors raised while building or loading a model. All of them are fatal
/// for a run and are reported before any idea is scored.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON model file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "Model arrays are inconsistent: {weights} weights, {means} scaler means and {stds} scaler stds (expected weights = means + 1 = stds + 1)."
    )]
    LengthMismatch {
        weights: usize,
        means: usize,
        stds: usize,
    },
    #[error("Model describes {found} features, but ideas carry exactly {expected}.")]
    WrongFeatureCount { found: usize, expected: usize },
    #[error("Model field '{field}' has a non-finite value at index {index}.")]
    NonFinite { field: &'static str, index: usize },
}

impl TryFrom<ModelFile> for Model {
    type Error = ConfigError;

    fn try_from(file: ModelFile) -> Result<Self, Self::Error> {
        Model::new(file.weights, file.scaler_means, file.scaler_stds)
            .map(|model| model.with_metadata(file.metadata))
    }
}

impl From<Model> for ModelFile {
    fn from(model: Model) -> Self {
        ModelFile {
            weights: model.weights,
            scaler_means: model.feature_means,
            scaler_stds: model.feature_stds,
            metadata: model.metadata,
        }
    }
}

// Weights exported from the reference training run shipped with the web demo.
const DEFAULT_WEIGHTS: [f64; NUM_FEATURES + 1] = [
    0.973151750073213,
    1.384131304946152,
    0.04812224790906328,
    1.6357567409915157,
    -1.9250741581106545,
    0.6332355900464715,
];
const DEFAULT_MEANS: [f64; NUM_FEATURES] = [
    0.5733333333333331,
    0.6333333333333333,
    22133.333333333332,
    10.6,
    0.5133333333333333,
];
const DEFAULT_STDS: [f64; NUM_FEATURES] = [
    0.2610874693788782,
    0.18093671611393647,
    19985.23264336755,
    3.8877095717511763,
    0.2393940763877081,
];

impl Model {
    /// Validates and builds a model.
    pub fn new(
        weights: Vec<f64>,
        feature_means: Vec<f64>,
        feature_stds: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        if weights.len() != feature_means.len() + 1 || feature_means.len() != feature_stds.len() {
            return Err(ConfigError::LengthMismatch {
                weights: weights.len(),
                means: feature_means.len(),
                stds: feature_stds.len(),
            });
        }
        if feature_means.len() != NUM_FEATURES {
            return Err(ConfigError::WrongFeatureCount {
                found: feature_means.len(),
                expected: NUM_FEATURES,
            });
        }
        for (field, values) in [
            ("weights", &weights),
            ("scaler_means", &feature_means),
            ("scaler_stds", &feature_stds),
        ] {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinite { field, index });
            }
        }
        if let Some(index) = feature_stds.iter().position(|&s| s == 0.0) {
            log::warn!("Scaler std at index {index} is zero; that feature is only centered");
        }

        Ok(Self {
            weights,
            feature_means,
            feature_stds,
            metadata: BTreeMap::new(),
        })
    }

    /// The model embedded in the application, used when no model file is given.
    pub fn embedded_default() -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("learning_rate".to_string(), "0.1".to_string());
        metadata.insert("epochs".to_string(), "300".to_string());
        metadata.insert("l2".to_string(), "0.0".to_string());
        Self {
            weights: DEFAULT_WEIGHTS.to_vec(),
            feature_means: DEFAULT_MEANS.to_vec(),
            feature_stds: DEFAULT_STDS.to_vec(),
            metadata,
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn feature_means(&self) -> &[f64] {
        &self.feature_means
    }

    pub fn feature_stds(&self) -> &[f64] {
        &self.feature_stds
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Standardizes a raw feature vector with this model's scaler statistics.
    pub fn standardize(&self, features: &FeatureVector) -> Result<Vec<f64>, ScaleError> {
        scaler::standardize(features, &self.feature_means, &self.feature_stds)
    }

    /// Success probability for one idea.
    pub fn success_probability(&self, idea: &Idea) -> Result<f64, ScaleError> {
        let standardized = self.standardize(&idea.features())?;
        Ok(classifier::predict_probability(&self.weights, &standardized))
    }

    /// Parses a model from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ModelFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// Loads a model from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Saves the model as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(json.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn embedded_default_passes_validation() {
        let model = Model::embedded_default();
        let rebuilt = Model::new(
            model.weights().to_vec(),
            model.feature_means().to_vec(),
            model.feature_stds().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt.weights(), model.weights());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Model::new(vec![0.0; 5], vec![0.0; 5], vec![1.0; 5]).unwrap_err();
        match err {
            ConfigError::LengthMismatch {
                weights,
                means,
                stds,
            } => {
                assert_eq!((weights, means, stds), (5, 5, 5));
            }
            other => panic!("Expected LengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let err = Model::new(vec![0.0; 4], vec![0.0; 3], vec![1.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongFeatureCount {
                found: 3,
                expected: 5
            }
        ));
    }

    #[test]
    fn rejects_non_finite_coefficients() {
        let mut weights = vec![0.0; 6];
        weights[2] = f64::NAN;
        let err = Model::new(weights, vec![0.0; 5], vec![1.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonFinite {
                field: "weights",
                index: 2
            }
        ));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let json = r#"{"weights": [0,0,0,0,0,0], "scaler_means": [0,0,0,0,0]}"#;
        let err = Model::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)), "got {err:?}");
    }

    #[test]
    fn inconsistent_json_arrays_are_rejected() {
        let json = r#"{"weights": [0,0,0], "scaler_means": [0,0,0,0,0], "scaler_stds": [1,1,1,1,1]}"#;
        let err = Model::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("inconsistent"), "got {err}");
    }

    #[test]
    fn save_and_load_preserve_the_model() {
        let model = Model::embedded_default();
        let file = NamedTempFile::new().unwrap();
        model.save(file.path()).unwrap();
        let loaded = Model::load(file.path()).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.metadata().get("epochs").map(String::as_str), Some("300"));
    }

    #[test]
    fn json_uses_scaler_field_names() {
        let json = serde_json::to_value(Model::embedded_default()).unwrap();
        assert!(json.get("scaler_means").is_some());
        assert!(json.get("scaler_stds").is_some());
        assert_eq!(json["weights"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn zero_std_feature_is_centered_only() {
        let model = Model::new(vec![0.0; 6], vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![0.0; 5]).unwrap();
        let z = model.standardize(&[2.0, 2.0, 2.0, 2.0, 2.0]).unwrap();
        assert_abs_diff_eq!(z[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(z[4], -3.0, epsilon = 1e-12);
    }
}
