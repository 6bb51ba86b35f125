use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::CategoryField;
use crate::encoding::{EncodedFeatureRecord, FEATURE_COUNT, FEATURE_NAMES};
use crate::error::{PredictError, Result};
use crate::outcome::PredictionLabel;

pub const ARTIFACT_VERSION: u32 = 1;

pub trait PredictionModel: Send + Sync {
    fn predict(&self, record: &EncodedFeatureRecord) -> PredictionLabel;

    /// Category vocabulary the model was trained against, when recorded.
    fn vocabulary(&self) -> Option<&VocabularyManifest> {
        None
    }

    fn describe(&self) -> String {
        "model".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyManifest {
    pub weather: VocabularyEntry,
    pub team: VocabularyEntry,
    pub location: VocabularyEntry,
}

impl VocabularyManifest {
    pub fn entry(&self, field: CategoryField) -> &VocabularyEntry {
        match field {
            CategoryField::Weather => &self.weather,
            CategoryField::Team => &self.team,
            CategoryField::Location => &self.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Binary,
    Multiclass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        split_feature: usize,
        threshold: f64,
        #[serde(default = "default_decision_type")]
        decision_type: String,
        left_child: Box<TreeNode>,
        right_child: Box<TreeNode>,
    },
    Leaf {
        leaf_value: f64,
    },
}

fn default_decision_type() -> String {
    "<=".to_string()
}

fn default_num_class() -> usize {
    1
}

impl TreeNode {
    pub fn evaluate(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { leaf_value } => return *leaf_value,
                TreeNode::Split {
                    split_feature,
                    threshold,
                    left_child,
                    right_child,
                    ..
                } => {
                    node = if features[*split_feature] <= *threshold {
                        &**left_child
                    } else {
                        &**right_child
                    };
                }
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            TreeNode::Leaf { leaf_value } => {
                if leaf_value.is_finite() {
                    Ok(())
                } else {
                    Err("non-finite leaf value".to_string())
                }
            }
            TreeNode::Split {
                split_feature,
                threshold,
                decision_type,
                left_child,
                right_child,
            } => {
                if *split_feature >= FEATURE_COUNT {
                    return Err(format!("split_feature {split_feature} out of range"));
                }
                if decision_type != "<=" {
                    return Err(format!("unsupported decision_type {decision_type:?}"));
                }
                if threshold.is_nan() {
                    return Err("NaN threshold".to_string());
                }
                left_child.validate()?;
                right_child.validate()
            }
        }
    }
}

/// Serialized gradient-boosted tree classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub objective: Objective,
    #[serde(default = "default_num_class")]
    pub num_class: usize,
    // Maps class index to emitted label; empty means the index is the label.
    #[serde(default)]
    pub class_labels: Vec<i64>,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub vocabulary: Option<VocabularyManifest>,
    pub trees: Vec<TreeNode>,
}

impl ModelArtifact {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.version != ARTIFACT_VERSION {
            return Err(format!(
                "unsupported artifact version {} (expected {ARTIFACT_VERSION})",
                self.version
            ));
        }
        if self.feature_names.len() != FEATURE_COUNT
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(got, want)| got.trim().to_ascii_lowercase() != want)
        {
            return Err(format!(
                "feature_names {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            ));
        }
        if self.trees.is_empty() {
            return Err("artifact has no trees".to_string());
        }

        let classes = self.class_count();
        match self.objective {
            Objective::Binary => {
                if self.num_class != 1 {
                    return Err(format!("binary objective with num_class {}", self.num_class));
                }
            }
            Objective::Multiclass => {
                if self.num_class < 2 {
                    return Err(format!("multiclass objective with num_class {}", self.num_class));
                }
                if self.trees.len() % self.num_class != 0 {
                    return Err(format!(
                        "{} trees cannot be split across {} classes",
                        self.trees.len(),
                        self.num_class
                    ));
                }
            }
        }
        if !self.class_labels.is_empty() && self.class_labels.len() != classes {
            return Err(format!(
                "class_labels has {} entries, expected {classes}",
                self.class_labels.len()
            ));
        }

        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|err| format!("tree {idx}: {err}"))?;
        }
        Ok(())
    }

    fn class_count(&self) -> usize {
        match self.objective {
            Objective::Binary => 2,
            Objective::Multiclass => self.num_class,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeEnsembleModel {
    artifact: ModelArtifact,
    path: Option<PathBuf>,
}

impl TreeEnsembleModel {
    pub fn load(path: &Path) -> Result<Self> {
        let load_err = |reason: String| PredictError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };
        let raw = fs::read_to_string(path).map_err(|err| load_err(err.to_string()))?;
        let artifact = serde_json::from_str::<ModelArtifact>(&raw)
            .map_err(|err| load_err(format!("parse: {err}")))?;
        let mut model = Self::from_artifact(artifact).map_err(|err| match err {
            PredictError::ModelLoad { reason, .. } => load_err(reason),
            other => other,
        })?;
        model.path = Some(path.to_path_buf());

        let labels = model.emitted_labels();
        info!(
            path = %path.display(),
            objective = ?model.artifact.objective,
            trees = model.artifact.trees.len(),
            labels = ?labels,
            "model artifact loaded"
        );
        if !labels.iter().any(|l| !matches!(*l, 0 | 1)) {
            warn!("model cannot emit a draw label; draw outcomes will never be shown");
        }
        Ok(model)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        artifact
            .validate()
            .map_err(|reason| PredictError::ModelLoad {
                path: PathBuf::from("<memory>"),
                reason,
            })?;
        Ok(Self {
            artifact,
            path: None,
        })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Every label `predict` can return.
    pub fn emitted_labels(&self) -> Vec<i64> {
        (0..self.artifact.class_count())
            .map(|idx| self.label_for_class(idx))
            .collect()
    }

    fn label_for_class(&self, idx: usize) -> i64 {
        self.artifact
            .class_labels
            .get(idx)
            .copied()
            .unwrap_or(idx as i64)
    }

    /// Summed leaf values per class.
    pub fn raw_scores(&self, record: &EncodedFeatureRecord) -> Vec<f64> {
        let features = record.values();
        let num_class = self.artifact.num_class.max(1);
        let mut scores = vec![0.0; num_class];
        for (idx, tree) in self.artifact.trees.iter().enumerate() {
            scores[idx % num_class] += tree.evaluate(features);
        }
        scores
    }
}

impl PredictionModel for TreeEnsembleModel {
    fn predict(&self, record: &EncodedFeatureRecord) -> PredictionLabel {
        let scores = self.raw_scores(record);
        let class = match self.artifact.objective {
            // sigmoid(score) > 0.5
            Objective::Binary => usize::from(scores[0] > 0.0),
            Objective::Multiclass => {
                let mut best = 0usize;
                for (idx, score) in scores.iter().enumerate() {
                    if *score > scores[best] {
                        best = idx;
                    }
                }
                best
            }
        };
        PredictionLabel(self.label_for_class(class))
    }

    fn vocabulary(&self) -> Option<&VocabularyManifest> {
        self.artifact.vocabulary.as_ref()
    }

    fn describe(&self) -> String {
        let origin = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        format!(
            "{origin} ({:?}, {} trees)",
            self.artifact.objective,
            self.artifact.trees.len()
        )
    }
}
