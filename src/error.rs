use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CategoryField;
use crate::encoding::FeatureField;

pub type Result<T, E = PredictError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("catalog source unreachable ({target}): {source}")]
    Connectivity {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("catalog query failed: {0}")]
    CatalogQuery(#[from] rusqlite::Error),

    #[error("catalog query returned no `{0}` column")]
    MissingColumn(&'static str),

    #[error("catalog has no known values for {0}")]
    EmptyCategory(CategoryField),

    #[error("load model artifact {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("{field} vocabulary does not match the model: expected {expected}, found {actual}")]
    VocabularyMismatch {
        field: CategoryField,
        expected: String,
        actual: String,
    },

    #[error("unknown {field} value {value:?}")]
    UnknownCategory { field: FeatureField, value: String },

    #[error("invalid attendance {0:?}")]
    InvalidAttendance(String),

    #[error("config: {0}")]
    Config(String),
}

impl PredictError {
    /// Errors a user can fix by changing the submission; everything else is
    /// an operator problem.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PredictError::UnknownCategory { .. } | PredictError::InvalidAttendance(_)
        )
    }
}
