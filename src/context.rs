use tracing::{info, warn};

use crate::catalog::{CategoryCatalog, CategoryField, SqliteCatalogSource, build_catalog};
use crate::config::AppConfig;
use crate::encoding::{EncodedFeatureRecord, EncoderRegistry};
use crate::error::{PredictError, Result};
use crate::model::{PredictionModel, TreeEnsembleModel, VocabularyEntry, VocabularyManifest};
use crate::outcome::{OutcomeMessage, interpret};
use crate::request::MatchRequest;

/// Everything a submission needs, built once at startup and read-only
/// afterwards.
pub struct AppContext {
    catalog: CategoryCatalog,
    encoders: EncoderRegistry,
    model: Box<dyn PredictionModel>,
}

impl AppContext {
    /// Opens the catalog database, builds the catalog and encoders and loads
    /// the model artifact. Any failure here is fatal to startup.
    pub fn initialize(config: &AppConfig) -> Result<Self> {
        let source = SqliteCatalogSource::open(&config.db_path, &config.table)?;
        let catalog = build_catalog(&source)?;
        let model = TreeEnsembleModel::load(&config.model_path)?;
        Self::new(catalog, Box::new(model))
    }

    pub fn new(catalog: CategoryCatalog, model: Box<dyn PredictionModel>) -> Result<Self> {
        if let Some(field) = catalog.first_empty_field() {
            return Err(PredictError::EmptyCategory(field));
        }
        let encoders = EncoderRegistry::build(&catalog);
        if let Some(manifest) = model.vocabulary() {
            check_vocabulary(&encoders, manifest)?;
        } else {
            warn!("model artifact has no vocabulary manifest; catalog drift goes undetected");
        }
        info!(model = %model.describe(), "application context ready");
        Ok(Self {
            catalog,
            encoders,
            model,
        })
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn model(&self) -> &dyn PredictionModel {
        self.model.as_ref()
    }

    pub fn encode(&self, request: &MatchRequest) -> Result<EncodedFeatureRecord> {
        self.encoders.encode(request)
    }

    /// Encode, predict, interpret. Unknown categories come back as an error
    /// for the caller to show; nothing is predicted for them.
    pub fn predict(&self, request: &MatchRequest) -> Result<OutcomeMessage> {
        let record = match self.encode(request) {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "submission rejected");
                return Err(err);
            }
        };
        let label = self.model.predict(&record);
        let message = interpret(label, &request.team1, &request.team2);
        info!(label = label.0, outcome = %message, "prediction");
        Ok(message)
    }
}

fn check_vocabulary(encoders: &EncoderRegistry, manifest: &VocabularyManifest) -> Result<()> {
    for field in CategoryField::ALL {
        let encoder = encoders.encoder_for_category(field);
        let expected = manifest.entry(field);
        if expected.size != encoder.len() {
            return Err(PredictError::VocabularyMismatch {
                field,
                expected: format!("{} values", expected.size),
                actual: format!("{} values", encoder.len()),
            });
        }
        if let Some(want) = expected.sha256.as_deref() {
            let got = encoder.fingerprint();
            if !want.eq_ignore_ascii_case(&got) {
                return Err(PredictError::VocabularyMismatch {
                    field,
                    expected: format!("sha256 {want}"),
                    actual: format!("sha256 {got}"),
                });
            }
        }
    }
    Ok(())
}

/// Manifest describing the current catalog, for embedding into a model
/// artifact.
pub fn vocabulary_manifest(encoders: &EncoderRegistry) -> VocabularyManifest {
    let entry = |field| {
        let encoder = encoders.encoder_for_category(field);
        VocabularyEntry {
            size: encoder.len(),
            sha256: Some(encoder.fingerprint()),
        }
    };
    VocabularyManifest {
        weather: entry(CategoryField::Weather),
        team: entry(CategoryField::Team),
        location: entry(CategoryField::Location),
    }
}
