use std::path::PathBuf;

use rusqlite::Connection;

use outcome_terminal::catalog::{
    CatalogRow, CategoryCatalog, CategoryField, SqliteCatalogSource, build_catalog,
};
use outcome_terminal::encoding::{EncodedFeatureRecord, FeatureField};
use outcome_terminal::model::{
    PredictionModel, TreeEnsembleModel, VocabularyEntry, VocabularyManifest,
};
use outcome_terminal::outcome::{Outcome, PredictionLabel};
use outcome_terminal::request::MatchRequest;
use outcome_terminal::{AppContext, PredictError};

struct FixedModel {
    label: i64,
    vocabulary: Option<VocabularyManifest>,
}

impl FixedModel {
    fn new(label: i64) -> Self {
        Self {
            label,
            vocabulary: None,
        }
    }
}

impl PredictionModel for FixedModel {
    fn predict(&self, _record: &EncodedFeatureRecord) -> PredictionLabel {
        PredictionLabel(self.label)
    }

    fn vocabulary(&self) -> Option<&VocabularyManifest> {
        self.vocabulary.as_ref()
    }
}

fn seeded_source() -> SqliteCatalogSource {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE sports_data_final (
            Weather TEXT, TEAM1 TEXT, Team2 TEXT, Location TEXT, attendance INTEGER
        );
        INSERT INTO sports_data_final VALUES ('Sunny', 'India', 'Australia', 'Delhi', 30000);
        INSERT INTO sports_data_final VALUES ('Sunny', 'India', 'Australia', 'Delhi', 42000);
        INSERT INTO sports_data_final VALUES ('Rainy', 'Australia', NULL, 'Delhi', 12000);
        "#,
    )
    .unwrap();
    SqliteCatalogSource::from_connection(conn, "sports_data_final").unwrap()
}

#[test]
fn sqlite_catalog_to_prediction() {
    let catalog = build_catalog(&seeded_source()).unwrap();
    assert_eq!(catalog.len(CategoryField::Weather), 2);
    assert_eq!(catalog.len(CategoryField::Team), 2);
    assert_eq!(catalog.len(CategoryField::Location), 1);

    let ctx = AppContext::new(catalog, Box::new(FixedModel::new(1))).unwrap();
    let request = MatchRequest::build("Sunny", "India", "Australia", "Delhi", 50_000);
    let msg = ctx.predict(&request).unwrap();

    assert_eq!(msg.outcome, Outcome::Team1Win);
    assert_eq!(msg.to_string(), "India wins");
}

#[test]
fn unknown_category_is_rejected_without_predicting() {
    let catalog = build_catalog(&seeded_source()).unwrap();
    let ctx = AppContext::new(catalog, Box::new(FixedModel::new(1))).unwrap();

    let request = MatchRequest::build("Sunny", "India", "Australia", "Mumbai", 0);
    let err = ctx.predict(&request).unwrap_err();
    assert!(matches!(err, PredictError::UnknownCategory { .. }));
    assert!(err.is_rejection());
}

#[test]
fn empty_category_fails_startup() {
    let catalog = CategoryCatalog::from_rows(vec![CatalogRow {
        weather: None,
        team1: Some("India".to_string()),
        team2: Some("Australia".to_string()),
        location: Some("Delhi".to_string()),
    }]);
    let err = AppContext::new(catalog, Box::new(FixedModel::new(0))).err().unwrap();
    assert!(matches!(
        err,
        PredictError::EmptyCategory(CategoryField::Weather)
    ));
}

#[test]
fn vocabulary_drift_fails_fast() {
    let catalog = CategoryCatalog::from_rows(vec![CatalogRow::new(
        "Sunny", "India", "Australia", "Delhi",
    )]);
    let model = FixedModel {
        label: 1,
        vocabulary: Some(VocabularyManifest {
            weather: VocabularyEntry {
                size: 1,
                sha256: None,
            },
            team: VocabularyEntry {
                size: 3,
                sha256: None,
            },
            location: VocabularyEntry {
                size: 1,
                sha256: None,
            },
        }),
    };

    let err = AppContext::new(catalog, Box::new(model)).err().unwrap();
    match err {
        PredictError::VocabularyMismatch { field, .. } => assert_eq!(field, CategoryField::Team),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bundled_model_accepts_the_seed_vocabulary() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/outcome_model.json");
    let model = TreeEnsembleModel::load(&path).unwrap();
    assert!(model.artifact().vocabulary.is_some());

    let weather = ["Sunny", "Rainy", "Cloudy", "Humid"];
    let teams = [
        "Australia",
        "England",
        "India",
        "New Zealand",
        "Pakistan",
        "South Africa",
        "Sri Lanka",
        "West Indies",
    ];
    let locations = ["Delhi", "Mumbai", "Kolkata", "Chennai", "Melbourne", "London"];
    let rows = teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            CatalogRow::new(
                weather[i % weather.len()],
                team,
                teams[(i + 1) % teams.len()],
                locations[i % locations.len()],
            )
        })
        .collect::<Vec<_>>();
    let catalog = CategoryCatalog::from_rows(rows);

    let ctx = AppContext::new(catalog, Box::new(model)).unwrap();
    assert_eq!(ctx.encoders().encoder(FeatureField::Team1).len(), teams.len());
    assert_eq!(ctx.encoders().encoder(FeatureField::Location).len(), locations.len());
    let request = MatchRequest::build("Humid", "England", "India", "London", 60_000);
    let msg = ctx.predict(&request).unwrap();
    assert!(matches!(msg.outcome, Outcome::Team1Win | Outcome::Team2Win));
}
