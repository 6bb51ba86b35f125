use outcome_terminal::PredictError;
use outcome_terminal::catalog::{CatalogRow, CategoryCatalog};
use outcome_terminal::encoding::{EncoderRegistry, FeatureField};
use outcome_terminal::request::MatchRequest;

fn catalog() -> CategoryCatalog {
    CategoryCatalog::from_rows(vec![
        CatalogRow::new("Sunny", "India", "Australia", "Delhi"),
        CatalogRow::new("Rainy", "England", "India", "London"),
        CatalogRow::new("Sunny", "Pakistan", "Sri Lanka", "Delhi"),
    ])
}

#[test]
fn team_codes_are_the_same_on_both_sides() {
    let encoders = EncoderRegistry::build(&catalog());
    for team in ["Australia", "England", "India", "Pakistan", "Sri Lanka"] {
        let home = encoders.encode_field(FeatureField::Team1, team).unwrap();
        let away = encoders.encode_field(FeatureField::Team2, team).unwrap();
        assert_eq!(home, away, "{team}");
    }
}

#[test]
fn decode_inverts_encode_for_every_known_value() {
    let catalog = catalog();
    let encoders = EncoderRegistry::build(&catalog);
    for field in FeatureField::ALL {
        let encoder = encoders.encoder(field);
        for value in catalog.values(field.category()) {
            let code = encoder.encode(value).unwrap();
            assert_eq!(encoder.decode(code), Some(value.as_str()));
        }
    }
}

#[test]
fn codes_follow_sorted_order() {
    let catalog = CategoryCatalog::from_rows(vec![
        CatalogRow::new("Sunny", "India", "Australia", "Delhi"),
        CatalogRow::new("Rainy", "India", "Australia", "Delhi"),
    ]);
    let encoders = EncoderRegistry::build(&catalog);
    let request = MatchRequest::build("Sunny", "India", "Australia", "Delhi", 25_000);

    let first = encoders.encode(&request).unwrap();
    let second = encoders.encode(&request).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.values(), &[1.0, 1.0, 0.0, 0.0, 25_000.0]);
    assert_eq!(first.get("attendance"), Some(25_000.0));
}

#[test]
fn rebuilding_the_registry_gives_identical_codes() {
    let catalog = CategoryCatalog::from_rows(vec![
        CatalogRow::new("Sunny", "India", "Australia", "Delhi"),
        CatalogRow::new("Rainy", "Australia", "India", "Delhi"),
    ]);
    let a = EncoderRegistry::build(&catalog);
    let b = EncoderRegistry::build(&catalog);
    assert_eq!(a, b);

    assert_eq!(a.encoder(FeatureField::Weather).classes(), ["Rainy", "Sunny"]);
    assert_eq!(a.encoder(FeatureField::Team1).classes(), ["Australia", "India"]);
    assert_eq!(a.encoder(FeatureField::Team2).classes(), ["Australia", "India"]);
    assert_eq!(a.encoder(FeatureField::Location).classes(), ["Delhi"]);

    for field in FeatureField::ALL {
        for value in catalog.values(field.category()) {
            assert_eq!(
                a.encode_field(field, value).unwrap(),
                b.encode_field(field, value).unwrap(),
                "{field} {value}"
            );
        }
    }
}

#[test]
fn unknown_weather_is_rejected() {
    let encoders = EncoderRegistry::build(&catalog());
    let request = MatchRequest::build("Stormy", "India", "Australia", "Delhi", 0);

    let err = encoders.encode(&request).unwrap_err();
    assert!(err.is_rejection());
    match err {
        PredictError::UnknownCategory { field, value } => {
            assert_eq!(field, FeatureField::Weather);
            assert_eq!(value, "Stormy");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn values_are_matched_exactly() {
    let encoders = EncoderRegistry::build(&catalog());
    assert!(encoders.encode_field(FeatureField::Team1, "india").is_err());
    assert!(encoders.encode_field(FeatureField::Location, "Delhi ").is_err());
}
