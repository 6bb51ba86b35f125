use std::collections::HashMap;
use std::fmt;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::catalog::{CategoryCatalog, CategoryField};
use crate::error::{PredictError, Result};
use crate::request::MatchRequest;

/// Column order of every encoded record. Model artifacts must list the same
/// names in the same order.
pub const FEATURE_NAMES: [&str; 5] = ["weather", "team1", "team2", "location", "attendance"];
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureField {
    Weather,
    Team1,
    Team2,
    Location,
}

impl FeatureField {
    pub const ALL: [FeatureField; 4] = [
        FeatureField::Weather,
        FeatureField::Team1,
        FeatureField::Team2,
        FeatureField::Location,
    ];

    /// Catalog namespace the field draws its vocabulary from. Both team roles
    /// share one namespace.
    pub fn category(self) -> CategoryField {
        match self {
            FeatureField::Weather => CategoryField::Weather,
            FeatureField::Team1 | FeatureField::Team2 => CategoryField::Team,
            FeatureField::Location => CategoryField::Location,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FeatureField::Weather => "weather",
            FeatureField::Team1 => "team1",
            FeatureField::Team2 => "team2",
            FeatureField::Location => "location",
        }
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Dense, sorted label encoding: the i-th smallest class gets code `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>();
        classes.sort_unstable();
        classes.dedup();

        let codes = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.clone(), idx as u32))
            .collect();
        Self { classes, codes }
    }

    pub fn encode(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// SHA-256 over the sorted classes, newline separated, as lowercase hex.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (idx, class) in self.classes.iter().enumerate() {
            if idx > 0 {
                hasher.update(b"\n");
            }
            hasher.update(class.as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureRecord {
    values: [f64; FEATURE_COUNT],
}

impl EncodedFeatureRecord {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderRegistry {
    weather: LabelEncoder,
    team1: LabelEncoder,
    team2: LabelEncoder,
    location: LabelEncoder,
}

impl EncoderRegistry {
    pub fn build(catalog: &CategoryCatalog) -> Self {
        let teams = catalog.values(CategoryField::Team);
        Self {
            weather: LabelEncoder::fit(catalog.values(CategoryField::Weather)),
            team1: LabelEncoder::fit(teams),
            team2: LabelEncoder::fit(teams),
            location: LabelEncoder::fit(catalog.values(CategoryField::Location)),
        }
    }

    pub fn encoder(&self, field: FeatureField) -> &LabelEncoder {
        match field {
            FeatureField::Weather => &self.weather,
            FeatureField::Team1 => &self.team1,
            FeatureField::Team2 => &self.team2,
            FeatureField::Location => &self.location,
        }
    }

    /// Encoder used to check a catalog namespace against a model manifest.
    pub fn encoder_for_category(&self, field: CategoryField) -> &LabelEncoder {
        match field {
            CategoryField::Weather => &self.weather,
            CategoryField::Team => &self.team1,
            CategoryField::Location => &self.location,
        }
    }

    pub fn encode_field(&self, field: FeatureField, value: &str) -> Result<u32> {
        self.encoder(field)
            .encode(value)
            .ok_or_else(|| PredictError::UnknownCategory {
                field,
                value: value.to_string(),
            })
    }

    pub fn encode(&self, request: &MatchRequest) -> Result<EncodedFeatureRecord> {
        let weather = self.encode_field(FeatureField::Weather, &request.weather)?;
        let team1 = self.encode_field(FeatureField::Team1, &request.team1)?;
        let team2 = self.encode_field(FeatureField::Team2, &request.team2)?;
        let location = self.encode_field(FeatureField::Location, &request.location)?;
        debug!(weather, team1, team2, location, attendance = request.attendance, "encoded request");

        Ok(EncodedFeatureRecord {
            values: [
                f64::from(weather),
                f64::from(team1),
                f64::from(team2),
                f64::from(location),
                request.attendance as f64,
            ],
        })
    }
}
