use std::env;
use std::path::PathBuf;

use crate::catalog::{DEFAULT_MATCH_TABLE, validate_table_name};
use crate::error::{PredictError, Result};

const CACHE_DIR: &str = "outcome_terminal";
const DEFAULT_DB_FILE: &str = "historical_matches.sqlite";
const DEFAULT_MODEL_PATH: &str = "assets/outcome_model.json";
const DEFAULT_ATTENDANCE_STEP: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub model_path: PathBuf,
    pub attendance_step: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Environment first, then `--db`, `--table` and `--model` flags.
    pub fn from_env_and_args(args: &[String]) -> Result<Self> {
        let mut config = Self::from_env()?;
        config.apply_args(args)?;
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = match non_blank("OUTCOME_DB_PATH") {
            Some(raw) => PathBuf::from(raw.trim()),
            None => default_db_path().ok_or_else(|| {
                PredictError::Config(
                    "OUTCOME_DB_PATH unset and no cache directory available".to_string(),
                )
            })?,
        };
        let table = non_blank("OUTCOME_MATCH_TABLE")
            .map(|raw| raw.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MATCH_TABLE.to_string());
        validate_table_name(&table)?;
        let model_path = non_blank("OUTCOME_MODEL_PATH")
            .map(|raw| PathBuf::from(raw.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        let attendance_step = non_blank("OUTCOME_ATTENDANCE_STEP")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_ATTENDANCE_STEP)
            .max(1);

        Ok(Self {
            db_path,
            table,
            model_path,
            attendance_step,
        })
    }

    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        if let Some(path) = flag_value(args, "db") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(table) = flag_value(args, "table") {
            validate_table_name(&table)?;
            self.table = table;
        }
        if let Some(path) = flag_value(args, "model") {
            self.model_path = PathBuf::from(path);
        }
        Ok(())
    }
}

/// Reads `--name=value` or `--name value`. Blank values are ignored.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let long = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == long
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DEFAULT_DB_FILE))
}
