use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use rusqlite::{Connection, params};

use outcome_terminal::catalog::validate_table_name;
use outcome_terminal::config::{self, AppConfig, flag_value};
use outcome_terminal::telemetry;

const WEATHER: &[&str] = &["Sunny", "Rainy", "Cloudy", "Humid"];
const TEAMS: &[&str] = &[
    "Australia",
    "England",
    "India",
    "New Zealand",
    "Pakistan",
    "South Africa",
    "Sri Lanka",
    "West Indies",
];
const LOCATIONS: &[&str] = &["Delhi", "Mumbai", "Kolkata", "Chennai", "Melbourne", "London"];
const DEFAULT_ROWS: usize = 400;

fn main() -> Result<()> {
    config::load_dotenv();
    telemetry::init_stderr();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env_and_args(&args)?;
    let rows = match flag_value(&args, "rows") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| anyhow!("--rows must be a positive integer, got {raw:?}"))?,
        None => DEFAULT_ROWS,
    };
    let reset = args.iter().any(|a| a == "--reset");

    let mut conn = open_writable(&config.db_path)?;
    let inserted = seed(&mut conn, &config.table, rows, reset)?;

    println!("Seed complete");
    println!("DB: {}", config.db_path.display());
    println!("Table: {}", config.table);
    println!("Rows inserted: {inserted}");
    Ok(())
}

fn open_writable(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))
}

fn seed(conn: &mut Connection, table: &str, rows: usize, reset: bool) -> Result<usize> {
    validate_table_name(table)?;
    if reset {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))
            .context("drop table")?;
    }
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            match_id INTEGER PRIMARY KEY AUTOINCREMENT,
            match_date TEXT NOT NULL,
            weather TEXT NULL,
            team1 TEXT NULL,
            team2 TEXT NULL,
            location TEXT NULL,
            attendance INTEGER NOT NULL,
            team1_score INTEGER NOT NULL,
            team2_score INTEGER NOT NULL,
            outcome INTEGER NOT NULL
        );
        "#
    ))
    .context("create match table")?;

    // Cycle through every category first so the catalog always covers the
    // full vocabulary, then randomize.
    let rows = rows.max(TEAMS.len());
    let mut rng = rand::thread_rng();
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).context("valid start date")?;

    let tx = conn.transaction().context("begin seed transaction")?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {table}(match_date, weather, team1, team2, location, attendance, team1_score, team2_score, outcome)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ))
            .context("prepare insert")?;

        for i in 0..rows {
            let weather = if i < WEATHER.len() {
                WEATHER[i]
            } else {
                pick(&mut rng, WEATHER)
            };
            let location = if i < LOCATIONS.len() {
                LOCATIONS[i]
            } else {
                pick(&mut rng, LOCATIONS)
            };
            let team1 = if i < TEAMS.len() {
                TEAMS[i]
            } else {
                pick(&mut rng, TEAMS)
            };
            let team2 = loop {
                let candidate = pick(&mut rng, TEAMS);
                if candidate != team1 {
                    break candidate;
                }
            };

            let attendance: i64 = rng.gen_range(5_000..=90_000);
            let team1_score: i64 = rng.gen_range(0..=4);
            let team2_score: i64 = rng.gen_range(0..=4);
            let outcome = match team1_score.cmp(&team2_score) {
                std::cmp::Ordering::Greater => 1,
                std::cmp::Ordering::Less => 0,
                std::cmp::Ordering::Equal => 2,
            };
            let date = start + Duration::days(i as i64 * 3);

            stmt.execute(params![
                date.format("%Y-%m-%d").to_string(),
                weather,
                team1,
                team2,
                location,
                attendance,
                team1_score,
                team2_score,
                outcome,
            ])
            .context("insert seed row")?;
        }
    }
    tx.commit().context("commit seed transaction")?;
    Ok(rows)
}

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_parent_reports_the_directory() {
        let blocker = std::env::temp_dir().join(format!(
            "outcome_terminal_seed_blocker_{}",
            std::process::id()
        ));
        std::fs::write(&blocker, b"not a directory").expect("write blocker file");

        let err = open_writable(&blocker.join("matches.sqlite"))
            .err()
            .expect("open should fail");
        let _ = std::fs::remove_file(&blocker);

        assert!(err.to_string().starts_with("create directory"), "{err:#}");
    }

    #[test]
    fn seeding_covers_every_category() {
        let mut conn = Connection::open_in_memory().expect("in-memory db");
        let inserted = seed(&mut conn, "sports_data_final", 1, false).expect("seed");
        assert_eq!(inserted, TEAMS.len());

        let distinct = |column: &str| -> i64 {
            conn.query_row(
                &format!("SELECT COUNT(DISTINCT {column}) FROM sports_data_final"),
                [],
                |row| row.get(0),
            )
            .expect("count")
        };
        assert_eq!(distinct("weather"), WEATHER.len() as i64);
        assert_eq!(distinct("team1"), TEAMS.len() as i64);
        assert_eq!(distinct("location"), LOCATIONS.len() as i64);
    }
}
