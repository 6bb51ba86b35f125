use anyhow::{Context, Result, anyhow};

use outcome_terminal::config::{self, AppConfig, flag_value};
use outcome_terminal::context::AppContext;
use outcome_terminal::encoding::FeatureField;
use outcome_terminal::request::{MatchRequest, parse_attendance};
use outcome_terminal::telemetry;

fn main() -> Result<()> {
    config::load_dotenv();
    telemetry::init_stderr();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env_and_args(&args)?;
    let ctx = AppContext::initialize(&config).context("startup failed")?;

    let mut values = Vec::with_capacity(FeatureField::ALL.len());
    for field in FeatureField::ALL {
        let Some(value) = flag_value(&args, field.key()) else {
            let known = ctx
                .catalog()
                .values(field.category())
                .iter()
                .cloned()
                .collect::<Vec<_>>();
            return Err(anyhow!(
                "missing --{} (known: {})",
                field.key(),
                known.join(", ")
            ));
        };
        values.push(value);
    }
    let attendance = flag_value(&args, "attendance")
        .map(|raw| parse_attendance(&raw))
        .transpose()?
        .unwrap_or(0);

    let [weather, team1, team2, location]: [String; 4] = values
        .try_into()
        .map_err(|_| anyhow!("expected four categorical values"))?;
    let request = MatchRequest::build(
        weather,
        team1,
        team2,
        location,
        i64::try_from(attendance).unwrap_or(i64::MAX),
    );

    let message = ctx.predict(&request)?;
    println!("{message}");
    Ok(())
}
