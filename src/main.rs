use boxscore::PlayByPlay;
use boxscore::settings::Settings;
use log::{error, warn};
use nba_stats_api::client::StatsApi;
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    game_id: String,
    csv: Option<PathBuf>,
    teams: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum CliAction {
    Help,
    Version,
    Run(Args),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(CliAction::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(CliAction::Version) => {
            println!("boxscore {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(CliAction::Run(args)) => args,
        Err(msg) => {
            eprintln!("{msg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();

    let settings = Settings::load();
    env_logger::Builder::new()
        .parse_filters(&settings.log_filter)
        .target(env_logger::Target::Stderr)
        .init();

    let mut api = StatsApi::new();
    if let Some(url) = &settings.stats_base_url {
        api = api.with_base_url(url.clone());
    }

    let csv = args.csv.or(settings.pbp_csv);
    if let Some(path) = &csv
        && !path.exists()
    {
        warn!("{} does not exist; fetching from the stats service", path.display());
    }

    let table = api
        .load_pbp(&args.game_id, csv.as_deref())
        .await
        .inspect_err(|e| error!("could not load game {}: {e}", args.game_id))?;
    let game = PlayByPlay::new(&table).inspect_err(|e| error!("game {}: {e}", args.game_id))?;

    let json = if args.teams {
        serde_json::to_string_pretty(&game.teambygamestats())?
    } else {
        serde_json::to_string_pretty(&game.playerbygamestats())?
    };
    println!("{json}");
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliAction, String> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "--teams" => parsed.teams = true,
            "--csv" => {
                let path = args.next().ok_or("--csv needs a path")?;
                parsed.csv = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {flag}")),
            game_id if parsed.game_id.is_empty() => parsed.game_id = game_id.to_owned(),
            extra => return Err(format!("Unexpected argument: {extra}")),
        }
    }

    if parsed.game_id.is_empty() {
        return Err("Missing GAME_ID".into());
    }
    Ok(CliAction::Run(parsed))
}

fn usage_text() -> &'static str {
    "boxscore - box scores from NBA play-by-play

Usage:
  boxscore <GAME_ID> [--csv PATH] [--teams]
  boxscore --help
  boxscore --version

Options:
  --csv PATH   Read play-by-play from a cached CSV instead of the stats service
  --teams      Print team box scores instead of player box scores

Environment:
  BOXSCORE_PBP_CSV     Default cached CSV path
  BOXSCORE_STATS_URL   Stats service base URL (default https://stats.nba.com/stats)
  RUST_LOG             Log filter (default warn)"
}
