use crate::stats::StatsResponse;
use crate::{PbpTable, derive, normalize_game_id, read_csv, season_from_game_id};
use chrono::NaiveDate;
use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const STATS_BASE: &str = "https://stats.nba.com/stats";
const JUMP_BALL: &str = "10";

/// NBA stats client backed by the public stats.nba.com endpoints.
#[derive(Debug, Clone)]
pub struct StatsApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for StatsApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (boxscore/0.1 play-by-play loader)")
                .default_headers(stats_headers())
                .build()
                .unwrap_or_default(),
            base_url: STATS_BASE.to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// The stats service rejects requests that don't look like they came from
/// its own web front end.
fn stats_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(header::REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(header::ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    headers
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Csv(csv::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Csv(e, source) => write!(f, "CSV error in {source}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl StatsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at a different stats host (a mirror, or a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load one game's play-by-play table in the shape the box score engine
    /// expects.
    ///
    /// Fallback chain:
    /// 1) `csv_path`, when it points at an existing file, read as-is.
    /// 2) The stats service. Raw rows are canonicalized and the game context
    ///    (home/away teams, game date, season) is attached to every row.
    pub async fn load_pbp(&self, game_id: &str, csv_path: Option<&Path>) -> ApiResult<PbpTable> {
        if let Some(path) = csv_path
            && path.exists()
        {
            log::debug!("loading game {game_id} from {}", path.display());
            return read_csv(path);
        }

        let game_id = normalize_game_id(game_id);
        let raw = self.fetch_play_by_play(&game_id).await?;
        let game_date = self.fetch_game_date(&game_id).await?;

        let mut table = derive::canonicalize(&raw);
        attach_team_roles(&mut table, &raw)?;
        table.fill_column("game_date", Some(game_date.format("%Y-%m-%d").to_string()));
        table.fill_column("season", season_from_game_id(&game_id).map(|s| s.to_string()));
        Ok(table)
    }

    /// Fetch the raw `PlayByPlay` result set for a game.
    pub async fn fetch_play_by_play(&self, game_id: &str) -> ApiResult<PbpTable> {
        let url = format!(
            "{}/playbyplayv2?GameID={}&StartPeriod=1&EndPeriod=14",
            self.base_url,
            normalize_game_id(game_id)
        );
        let raw: StatsResponse = self.get(&url).await?;
        let table = raw
            .result_set("PlayByPlay")
            .map(|rs| rs.to_table())
            .ok_or_else(|| ApiError::NotFound(format!("no PlayByPlay result set for {game_id}")))?;
        if table.is_empty() {
            return Err(ApiError::NotFound(format!("no play-by-play rows for {game_id}")));
        }
        Ok(table)
    }

    /// Fetch the game date from the `GameSummary` result set.
    pub async fn fetch_game_date(&self, game_id: &str) -> ApiResult<NaiveDate> {
        let url = format!(
            "{}/boxscoresummaryv2?GameID={}",
            self.base_url,
            normalize_game_id(game_id)
        );
        let raw: StatsResponse = self.get(&url).await?;
        let summary = raw
            .result_set("GameSummary")
            .map(|rs| rs.to_table())
            .ok_or_else(|| ApiError::NotFound(format!("no GameSummary result set for {game_id}")))?;
        let value = summary
            .get(0, "game_date_est")
            .ok_or_else(|| ApiError::NotFound(format!("no game date for {game_id}")))?;
        parse_game_date(value)
            .ok_or_else(|| ApiError::Other(format!("unrecognised game date {value:?} for {game_id}")))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.as_u16() == 404).unwrap_or(false) {
                    Err(ApiError::NotFound(url.to_owned()))
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Game context: stats rows → denormalized team-role columns
// ---------------------------------------------------------------------------

/// `GAME_DATE_EST` arrives as `2007-11-30T00:00:00`; only the date matters.
fn parse_game_date(value: &str) -> Option<NaiveDate> {
    let date = value.split('T').next()?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Attach home/away team id and abbreviation to every row.
///
/// The opening jump ball is described on the home side when slot 1 holds the
/// home jumper, so whichever description is filled decides the roles.
fn attach_team_roles(table: &mut PbpTable, raw: &PbpTable) -> ApiResult<()> {
    let row = (0..raw.len())
        .find(|&r| raw.get(r, "eventmsgtype") == Some(JUMP_BALL))
        .ok_or_else(|| ApiError::NotFound("no jump ball event to resolve home/away".into()))?;

    let slot = |n: u8, field: &str| raw.get(row, &format!("player{n}_team_{field}")).map(str::to_owned);
    let (home, away) = if raw.get(row, "homedescription").is_some() { (1, 2) } else { (2, 1) };

    let home_id = slot(home, "id");
    let away_id = slot(away, "id");
    if home_id.is_none() || away_id.is_none() {
        return Err(ApiError::Other("jump ball is missing a team id".into()));
    }

    table.fill_column("home_team_id", home_id);
    table.fill_column("away_team_id", away_id);
    table.fill_column("home_team_abbrev", slot(home, "abbreviation"));
    table.fill_column("away_team_abbrev", slot(away, "abbreviation"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump_ball_table(home_description: Option<&str>) -> PbpTable {
        let mut raw = PbpTable::new([
            "eventmsgtype",
            "homedescription",
            "visitordescription",
            "player1_team_id",
            "player1_team_abbreviation",
            "player2_team_id",
            "player2_team_abbreviation",
        ]);
        raw.push_row([Some("12"), None, None, None, None, None, None]);
        let visitor = if home_description.is_some() { None } else { Some("Jump Ball") };
        raw.push_row([
            Some("10"),
            home_description,
            visitor,
            Some("1610612743"),
            Some("DEN"),
            Some("1610612746"),
            Some("LAC"),
        ]);
        raw
    }

    #[test]
    fn game_date_drops_the_time_component() {
        assert_eq!(
            parse_game_date("2007-11-30T00:00:00"),
            NaiveDate::from_ymd_opt(2007, 11, 30)
        );
        assert_eq!(parse_game_date("2007-11-30"), NaiveDate::from_ymd_opt(2007, 11, 30));
        assert_eq!(parse_game_date("Nov 30"), None);
    }

    #[test]
    fn home_description_marks_slot_one_as_home() {
        let raw = jump_ball_table(Some("Jump Ball Camby vs. Kaman"));
        let mut table = raw.clone();
        attach_team_roles(&mut table, &raw).expect("jump ball present");
        assert_eq!(table.get(0, "home_team_id"), Some("1610612743"));
        assert_eq!(table.get(1, "home_team_abbrev"), Some("DEN"));
        assert_eq!(table.get(1, "away_team_abbrev"), Some("LAC"));
    }

    #[test]
    fn visitor_description_swaps_roles() {
        let raw = jump_ball_table(None);
        let mut table = raw.clone();
        attach_team_roles(&mut table, &raw).expect("jump ball present");
        assert_eq!(table.get(0, "home_team_id"), Some("1610612746"));
        assert_eq!(table.get(0, "away_team_abbrev"), Some("DEN"));
    }

    #[test]
    fn missing_jump_ball_is_not_found() {
        let mut raw = PbpTable::new(["eventmsgtype", "homedescription"]);
        raw.push_row([Some("12"), None::<&str>]);
        let mut table = raw.clone();
        assert!(matches!(
            attach_team_roles(&mut table, &raw),
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn csv_path_short_circuits_the_network() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(&mut file, b"game_id,period\n20700233,1\n").expect("write csv");

        // Unroutable base URL: any network call would fail the test.
        let api = StatsApi::new().with_base_url("http://127.0.0.1:9");
        let table = api
            .load_pbp("20700233", Some(file.path()))
            .await
            .expect("csv should load");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "period"), Some("1"));
    }

    #[tokio::test]
    async fn load_pbp_fetches_and_canonicalizes() {
        let mut server = mockito::Server::new_async().await;
        let pbp_body = r#"{"resultSets":[{"name":"PlayByPlay","headers":
            ["GAME_ID","EVENTNUM","EVENTMSGTYPE","EVENTMSGACTIONTYPE","PERIOD","PCTIMESTRING",
             "HOMEDESCRIPTION","VISITORDESCRIPTION","PLAYER1_ID","PLAYER1_TEAM_ID",
             "PLAYER1_TEAM_ABBREVIATION","PLAYER2_ID","PLAYER2_TEAM_ID","PLAYER2_TEAM_ABBREVIATION"],
            "rowSet":[
             ["0020700233",0,12,0,1,"12:00",null,null,0,null,null,0,null,null],
             ["0020700233",1,10,0,1,"12:00","Jump Ball Camby vs. Kaman",null,948,1610612743,"DEN",1894,1610612746,"LAC"],
             ["0020700233",2,1,1,1,"11:41",null,"Brand 3PT Jump Shot (3 PTS)",1894,1610612746,"LAC",0,null,null]
            ]}]}"#;
        let summary_body = r#"{"resultSets":[{"name":"GameSummary","headers":["GAME_DATE_EST","GAME_ID"],
            "rowSet":[["2007-11-30T00:00:00","0020700233"]]}]}"#;

        let pbp_mock = server
            .mock("GET", "/playbyplayv2")
            .match_query(mockito::Matcher::UrlEncoded("GameID".into(), "0020700233".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(pbp_body)
            .create_async()
            .await;
        let summary_mock = server
            .mock("GET", "/boxscoresummaryv2")
            .match_query(mockito::Matcher::UrlEncoded("GameID".into(), "0020700233".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(summary_body)
            .create_async()
            .await;

        let api = StatsApi::new().with_base_url(server.url());
        let table = api.load_pbp("20700233", None).await.expect("game should load");

        pbp_mock.assert_async().await;
        summary_mock.assert_async().await;
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2, "event_type_de"), Some("shot"));
        assert_eq!(table.get(2, "points_made"), Some("3"));
        assert_eq!(table.get(2, "seconds_elapsed"), Some("19"));
        assert_eq!(table.get(0, "home_team_id"), Some("1610612743"));
        assert_eq!(table.get(0, "away_team_abbrev"), Some("LAC"));
        assert_eq!(table.get(2, "game_date"), Some("2007-11-30"));
        assert_eq!(table.get(2, "season"), Some("2008"));
    }

    #[tokio::test]
    async fn missing_game_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let api = StatsApi::new().with_base_url(server.url());
        let err = api.load_pbp("1", None).await.expect_err("404 should fail");
        assert!(matches!(err, ApiError::NotFound(_)), "got {err}");
    }
}
