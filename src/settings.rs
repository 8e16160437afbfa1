use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Cached play-by-play CSV to read instead of calling the stats service.
    pub pbp_csv: Option<PathBuf>,
    /// Stats service base URL override, for mirrors and local fixtures.
    pub stats_base_url: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pbp_csv: None,
            stats_base_url: None,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment. Command-line flags are
    /// applied on top by the caller.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            pbp_csv: get("BOXSCORE_PBP_CSV").map(PathBuf::from),
            stats_base_url: get("BOXSCORE_STATS_URL"),
            log_filter: get("RUST_LOG").unwrap_or(defaults.log_filter),
        }
    }
}
