use std::fmt;

pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal engine failures. Neither variant ever comes with a partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A structurally required column is absent, or one of its cells is
    /// unreadable. `row` is `None` when the whole column is missing.
    Schema {
        column: String,
        row: Option<usize>,
        reason: String,
    },
    /// Nothing in the log identifies the home and away teams.
    MissingContext(String),
}

impl EngineError {
    pub(crate) fn missing_column(column: &str) -> Self {
        EngineError::Schema {
            column: column.to_owned(),
            row: None,
            reason: "required column is missing".into(),
        }
    }

    pub(crate) fn bad_cell(column: &str, row: usize, reason: impl Into<String>) -> Self {
        EngineError::Schema {
            column: column.to_owned(),
            row: Some(row),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Schema { column, row: None, reason } => {
                write!(f, "Schema error in column {column}: {reason}")
            }
            EngineError::Schema { column, row: Some(row), reason } => {
                write!(f, "Schema error in column {column}, row {row}: {reason}")
            }
            EngineError::MissingContext(msg) => write!(f, "Missing game context: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Non-fatal: a category had no qualifying events for anyone in the game.
/// The all-zero table is still a valid result, so this is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationWarning {
    pub category: &'static str,
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Player,
    Team,
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            Scope::Player => "player",
            Scope::Team => "team",
        };
        write!(f, "no qualifying {} events at {scope} scope; reporting zeros", self.category)
    }
}

impl AggregationWarning {
    /// Log a warning when every value in `counts` is zero (or there are none).
    pub(crate) fn check<I>(category: &'static str, scope: Scope, counts: I)
    where
        I: IntoIterator<Item = i64>,
    {
        if counts.into_iter().all(|c| c == 0) {
            log::warn!("{}", AggregationWarning { category, scope });
        }
    }
}
