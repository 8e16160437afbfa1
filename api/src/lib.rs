pub mod client;
pub mod derive;
pub mod stats;

use crate::client::{ApiError, ApiResult};
use std::io;
use std::path::Path;

// ---------------------------------------------------------------------------
// Exchange type: one row per play-by-play event, string cells
// ---------------------------------------------------------------------------

/// Cell values that pandas-style exports use to mean "no value".
const NULL_MARKERS: [&str; 5] = ["", "nan", "NaN", "None", "null"];

/// A column-named table of play-by-play rows.
///
/// Headers are stored lower-cased and trimmed, so lookups are effectively
/// case-insensitive. Empty cells (and the usual NaN/None spellings) are kept
/// as `None` so "never recorded" stays distinguishable from a recorded zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PbpTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl PbpTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().trim().to_lowercase())
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.headers.iter().position(|h| *h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut row: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| c.map(Into::into).and_then(clean_cell))
            .collect();
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Cell lookup by row index and column name.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        self.cell(row, self.column(name)?)
    }

    /// Set every row's value for `name`, adding the column if it is missing.
    pub fn fill_column(&mut self, name: &str, value: Option<String>) {
        let idx = self.ensure_column(name);
        for row in &mut self.rows {
            row[idx] = value.clone();
        }
    }

    /// Replace the values of `name` row by row, adding the column if missing.
    /// Extra values are ignored; missing ones become `None`.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<String>>) {
        let idx = self.ensure_column(name);
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[idx] = values.next().flatten();
        }
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.trim().to_lowercase());
        for row in &mut self.rows {
            row.push(None);
        }
        self.headers.len() - 1
    }
}

fn clean_cell(value: String) -> Option<String> {
    let trimmed = value.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

// ---------------------------------------------------------------------------
// CSV cache
// ---------------------------------------------------------------------------

/// Load a cached play-by-play CSV from disk.
pub fn read_csv(path: &Path) -> ApiResult<PbpTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| ApiError::NotFound(format!("could not read {}: {e}", path.display())))?;
    read_csv_from(file, &path.display().to_string())
}

/// Load play-by-play rows from any CSV reader. `source` only labels errors.
pub fn read_csv_from<R: io::Read>(reader: R, source: &str) -> ApiResult<PbpTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ApiError::Csv(e, source.to_owned()))?
        .clone();
    let mut table = PbpTable::new(headers.iter());

    for record in reader.records() {
        let record = record.map_err(|e| ApiError::Csv(e, source.to_owned()))?;
        table.push_row(record.iter().map(Some));
    }

    log::debug!("read {} play-by-play rows from {source}", table.len());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Game identifiers
// ---------------------------------------------------------------------------

/// Zero-pad a game id to the ten digits the stats service expects.
pub fn normalize_game_id(game_id: &str) -> String {
    format!("{:0>10}", game_id.trim())
}

/// Season (the calendar year it ends in) encoded in a game id.
///
/// Digits 3-4 of the padded id are the two-digit year the season starts in:
/// `0020700233` is the 2007-08 season, i.e. 2008. Codes from 46 up are
/// 1900s seasons, so `99` is the 1999-00 season and maps to 2000, not 2001.
pub fn season_from_game_id(game_id: &str) -> Option<i32> {
    let padded = normalize_game_id(game_id);
    let code: i32 = padded.get(3..5)?.parse().ok()?;
    if code >= 46 {
        Some(1900 + code + 1)
    } else {
        Some(2000 + code + 1)
    }
}
