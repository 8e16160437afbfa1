//! NBA stats service raw wire types: serde shapes for the `resultSets`
//! envelope every endpoint returns, convertible into a `PbpTable`.

use crate::PbpTable;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub resource: Option<String>,
    #[serde(default)]
    pub result_sets: Vec<ResultSet>,
}

impl StatsResponse {
    /// Find a result set by name, e.g. `"PlayByPlay"` or `"GameSummary"`.
    pub fn result_set(&self, name: &str) -> Option<&ResultSet> {
        self.result_sets
            .iter()
            .find(|rs| rs.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub name: String,
    #[serde(default)]
    pub headers: Vec<String>,
    /// Row-major cells; the service mixes numbers, strings and nulls.
    #[serde(default)]
    pub row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn to_table(&self) -> PbpTable {
        let mut table = PbpTable::new(&self.headers);
        for row in &self.row_set {
            table.push_row(row.iter().map(value_to_cell));
        }
        table
    }
}

fn value_to_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_owned()),
        other => Some(other.to_string()),
    }
}
