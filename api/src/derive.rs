//! Canonical play-by-play columns derived from raw `playbyplayv2` rows.
//!
//! The stats service reports each event as a message type, an action subtype,
//! a game clock and free-text descriptions. The box score engine instead wants
//! elapsed seconds and explicit flags (`shot_made`, `is_o_rebound`, ...), so
//! this module walks the raw rows once, in order, and writes those columns.

use crate::PbpTable;

const REGULATION_PERIOD_SECS: u32 = 720;
const OVERTIME_PERIOD_SECS: u32 = 300;
const REGULATION_PERIODS: u32 = 4;

/// Columns copied verbatim from the raw rows when present.
const PASSTHROUGH: [&str; 19] = [
    "game_id",
    "period",
    "eventmsgtype",
    "eventmsgactiontype",
    "pctimestring",
    "homedescription",
    "neutraldescription",
    "visitordescription",
    "player1_id",
    "player1_name",
    "player1_team_abbreviation",
    "player2_id",
    "player2_name",
    "player2_team_id",
    "player2_team_abbreviation",
    "player3_id",
    "player3_name",
    "player3_team_id",
    "player3_team_abbreviation",
];

/// Columns this module computes.
const DERIVED: [&str; 16] = [
    "event_id",
    "player1_team_id",
    "seconds_elapsed",
    "event_length",
    "event_type_de",
    "event_team",
    "shot_made",
    "is_three",
    "points_made",
    "is_block",
    "is_o_rebound",
    "is_d_rebound",
    "is_turnover",
    "is_steal",
    "foul_type",
    "is_putback",
];

/// Seconds in the given period (periods start at 1; 5 and up are overtime).
pub fn period_length(period: u32) -> u32 {
    if period <= REGULATION_PERIODS {
        REGULATION_PERIOD_SECS
    } else {
        OVERTIME_PERIOD_SECS
    }
}

/// Game seconds elapsed before the given period tips off.
pub fn period_start(period: u32) -> u32 {
    let period = period.max(1);
    let regulation = (period - 1).min(REGULATION_PERIODS);
    let overtime = (period - 1).saturating_sub(REGULATION_PERIODS);
    regulation * REGULATION_PERIOD_SECS + overtime * OVERTIME_PERIOD_SECS
}

/// Parse a `MM:SS` game clock into seconds remaining.
pub fn parse_clock(clock: &str) -> Option<u32> {
    let (minutes, seconds) = clock.trim().split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    // Sub-minute clocks can carry tenths ("0:04.3"); whole seconds are enough.
    let seconds: f64 = seconds.trim().parse().ok()?;
    minutes.checked_mul(60)?.checked_add(seconds.floor() as u32)
}

/// Text label for a raw `eventmsgtype` code.
pub fn event_type_label(code: u32) -> &'static str {
    match code {
        1 => "shot",
        2 => "missed_shot",
        3 => "free-throw",
        4 => "rebound",
        5 => "turnover",
        6 => "foul",
        7 => "violation",
        8 => "substitution",
        9 => "timeout",
        10 => "jump-ball",
        11 => "ejection",
        12 => "period-start",
        13 => "period-end",
        18 => "instant-replay",
        _ => "unknown",
    }
}

/// Text label for a foul's `eventmsgactiontype` code.
pub fn foul_type_label(code: u32) -> &'static str {
    match code {
        1 => "personal",
        2 => "shooting",
        3 => "loose_ball",
        4 => "offensive",
        5 => "inbound",
        6 => "away_from_play",
        8 => "punching",
        9 => "clear_path",
        10 => "double_personal",
        11 => "technical",
        12 => "non_unsportsmanlike_technical",
        13 => "hanging_technical",
        14 => "flagrant_1",
        15 => "flagrant_2",
        16 => "double_technical",
        17 => "defensive_3_seconds",
        18 => "delay_technical",
        19 => "taunting_technical",
        25 => "excess_timeout_technical",
        26 => "offensive_charge",
        27 => "personal_block",
        28 => "personal_take",
        29 => "shooting_block",
        30 => "too_many_players_technical",
        31 => "transition_take",
        _ => "unknown",
    }
}

/// Build the canonical table from raw service rows.
///
/// Rows are processed in their delivered order, which the service already
/// sorts chronologically; rebound classification and event lengths depend
/// on that order.
pub fn canonicalize(raw: &PbpTable) -> PbpTable {
    let mut headers: Vec<&str> = PASSTHROUGH
        .iter()
        .copied()
        .filter(|c| raw.has_column(c))
        .collect();
    headers.extend(DERIVED);
    let mut out = PbpTable::new(&headers);

    let mut previous: Option<(u32, u32)> = None;
    let mut last_miss_team: Option<String> = None;

    for row in 0..raw.len() {
        let text = |name: &str| raw.get(row, name).map(str::to_owned);
        let number = |name: &str| raw.get(row, name).and_then(parse_u32);

        let msg_type = number("eventmsgtype").unwrap_or_default();
        let action_type = number("eventmsgactiontype").unwrap_or_default();
        let period = number("period").unwrap_or(1);
        let description = [
            raw.get(row, "homedescription"),
            raw.get(row, "neutraldescription"),
            raw.get(row, "visitordescription"),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

        let remaining = raw
            .get(row, "pctimestring")
            .and_then(parse_clock)
            .unwrap_or_else(|| period_length(period));
        let seconds_elapsed =
            period_start(period) + period_length(period).saturating_sub(remaining);
        let event_length = match previous {
            Some((prev_period, prev_elapsed)) if prev_period == period => {
                seconds_elapsed.saturating_sub(prev_elapsed)
            }
            _ => 0,
        };
        previous = Some((period, seconds_elapsed));

        // Team rebounds and team turnovers put the team id in slot 1 and
        // leave its team column empty.
        let (player1_id, player1_team_id, team_placeholder) =
            match (text("player1_id"), text("player1_team_id")) {
                (Some(id), Some(team)) if id != "0" => (Some(id), Some(team), None),
                (Some(id), None) if id != "0" && is_team_id(&id) => (None, None, Some(id)),
                (_, team) => (None, team, None),
            };
        let event_team = player1_team_id.clone().or(team_placeholder);
        let player3_id = text("player3_id").filter(|id| id != "0");
        let player2_id = text("player2_id").filter(|id| id != "0");

        let shot_made = match msg_type {
            1 => Some(true),
            2 => Some(false),
            3 => Some(!description.contains("MISS")),
            _ => None,
        };
        let is_three = matches!(msg_type, 1 | 2) && description.contains("3PT");
        let points_made = match (msg_type, shot_made) {
            (1, _) if is_three => 3,
            (1, _) => 2,
            (3, Some(true)) => 1,
            _ => 0,
        };

        let (is_o_rebound, is_d_rebound) = if msg_type == 4 {
            let offensive = event_team.is_some() && event_team == last_miss_team;
            (offensive, !offensive && event_team.is_some())
        } else {
            (false, false)
        };
        if shot_made == Some(false) {
            last_miss_team = event_team.clone();
        }

        let mut cells: Vec<Option<String>> = PASSTHROUGH
            .iter()
            .filter(|c| raw.has_column(c))
            .map(|c| match *c {
                "player1_id" => player1_id.clone(),
                "player2_id" => player2_id.clone(),
                "player3_id" => player3_id.clone(),
                _ => text(c),
            })
            .collect();
        cells.extend([
            text("eventnum"),
            player1_team_id,
            Some(seconds_elapsed.to_string()),
            Some(event_length.to_string()),
            Some(event_type_label(msg_type).to_owned()),
            event_team,
            shot_made.map(flag),
            Some(flag(is_three)),
            Some(points_made.to_string()),
            Some(flag(msg_type == 2 && player3_id.is_some())),
            Some(flag(is_o_rebound)),
            Some(flag(is_d_rebound)),
            Some(flag(msg_type == 5)),
            Some(flag(msg_type == 5 && player2_id.is_some())),
            (msg_type == 6).then(|| foul_type_label(action_type).to_owned()),
            Some(flag(msg_type == 1 && description.contains("PUTBACK"))),
        ]);
        out.push_row(cells);
    }

    log::debug!("derived canonical columns for {} rows", out.len());
    out
}

fn parse_u32(value: &str) -> Option<u32> {
    value
        .parse::<u32>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|v| v as u32))
}

/// NBA franchise ids all live in the 1610612xxx block.
fn is_team_id(id: &str) -> bool {
    id.len() == 10 && id.starts_with("1610612")
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_HEADERS: [&str; 12] = [
        "GAME_ID",
        "EVENTNUM",
        "EVENTMSGTYPE",
        "EVENTMSGACTIONTYPE",
        "PERIOD",
        "PCTIMESTRING",
        "HOMEDESCRIPTION",
        "VISITORDESCRIPTION",
        "PLAYER1_ID",
        "PLAYER1_TEAM_ID",
        "PLAYER2_ID",
        "PLAYER3_ID",
    ];

    fn raw_table(rows: &[[&str; 12]]) -> PbpTable {
        let mut table = PbpTable::new(RAW_HEADERS);
        for row in rows {
            table.push_row(row.iter().map(|c| Some(*c)));
        }
        table
    }

    #[test]
    fn period_boundaries() {
        assert_eq!(period_start(1), 0);
        assert_eq!(period_start(4), 2160);
        assert_eq!(period_start(5), 2880);
        assert_eq!(period_start(6), 3180);
        assert_eq!(period_length(5), 300);
    }

    #[test]
    fn clock_parses_minutes_and_tenths() {
        assert_eq!(parse_clock("12:00"), Some(720));
        assert_eq!(parse_clock("0:04.3"), Some(4));
        assert_eq!(parse_clock("garbage"), None);
        assert_eq!(parse_clock("99999999:00"), None);
    }

    #[test]
    fn missed_shot_then_rebounds_are_classified() {
        let table = raw_table(&[
            ["0020700233", "1", "12", "0", "1", "12:00", "", "", "0", "", "0", "0"],
            ["0020700233", "2", "2", "1", "1", "11:40", "MISS Iverson 3PT Jump Shot", "Camby BLOCK (1 BLK)", "947", "1610612743", "0", "948"],
            ["0020700233", "3", "4", "0", "1", "11:38", "", "Camby REBOUND", "948", "1610612746", "0", "0"],
            ["0020700233", "4", "2", "1", "1", "11:20", "", "MISS Brand 15' Jump Shot", "1894", "1610612746", "0", "0"],
            ["0020700233", "5", "4", "0", "1", "11:18", "", "Brand REBOUND", "1894", "1610612746", "0", "0"],
            ["0020700233", "6", "1", "1", "1", "11:17", "", "Brand Putback Layup (2 PTS)", "1894", "1610612746", "0", "0"],
        ]);
        let out = canonicalize(&table);

        assert_eq!(out.get(1, "event_type_de"), Some("missed_shot"));
        assert_eq!(out.get(1, "is_three"), Some("1"));
        assert_eq!(out.get(1, "is_block"), Some("1"));
        assert_eq!(out.get(1, "seconds_elapsed"), Some("20"));
        assert_eq!(out.get(1, "event_length"), Some("20"));
        assert_eq!(out.get(2, "is_d_rebound"), Some("1"));
        assert_eq!(out.get(2, "is_o_rebound"), Some("0"));
        assert_eq!(out.get(4, "is_o_rebound"), Some("1"));
        assert_eq!(out.get(5, "points_made"), Some("2"));
        assert_eq!(out.get(5, "is_putback"), Some("1"));
        assert_eq!(out.get(5, "event_team"), Some("1610612746"));
    }

    #[test]
    fn team_rebound_moves_team_id_out_of_player_slot() {
        let table = raw_table(&[
            ["0020700233", "10", "3", "11", "1", "5:00", "MISS Anthony Free Throw 1 of 2", "", "2546", "1610612743", "0", "0"],
            ["0020700233", "11", "4", "0", "1", "5:00", "Nuggets Rebound", "", "1610612743", "", "0", "0"],
        ]);
        let out = canonicalize(&table);

        assert_eq!(out.get(0, "shot_made"), Some("0"));
        assert_eq!(out.get(0, "points_made"), Some("0"));
        assert_eq!(out.get(1, "player1_id"), None);
        assert_eq!(out.get(1, "event_team"), Some("1610612743"));
        assert_eq!(out.get(1, "is_o_rebound"), Some("1"));
    }

    #[test]
    fn turnovers_fouls_and_steals() {
        let table = raw_table(&[
            ["0020700233", "20", "5", "1", "2", "10:00", "", "Mobley Bad Pass Turnover", "1510", "1610612746", "947", "0"],
            ["0020700233", "21", "6", "11", "2", "9:50", "Smith T.FOUL", "", "2059", "1610612743", "0", "0"],
        ]);
        let out = canonicalize(&table);

        assert_eq!(out.get(0, "is_turnover"), Some("1"));
        assert_eq!(out.get(0, "is_steal"), Some("1"));
        assert_eq!(out.get(0, "seconds_elapsed"), Some("840"));
        assert_eq!(out.get(0, "foul_type"), None);
        assert_eq!(out.get(1, "foul_type"), Some("technical"));
        assert_eq!(out.get(1, "event_length"), Some("10"));
    }
}
