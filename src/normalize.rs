//! `PbpTable` → typed, deduplicated, chronologically ordered events.
//!
//! Column names are matched case-insensitively against a list of accepted
//! spellings per field. A handful of fields are structural and must be
//! present; everything else becomes `None` when its column is absent.

use crate::context::GameContext;
use crate::error::{EngineError, EngineResult};
use crate::event::{Event, EventType, FoulType, GameTags, PlayerId, PlayerSlot, ShotType, TeamId};
use log::{debug, warn};
use nba_stats_api::PbpTable;
use std::collections::HashSet;

const PERIOD: &[&str] = &["period"];
const SECONDS_ELAPSED: &[&str] = &["seconds_elapsed", "secs_elapsed", "elapsed_seconds"];
const EVENT_TYPE_LABEL: &[&str] = &["event_type_de", "event_type"];
const EVENT_TYPE_CODE: &[&str] = &["eventmsgtype"];
const EVENT_TEAM: &[&str] = &["event_team", "event_team_id"];
const EVENT_ID: &[&str] = &["event_id", "eventnum"];
const EVENT_LENGTH: &[&str] = &["event_length"];
const ACTION_TYPE: &[&str] = &["eventmsgactiontype", "event_action_type"];
const SHOT_TYPE: &[&str] = &["shot_type_de", "shot_type"];

const LINEUP_SLOTS: usize = 5;

/// Column positions for every field the engine reads, resolved once.
struct Columns {
    period: usize,
    seconds_elapsed: usize,
    event_type_label: Option<usize>,
    event_type_code: Option<usize>,
    event_team: Option<usize>,
    event_id: Option<usize>,
    event_length: Option<usize>,
    action_type: Option<usize>,
    shot_type: Option<usize>,
    shot_made: Option<usize>,
    is_three: Option<usize>,
    points_made: Option<usize>,
    is_block: Option<usize>,
    is_o_rebound: Option<usize>,
    is_d_rebound: Option<usize>,
    is_turnover: Option<usize>,
    is_steal: Option<usize>,
    is_putback: Option<usize>,
    foul_type: Option<usize>,
    home_description: Option<usize>,
    visitor_description: Option<usize>,
    game_id: Option<usize>,
    game_date: Option<usize>,
    season: Option<usize>,
    home_team_id: Option<usize>,
    away_team_id: Option<usize>,
    home_team_abbrev: Option<usize>,
    away_team_abbrev: Option<usize>,
    slots: [SlotColumns; 3],
    home_lineup: Vec<usize>,
    away_lineup: Vec<usize>,
}

struct SlotColumns {
    id: Option<usize>,
    team_id: Option<usize>,
    team_abbrev: Option<usize>,
    name: Option<usize>,
}

fn find(table: &PbpTable, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| table.column(n))
}

fn require(table: &PbpTable, names: &[&str]) -> EngineResult<usize> {
    find(table, names).ok_or_else(|| EngineError::missing_column(names[0]))
}

impl Columns {
    fn resolve(table: &PbpTable) -> EngineResult<Self> {
        let period = require(table, PERIOD)?;
        let seconds_elapsed = require(table, SECONDS_ELAPSED)?;

        let event_type_label = find(table, EVENT_TYPE_LABEL);
        let event_type_code = find(table, EVENT_TYPE_CODE);
        if event_type_label.is_none() && event_type_code.is_none() {
            return Err(EngineError::missing_column(EVENT_TYPE_LABEL[0]));
        }

        let slots = [1, 2, 3].map(|n| SlotColumns {
            id: table.column(&format!("player{n}_id")),
            team_id: table.column(&format!("player{n}_team_id")),
            team_abbrev: table.column(&format!("player{n}_team_abbreviation")),
            name: table.column(&format!("player{n}_name")),
        });

        // Team identity comes from `event_team` or, failing that, the acting
        // player's team column. One of the two has to exist.
        let event_team = find(table, EVENT_TEAM);
        if event_team.is_none() && slots[0].team_id.is_none() {
            return Err(EngineError::missing_column(EVENT_TEAM[0]));
        }

        let lineup = |side: &str| -> Vec<usize> {
            (1..=LINEUP_SLOTS)
                .filter_map(|n| table.column(&format!("{side}_player_{n}_id")))
                .collect()
        };

        Ok(Self {
            period,
            seconds_elapsed,
            event_type_label,
            event_type_code,
            event_team,
            event_id: find(table, EVENT_ID),
            event_length: find(table, EVENT_LENGTH),
            action_type: find(table, ACTION_TYPE),
            shot_type: find(table, SHOT_TYPE),
            shot_made: table.column("shot_made"),
            is_three: table.column("is_three"),
            points_made: table.column("points_made"),
            is_block: table.column("is_block"),
            is_o_rebound: table.column("is_o_rebound"),
            is_d_rebound: table.column("is_d_rebound"),
            is_turnover: table.column("is_turnover"),
            is_steal: table.column("is_steal"),
            is_putback: table.column("is_putback"),
            foul_type: table.column("foul_type"),
            home_description: table.column("homedescription"),
            visitor_description: table.column("visitordescription"),
            game_id: table.column("game_id"),
            game_date: table.column("game_date"),
            season: table.column("season"),
            home_team_id: table.column("home_team_id"),
            away_team_id: table.column("away_team_id"),
            home_team_abbrev: table.column("home_team_abbrev"),
            away_team_abbrev: table.column("away_team_abbrev"),
            home_lineup: lineup("home"),
            away_lineup: lineup("away"),
            slots,
        })
    }
}

/// Reads typed cells from one row, reporting failures against the column.
struct RowReader<'a> {
    table: &'a PbpTable,
    row: usize,
}

impl RowReader<'_> {
    fn text(&self, column: Option<usize>) -> Option<String> {
        column.and_then(|c| self.table.cell(self.row, c)).map(str::to_owned)
    }

    fn parse<T: std::str::FromStr>(&self, column: Option<usize>) -> EngineResult<Option<T>> {
        let Some(c) = column else { return Ok(None) };
        let Some(value) = self.table.cell(self.row, c) else { return Ok(None) };
        parse_number(value)
            .map(Some)
            .ok_or_else(|| self.error(c, format!("not a number: {value:?}")))
    }

    fn required<T: std::str::FromStr>(&self, column: usize) -> EngineResult<T> {
        self.parse(Some(column))?
            .ok_or_else(|| self.error(column, "required value is empty"))
    }

    fn id(&self, column: Option<usize>) -> EngineResult<Option<u64>> {
        // Slot ids of zero mean "nobody".
        Ok(self.parse::<u64>(column)?.filter(|&id| id != 0))
    }

    fn flag(&self, column: Option<usize>) -> EngineResult<Option<bool>> {
        let Some(c) = column else { return Ok(None) };
        let Some(value) = self.table.cell(self.row, c) else { return Ok(None) };
        parse_flag(value)
            .map(Some)
            .ok_or_else(|| self.error(c, format!("not a boolean: {value:?}")))
    }

    fn error(&self, column: usize, reason: impl Into<String>) -> EngineError {
        EngineError::bad_cell(&self.table.headers()[column], self.row, reason)
    }
}

/// Integers, tolerating the `.0` suffix float-typed exports put on them.
fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.parse::<T>().ok().or_else(|| {
        let (whole, frac) = value.split_once('.')?;
        if frac.chars().all(|c| c == '0') {
            whole.parse::<T>().ok()
        } else {
            None
        }
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "1.0" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Normalize a raw play-by-play table into chronologically ordered events.
///
/// Fails on a missing structural column (period, elapsed time, event type,
/// team identity) or on any cell that cannot be read as its column's type.
pub fn normalize(table: &PbpTable) -> EngineResult<Vec<Event>> {
    let cols = Columns::resolve(table)?;
    let mut events = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        events.push(read_event(table, &cols, row)?);
    }

    let mut events = dedupe(table, events);
    // Stable sort: rows sharing a clock second keep their logged order.
    events.sort_by_key(|e| (e.period, e.seconds_elapsed));

    debug!("normalized {} events from {} rows", events.len(), table.len());
    Ok(events)
}

fn read_event(table: &PbpTable, cols: &Columns, row: usize) -> EngineResult<Event> {
    let r = RowReader { table, row };

    let type_column = cols.event_type_label.or(cols.event_type_code).unwrap_or(cols.period);
    let event_type = match (r.text(cols.event_type_label), r.parse::<u32>(cols.event_type_code)?) {
        (Some(label), code) => EventType::from_label(&label)
            .or_else(|| code.and_then(EventType::from_code))
            .ok_or_else(|| r.error(type_column, format!("unknown event type {label:?}")))?,
        (None, Some(code)) => EventType::from_code(code).unwrap_or(EventType::Other),
        (None, None) => return Err(r.error(type_column, "required value is empty")),
    };

    let action_type = r.parse::<u32>(cols.action_type)?;
    let foul_type = if event_type == EventType::Foul {
        r.text(cols.foul_type)
            .map(|label| FoulType::from_label(&label))
            .or_else(|| action_type.map(FoulType::from_code))
    } else {
        None
    };

    let mut slots = [None, None, None];
    for (slot, sc) in slots.iter_mut().zip(&cols.slots) {
        if let Some(id) = r.id(sc.id)? {
            *slot = Some(PlayerSlot {
                id,
                team_id: r.id(sc.team_id)?,
                team_abbrev: r.text(sc.team_abbrev),
                name: r.text(sc.name),
            });
        }
    }
    let [player1, player2, player3] = slots;

    let event_team = match cols.event_team {
        Some(c) => r.id(Some(c))?,
        None => r.id(cols.slots[0].team_id)?,
    };

    let lineup = |columns: &[usize]| -> EngineResult<Vec<PlayerId>> {
        let mut ids = Vec::new();
        for &c in columns {
            if let Some(id) = r.id(Some(c))? {
                ids.push(id);
            }
        }
        Ok(ids)
    };

    Ok(Event {
        row,
        tags: GameTags {
            game_id: r.text(cols.game_id),
            game_date: r.text(cols.game_date),
            season: r.parse(cols.season)?,
            home_team_id: r.id(cols.home_team_id)?,
            away_team_id: r.id(cols.away_team_id)?,
            home_team_abbrev: r.text(cols.home_team_abbrev),
            away_team_abbrev: r.text(cols.away_team_abbrev),
        },
        period: r.required(cols.period)?,
        event_id: r.parse(cols.event_id)?,
        seconds_elapsed: r.required(cols.seconds_elapsed)?,
        event_length: r.parse(cols.event_length)?,
        event_team,
        event_type,
        action_type,
        shot_type: r.text(cols.shot_type).map(|s| ShotType::from_label(&s)),
        shot_made: r.flag(cols.shot_made)?,
        is_three: r.flag(cols.is_three)?,
        points_made: r.parse(cols.points_made)?,
        is_block: r.flag(cols.is_block)?,
        is_o_rebound: r.flag(cols.is_o_rebound)?,
        is_d_rebound: r.flag(cols.is_d_rebound)?,
        is_turnover: r.flag(cols.is_turnover)?,
        is_steal: r.flag(cols.is_steal)?,
        is_putback: r.flag(cols.is_putback)?,
        foul_type,
        home_description: r.text(cols.home_description),
        visitor_description: r.text(cols.visitor_description),
        player1,
        player2,
        player3,
        home_lineup: lineup(&cols.home_lineup)?,
        away_lineup: lineup(&cols.away_lineup)?,
    })
}

#[derive(Hash, PartialEq, Eq)]
enum RowIdentity {
    Event(Option<String>, u8, u32),
    Cells(Vec<Option<String>>),
}

/// Drop repeated rows. Rows with an event id are identified by
/// `(game_id, period, event_id)`; rows without one only by their full
/// contents. The first occurrence wins.
fn dedupe(table: &PbpTable, events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    let before = events.len();
    let kept: Vec<Event> = events
        .into_iter()
        .filter(|e| {
            let identity = match e.event_id {
                Some(id) => RowIdentity::Event(e.tags.game_id.clone(), e.period, id),
                None => RowIdentity::Cells(table.rows()[e.row].clone()),
            };
            seen.insert(identity)
        })
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        warn!("dropped {dropped} duplicate play-by-play rows");
    }
    kept
}

/// Fill in offensive/defensive for rebounds the log left unclassified,
/// using the team of the most recent missed shot or free throw.
///
/// Run after [`scrub_team_placeholders`]: a team rebound logged only as a
/// team id in the player slot has no team until then.
pub(crate) fn classify_rebounds(events: &mut [Event]) {
    let mut last_miss: Option<TeamId> = None;
    let mut classified = 0;
    for e in events.iter_mut() {
        if (e.is_field_goal_attempt() || e.is_free_throw()) && !e.is_made() {
            last_miss = e.team();
        } else if e.is_rebound() && e.is_o_rebound.is_none() && e.is_d_rebound.is_none() {
            if let (Some(team), Some(shooting)) = (e.team(), last_miss) {
                e.is_o_rebound = Some(team == shooting);
                e.is_d_rebound = Some(team != shooting);
                classified += 1;
            }
        }
    }
    if classified > 0 {
        debug!("classified {classified} rebounds from the preceding miss");
    }
}

/// Some logs put a team id in a player slot for team rebounds and team
/// turnovers. Once the two team ids are known, move those into `event_team`
/// so no team is ever counted as a player.
pub(crate) fn scrub_team_placeholders(events: &mut [Event], context: &GameContext) {
    let mut scrubbed = 0;
    for e in events.iter_mut() {
        for slot in [&mut e.player1, &mut e.player2, &mut e.player3] {
            if let Some(team) = slot.as_ref().map(|p| p.id).filter(|&id| context.is_team(id)) {
                *slot = None;
                e.event_team.get_or_insert(team);
                scrubbed += 1;
            }
        }
    }
    if scrubbed > 0 {
        debug!("moved {scrubbed} team placeholders out of player slots");
    }
}
