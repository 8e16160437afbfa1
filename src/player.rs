//! Player-scope category aggregators.
//!
//! Each function scans the whole log and returns a fresh table keyed by
//! `(player, team)`. A player only appears in a table when they have at
//! least one qualifying event; the composite builder fills in the zeros.

use crate::clock::format_toc;
use crate::error::{AggregationWarning, Scope};
use crate::event::Event;
use crate::game::{GameLog, PlayerTable};
use crate::lineup::{StintTotals, replay};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Shooting {
    pub fgm: u32,
    pub fga: u32,
    pub tpm: u32,
    pub tpa: u32,
    pub ftm: u32,
    pub fta: u32,
    pub points: u32,
}

impl Shooting {
    /// Fold one shot or free throw into the splits. Free throws never touch
    /// the field goal columns, so an and-one adds one FGA and one FTA.
    pub fn record(&mut self, e: &Event) {
        let made = e.is_made();
        if e.is_free_throw() {
            self.fta += 1;
            self.ftm += u32::from(made);
        } else if e.is_field_goal_attempt() {
            let three = e.is_three_attempt();
            self.fga += 1;
            self.fgm += u32::from(made);
            self.tpa += u32::from(three);
            self.tpm += u32::from(three && made);
        } else {
            return;
        }
        self.points += e.points();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rebounds {
    pub oreb: u32,
    pub dreb: u32,
}

impl Rebounds {
    pub fn record(&mut self, e: &Event) {
        if e.is_o_rebound == Some(true) {
            self.oreb += 1;
        } else if e.is_d_rebound == Some(true) {
            self.dreb += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.oreb + self.dreb
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeOnCourt {
    pub toc: u32,
    pub toc_string: String,
}

impl From<u32> for TimeOnCourt {
    fn from(toc: u32) -> Self {
        Self { toc, toc_string: format_toc(toc) }
    }
}

pub fn shooting(log: GameLog<'_>) -> PlayerTable<Shooting> {
    let mut table = PlayerTable::<Shooting>::new();
    for e in log.events {
        if let Some(key) = e.shooter().and_then(|p| log.key(p)) {
            table.entry(key).or_default().record(e);
        }
    }
    AggregationWarning::check("shooting", Scope::Player, table.values().map(|s| i64::from(s.fga + s.fta)));
    table
}

pub fn blocks(log: GameLog<'_>) -> PlayerTable<u32> {
    let table = log.count_players(Event::blocker);
    AggregationWarning::check("blk", Scope::Player, table.values().map(|&n| i64::from(n)));
    table
}

pub fn assists(log: GameLog<'_>) -> PlayerTable<u32> {
    let table = log.count_players(Event::assister);
    AggregationWarning::check("ast", Scope::Player, table.values().map(|&n| i64::from(n)));
    table
}

/// Rebounds credited to an individual. Team rebounds have no player slot
/// and never show up here.
pub fn rebounds(log: GameLog<'_>) -> PlayerTable<Rebounds> {
    let mut table = PlayerTable::<Rebounds>::new();
    for e in log.events {
        if let Some(key) = e.rebounder().and_then(|p| log.key(p)) {
            table.entry(key).or_default().record(e);
        }
    }
    AggregationWarning::check("reb", Scope::Player, table.values().map(|r| i64::from(r.total())));
    table
}

pub fn steals(log: GameLog<'_>) -> PlayerTable<u32> {
    let table = log.count_players(Event::stealer);
    AggregationWarning::check("stl", Scope::Player, table.values().map(|&n| i64::from(n)));
    table
}

pub fn turnovers(log: GameLog<'_>) -> PlayerTable<u32> {
    let table = log.count_players(|e| if e.is_turnover() { e.player1.as_ref() } else { None });
    AggregationWarning::check("tov", Scope::Player, table.values().map(|&n| i64::from(n)));
    table
}

pub fn fouls(log: GameLog<'_>) -> PlayerTable<u32> {
    let table = log.count_players(|e| if e.is_personal_foul() { e.player1.as_ref() } else { None });
    AggregationWarning::check("pf", Scope::Player, table.values().map(|&n| i64::from(n)));
    table
}

pub fn plus_minus(log: GameLog<'_>) -> PlayerTable<i64> {
    plus_minus_from(log, &replay(log))
}

pub fn time_on_court(log: GameLog<'_>) -> PlayerTable<TimeOnCourt> {
    time_on_court_from(log, &replay(log))
}

pub fn possessions(log: GameLog<'_>) -> PlayerTable<u32> {
    possessions_from(log, &replay(log))
}

pub(crate) fn plus_minus_from(log: GameLog<'_>, stints: &StintTotals) -> PlayerTable<i64> {
    stints
        .plus_minus
        .iter()
        .filter_map(|(&id, &pm)| Some((log.key_of(id)?, pm)))
        .collect()
}

pub(crate) fn time_on_court_from(log: GameLog<'_>, stints: &StintTotals) -> PlayerTable<TimeOnCourt> {
    let table: PlayerTable<TimeOnCourt> = stints
        .seconds
        .iter()
        .filter_map(|(&id, &secs)| Some((log.key_of(id)?, TimeOnCourt::from(secs))))
        .collect();
    AggregationWarning::check("toc", Scope::Player, table.values().map(|t| i64::from(t.toc)));
    table
}

pub(crate) fn possessions_from(log: GameLog<'_>, stints: &StintTotals) -> PlayerTable<u32> {
    let table: PlayerTable<u32> = stints
        .possessions
        .iter()
        .filter_map(|(&id, &n)| Some((log.key_of(id)?, n)))
        .collect();
    AggregationWarning::check("poss", Scope::Player, table.values().map(|&n| i64::from(n)));
    table
}
