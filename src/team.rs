//! Team-scope category aggregators.
//!
//! Counted straight from the events rather than summed from player tables,
//! so team-credited rows (team rebounds, team turnovers) are included. Both
//! teams are always present, zeroed when they have nothing in a category.

use crate::error::{AggregationWarning, Scope};
use crate::event::{PlayerSlot, TeamId};
use crate::game::{GameLog, TeamTable};
use crate::lineup::replay;
use crate::player::{Rebounds, Shooting, TimeOnCourt};
use crate::possession::{count_by_team, possession_ends};

/// Team of a credited player: the roster's answer, else the slot's own.
fn team_of_player(log: &GameLog<'_>, slot: &PlayerSlot) -> Option<TeamId> {
    log.roster
        .team_of(slot.id)
        .or(slot.team_id)
        .filter(|&t| log.context.is_team(t))
}

fn warn_if_empty(category: &'static str, table: &TeamTable<u32>) {
    AggregationWarning::check(category, Scope::Team, table.values().map(|&n| i64::from(n)));
}

pub fn shooting(log: GameLog<'_>) -> TeamTable<Shooting> {
    let mut table = log.empty_teams::<Shooting>();
    for e in log.events {
        if !(e.is_field_goal_attempt() || e.is_free_throw()) {
            continue;
        }
        if let Some(s) = log.team_of(e).and_then(|t| table.get_mut(&t)) {
            s.record(e);
        }
    }
    AggregationWarning::check("shooting", Scope::Team, table.values().map(|s| i64::from(s.fga + s.fta)));
    table
}

pub fn blocks(log: GameLog<'_>) -> TeamTable<u32> {
    let table = log.count_teams(|e| e.blocker().and_then(|p| team_of_player(&log, p)));
    warn_if_empty("blk", &table);
    table
}

pub fn assists(log: GameLog<'_>) -> TeamTable<u32> {
    let table = log.count_teams(|e| e.assister().and_then(|p| team_of_player(&log, p)));
    warn_if_empty("ast", &table);
    table
}

/// Includes team rebounds, which no player is credited with.
pub fn rebounds(log: GameLog<'_>) -> TeamTable<Rebounds> {
    let mut table = log.empty_teams::<Rebounds>();
    for e in log.events.iter().filter(|e| e.is_rebound()) {
        if let Some(r) = log.team_of(e).and_then(|t| table.get_mut(&t)) {
            r.record(e);
        }
    }
    AggregationWarning::check("reb", Scope::Team, table.values().map(|r| i64::from(r.total())));
    table
}

pub fn steals(log: GameLog<'_>) -> TeamTable<u32> {
    let table = log.count_teams(|e| e.stealer().and_then(|p| team_of_player(&log, p)));
    warn_if_empty("stl", &table);
    table
}

/// Includes team turnovers (shot clock, eight seconds and the like).
pub fn turnovers(log: GameLog<'_>) -> TeamTable<u32> {
    let table = log.count_teams(|e| if e.is_turnover() { log.team_of(e) } else { None });
    warn_if_empty("tov", &table);
    table
}

pub fn fouls(log: GameLog<'_>) -> TeamTable<u32> {
    let table = log.count_teams(|e| if e.is_personal_foul() { log.team_of(e) } else { None });
    warn_if_empty("pf", &table);
    table
}

/// Points scored minus points allowed. The two teams always negate.
pub fn plus_minus(log: GameLog<'_>) -> TeamTable<i64> {
    let points = shooting(log);
    let scored = |team: TeamId| points.get(&team).map_or(0, |s| i64::from(s.points));
    log.context
        .teams()
        .into_iter()
        .map(|team| {
            let against = log.context.opponent(team).map_or(0, scored);
            (team, scored(team) - against)
        })
        .collect()
}

/// Game length covered by the replay, the same for both teams.
pub fn time_on_court(log: GameLog<'_>) -> TeamTable<TimeOnCourt> {
    let seconds = replay(log).game_seconds;
    let table: TeamTable<TimeOnCourt> = log
        .context
        .teams()
        .into_iter()
        .map(|team| (team, TimeOnCourt::from(seconds)))
        .collect();
    AggregationWarning::check("toc", Scope::Team, [i64::from(seconds)]);
    table
}

pub fn possessions(log: GameLog<'_>) -> TeamTable<u32> {
    let ends = possession_ends(log.events, log.context);
    let count = count_by_team(&ends);
    let table: TeamTable<u32> = log.context.teams().into_iter().map(|t| (t, count(t))).collect();
    warn_if_empty("poss", &table);
    table
}
