//! Composite box scores: every category joined into one row per player or
//! team, with context columns attached.

use crate::clock::format_toc;
use crate::event::{PlayerId, TeamId};
use crate::game::{GameLog, PlayerKey, PlayerTable, TeamTable};
use crate::lineup::replay;
use crate::{player, team};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerGameStats {
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    pub team_id: TeamId,
    pub team_abbrev: String,
    pub game_id: String,
    pub game_date: NaiveDate,
    pub season: i32,
    pub fgm: u32,
    pub fga: u32,
    pub tpm: u32,
    pub tpa: u32,
    pub ftm: u32,
    pub fta: u32,
    pub points: u32,
    pub oreb: u32,
    pub dreb: u32,
    pub ast: u32,
    pub blk: u32,
    pub stl: u32,
    pub tov: u32,
    pub pf: u32,
    pub plus_minus: i64,
    pub toc: u32,
    pub toc_string: String,
    pub poss: u32,
    pub opponent: TeamId,
    pub opponent_abbrev: String,
    pub is_home: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamGameStats {
    pub team_id: TeamId,
    pub team_abbrev: String,
    pub game_id: String,
    pub game_date: NaiveDate,
    pub season: i32,
    pub is_home: u8,
    pub fgm: u32,
    pub fga: u32,
    pub tpm: u32,
    pub tpa: u32,
    pub ftm: u32,
    pub fta: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub oreb: u32,
    pub dreb: u32,
    pub ast: u32,
    pub blk: u32,
    pub stl: u32,
    pub tov: u32,
    pub pf: u32,
    pub plus_minus: i64,
    pub toc: u32,
    pub toc_string: String,
    pub poss: u32,
    pub opponent: TeamId,
    pub opponent_abbrev: String,
}

/// One row per rostered player, ordered by team (home first) then player id.
pub fn player_game_stats(log: GameLog<'_>) -> Vec<PlayerGameStats> {
    let ctx = log.context;
    let stints = replay(log);

    let shooting = player::shooting(log);
    let rebounds = player::rebounds(log);
    let assists = player::assists(log);
    let blocks = player::blocks(log);
    let steals = player::steals(log);
    let turnovers = player::turnovers(log);
    let fouls = player::fouls(log);
    let plus_minus = player::plus_minus_from(log, &stints);
    let toc = player::time_on_court_from(log, &stints);
    let poss = player::possessions_from(log, &stints);

    let mut rows: Vec<PlayerGameStats> = log
        .roster
        .iter()
        .map(|(player_id, team_id)| {
            let key = PlayerKey { player_id, team_id };
            let s = shooting.get(&key).copied().unwrap_or_default();
            let r = rebounds.get(&key).copied().unwrap_or_default();
            let count = |table: &PlayerTable<u32>| table.get(&key).copied().unwrap_or(0);
            let seconds = toc.get(&key).map_or(0, |t| t.toc);
            let opponent = ctx.opponent(team_id).unwrap_or_default();

            PlayerGameStats {
                player_id,
                player_name: log.roster.name_of(player_id).map(str::to_owned),
                team_id,
                team_abbrev: ctx.abbrev(team_id).unwrap_or_default().to_owned(),
                game_id: ctx.game_id.clone(),
                game_date: ctx.game_date,
                season: ctx.season,
                fgm: s.fgm,
                fga: s.fga,
                tpm: s.tpm,
                tpa: s.tpa,
                ftm: s.ftm,
                fta: s.fta,
                points: s.points,
                oreb: r.oreb,
                dreb: r.dreb,
                ast: count(&assists),
                blk: count(&blocks),
                stl: count(&steals),
                tov: count(&turnovers),
                pf: count(&fouls),
                plus_minus: plus_minus.get(&key).copied().unwrap_or(0),
                toc: seconds,
                toc_string: format_toc(seconds),
                poss: count(&poss),
                opponent,
                opponent_abbrev: ctx.abbrev(opponent).unwrap_or_default().to_owned(),
                is_home: u8::from(ctx.is_home(team_id)),
            }
        })
        .collect();

    rows.sort_by_key(|r| (r.is_home == 0, r.player_id));
    debug!("built {} player rows for game {}", rows.len(), ctx.game_id);
    rows
}

/// Home team first, then away.
pub fn team_game_stats(log: GameLog<'_>) -> Vec<TeamGameStats> {
    let ctx = log.context;
    let shooting = team::shooting(log);
    let rebounds = team::rebounds(log);
    let assists = team::assists(log);
    let blocks = team::blocks(log);
    let steals = team::steals(log);
    let turnovers = team::turnovers(log);
    let fouls = team::fouls(log);
    let plus_minus = team::plus_minus(log);
    let toc = team::time_on_court(log);
    let poss = team::possessions(log);

    ctx.teams()
        .into_iter()
        .map(|team_id| {
            let opponent = ctx.opponent(team_id).unwrap_or_default();
            let s = shooting.get(&team_id).copied().unwrap_or_default();
            let against = shooting.get(&opponent).map_or(0, |o| o.points);
            let r = rebounds.get(&team_id).copied().unwrap_or_default();
            let count = |table: &TeamTable<u32>| table.get(&team_id).copied().unwrap_or(0);
            let seconds = toc.get(&team_id).map_or(0, |t| t.toc);

            TeamGameStats {
                team_id,
                team_abbrev: ctx.abbrev(team_id).unwrap_or_default().to_owned(),
                game_id: ctx.game_id.clone(),
                game_date: ctx.game_date,
                season: ctx.season,
                is_home: u8::from(ctx.is_home(team_id)),
                fgm: s.fgm,
                fga: s.fga,
                tpm: s.tpm,
                tpa: s.tpa,
                ftm: s.ftm,
                fta: s.fta,
                points_for: s.points,
                points_against: against,
                oreb: r.oreb,
                dreb: r.dreb,
                ast: count(&assists),
                blk: count(&blocks),
                stl: count(&steals),
                tov: count(&turnovers),
                pf: count(&fouls),
                plus_minus: plus_minus.get(&team_id).copied().unwrap_or(0),
                toc: seconds,
                toc_string: format_toc(seconds),
                poss: count(&poss),
                opponent,
                opponent_abbrev: ctx.abbrev(opponent).unwrap_or_default().to_owned(),
            }
        })
        .collect()
}
