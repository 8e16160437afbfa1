use crate::error::{EngineError, EngineResult};
use crate::event::{Event, EventType, PlayerSlot, TeamId};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Who is playing, and when. Resolved once per game and only read after that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameContext {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub season: i32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_team_abbrev: String,
    pub away_team_abbrev: String,
}

impl GameContext {
    pub fn teams(&self) -> [TeamId; 2] {
        [self.home_team_id, self.away_team_id]
    }

    pub fn is_home(&self, team: TeamId) -> bool {
        team == self.home_team_id
    }

    pub fn is_team(&self, id: u64) -> bool {
        id == self.home_team_id || id == self.away_team_id
    }

    /// The other team, or `None` if `team` is not playing in this game.
    pub fn opponent(&self, team: TeamId) -> Option<TeamId> {
        if team == self.home_team_id {
            Some(self.away_team_id)
        } else if team == self.away_team_id {
            Some(self.home_team_id)
        } else {
            None
        }
    }

    pub fn abbrev(&self, team: TeamId) -> Option<&str> {
        if team == self.home_team_id {
            Some(&self.home_team_abbrev)
        } else if team == self.away_team_id {
            Some(&self.away_team_abbrev)
        } else {
            None
        }
    }
}

struct TeamRoles {
    home: TeamId,
    away: TeamId,
    home_abbrev: Option<String>,
    away_abbrev: Option<String>,
}

/// Build the game context from the event log.
///
/// Team roles come from the explicit `home_team_*`/`away_team_*` columns when
/// any row carries them. Otherwise the opening jump ball decides: when its
/// home-side description is present, the slot 1 jumper's team is home.
/// Game id, date and season must come from the rows (season may also be
/// derived from the game id).
pub fn resolve_game_context(events: &[Event]) -> EngineResult<GameContext> {
    let roles = match explicit_roles(events) {
        Some(roles) => roles,
        None => jump_ball_roles(events)?,
    };

    let game_id = events
        .iter()
        .find_map(|e| e.tags.game_id.clone())
        .ok_or_else(|| EngineError::MissingContext("no game_id on any row".into()))?;

    let game_date = events
        .iter()
        .filter_map(|e| e.tags.game_date.as_deref())
        .find_map(parse_date)
        .ok_or_else(|| EngineError::MissingContext(format!("no readable game_date for {game_id}")))?;

    let season = events
        .iter()
        .find_map(|e| e.tags.season)
        .or_else(|| nba_stats_api::season_from_game_id(&game_id))
        .ok_or_else(|| EngineError::MissingContext(format!("no season for {game_id}")))?;

    let home_team_abbrev = roles
        .home_abbrev
        .or_else(|| abbrev_from_slots(events, roles.home))
        .ok_or_else(|| EngineError::MissingContext(format!("no abbreviation for team {}", roles.home)))?;
    let away_team_abbrev = roles
        .away_abbrev
        .or_else(|| abbrev_from_slots(events, roles.away))
        .ok_or_else(|| EngineError::MissingContext(format!("no abbreviation for team {}", roles.away)))?;

    debug!("game {game_id}: {away_team_abbrev} ({}) at {home_team_abbrev} ({})", roles.away, roles.home);

    Ok(GameContext {
        game_id,
        game_date,
        season,
        home_team_id: roles.home,
        away_team_id: roles.away,
        home_team_abbrev,
        away_team_abbrev,
    })
}

fn explicit_roles(events: &[Event]) -> Option<TeamRoles> {
    let tags = events
        .iter()
        .map(|e| &e.tags)
        .find(|t| t.home_team_id.is_some() && t.away_team_id.is_some())?;
    Some(TeamRoles {
        home: tags.home_team_id?,
        away: tags.away_team_id?,
        home_abbrev: events.iter().find_map(|e| e.tags.home_team_abbrev.clone()),
        away_abbrev: events.iter().find_map(|e| e.tags.away_team_abbrev.clone()),
    })
}

fn jump_ball_roles(events: &[Event]) -> EngineResult<TeamRoles> {
    let jump = events
        .iter()
        .find(|e| e.event_type == EventType::JumpBall)
        .ok_or_else(|| EngineError::MissingContext("no team-role columns and no jump ball".into()))?;

    let team = |slot: &Option<PlayerSlot>| slot.as_ref().and_then(|p| p.team_id);
    let abbrev = |slot: &Option<PlayerSlot>| slot.as_ref().and_then(|p| p.team_abbrev.clone());

    let (home_slot, away_slot) = if jump.home_description.is_some() {
        (&jump.player1, &jump.player2)
    } else {
        (&jump.player2, &jump.player1)
    };

    match (team(home_slot), team(away_slot)) {
        (Some(home), Some(away)) if home != away => Ok(TeamRoles {
            home,
            away,
            home_abbrev: abbrev(home_slot),
            away_abbrev: abbrev(away_slot),
        }),
        _ => Err(EngineError::MissingContext(format!(
            "jump ball at row {} does not name two teams",
            jump.row
        ))),
    }
}

fn abbrev_from_slots(events: &[Event], team: TeamId) -> Option<String> {
    events
        .iter()
        .flat_map(Event::players)
        .filter(|p| p.team_id == Some(team))
        .find_map(|p| p.team_abbrev.clone())
}

/// Accepts `2007-11-30`, optionally followed by a time (`T00:00:00` or ` 00:00:00`).
fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = value.split(['T', ' ']).next()?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures::{AWAY, HOME, event, slot};

    fn tagged(mut e: Event) -> Event {
        e.tags.game_id = Some("0020700233".into());
        e.tags.game_date = Some("2007-11-30T00:00:00".into());
        e
    }

    fn jump_ball(home_side: bool) -> Event {
        let mut jump = tagged(event(EventType::JumpBall, 0));
        jump.player1 = slot(1, AWAY);
        jump.player2 = slot(2, HOME);
        if let Some(p) = jump.player1.as_mut() {
            p.team_abbrev = Some("LAC".into());
        }
        if let Some(p) = jump.player2.as_mut() {
            p.team_abbrev = Some("DEN".into());
        }
        if home_side {
            jump.home_description = Some("Jump Ball Kaman vs. Camby".into());
        } else {
            jump.visitor_description = Some("Jump Ball Kaman vs. Camby".into());
        }
        jump
    }

    #[test]
    fn explicit_columns_win_over_jump_ball() {
        let mut first = tagged(event(EventType::PeriodStart, 0));
        first.tags.home_team_id = Some(HOME);
        first.tags.away_team_id = Some(AWAY);
        first.tags.home_team_abbrev = Some("DEN".into());
        first.tags.away_team_abbrev = Some("LAC".into());
        first.tags.season = Some(2008);

        let ctx = resolve_game_context(&[first, jump_ball(true)]).expect("context");
        assert_eq!(ctx.home_team_id, HOME);
        assert_eq!(ctx.away_team_abbrev, "LAC");
        assert_eq!(ctx.game_date, NaiveDate::from_ymd_opt(2007, 11, 30).unwrap());
        assert_eq!(ctx.season, 2008);
    }

    #[test]
    fn jump_ball_description_decides_home() {
        let ctx = resolve_game_context(&[jump_ball(true)]).expect("context");
        assert_eq!((ctx.home_team_id, ctx.away_team_id), (AWAY, HOME));
        assert_eq!(ctx.home_team_abbrev, "LAC");

        let ctx = resolve_game_context(&[jump_ball(false)]).expect("context");
        assert_eq!((ctx.home_team_id, ctx.away_team_id), (HOME, AWAY));
        assert_eq!(ctx.home_team_abbrev, "DEN");
        // Season falls back to the game id.
        assert_eq!(ctx.season, 2008);
    }

    #[test]
    fn no_roles_and_no_jump_ball_is_missing_context() {
        let shot = tagged(event(EventType::ShotMade, 10));
        assert!(matches!(
            resolve_game_context(&[shot]),
            Err(EngineError::MissingContext(_))
        ));
    }

    #[test]
    fn opponent_and_abbrev_lookups() {
        let ctx = resolve_game_context(&[jump_ball(false)]).expect("context");
        assert_eq!(ctx.opponent(HOME), Some(AWAY));
        assert_eq!(ctx.opponent(AWAY), Some(HOME));
        assert_eq!(ctx.opponent(42), None);
        assert_eq!(ctx.abbrev(AWAY), Some("LAC"));
        assert!(ctx.is_home(HOME));
    }
}
