//! On-court lineup replay.
//!
//! Lineups are explicit state: the set of players on the floor for each
//! team. Each period is seeded with its starters and then advanced by
//! substitutions in log order. Every event's duration is credited to the
//! players on the floor before the event's own substitution applies.

use crate::event::{Event, EventType, FoulType, PlayerId, TeamId};
use crate::game::GameLog;
use crate::possession::possession_ends;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub const LINEUP_SIZE: usize = 5;

pub type Lineup = BTreeSet<PlayerId>;

/// Per-player totals accumulated over the replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StintTotals {
    pub seconds: HashMap<PlayerId, u32>,
    pub plus_minus: HashMap<PlayerId, i64>,
    pub possessions: HashMap<PlayerId, u32>,
    /// Length of the whole replayed game.
    pub game_seconds: u32,
}

#[derive(Debug, Default)]
struct Lineups {
    on_court: BTreeMap<TeamId, Lineup>,
}

impl Lineups {
    fn of(&self, team: TeamId) -> impl Iterator<Item = PlayerId> + '_ {
        self.on_court.get(&team).into_iter().flatten().copied()
    }

    fn all(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.on_court.values().flatten().copied()
    }

    fn substitute(&mut self, team: TeamId, leaving: Option<PlayerId>, entering: Option<PlayerId>) {
        let lineup = self.on_court.entry(team).or_default();
        if let Some(out) = leaving
            && !lineup.remove(&out)
        {
            debug!("player {out} subbed out without being on the floor");
        }
        if let Some(id) = entering {
            lineup.insert(id);
        }
    }
}

/// Replay the whole game and total each player's time, plus/minus and
/// possessions on the floor.
pub fn replay(log: GameLog<'_>) -> StintTotals {
    let events = log.events;
    let mut ends = possession_ends(events, log.context).into_iter().peekable();
    let mut totals = StintTotals::default();
    let mut lineups = Lineups::default();
    let mut previous: Option<&Event> = None;

    for (index, e) in events.iter().enumerate() {
        let new_period = previous.is_none_or(|p| p.period != e.period);
        if new_period {
            lineups = period_starters(log, index);
        }

        let duration = e.event_length.unwrap_or_else(|| match previous {
            Some(p) if !new_period => e.seconds_elapsed.saturating_sub(p.seconds_elapsed),
            _ => 0,
        });
        totals.game_seconds += duration;
        for player in lineups.all() {
            *totals.seconds.entry(player).or_default() += duration;
        }

        let points = i64::from(e.points());
        if points > 0
            && let Some(team) = log.team_of(e)
            && let Some(opponent) = log.context.opponent(team)
        {
            for player in lineups.of(team) {
                *totals.plus_minus.entry(player).or_default() += points;
            }
            for player in lineups.of(opponent) {
                *totals.plus_minus.entry(player).or_default() -= points;
            }
        }

        while let Some(end) = ends.next_if(|end| end.index == index) {
            for player in lineups.of(end.team) {
                *totals.possessions.entry(player).or_default() += 1;
            }
        }

        if let Some((leaving, entering)) = e.substitution() {
            let leaving = leaving.map(|p| p.id);
            let entering = entering.map(|p| p.id);
            let team = leaving
                .or(entering)
                .and_then(|id| log.roster.team_of(id))
                .or_else(|| log.team_of(e));
            match team {
                Some(team) => lineups.substitute(team, leaving, entering),
                None => warn!("substitution at row {} has no team; ignored", e.row),
            }
        }

        previous = Some(e);
    }
    totals
}

/// The lineups at the start of the period that begins at `start`.
///
/// Explicit lineup columns on the period's first row win. Otherwise a
/// starter is anyone who shows up in the period before being subbed in,
/// or whose first appearance is being subbed out.
fn period_starters(log: GameLog<'_>, start: usize) -> Lineups {
    let events = log.events;
    let first = &events[start];
    let mut lineups = Lineups::default();

    if !first.home_lineup.is_empty() || !first.away_lineup.is_empty() {
        let home = first.home_lineup.iter().copied().collect();
        let away = first.away_lineup.iter().copied().collect();
        lineups.on_court.insert(log.context.home_team_id, home);
        lineups.on_court.insert(log.context.away_team_id, away);
        return lineups;
    }

    let mut seen: HashSet<PlayerId> = HashSet::new();
    let add = |lineups: &mut Lineups, player: PlayerId| {
        if let Some(team) = log.roster.team_of(player) {
            let lineup = lineups.on_court.entry(team).or_default();
            if lineup.len() < LINEUP_SIZE {
                lineup.insert(player);
            }
        }
    };

    for e in events[start..].iter().take_while(|e| e.period == first.period) {
        if let Some((leaving, entering)) = e.substitution() {
            if let Some(out) = leaving
                && seen.insert(out.id)
            {
                add(&mut lineups, out.id);
            }
            if let Some(id) = entering {
                seen.insert(id.id);
            }
            continue;
        }
        if !involves_players_on_court(e) {
            continue;
        }
        for p in e.players() {
            if seen.insert(p.id) {
                add(&mut lineups, p.id);
            }
        }
    }

    for (team, lineup) in &lineups.on_court {
        if lineup.len() < LINEUP_SIZE {
            debug!(
                "period {}: only {} starters inferred for team {team}",
                first.period,
                lineup.len()
            );
        }
    }
    lineups
}

/// Technicals and ejections can name players sitting on the bench.
fn involves_players_on_court(e: &Event) -> bool {
    match e.event_type {
        EventType::Ejection | EventType::Timeout | EventType::PeriodStart | EventType::PeriodEnd => false,
        EventType::Foul => !matches!(
            e.foul_type,
            Some(FoulType::Technical | FoulType::DoubleTechnical)
        ),
        _ => true,
    }
}
