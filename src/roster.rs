//! Player → team assignment for one game.
//!
//! Every player gets exactly one team, chosen once, so that every category
//! table keys a player the same way and joins never split or drop a row.

use crate::context::GameContext;
use crate::event::{Event, EventType, PlayerId, TeamId};
use log::warn;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub team_id: TeamId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: BTreeMap<PlayerId, RosterEntry>,
}

#[derive(Default)]
struct Tally {
    name: Option<String>,
    /// team → (rows crediting the player to it, first row that did)
    teams: HashMap<TeamId, (usize, usize)>,
}

impl Roster {
    /// Assign each player the team most rows credit them to. Ties go to the
    /// team seen first. When a slot carries no team of its own, the slot's
    /// role in the event decides: the acting team for the actor, an assister
    /// or a player subbing in, and the other team for a stealer, a fouled
    /// player or a blocker. Lineup columns count as well.
    ///
    /// A player no row ties to either team (a jump ball recipient with no
    /// team column, say) is left off the roster with a warning, and so has
    /// no row in any player table.
    pub fn build(events: &[Event], context: &GameContext) -> Self {
        let mut tallies: HashMap<PlayerId, Tally> = HashMap::new();
        let mut order = 0usize;
        let mut note = |id: PlayerId, team: Option<TeamId>, name: Option<&String>| {
            if context.is_team(id) {
                return;
            }
            order += 1;
            let tally = tallies.entry(id).or_default();
            if tally.name.is_none() {
                tally.name = name.cloned();
            }
            if let Some(team) = team.filter(|&t| context.is_team(t)) {
                tally.teams.entry(team).or_insert((0, order)).0 += 1;
            }
        };

        for e in events {
            let acting_team = e.team();
            if let Some(p) = &e.player1 {
                note(p.id, p.team_id.or(acting_team), p.name.as_ref());
            }
            if let Some(p) = &e.player2 {
                let fallback = second_slot_team(e, acting_team, context);
                note(p.id, p.team_id.or(fallback), p.name.as_ref());
            }
            if let Some(p) = &e.player3 {
                let fallback = third_slot_team(e, acting_team, context);
                note(p.id, p.team_id.or(fallback), p.name.as_ref());
            }
            for &id in &e.home_lineup {
                note(id, Some(context.home_team_id), None);
            }
            for &id in &e.away_lineup {
                note(id, Some(context.away_team_id), None);
            }
        }

        let mut players = BTreeMap::new();
        for (id, tally) in tallies {
            let team = tally
                .teams
                .iter()
                .max_by_key(|&(_, &(count, first))| (count, std::cmp::Reverse(first)))
                .map(|(&team, _)| team);
            match team {
                Some(team_id) => {
                    players.insert(id, RosterEntry { team_id, name: tally.name });
                }
                None => warn!("player {id} is never credited to either team; skipping"),
            }
        }
        Self { players }
    }

    pub fn team_of(&self, player: PlayerId) -> Option<TeamId> {
        self.players.get(&player).map(|p| p.team_id)
    }

    pub fn name_of(&self, player: PlayerId) -> Option<&str> {
        self.players.get(&player)?.name.as_deref()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// `(player, team)` for every rostered player, ordered by player id.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, TeamId)> + '_ {
        self.players.iter().map(|(&id, entry)| (id, entry.team_id))
    }

    pub fn on_team(&self, team: TeamId) -> impl Iterator<Item = PlayerId> + '_ {
        self.iter().filter(move |&(_, t)| t == team).map(|(id, _)| id)
    }
}

/// Team implied for slot 2 by the event type, relative to the acting team.
fn second_slot_team(e: &Event, acting: Option<TeamId>, context: &GameContext) -> Option<TeamId> {
    let acting = acting?;
    match e.event_type {
        EventType::ShotMade | EventType::Substitution => Some(acting),
        EventType::Turnover | EventType::Foul | EventType::JumpBall => context.opponent(acting),
        _ => None,
    }
}

/// Team implied for slot 3: only a blocker's team can be told from the event.
fn third_slot_team(e: &Event, acting: Option<TeamId>, context: &GameContext) -> Option<TeamId> {
    if e.event_type == EventType::ShotMissed {
        context.opponent(acting?)
    } else {
        None
    }
}
