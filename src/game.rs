use crate::context::GameContext;
use crate::event::{Event, PlayerId, PlayerSlot, TeamId};
use crate::roster::Roster;
use serde::Serialize;
use std::collections::BTreeMap;

/// Row key of every player-scope table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PlayerKey {
    pub player_id: PlayerId,
    pub team_id: TeamId,
}

pub type PlayerTable<T> = BTreeMap<PlayerKey, T>;
pub type TeamTable<T> = BTreeMap<TeamId, T>;

/// Everything an aggregator reads: the ordered events, the resolved context,
/// and the roster. All borrowed and never mutated.
#[derive(Debug, Clone, Copy)]
pub struct GameLog<'a> {
    pub events: &'a [Event],
    pub context: &'a GameContext,
    pub roster: &'a Roster,
}

impl GameLog<'_> {
    /// Key for a player slot, or `None` for anyone not on the roster.
    pub fn key(&self, slot: &PlayerSlot) -> Option<PlayerKey> {
        self.key_of(slot.id)
    }

    pub fn key_of(&self, player_id: PlayerId) -> Option<PlayerKey> {
        let team_id = self.roster.team_of(player_id)?;
        Some(PlayerKey { player_id, team_id })
    }

    /// Team an event is credited to, if it is one of the two teams playing.
    pub fn team_of(&self, event: &Event) -> Option<TeamId> {
        event.team().filter(|&t| self.context.is_team(t))
    }

    /// Count one per event for the player `pick` selects.
    pub(crate) fn count_players<F>(&self, pick: F) -> PlayerTable<u32>
    where
        F: Fn(&Event) -> Option<&PlayerSlot>,
    {
        let mut table = PlayerTable::new();
        for slot in self.events.iter().filter_map(pick) {
            if let Some(key) = self.key(slot) {
                *table.entry(key).or_default() += 1;
            }
        }
        table
    }

    /// Count one per qualifying event for the team `pick` selects, with both
    /// teams always present.
    pub(crate) fn count_teams<F>(&self, pick: F) -> TeamTable<u32>
    where
        F: Fn(&Event) -> Option<TeamId>,
    {
        let mut table = self.empty_teams();
        for team in self.events.iter().filter_map(pick) {
            if let Some(count) = table.get_mut(&team) {
                *count += 1;
            }
        }
        table
    }

    pub(crate) fn empty_teams<T: Default>(&self) -> TeamTable<T> {
        self.context.teams().into_iter().map(|t| (t, T::default())).collect()
    }
}
