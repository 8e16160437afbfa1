//! Box scores derived from a single game's play-by-play log.
//!
//! ```no_run
//! use boxscore::PlayByPlay;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let table = nba_stats_api::read_csv(Path::new("0020700233.csv"))?;
//! let game = PlayByPlay::new(&table)?;
//! for row in game.playerbygamestats() {
//!     println!("{} {} pts {}", row.player_id, row.points, row.toc_string);
//! }
//! # Ok(())
//! # }
//! ```

pub mod boxscore;
pub mod clock;
pub mod context;
pub mod error;
pub mod event;
pub mod game;
pub mod lineup;
pub mod normalize;
pub mod player;
pub mod possession;
pub mod roster;
pub mod settings;
pub mod team;

pub use crate::boxscore::{PlayerGameStats, TeamGameStats};
pub use crate::context::{GameContext, resolve_game_context};
pub use crate::error::{AggregationWarning, EngineError, EngineResult, Scope};
pub use crate::event::{Event, EventType, PlayerId, TeamId};
pub use crate::game::{GameLog, PlayerKey, PlayerTable, TeamTable};
pub use crate::roster::Roster;

use crate::player::{Rebounds, Shooting, TimeOnCourt};
use chrono::NaiveDate;
use log::debug;
use nba_stats_api::PbpTable;

/// One game's play-by-play, normalized, with its context and roster
/// resolved. Immutable after construction; every aggregator call is a fresh
/// scan over the same events.
#[derive(Debug, Clone)]
pub struct PlayByPlay {
    events: Vec<Event>,
    context: GameContext,
    roster: Roster,
}

impl PlayByPlay {
    pub fn new(table: &PbpTable) -> EngineResult<Self> {
        let mut events = normalize::normalize(table)?;
        let context = resolve_game_context(&events)?;
        normalize::scrub_team_placeholders(&mut events, &context);
        normalize::classify_rebounds(&mut events);
        let roster = Roster::build(&events, &context);
        debug!(
            "game {}: {} events, {} players",
            context.game_id,
            events.len(),
            roster.len()
        );
        Ok(Self { events, context, roster })
    }

    pub fn log(&self) -> GameLog<'_> {
        GameLog {
            events: &self.events,
            context: &self.context,
            roster: &self.roster,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn context(&self) -> &GameContext {
        &self.context
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn home_team(&self) -> &str {
        &self.context.home_team_abbrev
    }

    pub fn away_team(&self) -> &str {
        &self.context.away_team_abbrev
    }

    pub fn home_team_id(&self) -> TeamId {
        self.context.home_team_id
    }

    pub fn away_team_id(&self) -> TeamId {
        self.context.away_team_id
    }

    pub fn game_id(&self) -> &str {
        &self.context.game_id
    }

    pub fn game_date(&self) -> NaiveDate {
        self.context.game_date
    }

    pub fn season(&self) -> i32 {
        self.context.season
    }

    // Player scope.

    pub fn player_shooting(&self) -> PlayerTable<Shooting> {
        player::shooting(self.log())
    }

    pub fn player_blocks(&self) -> PlayerTable<u32> {
        player::blocks(self.log())
    }

    pub fn player_assists(&self) -> PlayerTable<u32> {
        player::assists(self.log())
    }

    pub fn player_rebounds(&self) -> PlayerTable<Rebounds> {
        player::rebounds(self.log())
    }

    pub fn player_steals(&self) -> PlayerTable<u32> {
        player::steals(self.log())
    }

    pub fn player_turnovers(&self) -> PlayerTable<u32> {
        player::turnovers(self.log())
    }

    pub fn player_fouls(&self) -> PlayerTable<u32> {
        player::fouls(self.log())
    }

    pub fn player_plus_minus(&self) -> PlayerTable<i64> {
        player::plus_minus(self.log())
    }

    pub fn player_time_on_court(&self) -> PlayerTable<TimeOnCourt> {
        player::time_on_court(self.log())
    }

    pub fn player_possessions(&self) -> PlayerTable<u32> {
        player::possessions(self.log())
    }

    // Team scope.

    pub fn team_shooting(&self) -> TeamTable<Shooting> {
        team::shooting(self.log())
    }

    pub fn team_blocks(&self) -> TeamTable<u32> {
        team::blocks(self.log())
    }

    pub fn team_assists(&self) -> TeamTable<u32> {
        team::assists(self.log())
    }

    pub fn team_rebounds(&self) -> TeamTable<Rebounds> {
        team::rebounds(self.log())
    }

    pub fn team_steals(&self) -> TeamTable<u32> {
        team::steals(self.log())
    }

    pub fn team_turnovers(&self) -> TeamTable<u32> {
        team::turnovers(self.log())
    }

    pub fn team_fouls(&self) -> TeamTable<u32> {
        team::fouls(self.log())
    }

    pub fn team_plus_minus(&self) -> TeamTable<i64> {
        team::plus_minus(self.log())
    }

    pub fn team_time_on_court(&self) -> TeamTable<TimeOnCourt> {
        team::time_on_court(self.log())
    }

    pub fn team_possessions(&self) -> TeamTable<u32> {
        team::possessions(self.log())
    }

    // Composites.

    /// Every category for every player who appears in the log.
    pub fn playerbygamestats(&self) -> Vec<PlayerGameStats> {
        boxscore::player_game_stats(self.log())
    }

    /// Every category for both teams, home first.
    pub fn teambygamestats(&self) -> Vec<TeamGameStats> {
        boxscore::team_game_stats(self.log())
    }
}
