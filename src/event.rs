//! Typed play-by-play events.
//!
//! One [`Event`] per row of the normalized log. Optional columns stay
//! `Option` all the way through so an aggregator can tell "not recorded"
//! from "recorded as zero".

use serde::Serialize;

pub type PlayerId = u64;
pub type TeamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ShotMade,
    ShotMissed,
    FreeThrow,
    Rebound,
    Turnover,
    Foul,
    Violation,
    Substitution,
    Timeout,
    JumpBall,
    Ejection,
    PeriodStart,
    PeriodEnd,
    InstantReplay,
    Other,
}

impl EventType {
    /// Parse a textual event label (`event_type_de` style).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase().replace([' ', '_'], "-");
        let kind = match label.as_str() {
            "shot" | "made-shot" | "shot-made" | "field-goal-made" => EventType::ShotMade,
            "missed-shot" | "shot-missed" | "miss" | "field-goal-missed" => EventType::ShotMissed,
            "free-throw" | "freethrow" => EventType::FreeThrow,
            "rebound" => EventType::Rebound,
            "turnover" => EventType::Turnover,
            "foul" => EventType::Foul,
            "violation" => EventType::Violation,
            "substitution" | "sub" => EventType::Substitution,
            "timeout" => EventType::Timeout,
            "jump-ball" | "jumpball" => EventType::JumpBall,
            "ejection" => EventType::Ejection,
            "period-start" | "start-period" | "start-of-period" => EventType::PeriodStart,
            "period-end" | "end-period" | "end-of-period" => EventType::PeriodEnd,
            "instant-replay" | "replay" => EventType::InstantReplay,
            "unknown" | "other" => EventType::Other,
            _ => return None,
        };
        Some(kind)
    }

    /// Map a numeric `eventmsgtype` code.
    pub fn from_code(code: u32) -> Option<Self> {
        let kind = match code {
            1 => EventType::ShotMade,
            2 => EventType::ShotMissed,
            3 => EventType::FreeThrow,
            4 => EventType::Rebound,
            5 => EventType::Turnover,
            6 => EventType::Foul,
            7 => EventType::Violation,
            8 => EventType::Substitution,
            9 => EventType::Timeout,
            10 => EventType::JumpBall,
            11 => EventType::Ejection,
            12 => EventType::PeriodStart,
            13 => EventType::PeriodEnd,
            18 => EventType::InstantReplay,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_field_goal(self) -> bool {
        matches!(self, EventType::ShotMade | EventType::ShotMissed)
    }
}

/// Shot class, when the log records one separately from the event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    FieldGoal,
    ThreePoint,
    FreeThrow,
}

impl ShotType {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("free") || label == "ft" {
            ShotType::FreeThrow
        } else if label.contains("3pt") || label.contains("three") || label == "3" {
            ShotType::ThreePoint
        } else {
            ShotType::FieldGoal
        }
    }
}

/// Foul subtype. Only some of these count toward a player's personal fouls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulType {
    Personal,
    Shooting,
    LooseBall,
    Offensive,
    Inbound,
    AwayFromPlay,
    Punching,
    ClearPath,
    DoublePersonal,
    Flagrant1,
    Flagrant2,
    OffensiveCharge,
    PersonalBlock,
    PersonalTake,
    ShootingBlock,
    TransitionTake,
    Technical,
    DoubleTechnical,
    DefensiveThreeSeconds,
    Other,
}

impl FoulType {
    /// Map a foul's `eventmsgactiontype` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => FoulType::Personal,
            2 => FoulType::Shooting,
            3 => FoulType::LooseBall,
            4 => FoulType::Offensive,
            5 => FoulType::Inbound,
            6 => FoulType::AwayFromPlay,
            8 => FoulType::Punching,
            9 => FoulType::ClearPath,
            10 => FoulType::DoublePersonal,
            11 | 12 | 13 | 18 | 19 | 25 | 30 => FoulType::Technical,
            14 => FoulType::Flagrant1,
            15 => FoulType::Flagrant2,
            16 => FoulType::DoubleTechnical,
            17 => FoulType::DefensiveThreeSeconds,
            26 => FoulType::OffensiveCharge,
            27 => FoulType::PersonalBlock,
            28 => FoulType::PersonalTake,
            29 => FoulType::ShootingBlock,
            31 => FoulType::TransitionTake,
            _ => FoulType::Other,
        }
    }

    /// Parse a textual foul label, or a numeric code written as text.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase().replace([' ', '-', '.'], "_");
        if let Ok(code) = label.parse::<u32>() {
            return FoulType::from_code(code);
        }
        match label.as_str() {
            "personal" | "p" => FoulType::Personal,
            "shooting" | "s" => FoulType::Shooting,
            "loose_ball" => FoulType::LooseBall,
            "offensive" => FoulType::Offensive,
            "inbound" => FoulType::Inbound,
            "away_from_play" => FoulType::AwayFromPlay,
            "punching" => FoulType::Punching,
            "clear_path" => FoulType::ClearPath,
            "double_personal" => FoulType::DoublePersonal,
            "flagrant_1" | "flagrant_type_1" => FoulType::Flagrant1,
            "flagrant_2" | "flagrant_type_2" => FoulType::Flagrant2,
            "offensive_charge" | "charge" => FoulType::OffensiveCharge,
            "personal_block" => FoulType::PersonalBlock,
            "personal_take" => FoulType::PersonalTake,
            "shooting_block" => FoulType::ShootingBlock,
            "transition_take" => FoulType::TransitionTake,
            "double_technical" => FoulType::DoubleTechnical,
            "defensive_3_seconds" | "defense_3_second" => FoulType::DefensiveThreeSeconds,
            other if other.contains("technical") => FoulType::Technical,
            _ => FoulType::Other,
        }
    }

    /// Whether this foul is charged against the player's personal foul total.
    /// Technicals, defensive three seconds and unrecognised subtypes are not.
    pub fn counts_as_personal(self) -> bool {
        !matches!(
            self,
            FoulType::Technical
                | FoulType::DoubleTechnical
                | FoulType::DefensiveThreeSeconds
                | FoulType::Other
        )
    }
}

/// A player referenced by an event, with the team the row credits them to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSlot {
    pub id: PlayerId,
    pub team_id: Option<TeamId>,
    pub team_abbrev: Option<String>,
    pub name: Option<String>,
}

/// Game-level columns denormalized onto every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameTags {
    pub game_id: Option<String>,
    pub game_date: Option<String>,
    pub season: Option<i32>,
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub home_team_abbrev: Option<String>,
    pub away_team_abbrev: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Position of the row in the source table.
    pub row: usize,
    pub tags: GameTags,
    pub period: u8,
    pub event_id: Option<u32>,
    pub seconds_elapsed: u32,
    pub event_length: Option<u32>,
    pub event_team: Option<TeamId>,
    pub event_type: EventType,
    pub action_type: Option<u32>,
    pub shot_type: Option<ShotType>,
    pub shot_made: Option<bool>,
    pub is_three: Option<bool>,
    pub points_made: Option<u8>,
    pub is_block: Option<bool>,
    pub is_o_rebound: Option<bool>,
    pub is_d_rebound: Option<bool>,
    pub is_turnover: Option<bool>,
    pub is_steal: Option<bool>,
    pub is_putback: Option<bool>,
    pub foul_type: Option<FoulType>,
    pub home_description: Option<String>,
    pub visitor_description: Option<String>,
    /// Acting player.
    pub player1: Option<PlayerSlot>,
    /// Assister, stealer, fouled player, or the player entering on a sub.
    pub player2: Option<PlayerSlot>,
    /// Blocker, or the jump ball recipient.
    pub player3: Option<PlayerSlot>,
    /// On-court lineups recorded with the row, when the log carries them.
    pub home_lineup: Vec<PlayerId>,
    pub away_lineup: Vec<PlayerId>,
}

impl Event {
    pub fn is_free_throw(&self) -> bool {
        self.event_type == EventType::FreeThrow
            || (self.shot_type == Some(ShotType::FreeThrow) && !self.event_type.is_field_goal())
    }

    pub fn is_field_goal_attempt(&self) -> bool {
        self.event_type.is_field_goal()
    }

    pub fn is_three_attempt(&self) -> bool {
        self.is_field_goal_attempt()
            && (self.is_three == Some(true) || self.shot_type == Some(ShotType::ThreePoint))
    }

    /// Whether a shot or free throw went in.
    pub fn is_made(&self) -> bool {
        match self.event_type {
            EventType::ShotMade => true,
            EventType::ShotMissed => false,
            _ if self.is_free_throw() => self
                .shot_made
                .or(self.points_made.map(|p| p > 0))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Points scored on this event.
    pub fn points(&self) -> u32 {
        if !self.is_made() {
            return 0;
        }
        let implied = if self.is_free_throw() {
            1
        } else if self.is_three_attempt() {
            3
        } else {
            2
        };
        self.points_made.map(u32::from).unwrap_or(implied)
    }

    pub fn is_turnover(&self) -> bool {
        self.is_turnover
            .unwrap_or(self.event_type == EventType::Turnover)
    }

    pub fn is_rebound(&self) -> bool {
        self.event_type == EventType::Rebound
    }

    pub fn is_substitution(&self) -> bool {
        self.event_type == EventType::Substitution
    }

    pub fn shooter(&self) -> Option<&PlayerSlot> {
        if self.is_field_goal_attempt() || self.is_free_throw() {
            self.player1.as_ref()
        } else {
            None
        }
    }

    pub fn assister(&self) -> Option<&PlayerSlot> {
        if self.event_type == EventType::ShotMade {
            self.player2.as_ref()
        } else {
            None
        }
    }

    pub fn blocker(&self) -> Option<&PlayerSlot> {
        let blocked = self
            .is_block
            .unwrap_or(self.event_type == EventType::ShotMissed && self.player3.is_some());
        if blocked { self.player3.as_ref() } else { None }
    }

    pub fn stealer(&self) -> Option<&PlayerSlot> {
        if self.is_turnover() && self.is_steal != Some(false) {
            self.player2.as_ref()
        } else {
            None
        }
    }

    pub fn rebounder(&self) -> Option<&PlayerSlot> {
        if self.is_rebound() { self.player1.as_ref() } else { None }
    }

    /// `(leaving, entering)` for a substitution.
    pub fn substitution(&self) -> Option<(Option<&PlayerSlot>, Option<&PlayerSlot>)> {
        self.is_substitution()
            .then(|| (self.player1.as_ref(), self.player2.as_ref()))
    }

    pub fn is_personal_foul(&self) -> bool {
        self.event_type == EventType::Foul
            && self.foul_type.is_some_and(FoulType::counts_as_personal)
    }

    /// Team the event is credited to: the `event_team` column, falling back
    /// to the acting player's team.
    pub fn team(&self) -> Option<TeamId> {
        self.event_team
            .or_else(|| self.player1.as_ref().and_then(|p| p.team_id))
    }

    /// Every player slot that is filled.
    pub fn players(&self) -> impl Iterator<Item = &PlayerSlot> {
        [&self.player1, &self.player2, &self.player3]
            .into_iter()
            .flatten()
    }
}
