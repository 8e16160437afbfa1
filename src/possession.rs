//! Possession estimate.
//!
//! A possession ends on a made field goal (unless an and-one free throw
//! follows), on the last made free throw of a trip, on a defensive rebound
//! (ending the shooting team's possession), on a turnover, or when a period
//! ends while a team still has the ball. Every ending hands the ball to the
//! other team, so a period that runs out right after a score still closes
//! the opponent's possession.

use crate::context::GameContext;
use crate::event::{Event, EventType, TeamId};

/// One finished possession: the event that ended it and the team that had
/// the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PossessionEnd {
    pub index: usize,
    pub team: TeamId,
}

// eventmsgactiontype codes for free throws.
const FT_ONE_OF_ONE: u32 = 10;
const FT_LAST_OF_TRIP: [u32; 3] = [10, 12, 15];
const FT_NOT_LAST: [u32; 3] = [11, 13, 14];
const FT_TECHNICAL: [u32; 2] = [16, 21];

/// Walk the log in order and return every possession end.
pub fn possession_ends(events: &[Event], context: &GameContext) -> Vec<PossessionEnd> {
    let mut ends = Vec::new();
    let mut open: Option<TeamId> = None;

    for (index, e) in events.iter().enumerate() {
        let team = e.team().filter(|&t| context.is_team(t));

        match (team, e.event_type) {
            (Some(team), EventType::ShotMade) => {
                if and_one_follows(events, index, team) {
                    open = Some(team);
                } else {
                    ends.push(PossessionEnd { index, team });
                    open = context.opponent(team);
                }
            }
            (Some(team), EventType::ShotMissed) => open = Some(team),
            (Some(team), _) if e.is_free_throw() && !is_technical_free_throw(e) => {
                if e.is_made() && is_last_of_trip(events, index, team) {
                    ends.push(PossessionEnd { index, team });
                    open = context.opponent(team);
                } else {
                    open = Some(team);
                }
            }
            (Some(team), EventType::Rebound) => {
                if e.is_d_rebound == Some(true) {
                    if let Some(shooting) = open.filter(|&o| o != team).or(context.opponent(team)) {
                        ends.push(PossessionEnd { index, team: shooting });
                    }
                    open = Some(team);
                } else if e.is_o_rebound == Some(true) {
                    open = Some(team);
                }
            }
            (Some(team), _) if e.is_turnover() => {
                ends.push(PossessionEnd { index, team });
                open = context.opponent(team);
            }
            _ => {}
        }

        let period_over = events
            .get(index + 1)
            .is_none_or(|next| next.period != e.period);
        if period_over && let Some(team) = open.take() {
            ends.push(PossessionEnd { index, team });
        }
    }
    ends
}

/// Count of possession ends per team.
pub fn count_by_team(ends: &[PossessionEnd]) -> impl Fn(TeamId) -> u32 + '_ {
    move |team| ends.iter().filter(|p| p.team == team).count() as u32
}

fn is_technical_free_throw(e: &Event) -> bool {
    e.action_type.is_some_and(|a| FT_TECHNICAL.contains(&a))
}

/// Events logged at the same period and clock second as `index`.
fn same_moment(events: &[Event], index: usize) -> impl Iterator<Item = &Event> {
    let at = &events[index];
    events[index + 1..]
        .iter()
        .take_while(move |e| e.period == at.period && e.seconds_elapsed == at.seconds_elapsed)
}

fn and_one_follows(events: &[Event], index: usize, team: TeamId) -> bool {
    same_moment(events, index).any(|e| {
        e.is_free_throw()
            && e.team() == Some(team)
            && e.action_type.is_none_or(|a| a == FT_ONE_OF_ONE)
    })
}

fn is_last_of_trip(events: &[Event], index: usize, team: TeamId) -> bool {
    match events[index].action_type {
        Some(a) if FT_LAST_OF_TRIP.contains(&a) => true,
        Some(a) if FT_NOT_LAST.contains(&a) => false,
        // Without a subtype, the trip ends when no further free throw by
        // the same team happens at the same moment.
        _ => !same_moment(events, index)
            .any(|e| e.is_free_throw() && e.team() == Some(team) && !is_technical_free_throw(e)),
    }
}
