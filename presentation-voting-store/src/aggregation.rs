use core::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Ballot, PresentationId, SessionId, VotingMode};
use crate::roster::Roster;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Tally {
    #[serde(rename_all = "camelCase")]
    Selection { selection_count: usize },
    #[serde(rename_all = "camelCase")]
    Rating {
        vote_count: usize,
        total_rating: u64,
        /// `None` until the first rating arrives.
        average_rating: Option<f64>,
    },
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresentationStats {
    pub presentation_id: PresentationId,
    pub team_name: String,
    pub title: String,
    #[serde(flatten)]
    pub tally: Tally,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: usize,
    pub presentations: Vec<PresentationStats>,
}

/// Full scan over all ballots. Every roster entry is reported, including the ones
/// nobody voted for, so a freshly uploaded roster shows up at zero.
pub(crate) fn aggregate(
    mode: VotingMode,
    roster: &Roster,
    ballots: &HashMap<SessionId, Ballot>,
    total_users: usize,
) -> Stats {
    let mut presentations: Vec<PresentationStats> = roster
        .presentations()
        .iter()
        .map(|presentation| PresentationStats {
            presentation_id: presentation.id,
            team_name: presentation.team_name.clone(),
            title: presentation.title.clone(),
            tally: tally(mode, presentation.id, ballots),
        })
        .collect();

    presentations.sort_by(|a, b| {
        compare_tally(&a.tally, &b.tally).then_with(|| a.presentation_id.cmp(&b.presentation_id))
    });

    Stats {
        total_users,
        presentations,
    }
}

fn tally(mode: VotingMode, id: PresentationId, ballots: &HashMap<SessionId, Ballot>) -> Tally {
    match mode {
        VotingMode::Selection { .. } => Tally::Selection {
            selection_count: ballots
                .values()
                .filter(|ballot| matches!(ballot, Ballot::Selection(selected) if selected.contains(&id)))
                .count(),
        },
        VotingMode::Rating => {
            let (vote_count, total_rating) = ballots
                .values()
                .filter_map(|ballot| match ballot {
                    Ballot::Ratings(ratings) => ratings.get(&id),
                    Ballot::Selection(_) => None,
                })
                .fold((0_usize, 0_u64), |(count, total), rating| {
                    (count + 1, total + u64::from(rating.get()))
                });
            #[allow(
                clippy::cast_precision_loss,
                reason = "rating sums and counts stay far below 2^52"
            )]
            let average_rating =
                (vote_count > 0).then(|| total_rating as f64 / vote_count as f64);
            Tally::Rating {
                vote_count,
                total_rating,
                average_rating,
            }
        }
    }
}

/// Descending; unrated entries sort last.
fn compare_tally(a: &Tally, b: &Tally) -> Ordering {
    match (a, b) {
        (
            Tally::Selection { selection_count: a },
            Tally::Selection { selection_count: b },
        ) => b.cmp(a),
        (
            Tally::Rating {
                average_rating: a, ..
            },
            Tally::Rating {
                average_rating: b, ..
            },
        ) => match (a, b) {
            (Some(a), Some(b)) => b.total_cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}
