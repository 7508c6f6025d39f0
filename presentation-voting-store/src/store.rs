use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregation::{aggregate, Stats};
use crate::error::StoreError;
use crate::models::{
    Ballot, ConfigVersion, Presentation, PresentationId, Rating, Session, SessionId, Timestamp,
    VotingMode,
};
use crate::roster::Roster;
use crate::theme::{ThemeId, ThemeSettings};

/// Read-only view of the global settings handed to participants and admins.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub voting_active: bool,
    pub voting_mode: &'static str,
    pub required_selections: Option<u32>,
    pub last_config_update: ConfigVersion,
    pub selected_theme: ThemeId,
    pub random_theme: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionVotes {
    pub session_id: SessionId,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
    pub votes: Ballot,
}

struct State {
    voting_active: bool,
    mode: VotingMode,
    roster: Roster,
    config_version: ConfigVersion,
    theme: ThemeSettings,
    sessions: HashMap<SessionId, Session>,
    ballots: HashMap<SessionId, Ballot>,
}

impl State {
    fn reset_all(&mut self) {
        info!(
            sessions = self.sessions.len(),
            ballots = self.ballots.len(),
            "resetting all sessions and votes"
        );
        self.sessions.clear();
        self.ballots.clear();
    }

    fn touch(&mut self, id: &SessionId) -> Result<(), StoreError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or(StoreError::SessionNotFound)?;
        session.last_updated = Timestamp::now();
        Ok(())
    }

    fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            voting_active: self.voting_active,
            voting_mode: self.mode.name(),
            required_selections: self.mode.required_selections().map(core::num::NonZeroU32::get),
            last_config_update: self.config_version,
            selected_theme: self.theme.selected,
            random_theme: self.theme.random,
        }
    }
}

/// The single in-memory source of truth for sessions, votes and settings.
///
/// Every operation runs as one critical section, so a roster or rule change and
/// the reset it implies are observed together. Concurrent writes to the same
/// session are last-write-wins.
pub struct Store {
    state: Mutex<State>,
}

impl Store {
    #[must_use]
    pub fn new(mode: VotingMode, roster: Roster, theme: ThemeSettings) -> Self {
        Self {
            state: Mutex::new(State {
                voting_active: true,
                mode,
                roster,
                config_version: ConfigVersion::initial(),
                theme,
                sessions: HashMap::new(),
                ballots: HashMap::new(),
            }),
        }
    }

    /// Every operation leaves the state consistent before it can panic, so a
    /// poisoned lock is taken over instead of failing all later requests.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("recovering store lock poisoned by a panicking request");
            self.state.clear_poison();
            poisoned.into_inner()
        })
    }

    pub fn create_session(&self) -> SessionId {
        let mut state = self.lock();
        loop {
            let id = SessionId::generate();
            if let Entry::Vacant(entry) = state.sessions.entry(id.clone()) {
                entry.insert(Session::new(id.clone()));
                debug!(session = %id, "created session");
                return id;
            }
        }
    }

    pub fn session(&self, id: &SessionId) -> Result<Session, StoreError> {
        self.lock()
            .sessions
            .get(id)
            .cloned()
            .ok_or(StoreError::SessionNotFound)
    }

    pub fn touch(&self, id: &SessionId) -> Result<(), StoreError> {
        self.lock().touch(id)
    }

    pub fn total_users(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Replaces the whole selection of a session.
    ///
    /// Checks run in a fixed order: closed voting, stale config, mode, session id,
    /// selection count, then the individual ids. Nothing is written unless all of
    /// them pass.
    pub fn submit_selections(
        &self,
        id: &SessionId,
        selected: &[PresentationId],
        observed: ConfigVersion,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.voting_active {
            return Err(StoreError::VotingClosed);
        }
        if observed != state.config_version {
            return Err(StoreError::ConfigStale {
                current: state.config_version,
            });
        }
        let VotingMode::Selection { required } = state.mode else {
            return Err(StoreError::WrongMode {
                mode: state.mode.name(),
            });
        };
        if !id.is_well_formed() {
            return Err(StoreError::InvalidSessionId);
        }
        if usize::try_from(required.get()).ok() != Some(selected.len()) {
            return Err(StoreError::WrongSelectionCount {
                expected: required.get(),
                actual: selected.len(),
            });
        }
        let mut ballot = BTreeSet::new();
        for presentation in selected {
            if !state.roster.contains(*presentation) {
                return Err(StoreError::UnknownPresentation(*presentation));
            }
            if !ballot.insert(*presentation) {
                return Err(StoreError::DuplicateSelection(*presentation));
            }
        }

        if !state.sessions.contains_key(id) {
            // the client kept a session id that a reset or restart has since dropped
            debug!(session = %id, "recreating unknown session on submit");
            state.sessions.insert(id.clone(), Session::new(id.clone()));
        }
        state.ballots.insert(id.clone(), Ballot::Selection(ballot));
        state.touch(id)
    }

    /// Upserts one rating. Ratings for different presentations are independent.
    pub fn submit_rating(
        &self,
        id: &SessionId,
        presentation: PresentationId,
        rating: u8,
        observed: Option<ConfigVersion>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.voting_active {
            return Err(StoreError::VotingClosed);
        }
        if let Some(observed) = observed {
            if observed != state.config_version {
                return Err(StoreError::ConfigStale {
                    current: state.config_version,
                });
            }
        }
        if state.mode != VotingMode::Rating {
            return Err(StoreError::WrongMode {
                mode: state.mode.name(),
            });
        }
        let rating = Rating::new(rating)?;
        if !state.sessions.contains_key(id) {
            return Err(StoreError::SessionNotFound);
        }
        if !state.roster.contains(presentation) {
            return Err(StoreError::UnknownPresentation(presentation));
        }

        let ballot = state
            .ballots
            .entry(id.clone())
            .or_insert_with(|| Ballot::Ratings(BTreeMap::new()));
        if let Ballot::Ratings(ratings) = &mut *ballot {
            ratings.insert(presentation, rating);
        } else {
            *ballot = Ballot::Ratings(BTreeMap::from([(presentation, rating)]));
        }
        state.touch(id)
    }

    /// The current ballot of a known session, empty if it has not voted yet.
    pub fn votes(&self, id: &SessionId) -> Result<Ballot, StoreError> {
        let state = self.lock();
        if !state.sessions.contains_key(id) {
            return Err(StoreError::SessionNotFound);
        }
        Ok(state
            .ballots
            .get(id)
            .cloned()
            .unwrap_or_else(|| state.mode.empty_ballot()))
    }

    pub fn reset_all(&self) {
        self.lock().reset_all();
    }

    pub fn config(&self) -> ConfigSnapshot {
        self.lock().snapshot()
    }

    pub fn theme(&self) -> ThemeSettings {
        self.lock().theme
    }

    pub fn presentations(&self) -> Vec<Presentation> {
        self.lock().roster.presentations().to_vec()
    }

    /// Opening or closing voting keeps every recorded vote.
    pub fn set_voting_active(&self, active: bool) {
        self.lock().voting_active = active;
        info!(active, "voting status changed");
    }

    /// Replaces the roster, invalidating every session and vote.
    pub fn upload_roster(&self, presentations: Vec<Presentation>) -> Result<ConfigVersion, StoreError> {
        let roster = Roster::new(presentations)?;
        let mut state = self.lock();
        info!(presentations = roster.len(), "replacing roster");
        state.roster = roster;
        state.config_version = state.config_version.bump();
        state.reset_all();
        Ok(state.config_version)
    }

    /// Changes how many presentations each participant picks, invalidating every
    /// session and vote.
    pub fn set_required_selections(&self, required: u32) -> Result<ConfigVersion, StoreError> {
        let required =
            core::num::NonZeroU32::new(required).ok_or(StoreError::InvalidRequiredSelections)?;
        let mut state = self.lock();
        if state.mode == VotingMode::Rating {
            return Err(StoreError::WrongMode {
                mode: state.mode.name(),
            });
        }
        info!(required = required.get(), "changing required selections");
        state.mode = VotingMode::Selection { required };
        state.config_version = state.config_version.bump();
        state.reset_all();
        Ok(state.config_version)
    }

    /// Display preference only; votes and the config version are untouched.
    pub fn set_theme(&self, theme: ThemeSettings) {
        self.lock().theme = theme;
        info!(
            selected = theme.selected.get(),
            random = theme.random,
            "theme changed"
        );
    }

    pub fn stats(&self) -> Stats {
        let state = self.lock();
        aggregate(
            state.mode,
            &state.roster,
            &state.ballots,
            state.sessions.len(),
        )
    }

    /// Tallies and settings read under the same lock, so the dashboard never shows
    /// counts from before a reset next to the config from after it.
    pub fn overview(&self) -> (Stats, ConfigSnapshot) {
        let state = self.lock();
        let stats = aggregate(
            state.mode,
            &state.roster,
            &state.ballots,
            state.sessions.len(),
        );
        (stats, state.snapshot())
    }

    /// Every ballot with its session, oldest session first.
    pub fn all_votes(&self) -> Vec<SessionVotes> {
        let state = self.lock();
        let mut all: Vec<SessionVotes> = state
            .ballots
            .iter()
            .filter_map(|(id, ballot)| {
                state.sessions.get(id).map(|session| SessionVotes {
                    session_id: id.clone(),
                    created_at: session.created_at,
                    last_updated: session.last_updated,
                    votes: ballot.clone(),
                })
            })
            .collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        all
    }
}
