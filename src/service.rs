//! Async orchestration: run the engine against a store with retries.
//!
//! Every call that changes an event holds that event's lock, so a regeneration
//! (delete then insert) is never interleaved with another action on the same event.
//! Each call returns an [`ActionReport`] for the caller's audit sink.

use crate::audit::{Action, ActionReport};
use crate::config::EngineConfig;
use crate::error::{EngineResult, Rejection};
use crate::logic::{advance, generate, phase, standings, PhaseRequest, ScoreLedger};
use crate::models::{
    EventId, Format, Match, MatchId, MatchPatch, MatchStatus, Standing, Team, TeamId,
};
use crate::store::TournamentStore;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as EventLock;

/// A reported result for one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub team_a_score: i64,
    pub team_b_score: i64,
    #[serde(default)]
    pub winner_id: Option<TeamId>,
    pub status: MatchStatus,
}

/// Matches written by an action, with its report.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub report: ActionReport,
    pub matches: Vec<Match>,
}

/// Ranked standings of the current phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandingsView {
    pub format: Option<Format>,
    pub group_id: Option<String>,
    pub rows: Vec<Standing>,
}

/// Roster and matches of one event, read under the event lock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
}

pub struct TournamentService<S> {
    store: Arc<S>,
    config: EngineConfig,
    locks: Mutex<HashMap<EventId, Arc<EventLock<()>>>>,
}

impl<S: TournamentStore> TournamentService<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn event_lock(&self, event_id: EventId) -> Arc<EventLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(event_id).or_default().clone()
    }

    async fn list_teams(&self, event_id: EventId) -> EngineResult<Vec<Team>> {
        let store = &self.store;
        self.config
            .retry
            .run("list_teams", move || store.list_teams(event_id))
            .await
    }

    async fn list_matches(&self, event_id: EventId) -> EngineResult<Vec<Match>> {
        let store = &self.store;
        self.config
            .retry
            .run("list_matches", move || store.list_matches(event_id))
            .await
    }

    async fn insert(&self, matches: &[Match]) -> EngineResult<()> {
        let store = &self.store;
        self.config
            .retry
            .run("insert_matches", move || store.insert_matches(matches))
            .await
    }

    async fn update(&self, id: MatchId, patch: &MatchPatch) -> EngineResult<()> {
        let store = &self.store;
        self.config
            .retry
            .run("update_match", move || store.update_match(id, patch))
            .await
    }

    /// Generate a bracket for the whole roster. The event must not have matches yet.
    pub async fn generate(&self, event_id: EventId, format: Format, shuffle: bool) -> EngineResult<Outcome> {
        self.build_bracket(event_id, format, shuffle, false).await
    }

    /// Delete every match of the event and generate again. Completes only once both
    /// the delete and the insert went through.
    pub async fn regenerate(&self, event_id: EventId, format: Format, shuffle: bool) -> EngineResult<Outcome> {
        self.build_bracket(event_id, format, shuffle, true).await
    }

    async fn build_bracket(
        &self,
        event_id: EventId,
        format: Format,
        shuffle: bool,
        replace: bool,
    ) -> EngineResult<Outcome> {
        let lock = self.event_lock(event_id);
        let _guard = lock.lock().await;

        let teams = self.list_teams(event_id).await?;
        let mut seeds: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        if seeds.len() < 2 {
            return Err(Rejection::NotEnoughTeams {
                selected: seeds.len(),
            }
            .into());
        }
        if shuffle {
            seeds.shuffle(&mut rand::thread_rng());
        }
        let mut matches = generate(format, event_id, &seeds);

        if replace {
            let store = &self.store;
            self.config
                .retry
                .run("delete_matches", move || store.delete_matches(event_id))
                .await?;
        }
        self.insert(&matches).await?;

        let mut byes = 0;
        if format == Format::SingleElim {
            let advanced = self.advance_locked(event_id).await?;
            byes = advanced.byes_resolved.len();
            matches = self.list_matches(event_id).await?;
        }

        let (action, verb) = if replace {
            (Action::Regenerate, "Regenerated")
        } else {
            (Action::Generate, "Generated")
        };
        let mut report = ActionReport::new(
            action,
            event_id,
            format!("{} {} bracket for {} teams", verb, format, seeds.len()),
        )
        .with_format(format)
        .with_team_count(seeds.len());
        report.matches_created = matches.len();
        report.byes_resolved = byes;
        Ok(Outcome {
            report: report.logged(),
            matches,
        })
    }

    /// Link the bracket and resolve byes. Safe to call as often as wanted.
    pub async fn advance(&self, event_id: EventId) -> EngineResult<ActionReport> {
        let lock = self.event_lock(event_id);
        let _guard = lock.lock().await;
        let advanced = self.advance_locked(event_id).await?;

        let mut report = ActionReport::new(
            Action::ResolveBye,
            event_id,
            format!(
                "Resolved {} bye(s), advanced {} winner(s), set {} link(s)",
                advanced.byes_resolved.len(),
                advanced.winners_advanced,
                advanced.links_set
            ),
        );
        report.matches_updated = advanced.updates.len();
        report.byes_resolved = advanced.byes_resolved.len();
        Ok(report.logged())
    }

    async fn advance_locked(&self, event_id: EventId) -> EngineResult<crate::logic::Advancement> {
        let mut matches = self.list_matches(event_id).await?;
        let advanced = advance(&mut matches, self.config.max_bye_passes);
        for (id, patch) in &advanced.updates {
            self.update(*id, patch).await?;
        }
        log::debug!(
            "[{}] advancement: {} update(s) in {} pass(es)",
            event_id,
            advanced.updates.len(),
            advanced.passes
        );
        Ok(advanced)
    }

    /// Create the next round or phase from the current results.
    pub async fn transition(&self, event_id: EventId, request: &PhaseRequest) -> EngineResult<Outcome> {
        let lock = self.event_lock(event_id);
        let _guard = lock.lock().await;

        let teams = self.list_teams(event_id).await?;
        let existing = self.list_matches(event_id).await?;
        let plan = phase::plan_transition(event_id, request, &teams, &existing, &mut rand::thread_rng())?;

        self.insert(&plan.matches).await?;
        let mut byes = 0;
        if plan.format == Format::SingleElim {
            byes = self.advance_locked(event_id).await?.byes_resolved.len();
        }

        let mut report = ActionReport::new(
            Action::AdvanceRound,
            event_id,
            format!(
                "Started {} ({}) with {} teams at round {}",
                plan.label,
                plan.format,
                plan.teams.len(),
                plan.first_round
            ),
        )
        .with_format(plan.format)
        .with_team_count(plan.teams.len())
        .with_round(plan.first_round);
        report.matches_created = plan.matches.len();
        report.byes_resolved = byes;
        Ok(Outcome {
            report: report.logged(),
            matches: plan.matches,
        })
    }

    /// Store a reported result. Completed elimination matches push their winner on.
    ///
    /// A completed match only accepts score corrections that keep its status and
    /// winner. An elimination match cannot be completed without a winner.
    pub async fn record_result(
        &self,
        event_id: EventId,
        match_id: MatchId,
        result: &MatchResult,
    ) -> EngineResult<ActionReport> {
        let lock = self.event_lock(event_id);
        let _guard = lock.lock().await;

        let matches = self.list_matches(event_id).await?;
        let m = matches
            .iter()
            .find(|m| m.id == match_id)
            .ok_or(Rejection::UnknownMatch(match_id))?;
        if let Some(winner) = result.winner_id {
            if !m.has_team(winner) {
                return Err(Rejection::InvalidWinner { match_id, winner }.into());
            }
        }
        if m.is_completed()
            && (result.status != MatchStatus::Completed || result.winner_id != m.winner_id)
        {
            return Err(Rejection::MatchCompleted(match_id).into());
        }
        // Every completed elimination match names who advances.
        if m.format() == Format::SingleElim
            && result.status == MatchStatus::Completed
            && result.winner_id.is_none()
        {
            return Err(Rejection::MissingWinner(match_id).into());
        }

        let patch = MatchPatch {
            team_a_score: Some(result.team_a_score),
            team_b_score: Some(result.team_b_score),
            winner_id: result.winner_id,
            status: Some(result.status),
            ..MatchPatch::default()
        };
        self.update(match_id, &patch).await?;

        let mut updated = 1;
        if m.format() == Format::SingleElim && result.status == MatchStatus::Completed {
            updated += self.advance_locked(event_id).await?.updates.len();
        }

        let mut report = ActionReport::new(
            Action::RecordResult,
            event_id,
            format!(
                "Match {} set to {}-{} ({:?})",
                match_id, result.team_a_score, result.team_b_score, result.status
            ),
        )
        .with_format(m.format())
        .with_round(m.round);
        report.matches_updated = updated;
        Ok(report.logged())
    }

    /// Add `delta` to a team's score through the session's ledger. Returns the score
    /// to display. On failure only this delta is rolled back.
    pub async fn adjust_team_score(
        &self,
        ledger: &Mutex<ScoreLedger>,
        event_id: EventId,
        team_id: TeamId,
        delta: i64,
    ) -> EngineResult<i64> {
        let teams = self.list_teams(event_id).await?;
        let team = teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or(Rejection::UnknownTeam(team_id))?;

        let ticket = ledger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .begin(team_id, team.score, delta);

        let store = &self.store;
        let saved = self
            .config
            .retry
            .run("add_team_score", move || store.add_team_score(team_id, delta))
            .await;

        let mut ledger = ledger.lock().unwrap_or_else(|e| e.into_inner());
        match saved {
            Ok(team) => {
                ledger.confirm(ticket, team.score);
                ActionReport::new(
                    Action::AdjustScore,
                    event_id,
                    format!("Team {} score {:+} -> {}", team.name, delta, team.score),
                )
                .logged();
                Ok(ledger.displayed(team_id).unwrap_or(team.score))
            }
            Err(err) => {
                ledger.rollback(ticket);
                Err(err)
            }
        }
    }

    /// Teams and matches of an event. Waits for any regeneration in progress, so a
    /// reader never sees a bracket between its delete and its insert.
    pub async fn event(&self, event_id: EventId) -> EngineResult<EventView> {
        let lock = self.event_lock(event_id);
        let _guard = lock.lock().await;

        let teams = self.list_teams(event_id).await?;
        let matches = self.list_matches(event_id).await?;
        Ok(EventView {
            id: event_id,
            teams,
            matches,
        })
    }

    /// Ranked standings of the current phase.
    pub async fn standings(&self, event_id: EventId) -> EngineResult<StandingsView> {
        let lock = self.event_lock(event_id);
        let _guard = lock.lock().await;

        let teams = self.list_teams(event_id).await?;
        let matches = self.list_matches(event_id).await?;
        let (group_id, format) = match phase::current_phase(&matches) {
            Some((group, format)) => (group, Some(format)),
            None => (None, None),
        };
        let phase_matches: Vec<Match> = matches
            .into_iter()
            .filter(|m| m.group_id == group_id)
            .collect();
        let table = standings::compute(
            format.unwrap_or(Format::RoundRobin),
            &phase_matches,
            &teams,
        );
        Ok(StandingsView {
            format,
            group_id,
            rows: standings::rank(&table, &teams),
        })
    }
}
