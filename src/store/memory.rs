//! In-memory store for the web host and tests.

use crate::error::{StoreError, StoreResult};
use crate::models::{EventId, Match, MatchId, MatchPatch, Team, TeamId};
use crate::store::TournamentStore;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    teams: Vec<Team>,
    matches: Vec<Match>,
    /// Errors returned by the next calls of an operation, one per call.
    injected: HashMap<&'static str, VecDeque<StoreError>>,
}

/// Store kept in process memory. Last write wins.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Connection("store lock poisoned".into()))
    }

    /// Lock and consume one injected failure for `operation`, if any.
    fn begin(&self, operation: &'static str) -> StoreResult<MutexGuard<'_, Tables>> {
        let mut tables = self.lock()?;
        let injected = tables
            .injected
            .get_mut(operation)
            .and_then(|queue| queue.pop_front());
        match injected {
            Some(err) => Err(err),
            None => Ok(tables),
        }
    }

    /// Register a team. Not part of the engine's store contract.
    pub fn add_team(&self, event_id: EventId, name: impl Into<String>) -> StoreResult<Team> {
        let team = Team::new(event_id, name);
        self.lock()?.teams.push(team.clone());
        Ok(team)
    }

    /// Make the next calls of `operation` (a [`TournamentStore`] method name) fail
    /// with these errors, one per call, in order.
    pub fn fail_next(
        &self,
        operation: &'static str,
        errors: impl IntoIterator<Item = StoreError>,
    ) -> StoreResult<()> {
        self.lock()?
            .injected
            .entry(operation)
            .or_default()
            .extend(errors);
        Ok(())
    }

    /// Direct read, bypassing injected failures.
    pub fn snapshot(&self, event_id: EventId) -> StoreResult<Vec<Match>> {
        Ok(self
            .lock()?
            .matches
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TournamentStore for InMemoryStore {
    async fn list_matches(&self, event_id: EventId) -> StoreResult<Vec<Match>> {
        let tables = self.begin("list_matches")?;
        Ok(tables
            .matches
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_teams(&self, event_id: EventId) -> StoreResult<Vec<Team>> {
        let tables = self.begin("list_teams")?;
        Ok(tables
            .teams
            .iter()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn insert_matches(&self, matches: &[Match]) -> StoreResult<()> {
        let mut tables = self.begin("insert_matches")?;
        for m in matches {
            let clash = tables.matches.iter().chain(matches.iter()).any(|other| {
                other.id != m.id
                    && other.event_id == m.event_id
                    && other.group_id == m.group_id
                    && other.round == m.round
                    && other.position == m.position
            });
            if clash || tables.matches.iter().any(|other| other.id == m.id) {
                return Err(StoreError::Constraint(format!(
                    "match {} clashes with an existing match (round {}, position {})",
                    m.id, m.round, m.position
                )));
            }
        }
        tables.matches.extend_from_slice(matches);
        Ok(())
    }

    async fn update_match(&self, id: MatchId, patch: &MatchPatch) -> StoreResult<()> {
        let mut tables = self.begin("update_match")?;
        let m = tables
            .matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("match {id}")))?;
        m.apply(patch);
        Ok(())
    }

    async fn delete_matches(&self, event_id: EventId) -> StoreResult<()> {
        let mut tables = self.begin("delete_matches")?;
        tables.matches.retain(|m| m.event_id != event_id);
        Ok(())
    }

    async fn add_team_score(&self, team_id: TeamId, delta: i64) -> StoreResult<Team> {
        let mut tables = self.begin("add_team_score")?;
        let team = tables
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| StoreError::NotFound(format!("team {team_id}")))?;
        team.score += delta;
        Ok(team.clone())
    }
}
