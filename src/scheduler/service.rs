use chrono::Utc;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::config::SchedulerConfig;
use crate::event::{EventBus, KupEvent};
use crate::kup::{Kup, KupLocks, KupRepository, KupState};
use crate::prediction::{grade, Outcome, Prediction, PredictionKind, PredictionRepository};
use crate::ranking::{RankingEntry, RankingRepository, RankingTable};
use crate::scoring::{integrity_issues, PointsRuleRegistry, ScoringContext, ScoringError};
use crate::sport::ScopeRef;
use crate::tournament::ResultSource;

/// What a recomputation trigger ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    Rebuilt {
        participants: usize,
        integrity_issues: usize,
    },
    /// Another recomputation of the same Kup was in flight
    Coalesced,
}

/// Per-Kup results of one scheduler pass
#[derive(Debug, Default)]
pub struct RecomputeReport {
    pub rebuilt: Vec<String>,
    pub coalesced: Vec<String>,
    /// Kup id and error message
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KupFinalization {
    pub graded: usize,
    pub reordered: bool,
    pub rebuilt: bool,
}

/// Results of grading one finalized scope
#[derive(Debug, Default)]
pub struct FinalizationReport {
    pub updated: HashMap<String, KupFinalization>,
    pub failed: Vec<(String, String)>,
}

impl FinalizationReport {
    pub fn graded(&self) -> usize {
        self.updated.values().map(|k| k.graded).sum()
    }
}

/// Grades predictions and maintains ranking tables.
///
/// Every write happens under the Kup's guard from [`KupLocks`]. Full rebuilds
/// use `try_acquire`, so a trigger that finds a rebuild running is coalesced.
pub struct ScoringService {
    kup_repository: Arc<dyn KupRepository>,
    prediction_repository: Arc<dyn PredictionRepository>,
    ranking_repository: Arc<dyn RankingRepository>,
    result_source: Arc<dyn ResultSource>,
    registry: Arc<PointsRuleRegistry>,
    event_bus: EventBus,
    locks: KupLocks,
    config: SchedulerConfig,
}

impl ScoringService {
    /// `locks` must be the instance the Kup service uses, so that rebuilds
    /// and membership changes of one Kup never interleave
    pub fn builder(
        kup_repository: Arc<dyn KupRepository>,
        prediction_repository: Arc<dyn PredictionRepository>,
        ranking_repository: Arc<dyn RankingRepository>,
        result_source: Arc<dyn ResultSource>,
        locks: KupLocks,
    ) -> ScoringServiceBuilder {
        ScoringServiceBuilder {
            kup_repository,
            prediction_repository,
            ranking_repository,
            result_source,
            locks,
            registry: None,
            event_bus: None,
            config: SchedulerConfig::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Last committed standings of a Kup
    pub async fn ranking_table(&self, kup_id: &str) -> Result<Arc<RankingTable>, ScoringError> {
        self.ranking_repository
            .get_table(kup_id)
            .await?
            .ok_or_else(|| ScoringError::KupNotFound(kup_id.to_string()))
    }

    /// Points a prediction currently earns under the Kup's policy
    pub fn points_for(&self, kup: &Kup, prediction: &Prediction) -> Result<i32, ScoringError> {
        self.registry
            .points_for(kup, prediction, &ScoringContext::for_kup(kup))
    }

    /// Fully rebuilds a Kup's ranking table
    #[instrument(skip(self))]
    pub async fn recompute_kup(&self, kup_id: &str) -> Result<RecomputeOutcome, ScoringError> {
        let Some(_guard) = self.locks.try_acquire(kup_id).await else {
            debug!("Recomputation already running, trigger coalesced");
            return Ok(RecomputeOutcome::Coalesced);
        };
        self.rebuild_with_timeout(kup_id).await
    }

    /// Rebuilds every Kup whose standings are stale or whose scope just
    /// completed. Kups are processed concurrently and fail independently.
    #[instrument(skip(self))]
    pub async fn recompute_all(&self) -> Result<RecomputeReport, ScoringError> {
        let kups = self.kup_repository.list_kups().await?;
        let mut report = RecomputeReport::default();

        let mut due = Vec::new();
        for kup in &kups {
            match self.needs_recompute(kup).await {
                Ok(true) => due.push(kup.id.clone()),
                Ok(false) => {}
                Err(err) => {
                    error!(kup_id = %kup.id, error = %err, "Could not check Kup staleness");
                    report.failed.push((kup.id.clone(), err.to_string()));
                }
            }
        }

        info!(total = kups.len(), due = due.len(), "Recomputing stale Kups");

        let results = join_all(due.into_iter().map(|kup_id| async move {
            let result = self.recompute_kup(&kup_id).await;
            (kup_id, result)
        }))
        .await;

        for (kup_id, result) in results {
            match result {
                Ok(RecomputeOutcome::Rebuilt { .. }) => report.rebuilt.push(kup_id),
                Ok(RecomputeOutcome::Coalesced) => report.coalesced.push(kup_id),
                Err(err) => {
                    error!(kup_id = %kup_id, error = %err, "Kup recomputation failed");
                    report.failed.push((kup_id, err.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Grades all predictions covered by a finalized scope and updates the
    /// affected ranking tables incrementally. Kups whose own scope completed
    /// get a full rebuild and become final.
    #[instrument(skip(self, scope), fields(scope = %scope))]
    pub async fn on_scope_finalized(&self, scope: &ScopeRef) -> Result<FinalizationReport, ScoringError> {
        if !self.result_source.is_scope_final(scope).await? {
            return Err(ScoringError::ScopeNotFinal(scope.clone()));
        }
        let outcome = self.result_source.final_outcome(scope).await?;

        let mut kup_ids = BTreeSet::new();
        if outcome.is_some() {
            for prediction in self.prediction_repository.predictions_for_scope(scope).await? {
                kup_ids.insert(prediction.kup_id);
            }
        }
        for kup in self.kup_repository.list_kups().await? {
            if &kup.scope == scope {
                kup_ids.insert(kup.id);
            }
        }

        let outcome = outcome.as_ref();
        let results = join_all(kup_ids.into_iter().map(|kup_id| async move {
            let result = self.finalize_kup_scope(&kup_id, scope, outcome).await;
            (kup_id, result)
        }))
        .await;

        let mut report = FinalizationReport::default();
        for (kup_id, result) in results {
            match result {
                Ok(finalization) => {
                    report.updated.insert(kup_id, finalization);
                }
                Err(err) => {
                    error!(kup_id = %kup_id, error = %err, "Scope finalization failed for Kup");
                    report.failed.push((kup_id, err.to_string()));
                }
            }
        }

        info!(
            graded = report.graded(),
            kups = report.updated.len(),
            failed = report.failed.len(),
            "Scope finalization processed"
        );
        Ok(report)
    }

    async fn finalize_kup_scope(
        &self,
        kup_id: &str,
        scope: &ScopeRef,
        outcome: Option<&Outcome>,
    ) -> Result<KupFinalization, ScoringError> {
        let _guard = self.locks.acquire(kup_id).await;
        let mut kup = self.load_kup(kup_id).await?;
        let mut finalization = KupFinalization::default();

        if kup.state == KupState::Final {
            warn!(kup_id = %kup.id, "Standings are final, finalized scope ignored");
            return Ok(finalization);
        }

        let mut deltas = HashMap::new();
        if let Some(outcome) = outcome {
            let (graded, member_deltas) = self.grade_kup(&kup, scope, outcome).await?;
            finalization.graded = graded;
            deltas = member_deltas;
        }

        // Results are persisted even when the Kup cannot be scored.
        self.registry.rule_for(&kup.game_mode)?;

        if kup.state == KupState::Open {
            warn!(kup_id = %kup.id, "Results arrived for an open Kup, locking it");
            kup.transition(KupState::Locked)?;
            self.kup_repository.save_kup(&kup).await?;
        }
        if kup.state == KupState::Locked && finalization.graded > 0 {
            kup.transition(KupState::Grading)?;
            self.kup_repository.save_kup(&kup).await?;
        }

        deltas.retain(|_, delta| *delta != 0);
        if !deltas.is_empty() {
            let mut table = self.current_table(&kup).await?;
            finalization.reordered = table.apply_deltas(&deltas);
            let top = table.top(self.config.notify_top_n);
            let participants = table.len();
            self.ranking_repository.save_table(table).await?;
            self.notify(&kup.id, top, participants).await;
            debug!(
                kup_id = %kup.id,
                members = deltas.len(),
                reordered = finalization.reordered,
                "Applied incremental ranking update"
            );
        }

        if &kup.scope == scope {
            self.rebuild_with_timeout(kup_id).await?;
            finalization.rebuilt = true;
        }

        Ok(finalization)
    }

    /// Grades the Kup's predictions covered by `scope`, returning how many
    /// changed and the resulting point delta per member
    async fn grade_kup(
        &self,
        kup: &Kup,
        scope: &ScopeRef,
        outcome: &Outcome,
    ) -> Result<(usize, HashMap<String, i32>), ScoringError> {
        let rule = self.registry.rule_for(&kup.game_mode).ok();
        let context = ScoringContext::for_kup(kup);
        let points = |prediction: &Prediction| {
            rule.as_ref()
                .map(|r| r.points_for(kup, prediction, &context))
                .unwrap_or_default()
        };

        let predictions = self.prediction_repository.predictions_for_kup(&kup.id).await?;
        let mut graded = 0;
        let mut deltas: HashMap<String, i32> = HashMap::new();

        for mut prediction in predictions.into_iter().filter(|p| p.covers(scope)) {
            let results = match grade(&prediction, outcome) {
                Ok(results) => results,
                Err(err) => {
                    warn!(
                        kup_id = %kup.id,
                        prediction_id = %prediction.id,
                        error = %err,
                        "Prediction could not be graded, scored as zero"
                    );
                    continue;
                }
            };

            let before = points(&prediction);
            if !prediction.apply_grading(results) {
                continue;
            }
            self.prediction_repository.save_prediction(&prediction).await?;
            graded += 1;

            let delta = points(&prediction) - before;
            *deltas.entry(prediction.member_id.clone()).or_default() += delta;
        }

        Ok((graded, deltas))
    }

    async fn rebuild_with_timeout(&self, kup_id: &str) -> Result<RecomputeOutcome, ScoringError> {
        let started = Instant::now();
        match tokio::time::timeout(self.config.recompute_timeout, self.rebuild(kup_id)).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed = started.elapsed();
                error!(
                    kup_id = %kup_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Recomputation timed out, previous standings kept"
                );
                Err(ScoringError::Timeout {
                    kup_id: kup_id.to_string(),
                    elapsed,
                })
            }
        }
    }

    /// Full rebuild; the caller holds the Kup's guard
    async fn rebuild(&self, kup_id: &str) -> Result<RecomputeOutcome, ScoringError> {
        let mut kup = self.load_kup(kup_id).await?;
        let rule = self.registry.rule_for(&kup.game_mode).inspect_err(|err| {
            error!(kup_id = %kup_id, error = %err, "Kup has no points rule");
        })?;
        self.grade_finished_scopes(&mut kup).await?;
        let as_of = Utc::now();

        let mut totals = HashMap::new();
        let mut issues = 0;
        {
            let context = ScoringContext::for_kup(&kup);
            for member in &kup.members {
                let predictions = self
                    .prediction_repository
                    .predictions_for_member(&kup.id, member)
                    .await?;
                let mut total = 0;
                for prediction in &predictions {
                    issues += integrity_issues(&kup.game_mode, prediction);
                    total += rule.points_for(&kup, prediction, &context);
                }
                totals.insert(member.clone(), total);
            }
        }

        if issues > 0 {
            warn!(kup_id = %kup.id, integrity_issues = issues, "Malformed predictions scored as zero");
        }

        let mut table = self.current_table(&kup).await?;
        table.rebuild(&kup.members, &totals);
        table.as_of = Some(as_of);
        let top = table.top(self.config.notify_top_n);
        let participants = table.len();
        self.ranking_repository.save_table(table).await?;

        self.finalize_if_complete(&mut kup).await?;
        self.notify(&kup.id, top, participants).await;

        info!(kup_id = %kup.id, participants, state = %kup.state, "Ranking table rebuilt");
        Ok(RecomputeOutcome::Rebuilt {
            participants,
            integrity_issues: issues,
        })
    }

    /// Grades predictions whose scope is already final but whose
    /// finalization never reached this Kup, e.g. a dropped bus event.
    /// Returns how many predictions changed.
    async fn grade_finished_scopes(&self, kup: &mut Kup) -> Result<usize, ScoringError> {
        if !matches!(kup.state, KupState::Locked | KupState::Grading) {
            return Ok(0);
        }

        let mut scopes = vec![kup.scope.clone()];
        for prediction in self.prediction_repository.predictions_for_kup(&kup.id).await? {
            let mut covered = vec![prediction.scope];
            if let PredictionKind::Question { games, .. } = prediction.kind {
                covered.extend(games.into_iter().map(ScopeRef::Game));
            }
            for scope in covered {
                if !scopes.contains(&scope) {
                    scopes.push(scope);
                }
            }
        }

        let mut graded = 0;
        for scope in &scopes {
            if !self.result_source.is_scope_final(scope).await? {
                continue;
            }
            let Some(outcome) = self.result_source.final_outcome(scope).await? else {
                continue;
            };
            graded += self.grade_kup(kup, scope, &outcome).await?.0;
        }

        if graded > 0 {
            warn!(kup_id = %kup.id, graded, "Graded predictions missed by scope finalization");
            if kup.state == KupState::Locked {
                kup.transition(KupState::Grading)?;
                self.kup_repository.save_kup(kup).await?;
            }
        }
        Ok(graded)
    }

    async fn finalize_if_complete(&self, kup: &mut Kup) -> Result<(), ScoringError> {
        if !matches!(kup.state, KupState::Locked | KupState::Grading) {
            return Ok(());
        }
        if self.result_source.is_scope_final(&kup.scope).await? {
            kup.transition(KupState::Final)?;
            self.kup_repository.save_kup(kup).await?;
            info!(kup_id = %kup.id, scope = %kup.scope, "Kup scope complete, standings final");
        }
        Ok(())
    }

    async fn needs_recompute(&self, kup: &Kup) -> Result<bool, ScoringError> {
        if matches!(kup.state, KupState::Open | KupState::Final) {
            return Ok(false);
        }

        let last_graded_at = self.prediction_repository.last_graded_at(&kup.id).await?;
        let stale = match self.ranking_repository.get_table(&kup.id).await? {
            Some(table) => table.is_stale(last_graded_at),
            None => true,
        };
        if stale {
            return Ok(true);
        }

        Ok(self.result_source.is_scope_final(&kup.scope).await?)
    }

    async fn load_kup(&self, kup_id: &str) -> Result<Kup, ScoringError> {
        self.kup_repository
            .get_kup(kup_id)
            .await?
            .ok_or_else(|| ScoringError::KupNotFound(kup_id.to_string()))
    }

    async fn current_table(&self, kup: &Kup) -> Result<RankingTable, ScoringError> {
        Ok(match self.ranking_repository.get_table(&kup.id).await? {
            Some(snapshot) => (*snapshot).clone(),
            None => RankingTable::new(kup.id.clone(), &kup.members),
        })
    }

    async fn notify(&self, kup_id: &str, top: Vec<RankingEntry>, participants: usize) {
        self.event_bus
            .emit_to_kup(
                kup_id,
                KupEvent::RankingUpdated {
                    kup_id: kup_id.to_string(),
                    top,
                    participants,
                },
            )
            .await;
    }
}

pub struct ScoringServiceBuilder {
    kup_repository: Arc<dyn KupRepository>,
    prediction_repository: Arc<dyn PredictionRepository>,
    ranking_repository: Arc<dyn RankingRepository>,
    result_source: Arc<dyn ResultSource>,
    locks: KupLocks,
    registry: Option<Arc<PointsRuleRegistry>>,
    event_bus: Option<EventBus>,
    config: SchedulerConfig,
}

impl ScoringServiceBuilder {
    pub fn with_registry(mut self, registry: Arc<PointsRuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ScoringService {
        ScoringService {
            kup_repository: self.kup_repository,
            prediction_repository: self.prediction_repository,
            ranking_repository: self.ranking_repository,
            result_source: self.result_source,
            registry: self.registry.unwrap_or_default(),
            event_bus: self.event_bus.unwrap_or_default(),
            locks: self.locks,
            config: self.config,
        }
    }
}
