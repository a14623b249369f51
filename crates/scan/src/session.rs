//! Scan sessions: the UI-side owners of scan state.
//!
//! [`BatchSession`] owns one selected-boxes list for the lifetime of a batch
//! session and is the only place it is mutated: adding on a successful
//! scan, undo/clear on user request, and pruning after an operation.
//! [`SingleScanFlow`] resolves one box at a time and navigates.
//!
//! Both run an explicit `Idle -> Resolving -> Idle` cycle. New scans arriving
//! while a lookup or submission is in flight are ignored, not queued. A
//! blocking alert moves the batch session to `AwaitingUserAck` until the user
//! acknowledges it or takes the offered recovery action.
//!
//! Locks are never held across an `.await`. A call whose future is dropped
//! mid-flight (timeout, `select!`, the view going away) returns the session
//! to `Idle` without reporting anything.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use boxwise_client::BoxApi;
use boxwise_core::batch::{BatchOperation, BatchOutcome};
use boxwise_core::boxes::BoxRef;
use boxwise_core::code_format::CodeClassifier;
use boxwise_core::resolution::ResolutionResult;
use boxwise_core::selection::SelectedBoxes;

use crate::coordinator::BatchCoordinator;
use crate::error::{BatchError, ScanError};
use crate::label_lookup::LabelLookupService;
use crate::notify::Notifier;
use crate::reporter::{BlockingAlert, LookupSource, OutcomeReporter, RecoveryAction, Report};
use crate::resolver::ResolutionService;

/// Where a session is in its interaction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Resolving,
    AwaitingUserAck,
}

/// What happened to one scan or submission request.
#[derive(Debug)]
pub enum Disposition<T> {
    /// Another interaction was in progress; nothing was done.
    Ignored,
    /// The session was closed while the call was in flight; the result was
    /// dropped without any UI update.
    Discarded,
    /// The call completed and was reported.
    Completed(T),
}

impl<T> Disposition<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Result of a batch submission together with how it was reported.
#[derive(Debug)]
pub struct BatchSubmission {
    pub result: Result<BatchOutcome, BatchError>,
    pub report: Report,
}

/// Services shared by both session kinds.
struct Lookups {
    resolver: ResolutionService,
    labels: LabelLookupService,
}

impl Lookups {
    fn new(api: &Arc<dyn BoxApi>, classifier: CodeClassifier) -> Self {
        Self {
            resolver: ResolutionService::with_classifier(Arc::clone(api), classifier),
            labels: LabelLookupService::new(Arc::clone(api)),
        }
    }

    async fn lookup(
        &self,
        input: &str,
        source: LookupSource,
        is_batch_context: bool,
    ) -> Result<ResolutionResult, ScanError> {
        match source {
            LookupSource::ScannedCode => self.resolver.resolve(input, is_batch_context).await,
            LookupSource::TypedLabel => self.labels.lookup(input).await,
        }
    }
}

fn emit(notifier: &dyn Notifier, report: &Report) {
    if let Some(notification) = &report.notification {
        notifier.notify(notification.clone());
    }
}

fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    // Every mutation is a single assignment or `SelectedBoxes` call, so
    // poisoned state is still consistent.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Phase and epoch shared by both session kinds.
trait Cycle {
    fn phase_mut(&mut self) -> &mut SessionPhase;
    fn epoch(&self) -> u64;
}

/// One in-flight lookup or submission.
///
/// Dropping it before [`settle`](Self::settle) puts a session that is still
/// `Resolving` in the same epoch back to `Idle`.
struct InFlight<'a, S: Cycle> {
    state: &'a Mutex<S>,
    epoch: u64,
    settled: bool,
}

impl<'a, S: Cycle> InFlight<'a, S> {
    /// Move `Idle -> Resolving`, or `None` if the session is busy.
    fn begin(state: &'a Mutex<S>) -> Option<Self> {
        let mut guard = lock(state);
        let phase = guard.phase_mut();
        if *phase != SessionPhase::Idle {
            tracing::debug!(phase = ?*phase, "Session busy, ignoring input");
            return None;
        }
        *phase = SessionPhase::Resolving;
        Some(Self {
            state,
            epoch: guard.epoch(),
            settled: false,
        })
    }

    fn is_current(&self, state: &S) -> bool {
        state.epoch() == self.epoch
    }

    /// The caller has taken over the phase transition.
    fn settle(&mut self) {
        self.settled = true;
    }
}

impl<S: Cycle> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut guard = lock(self.state);
        if guard.epoch() != self.epoch {
            return;
        }
        let phase = guard.phase_mut();
        if *phase == SessionPhase::Resolving {
            *phase = SessionPhase::Idle;
            tracing::debug!(epoch = self.epoch, "In-flight call abandoned, session idle");
        }
    }
}

// ---------------------------------------------------------------------------
// BatchSession
// ---------------------------------------------------------------------------

struct PendingAlert {
    alert: BlockingAlert,
    operation: BatchOperation,
}

struct BatchState {
    phase: SessionPhase,
    selected: SelectedBoxes,
    pending: Option<PendingAlert>,
    /// Bumped by `close`; in-flight calls from an older epoch are discarded.
    epoch: u64,
}

impl Cycle for BatchState {
    fn phase_mut(&mut self) -> &mut SessionPhase {
        &mut self.phase
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Multi-box scanning with an accumulated selection and batch actions.
pub struct BatchSession {
    lookups: Lookups,
    coordinator: BatchCoordinator,
    reporter: OutcomeReporter,
    notifier: Arc<dyn Notifier>,
    state: Mutex<BatchState>,
}

impl BatchSession {
    pub fn new(api: Arc<dyn BoxApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_classifier(api, notifier, CodeClassifier::new())
    }

    pub fn with_classifier(
        api: Arc<dyn BoxApi>,
        notifier: Arc<dyn Notifier>,
        classifier: CodeClassifier,
    ) -> Self {
        Self {
            lookups: Lookups::new(&api, classifier),
            coordinator: BatchCoordinator::new(api),
            reporter: OutcomeReporter::new(),
            notifier,
            state: Mutex::new(BatchState {
                phase: SessionPhase::Idle,
                selected: SelectedBoxes::new(),
                pending: None,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BatchState> {
        lock(&self.state)
    }

    // ---- scanning ----

    /// Resolve a scanned code and add the box to the list on success.
    pub async fn handle_scan(&self, raw_code: &str) -> Disposition<Report> {
        self.handle_lookup(raw_code, LookupSource::ScannedCode).await
    }

    /// Look up a typed label and add the box to the list on success.
    pub async fn handle_label(&self, label_identifier: &str) -> Disposition<Report> {
        self.handle_lookup(label_identifier, LookupSource::TypedLabel)
            .await
    }

    async fn handle_lookup(&self, input: &str, source: LookupSource) -> Disposition<Report> {
        let Some(mut in_flight) = InFlight::begin(&self.state) else {
            return Disposition::Ignored;
        };

        let result = self.lookups.lookup(input, source, true).await;

        let report = {
            let mut state = self.lock();
            if !in_flight.is_current(&state) {
                tracing::warn!("Batch session closed during lookup, discarding result");
                return Disposition::Discarded;
            }
            in_flight.settle();
            state.phase = SessionPhase::Idle;

            match result {
                Ok(ResolutionResult::Success { resolved }) => {
                    let label = resolved.label_identifier.clone();
                    let added = state.selected.add(resolved);
                    tracing::debug!(
                        label_identifier = %label,
                        was_new = added.was_new,
                        count = state.selected.count(),
                        "Scanned box offered to selection",
                    );
                    self.reporter.batch_added(&label, added)
                }
                Ok(other) => self.reporter.batch_rejected(&other, source, input),
                Err(err) => {
                    tracing::error!(error = %err, "Lookup failed unexpectedly");
                    self.reporter.unexpected()
                }
            }
        };

        emit(self.notifier.as_ref(), &report);
        Disposition::Completed(report)
    }

    // ---- batch operations ----

    /// Submit `op` for a snapshot of the current selection.
    ///
    /// Failed items stay on the list; call [`take_recovery_action`] to prune
    /// them. A whole-call failure leaves the list untouched so the same
    /// submission can simply be retried.
    ///
    /// [`take_recovery_action`]: Self::take_recovery_action
    pub async fn submit(&self, op: BatchOperation) -> Disposition<BatchSubmission> {
        let Some(mut in_flight) = InFlight::begin(&self.state) else {
            return Disposition::Ignored;
        };
        let snapshot = self.lock().selected.contents().to_vec();

        let result = self.coordinator.submit(snapshot, op.clone()).await;

        let report = {
            let mut state = self.lock();
            if !in_flight.is_current(&state) {
                tracing::warn!(
                    operation = op.name(),
                    "Batch session closed during submission, discarding result"
                );
                return Disposition::Discarded;
            }
            in_flight.settle();

            let report = match &result {
                Ok(outcome) => self.reporter.batch_outcome(&op, outcome),
                Err(err) => self.reporter.batch_error(&op, err),
            };

            match &report.alert {
                Some(alert) => {
                    state.phase = SessionPhase::AwaitingUserAck;
                    state.pending = Some(PendingAlert {
                        alert: alert.clone(),
                        operation: op,
                    });
                }
                None => state.phase = SessionPhase::Idle,
            }
            report
        };

        emit(self.notifier.as_ref(), &report);
        Disposition::Completed(BatchSubmission {
            result,
            report,
        })
    }

    // ---- alerts and recovery ----

    /// The alert waiting for acknowledgement, if any.
    pub fn pending_alert(&self) -> Option<BlockingAlert> {
        self.lock().pending.as_ref().map(|p| p.alert.clone())
    }

    /// Dismiss the pending alert without changing the list.
    pub fn acknowledge(&self) {
        let mut state = self.lock();
        if state.pending.take().is_some() {
            state.phase = SessionPhase::Idle;
        }
    }

    /// Apply the pending alert's recovery action and dismiss it. Returns the
    /// removed boxes (empty when no alert was pending).
    pub fn take_recovery_action(&self) -> Vec<BoxRef> {
        let mut state = self.lock();
        let Some(pending) = state.pending.take() else {
            return Vec::new();
        };
        state.phase = SessionPhase::Idle;

        let removed = match pending.alert.action {
            RecoveryAction::RemoveFailedBoxes => {
                let failed: HashSet<&str> = pending
                    .alert
                    .label_identifiers
                    .iter()
                    .map(String::as_str)
                    .collect();
                state
                    .selected
                    .remove_where(|b| failed.contains(b.label_identifier.as_str()))
            }
            RecoveryAction::RemoveIneligibleBoxes => {
                let op = &pending.operation;
                state.selected.remove_where(|b| !op.is_eligible(b))
            }
        };

        tracing::info!(
            action = ?pending.alert.action,
            removed = removed.len(),
            remaining = state.selected.count(),
            "Recovery action applied",
        );
        removed
    }

    // ---- selection ----

    /// Remove the most recently added box.
    pub fn undo_last(&self) -> Option<BoxRef> {
        let undone = self.lock().selected.undo_last();
        if let Some(b) = &undone {
            tracing::debug!(label_identifier = %b.label_identifier, "Undid last scanned box");
        }
        undone
    }

    /// Remove every box from the list.
    pub fn clear(&self) {
        self.lock().selected.clear();
        tracing::debug!("Cleared selected boxes");
    }

    /// End the batch session: drop the list, any pending alert, and the
    /// result of any call still in flight.
    pub fn close(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.phase = SessionPhase::Idle;
        state.pending = None;
        state.selected.clear();
        tracing::debug!(epoch = state.epoch, "Batch session closed");
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn count(&self) -> usize {
        self.lock().selected.count()
    }

    /// Snapshot of the selected boxes, oldest first.
    pub fn contents(&self) -> Vec<BoxRef> {
        self.lock().selected.contents().to_vec()
    }
}

// ---------------------------------------------------------------------------
// SingleScanFlow
// ---------------------------------------------------------------------------

struct SingleState {
    phase: SessionPhase,
    epoch: u64,
}

impl Cycle for SingleState {
    fn phase_mut(&mut self) -> &mut SessionPhase {
        &mut self.phase
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Scan one box and open it (or the creation form for an unassigned code).
pub struct SingleScanFlow {
    lookups: Lookups,
    reporter: OutcomeReporter,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SingleState>,
}

impl SingleScanFlow {
    pub fn new(api: Arc<dyn BoxApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_classifier(api, notifier, CodeClassifier::new())
    }

    pub fn with_classifier(
        api: Arc<dyn BoxApi>,
        notifier: Arc<dyn Notifier>,
        classifier: CodeClassifier,
    ) -> Self {
        Self {
            lookups: Lookups::new(&api, classifier),
            reporter: OutcomeReporter::new(),
            notifier,
            state: Mutex::new(SingleState {
                phase: SessionPhase::Idle,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SingleState> {
        lock(&self.state)
    }

    pub async fn handle_scan(&self, raw_code: &str) -> Disposition<Report> {
        self.handle_lookup(raw_code, LookupSource::ScannedCode).await
    }

    pub async fn handle_label(&self, label_identifier: &str) -> Disposition<Report> {
        self.handle_lookup(label_identifier, LookupSource::TypedLabel)
            .await
    }

    async fn handle_lookup(&self, input: &str, source: LookupSource) -> Disposition<Report> {
        let Some(mut in_flight) = InFlight::begin(&self.state) else {
            return Disposition::Ignored;
        };

        let result = self.lookups.lookup(input, source, false).await;

        {
            let mut state = self.lock();
            if !in_flight.is_current(&state) {
                tracing::warn!("Scanner closed during lookup, discarding result");
                return Disposition::Discarded;
            }
            in_flight.settle();
            state.phase = SessionPhase::Idle;
        }

        let report = match result {
            Ok(result) => self.reporter.single(&result, source, input),
            Err(err) => {
                tracing::error!(error = %err, "Lookup failed unexpectedly");
                self.reporter.unexpected()
            }
        };

        emit(self.notifier.as_ref(), &report);
        Disposition::Completed(report)
    }

    /// The scanner view went away; drop any result still in flight.
    pub fn close(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.phase = SessionPhase::Idle;
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }
}
