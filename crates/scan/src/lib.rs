//! Scan resolution and batch box operations.
//!
//! - [`ResolutionService`] / [`LabelLookupService`] turn a scanned code or a
//!   typed label into a [`ResolutionResult`](boxwise_core::resolution::ResolutionResult).
//! - [`BatchCoordinator`] submits one mutation for all selected boxes and
//!   reconciles the per-item response.
//! - [`OutcomeReporter`] turns every outcome into exactly one user-facing
//!   report.
//! - [`BatchSession`] and [`SingleScanFlow`] own the UI-side state and are
//!   the only places the selected-boxes list is mutated.

pub mod coordinator;
pub mod error;
pub mod label_lookup;
pub mod notify;
pub mod reporter;
pub mod resolver;
pub mod session;

pub use coordinator::BatchCoordinator;
pub use error::{BatchError, BatchFailure, ScanError};
pub use label_lookup::LabelLookupService;
pub use notify::{Notification, NotificationBus, NotificationLevel, Notifier};
pub use reporter::{BlockingAlert, LookupSource, Navigation, OutcomeReporter, RecoveryAction, Report};
pub use resolver::ResolutionService;
pub use session::{BatchSession, BatchSubmission, Disposition, SessionPhase, SingleScanFlow};
