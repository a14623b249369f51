//! Outcome Reporter: every resolution or batch outcome becomes exactly one
//! [`Report`].
//!
//! A report carries at most one notification. The only reports without a
//! notification are single-box navigations, where moving to the next screen
//! is the feedback.

use boxwise_core::batch::{BatchOperation, BatchOutcome};
use boxwise_core::resolution::ResolutionResult;
use boxwise_core::selection::AddOutcome;
use boxwise_core::types::{DbId, LabelIdentifier};

use crate::error::{BatchError, BatchFailureKind};
use crate::notify::Notification;

/// Where the looked-up input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    ScannedCode,
    TypedLabel,
}

/// Route the UI should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    BoxDetail {
        base_id: DbId,
        label_identifier: LabelIdentifier,
    },
    /// Create a new box linked to the scanned code.
    CreateBox { raw_code: String },
}

/// One-click fix offered by a blocking alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    RemoveFailedBoxes,
    RemoveIneligibleBoxes,
}

/// Modal alert the user must acknowledge before continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingAlert {
    pub title: String,
    pub message: String,
    pub label_identifiers: Vec<LabelIdentifier>,
    pub action: RecoveryAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    pub notification: Option<Notification>,
    pub navigation: Option<Navigation>,
    pub alert: Option<BlockingAlert>,
}

impl Report {
    fn notify(notification: Notification) -> Self {
        Self {
            notification: Some(notification),
            ..Self::default()
        }
    }

    fn navigate(navigation: Navigation) -> Self {
        Self {
            navigation: Some(navigation),
            ..Self::default()
        }
    }

    fn with_alert(mut self, alert: BlockingAlert) -> Self {
        self.alert = Some(alert);
        self
    }
}

pub const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again.";

/// Stateless translator from outcomes to reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeReporter;

impl OutcomeReporter {
    pub fn new() -> Self {
        Self
    }

    // ---- resolution ----

    /// Single-box mode: success opens the box, an unassigned code opens box
    /// creation, everything else is an error toast.
    pub fn single(&self, result: &ResolutionResult, source: LookupSource, input: &str) -> Report {
        match result {
            ResolutionResult::Success { resolved } => Report::navigate(Navigation::BoxDetail {
                base_id: resolved.base.id,
                label_identifier: resolved.label_identifier.clone(),
            }),
            ResolutionResult::NotAssignedToBox { raw_code } => {
                Report::navigate(Navigation::CreateBox {
                    raw_code: raw_code.clone(),
                })
            }
            other => Report::notify(failure_notification(other, source, input)),
        }
    }

    /// Batch mode, box resolved and offered to the list.
    pub fn batch_added(&self, label_identifier: &str, added: AddOutcome) -> Report {
        if added.was_new {
            Report::notify(Notification::success(format!(
                "Box {label_identifier} was added to the list."
            )))
        } else {
            Report::notify(Notification::info(format!(
                "Box {label_identifier} is already on the list."
            )))
        }
    }

    /// Batch mode, resolution did not produce a box. Nothing is added.
    pub fn batch_rejected(
        &self,
        result: &ResolutionResult,
        source: LookupSource,
        input: &str,
    ) -> Report {
        Report::notify(failure_notification(result, source, input))
    }

    // ---- batch operations ----

    pub fn batch_outcome(&self, op: &BatchOperation, outcome: &BatchOutcome) -> Report {
        let verb = done_phrase(op);
        let updated = outcome.updated.len();
        let satisfied = outcome.already_satisfied.len();
        let failed = outcome.failed.len();

        let mut message = if updated > 0 {
            format!("{} {verb}.", count_boxes(updated))
        } else {
            String::new()
        };
        if satisfied > 0 {
            push_sentence(
                &mut message,
                &format!("{} already {}.", count_boxes(satisfied), satisfied_phrase(op)),
            );
        }

        if failed == 0 {
            return Report::notify(Notification::success(message).with_title(op_title(op)));
        }

        let total = outcome.submitted_count();
        push_sentence(
            &mut message,
            &format!("{failed} of {total} could not be updated."),
        );
        let notification = if updated + satisfied == 0 {
            Notification::error(format!("None of the {} could be updated.", count_boxes(total)))
        } else {
            Notification::warning(message)
        };

        Report::notify(notification.with_title(op_title(op))).with_alert(BlockingAlert {
            title: format!("{} could not be updated", count_boxes(failed)),
            message: "These boxes may have been changed by someone else, or they are not allowed \
                      for this action. Remove them from the list to continue."
                .to_string(),
            label_identifiers: outcome.failed.clone(),
            action: RecoveryAction::RemoveFailedBoxes,
        })
    }

    pub fn batch_error(&self, op: &BatchOperation, err: &BatchError) -> Report {
        let title = op_title(op);
        match err {
            BatchError::EmptySelection => {
                Report::notify(Notification::error("No boxes selected.").with_title(title))
            }
            BatchError::InvalidOperation(core) => {
                Report::notify(Notification::error(core.to_string()).with_title(title))
            }
            BatchError::Ineligible { label_identifiers } => {
                let count = label_identifiers.len();
                Report::notify(
                    Notification::error(format!(
                        "{} cannot be used for this action.",
                        count_boxes(count)
                    ))
                    .with_title(title),
                )
                .with_alert(BlockingAlert {
                    title: "Some boxes are not eligible".to_string(),
                    message: eligibility_rule(op).to_string(),
                    label_identifiers: label_identifiers.clone(),
                    action: RecoveryAction::RemoveIneligibleBoxes,
                })
            }
            BatchError::Failed(failure) => {
                let message = match failure.kind {
                    BatchFailureKind::Transient => {
                        format!("{title} failed. Please wait and try again.")
                    }
                    BatchFailureKind::PermissionDenied => {
                        format!("{title} failed. You don't have permission for this action.")
                    }
                    BatchFailureKind::TargetNotFound => {
                        format!("{title} failed. The selected target no longer exists.")
                    }
                };
                Report::notify(Notification::error(message).with_title(title))
            }
            BatchError::Unexpected(_) => self.unexpected(),
        }
    }

    /// Top-level catch for anything that escaped normalization.
    pub fn unexpected(&self) -> Report {
        Report::notify(Notification::error(SOMETHING_WENT_WRONG))
    }
}

fn failure_notification(result: &ResolutionResult, source: LookupSource, input: &str) -> Notification {
    match result {
        ResolutionResult::NotRecognizedFormat => match source {
            LookupSource::ScannedCode => Notification::error("This is not a box label code."),
            LookupSource::TypedLabel => {
                Notification::error(format!("No box with label {} was found.", input.trim()))
            }
        },
        ResolutionResult::NotAssignedToBox { .. } => {
            Notification::error("No box associated to this code.")
        }
        ResolutionResult::NotAuthorized => {
            Notification::error("You don't have permission to access this box.")
        }
        ResolutionResult::NotFound => Notification::error("This box no longer exists."),
        ResolutionResult::TransientFailure { .. } => {
            Notification::error("Could not look up the box. Please wait and try again.")
        }
        // A success handed to the failure path is a caller bug.
        ResolutionResult::Success { .. } => Notification::error(SOMETHING_WENT_WRONG),
    }
}

fn op_title(op: &BatchOperation) -> &'static str {
    match op {
        BatchOperation::MoveToLocation { .. } => "Move boxes",
        BatchOperation::AssignTags { .. } => "Assign tags",
        BatchOperation::AssignToShipment { .. } => "Assign to shipment",
    }
}

fn done_phrase(op: &BatchOperation) -> &'static str {
    match op {
        BatchOperation::MoveToLocation { .. } => "moved",
        BatchOperation::AssignTags { .. } => "tagged",
        BatchOperation::AssignToShipment { .. } => "assigned to the shipment",
    }
}

fn satisfied_phrase(op: &BatchOperation) -> &'static str {
    match op {
        BatchOperation::MoveToLocation { .. } => "at this location",
        BatchOperation::AssignTags { .. } => "carrying these tags",
        BatchOperation::AssignToShipment { .. } => "on the shipment",
    }
}

fn eligibility_rule(op: &BatchOperation) -> &'static str {
    match op {
        BatchOperation::MoveToLocation { .. } => {
            "Boxes on a shipment cannot be moved. Remove them from the list to continue."
        }
        BatchOperation::AssignTags { .. } => "Remove these boxes from the list to continue.",
        BatchOperation::AssignToShipment { .. } => {
            "Only boxes in stock can be assigned to a shipment. Remove them from the list to continue."
        }
    }
}

fn count_boxes(n: usize) -> String {
    if n == 1 {
        "1 box".to_string()
    } else {
        format!("{n} boxes")
    }
}

fn push_sentence(message: &mut String, sentence: &str) {
    if !message.is_empty() {
        message.push(' ');
    }
    message.push_str(sentence);
}
