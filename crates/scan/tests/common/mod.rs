#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use boxwise_client::{ApiError, BoxApi, CodeLookup, LabelLookup};
use boxwise_core::batch::MutationResponse;
use boxwise_core::box_state::BoxState;
use boxwise_core::boxes::{BaseRef, BoxRef, LocationRef, TagRef, UpdatedBox};
use boxwise_core::types::DbId;
use boxwise_scan::{Notification, Notifier};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A well-formed label hash derived from `n`.
pub fn hash(n: u32) -> String {
    format!("{n:032x}")
}

pub fn box_at(label: &str, state: BoxState, location_id: DbId) -> BoxRef {
    BoxRef {
        label_identifier: label.to_string(),
        state,
        location: Some(LocationRef {
            id: location_id,
            name: format!("Location {location_id}"),
        }),
        base: BaseRef {
            id: 1,
            name: "Lesvos".to_string(),
        },
        tags: Vec::new(),
        last_modified_on: None,
    }
}

pub fn in_stock(label: &str) -> BoxRef {
    box_at(label, BoxState::InStock, 10)
}

pub fn with_tags(mut b: BoxRef, tag_ids: &[DbId]) -> BoxRef {
    b.tags = tag_ids
        .iter()
        .map(|&id| TagRef {
            id,
            name: format!("Tag {id}"),
        })
        .collect();
    b
}

pub fn updated(label: &str, location_id: DbId) -> UpdatedBox {
    UpdatedBox {
        label_identifier: label.to_string(),
        state: BoxState::InStock,
        location: Some(LocationRef {
            id: location_id,
            name: format!("Location {location_id}"),
        }),
        last_modified_on: None,
    }
}

// ---------------------------------------------------------------------------
// FakeBoxApi
// ---------------------------------------------------------------------------

/// Scripted remote failure. `ApiError` is not `Clone`, so scripts store this
/// and convert on every call.
#[derive(Debug, Clone, Copy)]
pub enum FakeError {
    NotFound,
    Forbidden,
    Unavailable,
    Malformed,
}

impl FakeError {
    fn into_api_error(self) -> ApiError {
        match self {
            Self::NotFound => ApiError::NotFound,
            Self::Forbidden => ApiError::InsufficientPermission,
            Self::Unavailable => ApiError::Http {
                status: 503,
                body: "Service Unavailable".to_string(),
            },
            Self::Malformed => ApiError::Malformed("missing field `qrCode`".to_string()),
        }
    }
}

/// One call received by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ResolveCode(String),
    ResolveLabel(String),
    MoveBoxes {
        label_identifiers: Vec<String>,
        location_id: DbId,
    },
    AssignTags {
        label_identifiers: Vec<String>,
        tag_ids: Vec<DbId>,
    },
    AssignToShipment {
        shipment_id: DbId,
        label_identifiers: Vec<String>,
    },
}

/// In-memory [`BoxApi`] with scripted answers.
///
/// Unknown codes and labels answer `NotFound`. Mutations update every
/// submitted box unless a reply is scripted with [`FakeBoxApi::mutation_reply`].
#[derive(Default)]
pub struct FakeBoxApi {
    codes: Mutex<HashMap<String, Result<CodeLookup, FakeError>>>,
    labels: Mutex<HashMap<String, Result<LabelLookup, FakeError>>>,
    mutation: Mutex<Option<Result<MutationResponse, FakeError>>>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBoxApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn code(&self, code: &str, reply: Result<CodeLookup, FakeError>) -> &Self {
        self.codes.lock().unwrap().insert(code.to_string(), reply);
        self
    }

    /// Link `code` to `b`.
    pub fn code_for(&self, code: &str, b: BoxRef) -> &Self {
        self.code(code, Ok(CodeLookup::Box(b)))
    }

    pub fn label(&self, label: &str, reply: Result<LabelLookup, FakeError>) -> &Self {
        self.labels.lock().unwrap().insert(label.to_string(), reply);
        self
    }

    pub fn mutation_reply(&self, reply: Result<MutationResponse, FakeError>) -> &Self {
        *self.mutation.lock().unwrap() = Some(reply);
        self
    }

    /// Make every subsequent call wait until the returned handle is
    /// notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Let calls through again after [`hold`](Self::hold).
    pub fn release(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, Call::ResolveCode(_) | Call::ResolveLabel(_)))
            .count()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn mutate(&self, label_identifiers: &[String], location_id: DbId) -> Result<MutationResponse, ApiError> {
        match self.mutation.lock().unwrap().clone() {
            Some(reply) => reply.map_err(FakeError::into_api_error),
            None => Ok(MutationResponse {
                updated_boxes: label_identifiers
                    .iter()
                    .map(|label| updated(label, location_id))
                    .collect(),
                invalid_identifiers: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl BoxApi for FakeBoxApi {
    async fn resolve_code(&self, code: &str) -> Result<CodeLookup, ApiError> {
        self.record(Call::ResolveCode(code.to_string())).await;
        self.codes
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or(Err(FakeError::NotFound))
            .map_err(FakeError::into_api_error)
    }

    async fn resolve_label(&self, label_identifier: &str) -> Result<LabelLookup, ApiError> {
        self.record(Call::ResolveLabel(label_identifier.to_string()))
            .await;
        self.labels
            .lock()
            .unwrap()
            .get(label_identifier)
            .cloned()
            .unwrap_or(Err(FakeError::NotFound))
            .map_err(FakeError::into_api_error)
    }

    async fn move_boxes(
        &self,
        label_identifiers: &[String],
        location_id: DbId,
    ) -> Result<MutationResponse, ApiError> {
        self.record(Call::MoveBoxes {
            label_identifiers: label_identifiers.to_vec(),
            location_id,
        })
        .await;
        self.mutate(label_identifiers, location_id)
    }

    async fn assign_tags(
        &self,
        label_identifiers: &[String],
        tag_ids: &[DbId],
    ) -> Result<MutationResponse, ApiError> {
        self.record(Call::AssignTags {
            label_identifiers: label_identifiers.to_vec(),
            tag_ids: tag_ids.to_vec(),
        })
        .await;
        self.mutate(label_identifiers, 10)
    }

    async fn assign_to_shipment(
        &self,
        shipment_id: DbId,
        label_identifiers: &[String],
    ) -> Result<MutationResponse, ApiError> {
        self.record(Call::AssignToShipment {
            shipment_id,
            label_identifiers: label_identifiers.to_vec(),
        })
        .await;
        self.mutate(label_identifiers, 10)
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_message(&self) -> Option<String> {
        self.seen.lock().unwrap().last().map(|n| n.message.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}
