//! Resolution, label lookup and batch coordination without a session.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;

use boxwise_client::{BoxApi, CodeLookup, LabelLookup};
use boxwise_core::batch::{BatchOperation, MutationResponse};
use boxwise_core::box_state::BoxState;
use boxwise_core::code_format::CodeClassifier;
use boxwise_core::resolution::ResolutionResult;
use boxwise_core::selection::SelectedBoxes;
use boxwise_scan::error::BatchFailureKind;
use boxwise_scan::{BatchCoordinator, BatchError, LabelLookupService, ResolutionService, ScanError};

use common::{box_at, hash, in_stock, updated, Call, FakeBoxApi, FakeError};

fn dyn_api(api: &Arc<FakeBoxApi>) -> Arc<dyn BoxApi> {
    api.clone()
}

// ---------------------------------------------------------------------------
// ResolutionService
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolver_maps_every_lookup_outcome() {
    let api = FakeBoxApi::new();
    api.code_for(&hash(1), in_stock("1"))
        .code(&hash(2), Ok(CodeLookup::NotAssigned))
        .code(&hash(3), Ok(CodeLookup::BoxNotAuthorized))
        .code(&hash(4), Ok(CodeLookup::BoxNotFound))
        .code(&hash(5), Err(FakeError::Forbidden))
        .code(&hash(6), Err(FakeError::Unavailable));
    let resolver = ResolutionService::new(dyn_api(&api));

    assert_matches!(
        resolver.resolve(&hash(1), false).await,
        Ok(ResolutionResult::Success { ref resolved }) if resolved.label_identifier == "1"
    );
    assert_matches!(
        resolver.resolve(&hash(2), false).await,
        Ok(ResolutionResult::NotAssignedToBox { .. })
    );
    assert_matches!(
        resolver.resolve(&hash(3), true).await,
        Ok(ResolutionResult::NotAuthorized)
    );
    assert_matches!(
        resolver.resolve(&hash(4), true).await,
        Ok(ResolutionResult::NotFound)
    );
    assert_matches!(
        resolver.resolve(&hash(5), true).await,
        Ok(ResolutionResult::NotAuthorized)
    );
    assert_matches!(
        resolver.resolve(&hash(6), true).await,
        Ok(ResolutionResult::TransientFailure { ref error_detail }) if error_detail.contains("503")
    );
    // Unknown code.
    assert_matches!(
        resolver.resolve(&hash(7), true).await,
        Ok(ResolutionResult::NotRecognizedFormat)
    );
    assert_eq!(api.call_count(), 7);
}

#[tokio::test]
async fn resolver_short_circuits_foreign_codes() {
    let api = FakeBoxApi::new();
    let resolver = ResolutionService::new(dyn_api(&api));

    for code in ["", "   ", "hello", "https://example.com/?q=1", &hash(1)[..31]] {
        assert_matches!(
            resolver.resolve(code, true).await,
            Ok(ResolutionResult::NotRecognizedFormat)
        );
    }
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn resolver_honours_configured_url_prefix() {
    let api = FakeBoxApi::new();
    api.code_for(&hash(1), in_stock("1"));
    let resolver = ResolutionService::with_classifier(
        dyn_api(&api),
        CodeClassifier::with_url_prefix("https://boxes.example.org/"),
    );

    let ours = format!("https://boxes.example.org/mobile-app/?qr={}", hash(1));
    let theirs = format!("https://other.example.com/?qr={}", hash(1));

    assert_matches!(
        resolver.resolve(&ours, true).await,
        Ok(ResolutionResult::Success { .. })
    );
    assert_matches!(
        resolver.resolve(&theirs, true).await,
        Ok(ResolutionResult::NotRecognizedFormat)
    );
    assert_eq!(api.calls(), vec![Call::ResolveCode(hash(1))]);
}

#[tokio::test]
async fn resolver_surfaces_malformed_response_as_error() {
    let api = FakeBoxApi::new();
    api.code(&hash(1), Err(FakeError::Malformed));
    let resolver = ResolutionService::new(dyn_api(&api));

    assert_matches!(
        resolver.resolve(&hash(1), false).await,
        Err(ScanError::Unexpected(_))
    );
}

// ---------------------------------------------------------------------------
// LabelLookupService
// ---------------------------------------------------------------------------

#[tokio::test]
async fn label_lookup_trims_and_maps() {
    let api = FakeBoxApi::new();
    api.label("77", Ok(LabelLookup::Box(in_stock("77"))))
        .label("78", Ok(LabelLookup::Deleted))
        .label("79", Err(FakeError::Forbidden));
    let labels = LabelLookupService::new(dyn_api(&api));

    assert_matches!(
        labels.lookup("  77\t").await,
        Ok(ResolutionResult::Success { .. })
    );
    assert_matches!(labels.lookup("78").await, Ok(ResolutionResult::NotFound));
    assert_matches!(labels.lookup("79").await, Ok(ResolutionResult::NotAuthorized));
    assert_matches!(
        labels.lookup("80").await,
        Ok(ResolutionResult::NotRecognizedFormat)
    );
    assert_eq!(api.calls()[0], Call::ResolveLabel("77".into()));
}

#[tokio::test]
async fn blank_label_is_not_looked_up() {
    let api = FakeBoxApi::new();
    let labels = LabelLookupService::new(dyn_api(&api));

    assert_matches!(
        labels.lookup("   ").await,
        Ok(ResolutionResult::NotRecognizedFormat)
    );
    assert_eq!(api.call_count(), 0);
}

// ---------------------------------------------------------------------------
// BatchCoordinator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coordinator_sends_one_call_with_every_identifier() {
    let api = FakeBoxApi::new();
    let coordinator = BatchCoordinator::new(dyn_api(&api));
    let mut selection = SelectedBoxes::new();
    for label in ["1", "2", "3"] {
        selection.add(in_stock(label));
    }

    let outcome = coordinator
        .submit_selection(&selection, BatchOperation::AssignTags { tag_ids: vec![7, 8] })
        .await
        .unwrap();

    assert_eq!(outcome.updated.len(), 3);
    assert_eq!(
        api.calls(),
        vec![Call::AssignTags {
            label_identifiers: vec!["1".into(), "2".into(), "3".into()],
            tag_ids: vec![7, 8],
        }]
    );
    // The coordinator never prunes.
    assert_eq!(selection.count(), 3);
}

#[tokio::test]
async fn coordinator_refuses_invalid_payload_and_empty_selection() {
    let api = FakeBoxApi::new();
    let coordinator = BatchCoordinator::new(dyn_api(&api));

    assert_matches!(
        coordinator
            .submit(vec![in_stock("1")], BatchOperation::AssignTags { tag_ids: vec![] })
            .await,
        Err(BatchError::InvalidOperation(_))
    );
    assert_matches!(
        coordinator
            .submit(vec![], BatchOperation::MoveToLocation { location_id: 1 })
            .await,
        Err(BatchError::EmptySelection)
    );
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn coordinator_blocks_moving_boxes_on_a_shipment() {
    let api = FakeBoxApi::new();
    let coordinator = BatchCoordinator::new(dyn_api(&api));
    let snapshot = vec![
        in_stock("1"),
        box_at("2", BoxState::InTransit, 10),
        box_at("3", BoxState::Receiving, 10),
    ];

    let err = coordinator
        .submit(snapshot, BatchOperation::MoveToLocation { location_id: 4 })
        .await
        .unwrap_err();

    assert_matches!(
        err,
        BatchError::Ineligible { ref label_identifiers } if label_identifiers == &["2", "3"]
    );
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn coordinator_classifies_whole_call_failures() {
    let api = FakeBoxApi::new();
    let coordinator = BatchCoordinator::new(dyn_api(&api));
    let op = BatchOperation::AssignToShipment { shipment_id: 3 };

    api.mutation_reply(Err(FakeError::Forbidden));
    assert_matches!(
        coordinator.submit(vec![in_stock("1")], op.clone()).await,
        Err(BatchError::Failed(ref f)) if f.kind == BatchFailureKind::PermissionDenied
    );

    api.mutation_reply(Err(FakeError::NotFound));
    assert_matches!(
        coordinator.submit(vec![in_stock("1")], op.clone()).await,
        Err(BatchError::Failed(ref f)) if f.kind == BatchFailureKind::TargetNotFound
    );

    api.mutation_reply(Err(FakeError::Malformed));
    assert_matches!(
        coordinator.submit(vec![in_stock("1")], op).await,
        Err(BatchError::Unexpected(_))
    );
    assert_eq!(api.mutation_count(), 3);
}

#[tokio::test]
async fn coordinator_ignores_unsubmitted_identifiers_in_response() {
    let api = FakeBoxApi::new();
    api.mutation_reply(Ok(MutationResponse {
        updated_boxes: vec![updated("1", 5), updated("99", 5)],
        invalid_identifiers: vec![],
    }));
    let coordinator = BatchCoordinator::new(dyn_api(&api));

    let outcome = coordinator
        .submit(
            vec![in_stock("1"), in_stock("2")],
            BatchOperation::MoveToLocation { location_id: 5 },
        )
        .await
        .unwrap();

    assert_eq!(outcome.updated_identifiers(), vec!["1"]);
    assert_eq!(outcome.failed, vec!["2"]);
    assert_eq!(outcome.submitted_count(), 2);
}
