//! Integration tests for grantor edits.
//!
//! Edits arrive through the dispatcher (debounced) or directly through the
//! pending request. Each one is validated, re-rendered and becomes the
//! state a later grant is produced from.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::Harness;
use grantflow_core::{ElementId, EventKind, InputValue, UserInputEvent};
use grantflow_test::token_stream::{AMOUNT_PER_SECOND, INITIAL_AMOUNT, MAX_AMOUNT};
use grantflow_test::{TokenStreamHandler, token_stream_request};

#[tokio::test(start_paused = true)]
async fn test_only_final_edit_is_validated_and_granted() {
    let h = Harness::new();
    let pending = h.orchestrator.start(token_stream_request(true)).await.unwrap();
    let id = pending.session_id().clone();
    h.wait_for_content(&id).await;

    h.type_into(&id, AMOUNT_PER_SECOND, "2").await;
    h.type_into(&id, AMOUNT_PER_SECOND, "25").await;
    h.wait_for_field(&id, AMOUNT_PER_SECOND, "25").await;
    assert_eq!(h.probe.validated_amounts(), vec!["10", "25"]);

    let finishing = tokio::spawn(pending.finish());
    h.press(&id, h.grant()).await;
    let outcome = finishing.await.unwrap().unwrap();
    let data = &outcome.response().unwrap().permission.data;
    assert_eq!(data["amountPerSecond"], serde_json::json!(25));
    assert_eq!(data["initialAmount"], serde_json::json!(100));
}

#[tokio::test]
async fn test_edit_rejected_when_adjustment_not_allowed() {
    let h = Harness::new();
    let pending = h.orchestrator.start(token_stream_request(false)).await.unwrap();
    let id = pending.session_id().clone();
    h.wait_for_content(&id).await;
    let renders = h.host.renders(&id).len();

    let err = pending.apply_edit(AMOUNT_PER_SECOND, "99").await.unwrap_err();
    assert_eq!(err.to_string(), "Permission adjustment is not allowed");

    h.type_into(&id, AMOUNT_PER_SECOND, "99").await;
    h.orchestrator.dispatcher().drain_pending().await;

    assert_eq!(h.host.renders(&id).len(), renders);
    let ui = h.host.current(&id).unwrap();
    assert_eq!(ui.field_value(&ElementId::from(AMOUNT_PER_SECOND)), Some("10"));

    let finishing = tokio::spawn(pending.finish());
    h.press(&id, h.grant()).await;
    let outcome = finishing.await.unwrap().unwrap();
    assert_eq!(
        outcome.response().unwrap().permission.data["amountPerSecond"],
        serde_json::json!(10)
    );
}

#[tokio::test]
async fn test_non_adjustable_fields_render_read_only() {
    let h = Harness::new();
    let pending = h.orchestrator.start(token_stream_request(false)).await.unwrap();
    let id = pending.session_id().clone();

    let ui = h.wait_for_content(&id).await;
    for field in [AMOUNT_PER_SECOND, INITIAL_AMOUNT, MAX_AMOUNT] {
        assert!(matches!(
            ui.find(&ElementId::from(field)),
            Some(grantflow_core::UiElement::Field { disabled: true, .. })
        ));
    }
    drop(pending);
}

#[tokio::test(start_paused = true)]
async fn test_edits_of_different_fields_are_serialized() {
    let h = Harness::with_handler(
        TokenStreamHandler::new().with_metadata_delay(Duration::from_millis(100)),
    );
    let pending = h.orchestrator.start(token_stream_request(true)).await.unwrap();
    let id = pending.session_id().clone();
    h.wait_for_content(&id).await;

    h.type_into(&id, AMOUNT_PER_SECOND, "20").await;
    h.type_into(&id, MAX_AMOUNT, "5000").await;

    let amount = ElementId::from(AMOUNT_PER_SECOND);
    let max = ElementId::from(MAX_AMOUNT);
    h.host
        .wait_for_render(&id, |ui| {
            ui.field_value(&amount) == Some("20") && ui.field_value(&max) == Some("5000")
        })
        .await;

    let log = h.probe.log();
    assert_eq!(log.len(), 6);
    for pair in log.chunks(2) {
        let begun = pair[0].strip_prefix("begin:").unwrap();
        let ended = pair[1].strip_prefix("end:").unwrap();
        assert_eq!(begun, ended, "metadata derivations overlapped: {log:?}");
    }
    assert_eq!(log.last().map(String::as_str), Some("end:20/100/5000"));
    drop(pending);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_value_disables_grant_until_fixed() {
    let h = Harness::new();
    let pending = h.orchestrator.start(token_stream_request(true)).await.unwrap();
    let id = pending.session_id().clone();
    h.wait_for_content(&id).await;
    let grant = ElementId::from(h.grant());
    let finishing = tokio::spawn(pending.finish());

    h.type_into(&id, INITIAL_AMOUNT, "lots").await;
    let ui = h.wait_for_field(&id, INITIAL_AMOUNT, "lots").await;
    assert_eq!(ui.button_disabled(&grant), Some(true));
    assert!(ui.field_error(&ElementId::from(INITIAL_AMOUNT)).is_some());

    h.press(&id, h.grant()).await;
    assert_eq!(h.host.closed_with(&id), None);

    h.type_into(&id, INITIAL_AMOUNT, "50").await;
    let ui = h.wait_for_field(&id, INITIAL_AMOUNT, "50").await;
    assert_eq!(ui.button_disabled(&grant), Some(false));

    h.press(&id, h.grant()).await;
    let outcome = finishing.await.unwrap().unwrap();
    assert_eq!(
        outcome.response().unwrap().permission.data["initialAmount"],
        serde_json::json!(50)
    );
}

#[tokio::test(start_paused = true)]
async fn test_failing_edit_does_not_break_the_session() {
    let h = Harness::new();
    let pending = h.orchestrator.start(token_stream_request(true)).await.unwrap();
    let id = pending.session_id().clone();
    h.wait_for_content(&id).await;

    let wrong_type = UserInputEvent {
        element_id: ElementId::from(AMOUNT_PER_SECOND),
        kind: EventKind::InputChange,
        value: Some(InputValue::from(true)),
    };
    h.orchestrator.dispatcher().dispatch(&id, wrong_type).await;
    h.orchestrator.dispatcher().drain_pending().await;
    assert_eq!(
        h.host
            .current(&id)
            .unwrap()
            .field_value(&ElementId::from(AMOUNT_PER_SECOND)),
        Some("10")
    );

    h.type_into(&id, AMOUNT_PER_SECOND, "12").await;
    h.wait_for_field(&id, AMOUNT_PER_SECOND, "12").await;

    let finishing = tokio::spawn(pending.finish());
    h.press(&id, h.grant()).await;
    let outcome = finishing.await.unwrap().unwrap();
    assert_eq!(
        outcome.response().unwrap().permission.data["amountPerSecond"],
        serde_json::json!(12)
    );
}

#[tokio::test]
async fn test_early_edit_waits_for_initial_context() {
    let handler = TokenStreamHandler::new().with_context_gate();
    let h = Harness::with_handler(handler);
    let pending = Arc::new(h.orchestrator.start(token_stream_request(true)).await.unwrap());
    let id = pending.session_id().clone();

    let editing = {
        let pending = Arc::clone(&pending);
        tokio::spawn(async move { pending.apply_edit(MAX_AMOUNT, "700").await })
    };
    tokio::task::yield_now().await;
    assert!(!editing.is_finished());

    h.probe.release_context();
    editing.await.unwrap().unwrap();

    let ui = h.host.current(&id).unwrap();
    assert_eq!(ui.field_value(&ElementId::from(MAX_AMOUNT)), Some("700"));
    assert_eq!(h.probe.contexts_built(), 1);
}
