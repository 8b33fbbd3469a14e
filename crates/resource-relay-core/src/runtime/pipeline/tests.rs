// crates/resource-relay-core/src/runtime/pipeline/tests.rs
// ============================================================================
// Module: Middleware Pipeline Tests
// Description: Unit tests for pipeline ordering and the built-in stages.
// Purpose: Validate short-circuiting and working-copy semantics.
// Dependencies: resource-relay-core, serde_json
// ============================================================================

//! ## Overview
//! Validates that stages run in order, stop once an outcome is set, and that
//! the built-in stages produce the expected responses.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use super::Exchange;
use super::GeneratePhysicalId;
use super::HandleDelete;
use super::Pipeline;
use super::RequireProperties;
use crate::core::Outcome;
use crate::core::RequestObject;
use crate::core::ResponseStatus;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn request(request_type: &str, physical_id: Option<&str>, properties: Value) -> RequestObject {
    let mut value = json!({
        "RequestType": request_type,
        "ResponseURL": "https://callback.example.com/response",
        "StackId": "arn:stack/demo",
        "RequestId": "req-1",
        "ResourceType": "Custom::Demo",
        "LogicalResourceId": "Demo",
        "ResourceProperties": properties,
    });
    if let Some(id) = physical_id {
        value["PhysicalResourceId"] = json!(id);
    }
    RequestObject::parse(value).expect("valid request")
}

fn envelope(exchange: &Exchange<'_>) -> (ResponseStatus, Option<String>, Option<String>) {
    match exchange.outcome.as_ref() {
        Some(Outcome::Envelope(response)) => (
            response.status(),
            response.reason().map(str::to_string),
            response.physical_resource_id().map(str::to_string),
        ),
        other => panic!("expected envelope outcome, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Pipeline Tests
// ============================================================================

#[test]
fn empty_pipeline_leaves_exchange_unresolved() {
    let pipeline = Pipeline::new();
    let exchange = pipeline.run(Exchange::new(request("Create", None, json!({})), None));
    assert!(pipeline.is_empty());
    assert!(!exchange.is_resolved());
}

#[test]
fn stage_names_follow_registration_order() {
    let pipeline = Pipeline::new()
        .with(GeneratePhysicalId)
        .with(HandleDelete)
        .with(RequireProperties::new(["Key"]));
    assert_eq!(pipeline.len(), 3);
    assert_eq!(
        pipeline.stage_names(),
        vec!["generate_physical_id", "handle_delete", "require_properties"]
    );
}

#[test]
fn resolved_exchange_skips_later_stages() {
    let pipeline = Pipeline::new().with(HandleDelete).with(RequireProperties::new(["Missing"]));
    let exchange = pipeline.run(Exchange::new(request("Delete", Some("pid-1"), json!({})), None));
    let (status, reason, physical_id) = envelope(&exchange);
    assert_eq!(status, ResponseStatus::Success);
    assert_eq!(reason, None);
    assert_eq!(physical_id.as_deref(), Some("pid-1"));
}

// ============================================================================
// SECTION: Built-In Stage Tests
// ============================================================================

#[test]
fn generate_physical_id_fills_missing_id() {
    let original = request("Create", None, json!({}));
    let exchange = Pipeline::new().with(GeneratePhysicalId).run(Exchange::new(original.clone(), None));
    let generated = exchange.request.physical_resource_id().expect("generated id");
    assert_eq!(generated.len(), 32);
    assert!(generated.chars().all(|ch| ch.is_ascii_hexdigit()));
    assert!(original.physical_resource_id().is_none());
    assert!(!exchange.is_resolved());
}

#[test]
fn generate_physical_id_keeps_existing_id() {
    let exchange = Pipeline::new()
        .with(GeneratePhysicalId)
        .run(Exchange::new(request("Update", Some("keep-me"), json!({})), None));
    assert_eq!(exchange.request.physical_resource_id(), Some("keep-me"));
}

#[test]
fn handle_delete_ignores_other_request_types() {
    let exchange =
        Pipeline::new().with(HandleDelete).run(Exchange::new(request("Create", None, json!({})), None));
    assert!(!exchange.is_resolved());
}

#[test]
fn require_properties_reports_first_missing_property() {
    let exchange = Pipeline::new()
        .with(RequireProperties::new(["Present", "Absent", "AlsoAbsent"]))
        .run(Exchange::new(request("Update", Some("pid-9"), json!({"Present": 1})), None));
    let (status, reason, physical_id) = envelope(&exchange);
    assert_eq!(status, ResponseStatus::Failed);
    assert_eq!(reason.as_deref(), Some("Property Absent missing, sending failure signal"));
    assert_eq!(physical_id.as_deref(), Some("pid-9"));
}

#[test]
fn require_properties_passes_when_all_present() {
    let stage = RequireProperties::new(["A", "B"]);
    assert_eq!(stage.expected(), ["A".to_string(), "B".to_string()]);
    let exchange = Pipeline::new()
        .with(stage)
        .run(Exchange::new(request("Create", None, json!({"A": 1, "B": 2})), None));
    assert!(!exchange.is_resolved());
}

#[test]
fn generated_id_flows_into_later_stage_responses() {
    let exchange = Pipeline::new()
        .with(GeneratePhysicalId)
        .with(RequireProperties::new(["Absent"]))
        .run(Exchange::new(request("Create", None, json!({})), None));
    let (_, _, physical_id) = envelope(&exchange);
    assert_eq!(physical_id.as_deref(), exchange.request.physical_resource_id());
}
