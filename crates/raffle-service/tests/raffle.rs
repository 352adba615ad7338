//! Public raffle API integration tests.

mod common;

use common::TestHarness;
use raffle_core::SlotNumber;
use raffle_store::Store;
use serde_json::json;

fn slot(n: i64) -> SlotNumber {
    SlotNumber::new(n).unwrap()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn list_starts_empty() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/raffle").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_is_ordered_by_slot() {
    let harness = TestHarness::new();
    harness.reserve(42, "Carla Souza").await;
    harness.reserve(3, "Bruno Lima").await;
    harness.reserve(17, "Ana Silva").await;

    let body: Vec<serde_json::Value> = harness.server.get("/api/raffle").await.json();
    let slots: Vec<i64> = body.iter().map(|e| e["slot"].as_i64().unwrap()).collect();
    assert_eq!(slots, vec![3, 17, 42]);
}

// ============================================================================
// Single reservation
// ============================================================================

#[tokio::test]
async fn reserve_slot_success() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/raffle")
        .json(&json!({
            "slot": 7,
            "buyer_name": "Ana Silva",
            "phone": "11999990000"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ok"], true);

    let entries: Vec<serde_json::Value> = harness.server.get("/api/raffle").await.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["slot"], 7);
    assert_eq!(entries[0]["buyer_name"], "Ana Silva");
    assert_eq!(entries[0]["phone"], "11999990000");
    assert_eq!(entries[0]["status"], "reserved");
    assert!(entries[0]["paid_at"].is_null());
    assert!(entries[0]["reserved_at"].is_string());
}

#[tokio::test]
async fn every_slot_can_be_reserved() {
    let harness = TestHarness::new();

    for n in 1..=100 {
        harness.reserve(n, &format!("Buyer {n}")).await;
    }

    let entries: Vec<serde_json::Value> = harness.server.get("/api/raffle").await.json();
    assert_eq!(entries.len(), 100);
    assert_eq!(entries[0]["slot"], 1);
    assert_eq!(entries[99]["slot"], 100);
    assert!(entries.iter().all(|e| e["status"] == "reserved"));
}

#[tokio::test]
async fn reserve_trims_fields() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/api/raffle")
        .json(&json!({
            "slot": 8,
            "buyer_name": "  Ana Silva ",
            "phone": " 11999990000 "
        }))
        .await
        .assert_status_ok();

    let entry = harness.store.get_entry(slot(8)).await.unwrap().unwrap();
    assert_eq!(entry.buyer_name, "Ana Silva");
    assert_eq!(entry.phone, "11999990000");
}

#[tokio::test]
async fn reserve_taken_slot_conflicts() {
    let harness = TestHarness::new();
    harness.reserve(7, "Ana Silva").await;

    let response = harness
        .server
        .post("/api/raffle")
        .json(&json!({
            "slot": 7,
            "buyer_name": "Bruno Lima",
            "phone": "11988887777"
        }))
        .await;

    assert_eq!(response.status_code(), 409);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "slot_taken");

    // The first reservation is untouched
    let entry = harness.store.get_entry(slot(7)).await.unwrap().unwrap();
    assert_eq!(entry.buyer_name, "Ana Silva");
}

#[tokio::test]
async fn reserve_missing_fields_is_bad_request() {
    let harness = TestHarness::new();

    for body in [
        json!({ "buyer_name": "Ana Silva", "phone": "1199" }),
        json!({ "slot": 4, "phone": "1199" }),
        json!({ "slot": 4, "buyer_name": "Ana Silva" }),
        json!({ "slot": 4, "buyer_name": "   ", "phone": "1199" }),
    ] {
        let response = harness.server.post("/api/raffle").json(&body).await;
        assert_eq!(response.status_code(), 400, "body: {body}");
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"], "Missing required fields");
        assert_eq!(error["code"], "bad_request");
    }

    assert!(harness.store.list_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn reserve_out_of_range_slot_is_bad_request() {
    let harness = TestHarness::new();

    for n in [0, 101, -5] {
        let response = harness
            .server
            .post("/api/raffle")
            .json(&json!({ "slot": n, "buyer_name": "Ana Silva", "phone": "1199" }))
            .await;
        assert_eq!(response.status_code(), 400, "slot {n}");
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/raffle")
        .text("{not json")
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "bad_request");
}

// ============================================================================
// Batch reservation
// ============================================================================

#[tokio::test]
async fn batch_reserves_all_slots() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/raffle/batch")
        .json(&json!({
            "slots": [12, 5, 40, 5],
            "buyer_name": "Ana Silva",
            "phone": "11999990000"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["reserved"], json!([5, 12, 40]));
    assert_eq!(harness.store.list_entries().await.unwrap().len(), 3);
}

#[tokio::test]
async fn batch_with_taken_slot_reserves_nothing() {
    let harness = TestHarness::new();
    harness.reserve(12, "Bruno Lima").await;

    let response = harness
        .server
        .post("/api/raffle/batch")
        .json(&json!({
            "slots": [5, 12, 40],
            "buyer_name": "Ana Silva",
            "phone": "11999990000"
        }))
        .await;

    assert_eq!(response.status_code(), 409);
    let entries = harness.store.list_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].buyer_name, "Bruno Lima");
}

#[tokio::test]
async fn batch_without_slots_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/raffle/batch")
        .json(&json!({
            "slots": [],
            "buyer_name": "Ana Silva",
            "phone": "11999990000"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
}

// ============================================================================
// Info
// ============================================================================

#[tokio::test]
async fn info_returns_price_and_pix() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/raffle/info").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["slot_count"], 100);
    assert_eq!(body["ticket_price_cents"], 1000);
    assert_eq!(body["pix_key"], "19991318550");
    assert_eq!(body["pix_bank"], "Nubank");
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn reserve_then_confirm_shows_paid() {
    let harness = TestHarness::new();
    harness.reserve(7, "Ana Silva").await;

    harness
        .server
        .post("/api/admin/confirm")
        .json(&json!({ "slot": 7, "pin": common::TEST_PIN }))
        .await
        .assert_status_ok();

    let entries: Vec<serde_json::Value> = harness.server.get("/api/raffle").await.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["buyer_name"], "Ana Silva");
    assert_eq!(entries[0]["status"], "paid");
    assert!(entries[0]["paid_at"].is_string());
}
