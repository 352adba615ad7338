//! Client against a live service backed by the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use raffle_client::{AdminCredential, AdminPage, ClientError, PublicPage, RaffleClient, SlotState};
use raffle_core::{ChangeEvent, ChangeOp, NewReservation, SlotNumber};
use raffle_service::{create_router, AppState, ServiceConfig};
use raffle_store::MemoryStore;

const PIN: &str = "4321";

fn slot(n: i64) -> SlotNumber {
    SlotNumber::new(n).unwrap()
}

async fn spawn_service() -> String {
    let config = ServiceConfig {
        admin_pin: Some(PIN.to_string()),
        ..ServiceConfig::default()
    };
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn reserve_then_confirm_is_visible_as_paid() {
    let base_url = spawn_service().await;
    let client = RaffleClient::new(&base_url).unwrap();

    let mut page = PublicPage::new(client.clone());
    page.reload().await.unwrap();
    page.toggle(slot(7)).unwrap();
    page.first_name = "Ana".into();
    page.last_name = "Silva".into();
    page.phone = "11999990000".into();
    page.submit().await.unwrap();
    assert_eq!(page.slot_state(slot(7)), SlotState::Reserved);

    let admin = AdminPage::new(client.clone());
    admin.set_pin(PIN);
    admin.login().await.unwrap();
    admin.confirm(slot(7)).await.unwrap();

    let entries = client.list_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].buyer_name, "Ana Silva");
    assert!(entries[0].is_paid());
    assert!(entries[0].paid_at.is_some());
}

#[tokio::test]
async fn duplicate_reservation_is_slot_taken() {
    let base_url = spawn_service().await;
    let client = RaffleClient::new(&base_url).unwrap();

    let first = NewReservation::new(slot(11), "Ana Silva", "1199").unwrap();
    let second = NewReservation::new(slot(11), "Bruno Lima", "1188").unwrap();
    client.reserve(&first).await.unwrap();

    let err = client.reserve(&second).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 409, ref code, .. } if code == "slot_taken"));

    let entries = client.list_entries().await.unwrap();
    assert_eq!(entries[0].buyer_name, "Ana Silva");
}

#[tokio::test]
async fn wrong_pin_leaves_entries_alone() {
    let base_url = spawn_service().await;
    let client = RaffleClient::new(&base_url).unwrap();
    client
        .reserve(&NewReservation::new(slot(2), "Ana Silva", "1199").unwrap())
        .await
        .unwrap();

    let wrong = AdminCredential::Pin("0000".into());
    assert!(client.unreserve(slot(2), &wrong).await.is_err());
    assert!(client.reset(&wrong).await.is_err());
    assert_eq!(client.list_entries().await.unwrap().len(), 1);

    let right = AdminCredential::Pin(PIN.into());
    assert_eq!(client.unreserve(slot(2), &right).await.unwrap(), 1);
    assert_eq!(client.unreserve(slot(2), &right).await.unwrap(), 0);
}

#[tokio::test]
async fn change_feed_reports_mutations() {
    let base_url = spawn_service().await;
    let client = RaffleClient::new(&base_url).unwrap();

    let changes = client.subscribe().await.unwrap();
    futures::pin_mut!(changes);

    client
        .reserve(&NewReservation::new(slot(5), "Ana Silva", "1199").unwrap())
        .await
        .unwrap();
    client.reset(&AdminCredential::Pin(PIN.into())).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), changes.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(first, ChangeEvent::insert(slot(5)));

    let second = tokio::time::timeout(Duration::from_secs(5), changes.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(second.op, ChangeOp::Reset);
}
