//! Raffle HTTP client implementation.

use std::time::Duration;

use futures::Stream;
use reqwest::{Client, RequestBuilder};

use raffle_core::{ChangeEvent, NewReservation, RaffleEntry, SlotNumber};

use crate::error::ClientError;
use crate::stream::change_events;
use crate::types::{
    AdminCredential, AdminPinRequest, AdminSession, AdminSlotRequest, ApiErrorResponse,
    BatchReserveRequest, BatchReserveResponse, OkResponse, RaffleInfo, RemovedResponse,
    ReserveRequest,
};

/// Raffle API client.
///
/// Provides the public reservation calls, the admin calls, and the change
/// feed subscription.
#[derive(Debug, Clone)]
pub struct RaffleClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RaffleClient {
    /// Create a new raffle client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the raffle service (e.g., `"http://localhost:8080"`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new raffle client with custom options.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        // The change feed is long-lived, so the request timeout is applied
        // per call instead of on the client.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(options.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(options.timeout_seconds),
        })
    }

    /// List every entry ordered by slot.
    pub async fn list_entries(&self) -> Result<Vec<RaffleEntry>, ClientError> {
        let response = self.get("/api/raffle").send().await?;
        handle_response(response).await
    }

    /// Raffle facts and payment instructions.
    pub async fn payment_info(&self) -> Result<RaffleInfo, ClientError> {
        let response = self.get("/api/raffle/info").send().await?;
        handle_response(response).await
    }

    /// Reserve one slot.
    pub async fn reserve(&self, reservation: &NewReservation) -> Result<(), ClientError> {
        let request = ReserveRequest {
            slot: reservation.slot,
            buyer_name: reservation.buyer_name.clone(),
            phone: reservation.phone.clone(),
        };

        let response = self.post("/api/raffle").json(&request).send().await?;
        handle_response::<OkResponse>(response).await?;
        Ok(())
    }

    /// Reserve several slots for one buyer. Either all are reserved or none.
    ///
    /// Returns the reserved slots in ascending order.
    pub async fn reserve_batch(
        &self,
        slots: &[SlotNumber],
        buyer_name: &str,
        phone: &str,
    ) -> Result<Vec<SlotNumber>, ClientError> {
        let request = BatchReserveRequest {
            slots: slots.to_vec(),
            buyer_name: buyer_name.to_string(),
            phone: phone.to_string(),
        };

        let response = self.post("/api/raffle/batch").json(&request).send().await?;
        let body: BatchReserveResponse = handle_response(response).await?;
        Ok(body.reserved)
    }

    /// Reserve slots one request at a time, stopping at the first failure.
    ///
    /// Slots reserved before the failure stay reserved.
    pub async fn reserve_each(
        &self,
        reservations: &[NewReservation],
    ) -> Result<Vec<SlotNumber>, ClientError> {
        let mut reserved = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            if let Err(e) = self.reserve(reservation).await {
                tracing::warn!(
                    slot = %reservation.slot,
                    reserved = reserved.len(),
                    error = %e,
                    "Sequential reservation stopped"
                );
                return Err(e);
            }
            reserved.push(reservation.slot);
        }
        Ok(reserved)
    }

    /// Exchange the admin PIN for a session token.
    pub async fn create_session(&self, pin: &str) -> Result<AdminSession, ClientError> {
        let response = self
            .post("/api/admin/session")
            .json(&AdminPinRequest { pin: Some(pin) })
            .send()
            .await?;
        handle_response(response).await
    }

    /// Mark a slot as paid.
    pub async fn confirm_payment(
        &self,
        slot: SlotNumber,
        credential: &AdminCredential,
    ) -> Result<(), ClientError> {
        let body = AdminSlotRequest {
            slot,
            pin: body_pin(credential),
        };
        let response = self
            .admin_post("/api/admin/confirm", credential)
            .json(&body)
            .send()
            .await?;
        handle_response::<OkResponse>(response).await?;
        Ok(())
    }

    /// Release a slot. Returns how many entries were removed (0 or 1).
    pub async fn unreserve(
        &self,
        slot: SlotNumber,
        credential: &AdminCredential,
    ) -> Result<u64, ClientError> {
        let body = AdminSlotRequest {
            slot,
            pin: body_pin(credential),
        };
        let response = self
            .admin_post("/api/admin/unreserve", credential)
            .json(&body)
            .send()
            .await?;
        let body: RemovedResponse = handle_response(response).await?;
        Ok(body.removed)
    }

    /// Remove every entry. Returns how many were removed.
    pub async fn reset(&self, credential: &AdminCredential) -> Result<u64, ClientError> {
        let body = AdminPinRequest {
            pin: body_pin(credential),
        };
        let response = self
            .admin_post("/api/admin/reset", credential)
            .json(&body)
            .send()
            .await?;
        let body: RemovedResponse = handle_response(response).await?;
        Ok(body.removed)
    }

    /// Subscribe to the change feed.
    ///
    /// The stream ends when the server closes the connection.
    pub async fn subscribe(
        &self,
    ) -> Result<impl Stream<Item = Result<ChangeEvent, ClientError>>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/raffle/changes"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        tracing::debug!("Subscribed to change feed");
        Ok(change_events(response.bytes_stream()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).timeout(self.timeout)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).timeout(self.timeout)
    }

    fn admin_post(&self, path: &str, credential: &AdminCredential) -> RequestBuilder {
        match credential {
            AdminCredential::Pin(_) => self.post(path),
            AdminCredential::Session(token) => self.post(path).bearer_auth(token),
        }
    }
}

fn body_pin(credential: &AdminCredential) -> Option<&str> {
    match credential {
        AdminCredential::Pin(pin) => Some(pin.as_str()),
        AdminCredential::Session(_) => None,
    }
}

/// Handle API response and convert errors.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_from_response(response).await)
}

async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();

    match response.json::<ApiErrorResponse>().await {
        Ok(body) => ClientError::Api {
            code: body.code.unwrap_or_else(|| "unknown".to_string()),
            message: body.error,
            status: status.as_u16(),
        },
        Err(_) => ClientError::Api {
            code: "unknown".to_string(),
            message: format!("HTTP {status}"),
            status: status.as_u16(),
        },
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30). Not applied to the change feed.
    pub timeout_seconds: u64,
    /// Connect timeout in seconds (default: 10).
    pub connect_timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn slot(n: i64) -> SlotNumber {
        SlotNumber::new(n).unwrap()
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = RaffleClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_options() {
        let options = ClientOptions {
            timeout_seconds: 5,
            ..ClientOptions::default()
        };
        let client = RaffleClient::with_options("http://localhost:8080", options).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn list_entries_decodes_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/raffle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "slot": 7,
                "buyer_name": "Ana Silva",
                "phone": "11999990000",
                "status": "paid",
                "reserved_at": "2026-03-01T12:00:00Z",
                "paid_at": "2026-03-01T13:00:00Z"
            }])))
            .mount(&server)
            .await;

        let client = RaffleClient::new(server.uri()).unwrap();
        let entries = client.list_entries().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slot, slot(7));
        assert!(entries[0].is_paid());
    }

    #[tokio::test]
    async fn reserve_conflict_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/raffle"))
            .and(body_json(json!({
                "slot": 7,
                "buyer_name": "Ana Silva",
                "phone": "1199"
            })))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": "slot 7 is already taken",
                "code": "slot_taken"
            })))
            .mount(&server)
            .await;

        let client = RaffleClient::new(server.uri()).unwrap();
        let reservation = NewReservation::new(slot(7), "Ana Silva", "1199").unwrap();
        let err = client.reserve(&reservation).await.unwrap_err();

        match err {
            ClientError::Api {
                code,
                message,
                status,
            } => {
                assert_eq!(code, "slot_taken");
                assert_eq!(message, "slot 7 is already taken");
                assert_eq!(status, 409);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/raffle/info"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = RaffleClient::new(server.uri()).unwrap();
        let err = client.payment_info().await.unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn reserve_each_stops_at_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/raffle"))
            .and(body_json(json!({ "slot": 2, "buyer_name": "Ana Silva", "phone": "1199" })))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": "slot 2 is already taken",
                "code": "slot_taken"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/raffle"))
            .and(body_json(json!({ "slot": 1, "buyer_name": "Ana Silva", "phone": "1199" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/raffle"))
            .and(body_json(json!({ "slot": 3, "buyer_name": "Ana Silva", "phone": "1199" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(0)
            .mount(&server)
            .await;

        let client = RaffleClient::new(server.uri()).unwrap();
        let reservations =
            NewReservation::batch(&[slot(1), slot(2), slot(3)], "Ana Silva", "1199").unwrap();

        let err = client.reserve_each(&reservations).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 409, .. }));
    }

    #[tokio::test]
    async fn session_credential_uses_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/unreserve"))
            .and(header("authorization", "Bearer tok-123"))
            .and(body_json(json!({ "slot": 9 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "removed": 1 })),
            )
            .mount(&server)
            .await;

        let client = RaffleClient::new(server.uri()).unwrap();
        let removed = client
            .unreserve(slot(9), &AdminCredential::Session("tok-123".into()))
            .await
            .unwrap();

        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn pin_credential_goes_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/reset"))
            .and(body_json(json!({ "pin": "4321" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "removed": 4 })),
            )
            .mount(&server)
            .await;

        let client = RaffleClient::new(server.uri()).unwrap();
        let removed = client
            .reset(&AdminCredential::Pin("4321".into()))
            .await
            .unwrap();

        assert_eq!(removed, 4);
    }
}
