//! HTTP client for the beverage backend.
//!
//! Uses reqwest with a static API key header on every request. Location-scoped calls add an
//! `X-Location-Id` header taken from the caller, so switching location never requires
//! rebuilding the client.

use super::{
    ApiError, ApiResult, BeverageApi, CoffeeBalance, CoffeeTrackerRequest, InventoryItem,
    InventoryUpdate, Location, LocationId, Person, PersonUpdate, QuickBuyRequest, Statistics,
    Transaction,
};
use async_trait::async_trait;
use reqwest::{
    Method, RequestBuilder, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

/// Backend used when `BEVERAGE_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://brusliste-backend.vercel.app/api";

const API_KEY_HEADER: &str = "X-API-Key";
const LOCATION_HEADER: &str = "X-Location-Id";

/// [`BeverageApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Builds a client for `base_url` that authenticates with `api_key`.
    ///
    /// # Errors
    /// Returns [`ApiError::RequestSetup`] if the key is not a valid header value or the
    /// underlying client cannot be constructed.
    pub fn new(base_url: &str, api_key: &str) -> ApiResult<Self> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| ApiError::RequestSetup(format!("invalid API key header: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, location: Option<LocationId>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match location {
            Some(id) => builder.header(LOCATION_HEADER, id.to_string()),
            None => builder,
        }
    }

    #[instrument(skip(self))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        location: Option<LocationId>,
    ) -> ApiResult<T> {
        let response = self
            .request(Method::GET, path, location)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(path, &e))?;
        let response = check_status(path, response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(path, &e))?;
        debug!("GET {} returned {} bytes", path, body.len());

        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedResponse {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    #[instrument(skip(self, body))]
    async fn post_json<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        location: LocationId,
        body: &B,
    ) -> ApiResult<()> {
        let builder = self.request(Method::POST, path, Some(location)).json(body);
        execute(path, builder).await
    }

    #[instrument(skip(self))]
    async fn send_empty(&self, method: Method, path: &str, location: LocationId) -> ApiResult<()> {
        let builder = self.request(method, path, Some(location));
        execute(path, builder).await
    }
}

/// Sends a mutating request; any response body is discarded.
async fn execute(path: &str, builder: RequestBuilder) -> ApiResult<()> {
    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::from_reqwest(path, &e))?;
    check_status(path, response).await?;
    debug!("{} accepted", path);
    Ok(())
}

async fn check_status(path: &str, response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    warn!("{} returned HTTP {}", path, status.as_u16());
    Err(ApiError::Status {
        status: status.as_u16(),
        message: server_message(&text),
    })
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies are searched for `message`, `error` and `detail` keys; short plain-text bodies
/// are used as-is. HTML error pages yield `None`.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return None;
    }

    serde_json::from_str::<serde_json::Value>(trimmed).map_or_else(
        |_| Some(trimmed.to_string()),
        |value| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
                .map(str::to_string)
        },
    )
}

#[async_trait]
impl BeverageApi for HttpApi {
    async fn people(&self, location: LocationId) -> ApiResult<Vec<Person>> {
        self.get_json("/people", Some(location)).await
    }

    async fn upsert_person(&self, location: LocationId, update: &PersonUpdate) -> ApiResult<()> {
        self.post_json("/people", location, update).await
    }

    async fn delete_person(&self, location: LocationId, person_id: i64) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("/people/{person_id}"), location)
            .await
    }

    async fn pay_person(&self, location: LocationId, person_id: i64) -> ApiResult<()> {
        self.send_empty(Method::POST, &format!("/people/{person_id}/pay"), location)
            .await
    }

    async fn locations(&self) -> ApiResult<Vec<Location>> {
        self.get_json("/locations", None).await
    }

    async fn coffee_balances(&self, location: LocationId) -> ApiResult<Vec<CoffeeBalance>> {
        self.get_json("/coffee-balance", Some(location)).await
    }

    async fn track_coffee(
        &self,
        location: LocationId,
        entry: &CoffeeTrackerRequest,
    ) -> ApiResult<()> {
        self.post_json("/coffee-tracker", location, entry).await
    }

    async fn inventory(&self, location: LocationId) -> ApiResult<Vec<InventoryItem>> {
        self.get_json("/inventory", Some(location)).await
    }

    async fn update_inventory(
        &self,
        location: LocationId,
        update: &InventoryUpdate,
    ) -> ApiResult<()> {
        self.post_json("/inventory/update", location, update).await
    }

    async fn quick_buy(&self, location: LocationId, request: &QuickBuyRequest) -> ApiResult<()> {
        self.post_json("/quickbuy", location, request).await
    }

    async fn transactions(&self, location: LocationId) -> ApiResult<Vec<Transaction>> {
        self.get_json("/transactions", Some(location)).await
    }

    async fn statistics(&self, location: LocationId) -> ApiResult<Statistics> {
        self.get_json("/statistics", Some(location)).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::{ErrorCategory, classify};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        sync::mpsc,
    };

    /// Reads one request up to the end of its headers.
    async fn read_head(socket: &mut TcpStream) -> std::io::Result<String> {
        let mut head = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
        }
        Ok(String::from_utf8_lossy(&head).to_lowercase())
    }

    /// Serves `requests` connections, answering each with a 500 carrying `{"message":"x"}`,
    /// and forwards every request head to the returned channel.
    async fn failing_server(requests: usize) -> std::io::Result<(String, mpsc::UnboundedReceiver<String>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}/api", listener.local_addr()?);
        let (heads, received) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let body = r#"{"message":"x"}"#;
            let response = format!(
                "HTTP/1.1 500 Internal Server Error\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            for _ in 0..requests {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let Ok(head) = read_head(&mut socket).await else {
                    return;
                };
                let _ = heads.send(head);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Ok((base_url, received))
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = HttpApi::new("http://localhost:3000/api/", "key").unwrap();
        assert_eq!(api.url("/people"), "http://localhost:3000/api/people");
        assert_eq!(api.url("people/4/pay"), "http://localhost:3000/api/people/4/pay");
    }

    #[test]
    fn test_invalid_api_key_is_request_setup() {
        let result = HttpApi::new(DEFAULT_API_URL, "bad\nkey");
        assert!(matches!(result, Err(ApiError::RequestSetup(_))));
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message": "Person not found"}"#),
            Some("Person not found".to_string())
        );
        assert_eq!(
            server_message(r#"{"error": "Database unavailable"}"#),
            Some("Database unavailable".to_string())
        );
        assert_eq!(server_message(r#"{"status": 500}"#), None);
        assert_eq!(server_message("Bad gateway"), Some("Bad gateway".to_string()));
        assert_eq!(server_message("<html><body>404</body></html>"), None);
        assert_eq!(server_message("   "), None);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_no_response() {
        // Port 1 is reserved and nothing listens there
        let api = HttpApi::new("http://127.0.0.1:1/api", "key").unwrap();
        let error = api.people(1).await.unwrap_err();
        assert!(matches!(error, ApiError::NoResponse(_)), "got {error:?}");
        assert_eq!(classify(&error), ErrorCategory::NoConnectivity);
    }

    #[tokio::test]
    async fn test_unparseable_base_url_is_request_setup() {
        let api = HttpApi::new("not a url", "key").unwrap();
        let error = api.locations().await.unwrap_err();
        assert!(matches!(error, ApiError::RequestSetup(_)), "got {error:?}");
        assert!(matches!(
            classify(&error),
            ErrorCategory::RequestSetup { .. }
        ));
    }

    #[tokio::test]
    async fn test_headers_and_server_error_detail() -> crate::errors::Result<()> {
        let (base_url, mut heads) = failing_server(2).await?;
        let api = HttpApi::new(&base_url, "secret-key")?;

        let error = api.people(3).await.unwrap_err();
        assert_eq!(
            error,
            ApiError::Status {
                status: 500,
                message: Some("x".to_string()),
            }
        );
        assert_eq!(
            classify(&error),
            ErrorCategory::ServerError {
                detail: Some("x".to_string())
            }
        );
        let head = heads.recv().await.unwrap();
        assert!(head.starts_with("get /api/people "));
        assert!(head.contains("x-api-key: secret-key\r\n"));
        assert!(head.contains("content-type: application/json\r\n"));
        assert!(head.contains("x-location-id: 3\r\n"));

        // The location list is the one request without a location header
        assert!(api.locations().await.is_err());
        let head = heads.recv().await.unwrap();
        assert!(head.starts_with("get /api/locations "));
        assert!(head.contains("x-api-key: secret-key\r\n"));
        assert!(head.contains("content-type: application/json\r\n"));
        assert!(!head.contains("x-location-id"));
        Ok(())
    }
}
