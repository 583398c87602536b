//! Gateway WebSocket client for CLI operations.
//!
//! This module provides a WebSocket client that connects to the control-plane
//! gateway and speaks the protocol defined in `strato_proto::api`.
//!
//! # Example
//!
//! ```rust,no_run
//! use strato_cli::api::RouterApi;
//! use strato_cli::client::GatewayClient;
//!
//! # async fn example() -> Result<(), strato_cli::CliError> {
//! let mut client = GatewayClient::connect("ws://localhost:8080").await?;
//! let routers = client.list_routers().await?;
//! println!("Routers: {}", routers.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use strato_proto::api::{error_codes, ApiMessage, ApiResponse, PROTOCOL_VERSION};
use strato_proto::{Attributes, Resource, SecurityGroupRuleSpec};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::api::{IdentityApi, RouterApi, SecurityGroupApi};
use crate::error::CliError;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway WebSocket client.
pub struct GatewayClient {
    /// WebSocket stream.
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Server version.
    server_version: String,
    /// Request timeout.
    request_timeout: Duration,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("server_version", &self.server_version)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Connect to the gateway at the given URL.
    ///
    /// Performs the handshake to identify as a CLI client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is invalid (must start with `ws://` or `wss://`)
    /// - Connection fails
    /// - Handshake fails
    pub async fn connect(url: &str) -> Result<Self, CliError> {
        Self::connect_with_timeout(url, DEFAULT_CONNECT_TIMEOUT).await
    }

    /// Connect with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if connection or handshake fails.
    pub async fn connect_with_timeout(url: &str, connect_timeout: Duration) -> Result<Self, CliError> {
        validate_gateway_url(url)?;

        debug!(url = %url, "Connecting to gateway");

        let (ws, _response) = timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| CliError::Timeout("connection timed out".into()))?
            .map_err(|e| CliError::Connection(e.to_string()))?;

        debug!("WebSocket connected, sending handshake");

        let mut client = Self {
            ws,
            server_version: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };

        let hello = ApiMessage::hello(env!("CARGO_PKG_VERSION"));
        match client.send_request(hello).await? {
            ApiResponse::Welcome {
                server_version,
                protocol_version,
            } => {
                if protocol_version != PROTOCOL_VERSION {
                    warn!(
                        server = protocol_version,
                        client = PROTOCOL_VERSION,
                        "Protocol version mismatch"
                    );
                }
                client.server_version = server_version;
                debug!(version = %client.server_version, "Handshake complete");
                Ok(client)
            }
            other => Err(unexpected("hello", &other)),
        }
    }

    /// Set the request timeout.
    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    /// Get the server version.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Send a request and wait for its response.
    ///
    /// Gateway error responses become errors: `404` maps to
    /// [`CliError::NotFound`], anything else to [`CliError::Gateway`].
    async fn send_request(&mut self, request: ApiMessage) -> Result<ApiResponse, CliError> {
        let request_type = request.request_type();
        let json = request.to_json()?;

        trace!(request_type, "Sending request");
        self.ws
            .send(Message::Text(json))
            .await
            .map_err(|e| CliError::Connection(e.to_string()))?;

        let response = timeout(self.request_timeout, self.ws.next())
            .await
            .map_err(|_| CliError::Timeout(format!("request '{request_type}' timed out")))?
            .ok_or_else(|| CliError::Connection("connection closed".into()))?
            .map_err(|e| CliError::Connection(e.to_string()))?;

        match response {
            Message::Text(text) => {
                let response = ApiResponse::from_json(&text)?;
                trace!(request_type, "Received response");

                match response {
                    ApiResponse::Error { code, message, .. } if code == error_codes::NOT_FOUND => {
                        Err(CliError::NotFound(message))
                    }
                    ApiResponse::Error { code, message, .. } => {
                        Err(CliError::Gateway { code, message })
                    }
                    response => Ok(response),
                }
            }
            Message::Binary(_) => Err(CliError::Protocol("unexpected binary message".into())),
            Message::Close(_) => Err(CliError::Connection("connection closed by server".into())),
            _ => Err(CliError::Protocol("unexpected message type".into())),
        }
    }

    async fn request_resource(&mut self, request: ApiMessage) -> Result<Resource, CliError> {
        let request_type = request.request_type();
        match self.send_request(request).await? {
            ApiResponse::Resource { resource } => Ok(resource),
            other => Err(unexpected(request_type, &other)),
        }
    }

    async fn request_resources(&mut self, request: ApiMessage) -> Result<Vec<Resource>, CliError> {
        let request_type = request.request_type();
        match self.send_request(request).await? {
            ApiResponse::Resources { resources } => Ok(resources),
            other => Err(unexpected(request_type, &other)),
        }
    }

    async fn request_delete(&mut self, request: ApiMessage) -> Result<(), CliError> {
        let request_type = request.request_type();
        match self.send_request(request).await? {
            ApiResponse::Deleted { .. } => Ok(()),
            other => Err(unexpected(request_type, &other)),
        }
    }

    /// Close the connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close frame cannot be sent.
    pub async fn close(mut self) -> Result<(), CliError> {
        self.ws
            .close(None)
            .await
            .map_err(|e| CliError::Connection(e.to_string()))
    }
}

impl IdentityApi for GatewayClient {
    async fn find_project(
        &mut self,
        name_or_id: &str,
        domain: Option<&str>,
    ) -> Result<Resource, CliError> {
        self.request_resource(ApiMessage::FindProject {
            name_or_id: name_or_id.to_string(),
            domain: domain.map(str::to_string),
        })
        .await
    }
}

impl RouterApi for GatewayClient {
    async fn create_router(&mut self, attrs: Attributes) -> Result<Resource, CliError> {
        self.request_resource(ApiMessage::CreateRouter { attrs }).await
    }

    async fn list_routers(&mut self) -> Result<Vec<Resource>, CliError> {
        self.request_resources(ApiMessage::ListRouters).await
    }

    async fn get_router(&mut self, id: &str) -> Result<Resource, CliError> {
        self.request_resource(ApiMessage::GetRouter { id: id.to_string() })
            .await
    }

    async fn delete_router(&mut self, id: &str) -> Result<(), CliError> {
        self.request_delete(ApiMessage::DeleteRouter { id: id.to_string() })
            .await
    }
}

impl SecurityGroupApi for GatewayClient {
    async fn list_security_groups(
        &mut self,
        all_projects: Option<bool>,
    ) -> Result<Vec<Resource>, CliError> {
        self.request_resources(ApiMessage::ListSecurityGroups { all_projects })
            .await
    }

    async fn get_security_group(&mut self, name_or_id: &str) -> Result<Resource, CliError> {
        self.request_resource(ApiMessage::GetSecurityGroup {
            name_or_id: name_or_id.to_string(),
        })
        .await
    }

    async fn create_security_group_rule(
        &mut self,
        spec: SecurityGroupRuleSpec,
    ) -> Result<Resource, CliError> {
        self.request_resource(ApiMessage::CreateSecurityGroupRule { spec })
            .await
    }

    async fn delete_security_group_rule(&mut self, id: &str) -> Result<(), CliError> {
        self.request_delete(ApiMessage::DeleteSecurityGroupRule { id: id.to_string() })
            .await
    }
}

/// Validate the gateway URL format.
///
/// # Errors
///
/// Returns [`CliError::Config`] unless the URL uses `ws://` or `wss://`.
pub fn validate_gateway_url(url: &str) -> Result<(), CliError> {
    if !url.starts_with("ws://") && !url.starts_with("wss://") {
        return Err(CliError::Config(format!(
            "invalid gateway URL: {url}, must start with ws:// or wss://"
        )));
    }
    Ok(())
}

fn unexpected(request_type: &str, response: &ApiResponse) -> CliError {
    CliError::Protocol(format!("unexpected response to {request_type}: {response:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use strato_proto::{FieldValue, ResourceKind};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one connection, answering each request from `reply`.
    async fn serve_once<F>(reply: F) -> String
    where
        F: Fn(ApiMessage) -> ApiResponse + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let request = ApiMessage::from_json(&text).expect("request");
                let response = match request {
                    ApiMessage::Hello { .. } => ApiResponse::welcome("0.9.0"),
                    other => reply(other),
                };
                let json = response.to_json().expect("encode");
                if ws.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        });

        format!("ws://{addr}")
    }

    fn router(id: &str, name: &str) -> Resource {
        Resource::from_fields(
            ResourceKind::Router,
            [("id", FieldValue::from(id)), ("name", FieldValue::from(name))],
        )
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = GatewayClient::connect("http://invalid").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid gateway URL"));
    }

    #[tokio::test]
    async fn test_connection_timeout() {
        let result = GatewayClient::connect_with_timeout(
            "ws://10.255.255.1:9999",
            Duration::from_millis(100),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let result = GatewayClient::connect(&format!("ws://{addr}")).await;
        assert!(matches!(result, Err(CliError::Connection(_))));
    }

    #[tokio::test]
    async fn test_handshake_records_server_version() {
        let url = serve_once(|_| ApiResponse::error(500, "unused")).await;
        let client = GatewayClient::connect(&url).await.expect("connect");
        assert_eq!(client.server_version(), "0.9.0");
    }

    #[tokio::test]
    async fn test_list_routers() {
        let url = serve_once(|request| match request {
            ApiMessage::ListRouters => ApiResponse::Resources {
                resources: vec![router("r-1", "edge"), router("r-2", "core")],
            },
            _ => ApiResponse::error(400, "bad request"),
        })
        .await;

        let mut client = GatewayClient::connect(&url).await.expect("connect");
        let routers = client.list_routers().await.expect("list");
        assert_eq!(routers.len(), 2);
        assert_eq!(routers[1].name(), Some("core"));
    }

    #[tokio::test]
    async fn test_create_router_sends_attributes() {
        let url = serve_once(|request| match request {
            ApiMessage::CreateRouter { attrs } => {
                let mut fields: BTreeMap<String, FieldValue> = attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                fields.insert("id".into(), FieldValue::from("r-9"));
                ApiResponse::Resource {
                    resource: Resource::from_fields(ResourceKind::Router, fields),
                }
            }
            _ => ApiResponse::error(400, "bad request"),
        })
        .await;

        let mut client = GatewayClient::connect(&url).await.expect("connect");
        let mut attrs = Attributes::new();
        attrs.insert("name", "edge");
        attrs.insert("admin_state_up", false);
        let created = client.create_router(attrs).await.expect("create");
        assert_eq!(created.id(), Some("r-9"));
        assert_eq!(created.get("admin_state_up"), Some(&FieldValue::Bool(false)));
        assert!(created.get("distributed").is_none());
    }

    #[tokio::test]
    async fn test_not_found_maps_to_not_found() {
        let url = serve_once(|_| ApiResponse::error(404, "Router r-x could not be found")).await;

        let mut client = GatewayClient::connect(&url).await.expect("connect");
        let err = client.get_router("r-x").await.expect_err("missing");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Router r-x could not be found");
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let url = serve_once(|_| ApiResponse::error(409, "Router r-1 still has ports")).await;

        let mut client = GatewayClient::connect(&url).await.expect("connect");
        let err = client.delete_router("r-1").await.expect_err("conflict");
        assert!(matches!(err, CliError::Gateway { code: 409, .. }));
    }

    #[tokio::test]
    async fn test_unexpected_response_is_protocol_error() {
        let url = serve_once(|_| ApiResponse::Deleted { id: "r-1".into() }).await;

        let mut client = GatewayClient::connect(&url).await.expect("connect");
        let err = client.list_routers().await.expect_err("wrong shape");
        assert!(matches!(err, CliError::Protocol(_)));
    }

    #[test]
    fn test_validate_gateway_url() {
        assert!(validate_gateway_url("ws://localhost:8080").is_ok());
        assert!(validate_gateway_url("wss://secure:443").is_ok());
        assert!(matches!(
            validate_gateway_url("http://invalid"),
            Err(CliError::Config(_))
        ));
    }
}
