// HTTPS + WebSocket transport against the client's self-signed loopback
// endpoint. Certificate verification is disabled here and only here; the
// endpoint's cert is ephemeral and tied to the client install, and the host
// is always loopback.

use base64::{engine::general_purpose, Engine};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::lcu::locator::Credentials;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Subscription frame requesting every JSON API event; sent once on socket
/// open. The client answers with `[8, "OnJsonApiEvent", {...}]` frames.
pub const SUBSCRIBE_ALL_EVENTS: &str = "[5, \"OnJsonApiEvent\"]";

pub struct LcuTransport {
    credentials: Credentials,
    http: reqwest::Client,
    auth_header: String,
}

impl LcuTransport {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!("riot:{}", credentials.token))
        );
        Ok(LcuTransport {
            credentials,
            http,
            auth_header,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn base_url(&self) -> String {
        format!(
            "https://{}:{}",
            self.credentials.host, self.credentials.port
        )
    }

    /// GET a client resource as JSON. 401 means the credentials are stale,
    /// 404 on session resources means "not in that phase".
    pub async fn get(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url(), path);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;
        let status = response.status();
        match status.as_u16() {
            200..=299 => response
                .json()
                .await
                .map_err(|e| AgentError::Decode(format!("bad json from {}: {}", path, e))),
            401 => Err(AgentError::Auth),
            404 => Err(AgentError::NotInPhase),
            code => Err(AgentError::Http(code)),
        }
    }

    /// Open the event stream and subscribe to all JSON API events.
    pub async fn open_events(&self) -> Result<EventStream> {
        let url = format!(
            "wss://{}:{}/",
            self.credentials.host, self.credentials.port
        );
        let mut request = url
            .into_client_request()
            .map_err(|e| AgentError::Transport(format!("bad websocket url: {}", e)))?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.auth_header)
                .map_err(|e| AgentError::Transport(format!("bad auth header: {}", e)))?,
        );

        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| AgentError::Transport(format!("tls connector: {}", e)))?;
        let (mut socket, _response) = connect_async_tls_with_config(
            request,
            None,
            false,
            Some(Connector::NativeTls(tls)),
        )
        .await?;

        socket
            .send(Message::Text(SUBSCRIBE_ALL_EVENTS.to_string()))
            .await?;
        debug!(port = self.credentials.port, "event stream subscribed");
        Ok(EventStream { socket })
    }
}

pub struct EventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventStream {
    /// Next text frame, `Ok(None)` on orderly close. Control frames are
    /// handled inline.
    pub async fn next_text(&mut self) -> Result<Option<String>> {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(err) = self.socket.send(Message::Pong(payload)).await {
                        warn!(%err, "failed answering websocket ping");
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(err.into()),
            }
        }
    }

    pub async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
