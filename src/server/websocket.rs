use crate::agent::StrategyAgent;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::server::auth::verify_handshake;
use crate::session::{ ChatSession, SubmitError };

use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::net::TcpListener;

use tokio_tungstenite::{ accept_hdr_async, WebSocketStream };
use tokio_tungstenite::tungstenite::handshake::server::{ ErrorResponse, Request, Response };
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::Message;

use lazy_static::lazy_static;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };

use chrono::Utc;
use url::form_urlencoded;

use log::{ info, warn, error, debug };
use futures::{ Sink, SinkExt, StreamExt };

const MAX_MESSAGE_SIZE: usize = 1024 * 1024;
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);
const CONNECTIONS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => panic!("connection rate must be non-zero"),
};

lazy_static! {
    static ref CONNECTION_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> =
        RateLimiter::direct(Quota::per_second(CONNECTIONS_PER_SECOND));
}

type BoxError = Box<dyn Error + Send + Sync>;

pub async fn start_ws_server(
    addr: &str,
    agent: Arc<StrategyAgent>,
    api_key: Option<String>
) -> Result<(), BoxError> {
    let listener = TcpListener::bind(addr).await?;
    info!("WS server listening on: {}", addr);
    serve(listener, agent, api_key).await
}

/// Accept loop over an already bound listener.
pub async fn serve(
    listener: TcpListener,
    agent: Arc<StrategyAgent>,
    api_key: Option<String>
) -> Result<(), BoxError> {
    let api_key = api_key.filter(|k| !k.trim().is_empty());
    if api_key.is_some() {
        info!("WebSocket handshake requires a signed ts/sig pair.");
    } else {
        warn!("WebSocket server configured WITHOUT handshake authentication. Connections are open.");
    }

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        if CONNECTION_LIMITER.check().is_err() {
            warn!("Global connection rate limit exceeded for {}. Dropping connection.", peer);
            continue;
        }

        info!("Incoming connection from: {}", peer);
        let agent_clone = Arc::clone(&agent);
        let required_api_key = api_key.clone();

        tokio::spawn(async move {
            if let Err(e) = process_connection(peer, stream, agent_clone, required_api_key).await {
                error!("Failed to process connection for {}: {}", peer, e);
            }
        });
    }
}

fn unauthorized(reason: String) -> ErrorResponse {
    let mut res = ErrorResponse::new(Some(reason));
    *res.status_mut() = StatusCode::UNAUTHORIZED;
    res
}

async fn process_connection<S>(
    peer: SocketAddr,
    stream: S,
    agent: Arc<StrategyAgent>,
    required_api_key: Option<String>
) -> Result<(), BoxError>
    where S: AsyncRead + AsyncWrite + Unpin + Send + 'static
{
    let auth_callback = |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let Some(secret) = &required_api_key else {
            return Ok(response);
        };

        let qs = req.uri().query().unwrap_or("");
        let params: HashMap<String, String> = form_urlencoded
            ::parse(qs.as_bytes())
            .into_owned()
            .collect();

        let ts = params.get("ts").map(|s| s.as_str());
        let sig = params.get("sig").map(|s| s.as_str());

        match verify_handshake(secret, ts, sig, Utc::now().timestamp()) {
            Ok(()) => {
                info!("{} authenticated", peer);
                Ok(response)
            }
            Err(e) => {
                warn!("{}: handshake rejected: {}", peer, e);
                Err(unauthorized(e.to_string()))
            }
        }
    };

    match accept_hdr_async(stream, auth_callback).await {
        Ok(ws) => {
            handle_connection(peer, ws, agent).await;
            Ok(())
        }
        Err(e) => {
            error!("Handshake failed for {}: {}", peer, e);
            Err(Box::new(e) as _)
        }
    }
}

async fn send_message<W>(tx: &mut W, msg: &ServerMessage) -> Result<(), BoxError>
    where W: Sink<Message> + Unpin, W::Error: Error + Send + Sync + 'static
{
    let json = serde_json::to_string(msg)?;
    tx.send(Message::Text(json)).await?;
    Ok(())
}

fn transcript(session: &ChatSession) -> ServerMessage {
    ServerMessage::Transcript {
        messages: session.conversation().messages().to_vec(),
    }
}

/// One exchange. An error means the socket is gone.
async fn handle_chat<W>(session: &mut ChatSession, content: &str, tx: &mut W) -> Result<(), BoxError>
    where W: Sink<Message> + Unpin, W::Error: Error + Send + Sync + 'static
{
    if content.trim().is_empty() {
        let msg = ServerMessage::Error { message: SubmitError::EmptyInput.to_string() };
        return send_message(tx, &msg).await;
    }

    send_message(tx, &ServerMessage::Processing).await?;

    let reply = match session.submit(content).await {
        Ok(message) => ServerMessage::Response {
            message,
            timestamp: Utc::now().timestamp(),
        },
        Err(e) => ServerMessage::Error { message: e.to_string() },
    };
    send_message(tx, &reply).await
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    agent: Arc<StrategyAgent>
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    info!("New WebSocket connection: {}", peer);

    let (mut tx, mut rx) = websocket.split();
    let mut session = agent.open_session().await;
    info!("Assigned session ID {} to {}", session.id(), peer);

    if let Err(e) = send_message(&mut tx, &transcript(&session)).await {
        error!("Error sending initial transcript to {}: {}", peer, e);
        return;
    }

    while let Some(msg) = rx.next().await {
        match msg {
            Ok(message) => {
                if message.len() > MAX_MESSAGE_SIZE {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        MAX_MESSAGE_SIZE
                    );
                    let error_msg = ServerMessage::Error {
                        message: "Message too large".to_string(),
                    };
                    if send_message(&mut tx, &error_msg).await.is_err() {
                        error!("Failed to send size limit error to {}", peer);
                    }
                    break;
                }

                match message {
                    Message::Text(text) => {
                        let sent = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Chat { content }) => {
                                handle_chat(&mut session, &content, &mut tx).await
                            }
                            Ok(ClientMessage::History) => {
                                send_message(&mut tx, &transcript(&session)).await
                            }
                            Err(e) => {
                                error!("Failed to parse message from {}: {}", peer, e);
                                let error_msg = ServerMessage::Error {
                                    message: format!("Failed to parse message: {}", e),
                                };
                                send_message(&mut tx, &error_msg).await
                            }
                        };
                        if let Err(e) = sent {
                            error!("Error sending message to {}: {}", peer, e);
                            break;
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    Message::Ping(ping_data) => {
                        if tx.send(Message::Pong(ping_data)).await.is_err() {
                            error!("Failed to send pong to {}", peer);
                            break;
                        }
                    }
                    Message::Pong(_) => {}
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    Message::Frame(_) => {}
                }
            }
            Err(e) => {
                match e {
                    | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                    | tokio_tungstenite::tungstenite::Error::Protocol(_)
                    | tokio_tungstenite::tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                        io_err.kind() == std::io::ErrorKind::ConnectionReset
                    => {
                        info!("WebSocket connection reset by peer {}", peer);
                    }
                    _ => {
                        error!("Error receiving message from {}: {}", peer, e);
                    }
                }
                break;
            }
        }
    }

    debug!("Session {} ended after {} exchanges", session.id(), session.exchanges());
    info!("WebSocket connection closed for {} (Session ID: {})", peer, session.id());
}
