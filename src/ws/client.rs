use crate::jsonrpc;
use crate::logger::{Logger, get_logger};
use crate::ws::{ConnMessage, ConnReceiver, ConnSender, Connector};
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("message is not a valid JSON-RPC 2.0 envelope")]
    InvalidMessage,
    #[error("client is stopped")]
    Stopped,
}

/// Receives inbound text frames. `on_connect` runs after every successful
/// (re)connection, before any frames are delivered.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: String) -> Result<()>;

    async fn on_connect(&self) -> Result<()> {
        Ok(())
    }
}

pub struct WsClientConfig {
    pub topic: Option<String>,
    pub reconnect_delay: Duration,
    pub debug: bool,
}

impl Default for WsClientConfig {
    fn default() -> Self {
        Self {
            topic: None,
            reconnect_delay: Duration::from_secs(3),
            debug: false,
        }
    }
}

/// A websocket client that keeps itself connected: `run` dials through the
/// [`Connector`], pumps frames to the [`MessageHandler`], and redials after
/// `reconnect_delay` whenever the connection drops, until [`WsClient::close`].
pub struct WsClient {
    connector: Box<dyn Connector>,
    handler: Arc<dyn MessageHandler>,
    reconnect_delay: Duration,
    cancellation_token: CancellationToken,
    sender: Mutex<Option<Box<dyn ConnSender>>>,
    logger: Logger,
}

impl WsClient {
    pub fn new(
        config: WsClientConfig,
        connector: Box<dyn Connector>,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        let name = match &config.topic {
            Some(topic) => format!("WSClient:{topic}"),
            None => "WSClient".to_owned(),
        };

        Self {
            connector,
            handler,
            reconnect_delay: config.reconnect_delay,
            cancellation_token: CancellationToken::new(),
            sender: Mutex::new(None),
            logger: get_logger(&name, config.debug, true),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.sender.lock().await.is_some()
    }

    /// Connect loop. Returns once the client is closed.
    pub async fn run(&self) -> Result<()> {
        while !self.cancellation_token.is_cancelled() {
            match self.connector.connect().await {
                Ok((sender, receiver)) => {
                    self.logger
                        .info(&format!("connected to {}", self.connector.endpoint()));
                    *self.sender.lock().await = Some(sender);
                    if let Err(e) = self.handler.on_connect().await {
                        self.logger.warn(&format!("on_connect handler error: {e}"));
                    }
                    self.listen(receiver).await;
                    *self.sender.lock().await = None;
                    self.logger.warn("websocket connection closed");
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "websocket connection error: {e}, reconnecting in {:?}",
                        self.reconnect_delay
                    ));
                }
            }

            tokio::select! {
                _ = self.cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
        Ok(())
    }

    async fn listen(&self, mut receiver: Box<dyn ConnReceiver>) {
        loop {
            let message = tokio::select! {
                _ = self.cancellation_token.cancelled() => break,
                message = receiver.next() => message,
            };

            match message {
                Some(Ok(ConnMessage::Text(text))) => {
                    if let Err(e) = self.handler.handle(text).await {
                        self.logger.warn(&format!("message handler error: {e}"));
                    }
                }
                Some(Ok(ConnMessage::Binary(payload))) => {
                    self.logger
                        .debug(&format!("ignoring binary frame of {} bytes", payload.len()));
                }
                Some(Ok(ConnMessage::Ping)) | Some(Ok(ConnMessage::Pong)) => {}
                Some(Ok(ConnMessage::Close)) | None => break,
                Some(Err(e)) => {
                    self.logger.error(&format!("websocket receive error: {e}"));
                    break;
                }
            }
        }
    }

    /// Sends a JSON-RPC 2.0 message, waiting for an active connection if
    /// necessary. Rejects payloads without a valid envelope up front.
    pub async fn send(&self, message: &Value) -> Result<()> {
        if !jsonrpc::check_message(message) {
            return Err(SendError::InvalidMessage.into());
        }
        let text = serde_json::to_string(message)?;

        loop {
            if self.cancellation_token.is_cancelled() {
                return Err(SendError::Stopped.into());
            }

            {
                let mut guard = self.sender.lock().await;
                if let Some(sender) = guard.as_mut() {
                    return sender.send(ConnMessage::Text(text)).await;
                }
            }

            self.logger
                .warn("websocket not connected, waiting to send message");
            tokio::select! {
                _ = self.cancellation_token.cancelled() => return Err(SendError::Stopped.into()),
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    /// Stops the connect loop and sends a close frame on the active
    /// connection, if any.
    pub async fn close(&self) {
        self.cancellation_token.cancel();

        let mut guard = self.sender.lock().await;
        if let Some(sender) = guard.as_mut() {
            if let Err(e) = sender.send(ConnMessage::Close).await {
                self.logger.warn(&format!("error sending close frame: {e}"));
            }
        }
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::{Method, make_request, parse_message};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    struct FakeConnector {
        connections: std::sync::Mutex<VecDeque<(mpsc::Sender<ConnMessage>, mpsc::Receiver<ConnMessage>)>>,
    }

    #[async_trait::async_trait]
    impl Connector for FakeConnector {
        fn endpoint(&self) -> String {
            "fake://apparatus".to_owned()
        }

        async fn connect(&self) -> Result<(Box<dyn ConnSender>, Box<dyn ConnReceiver>)> {
            let (c2s_tx, s2c_rx) = self
                .connections
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no connection available"))?;
            Ok((Box::new(c2s_tx), Box::new(s2c_rx)))
        }
    }

    struct FakePeer {
        to_client: mpsc::Sender<ConnMessage>,
        from_client: mpsc::Receiver<ConnMessage>,
    }

    fn fake_connections(count: usize) -> (FakeConnector, Vec<FakePeer>) {
        let mut connections = VecDeque::new();
        let mut peers = Vec::new();
        for _ in 0..count {
            let (s2c_tx, s2c_rx) = mpsc::channel(16);
            let (c2s_tx, c2s_rx) = mpsc::channel(16);
            connections.push_back((c2s_tx, s2c_rx));
            peers.push(FakePeer {
                to_client: s2c_tx,
                from_client: c2s_rx,
            });
        }
        let connector = FakeConnector {
            connections: std::sync::Mutex::new(connections),
        };
        (connector, peers)
    }

    #[derive(Default)]
    struct RecordingHandler {
        messages: std::sync::Mutex<Vec<String>>,
        connects: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle(&self, message: String) -> Result<()> {
            self.messages.lock().unwrap().push(message);
            Ok(())
        }

        async fn on_connect(&self) -> Result<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_config() -> WsClientConfig {
        WsClientConfig {
            topic: Some("test".to_owned()),
            reconnect_delay: Duration::from_millis(10),
            debug: false,
        }
    }

    async fn wait_for(condition: impl Fn() -> bool) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    #[tokio::test]
    async fn delivers_text_frames_to_handler() {
        let (connector, mut peers) = fake_connections(1);
        let peer = peers.remove(0);
        let handler = Arc::new(RecordingHandler::default());
        let client = Arc::new(WsClient::new(
            fast_config(),
            Box::new(connector),
            handler.clone(),
        ));

        let run = tokio::spawn({
            let client = client.clone();
            async move { client.run().await }
        });

        peer.to_client
            .send(ConnMessage::Text(r#"{"jsonrpc":"2.0","method":"PING"}"#.to_owned()))
            .await
            .unwrap();

        wait_for(|| !handler.messages.lock().unwrap().is_empty()).await;
        assert_eq!(handler.connects.load(Ordering::SeqCst), 1);
        assert_eq!(
            handler.messages.lock().unwrap()[0],
            r#"{"jsonrpc":"2.0","method":"PING"}"#
        );

        client.close().await;
        run.await.unwrap().unwrap();
        drop(peer);
    }

    #[tokio::test]
    async fn sends_valid_messages_on_active_connection() {
        let (connector, mut peers) = fake_connections(1);
        let mut peer = peers.remove(0);
        let handler = Arc::new(RecordingHandler::default());
        let client = Arc::new(WsClient::new(
            fast_config(),
            Box::new(connector),
            handler.clone(),
        ));

        let run = tokio::spawn({
            let client = client.clone();
            async move { client.run().await }
        });

        wait_for(|| handler.connects.load(Ordering::SeqCst) == 1).await;
        client
            .send(&make_request(Method::Ping, None, None))
            .await
            .unwrap();

        let frame = peer.from_client.recv().await.unwrap();
        match frame {
            ConnMessage::Text(text) => {
                let message = parse_message(&text).unwrap();
                assert_eq!(message["method"], "PING");
                assert_eq!(message["id"], 3);
            }
            other => panic!("unexpected frame: {:?}", other),
        }

        client.close().await;
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn send_rejects_non_jsonrpc_payloads() {
        let (connector, _peers) = fake_connections(1);
        let client = WsClient::new(
            fast_config(),
            Box::new(connector),
            Arc::new(RecordingHandler::default()),
        );

        let err = client.send(&json!({"hello": 1})).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SendError>(),
            Some(SendError::InvalidMessage)
        ));
    }

    #[tokio::test]
    async fn send_fails_once_closed() {
        let (connector, _peers) = fake_connections(1);
        let client = WsClient::new(
            fast_config(),
            Box::new(connector),
            Arc::new(RecordingHandler::default()),
        );

        client.close().await;
        let err = client
            .send(&make_request(Method::Ping, None, None))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SendError>(),
            Some(SendError::Stopped)
        ));
    }

    #[tokio::test]
    async fn reconnects_after_connection_drop() {
        let (connector, mut peers) = fake_connections(2);
        let second = peers.remove(1);
        let first = peers.remove(0);
        let handler = Arc::new(RecordingHandler::default());
        let client = Arc::new(WsClient::new(
            fast_config(),
            Box::new(connector),
            handler.clone(),
        ));

        let run = tokio::spawn({
            let client = client.clone();
            async move { client.run().await }
        });

        wait_for(|| handler.connects.load(Ordering::SeqCst) == 1).await;

        // Dropping the peer's sender ends the first connection.
        drop(first);
        wait_for(|| handler.connects.load(Ordering::SeqCst) == 2).await;
        assert!(client.is_connected().await);

        client.close().await;
        run.await.unwrap().unwrap();
        drop(second);
    }
}
