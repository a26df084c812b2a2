use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// region conn message

#[derive(Debug)]
pub enum ConnMessage {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
}

impl From<Message> for ConnMessage {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(t) => ConnMessage::Text(t),
            Message::Binary(b) => ConnMessage::Binary(b),
            Message::Ping(_) => ConnMessage::Ping,
            Message::Pong(_) => ConnMessage::Pong,
            Message::Close(_) => ConnMessage::Close,
            // NOTE: raw frames never surface from a read of an
            //       established connection
            Message::Frame(_) => unreachable!("Invalid message type"),
        }
    }
}

impl From<ConnMessage> for Message {
    fn from(message: ConnMessage) -> Message {
        match message {
            ConnMessage::Text(t) => Message::Text(t),
            ConnMessage::Binary(b) => Message::Binary(b),
            ConnMessage::Ping => Message::Ping(Vec::new()),
            ConnMessage::Pong => Message::Pong(Vec::new()),
            ConnMessage::Close => Message::Close(None),
        }
    }
}

// endregion

// region conn sender

#[async_trait::async_trait]
pub trait ConnSender: Send + Sync {
    async fn send(&mut self, message: ConnMessage) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl ConnSender for SplitSink<WsStream, Message> {
    async fn send(&mut self, message: ConnMessage) -> anyhow::Result<()> {
        SinkExt::send(&mut self, Message::from(message)).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConnSender for Sender<ConnMessage> {
    async fn send(&mut self, message: ConnMessage) -> anyhow::Result<()> {
        Sender::<ConnMessage>::send(self, message).await?;
        Ok(())
    }
}

// endregion

// region conn receiver

#[async_trait::async_trait]
pub trait ConnReceiver: Send + Sync {
    async fn next(&mut self) -> Option<anyhow::Result<ConnMessage>>;
}

#[async_trait::async_trait]
impl ConnReceiver for SplitStream<WsStream> {
    async fn next(&mut self) -> Option<anyhow::Result<ConnMessage>> {
        StreamExt::next(&mut self)
            .await
            .map(|result| result.map(ConnMessage::from).map_err(anyhow::Error::from))
    }
}

#[async_trait::async_trait]
impl ConnReceiver for Receiver<ConnMessage> {
    async fn next(&mut self) -> Option<anyhow::Result<ConnMessage>> {
        Some(Ok(Receiver::<ConnMessage>::recv(&mut *self).await?))
    }
}

// endregion

// region connector

/// Produces fresh sender/receiver pairs, one per (re)connection attempt.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    fn endpoint(&self) -> String;

    async fn connect(&self) -> anyhow::Result<(Box<dyn ConnSender>, Box<dyn ConnReceiver>)>;
}

/// Dials the apparatus websocket endpoint at `ws://{host}:{port}/websocket`.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            url: format!("ws://{host}:{port}/websocket"),
        }
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            url: url.to_owned(),
        }
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn connect(&self) -> anyhow::Result<(Box<dyn ConnSender>, Box<dyn ConnReceiver>)> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        let (sink, stream) = stream.split();
        Ok((Box::new(sink), Box::new(stream)))
    }
}

// endregion
