//! Change-feed subscriptions over the backend's realtime websocket
//!
//! The backend pushes row-level change notifications over a Phoenix-protocol
//! websocket. A [`Subscription`] is a lazy, restartable sequence of
//! [`RowChange`] events for one table; dropping it tears the connection down.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::error::Error;

/// Kind of row-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change notification
#[derive(Debug, Clone)]
pub struct RowChange {
    /// Kind of change
    pub kind: RowChangeKind,

    /// Table the change happened on
    pub table: String,

    /// Row data after the change, for inserts and updates
    pub record: Option<Value>,

    /// Row data before the change, for updates and deletes
    pub old_record: Option<Value>,

    /// Commit timestamp as reported by the backend
    pub commit_timestamp: Option<String>,
}

impl RowChange {
    /// Parse a `postgres_changes` payload. The change body normally sits
    /// under `data`; older payload shapes carry it at the top level.
    pub(crate) fn from_payload(payload: &Value) -> Option<RowChange> {
        let data = payload.get("data").unwrap_or(payload);

        let kind = match data.get("type").and_then(Value::as_str) {
            Some("INSERT") => RowChangeKind::Insert,
            Some("UPDATE") => RowChangeKind::Update,
            Some("DELETE") => RowChangeKind::Delete,
            _ => return None,
        };

        Some(RowChange {
            kind,
            table: data
                .get("table")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            record: data.get("record").filter(|v| !v.is_null()).cloned(),
            old_record: data.get("old_record").filter(|v| !v.is_null()).cloned(),
            commit_timestamp: data
                .get("commit_timestamp")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Tuning for the websocket connection
#[derive(Debug, Clone)]
pub struct RealtimeOptions {
    /// Interval between heartbeats
    pub heartbeat_interval: Duration,

    /// Delay before a dropped connection is re-established
    pub reconnect_interval: Duration,

    /// Whether a dropped connection is re-established at all
    pub auto_reconnect: bool,
}

impl Default for RealtimeOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(1),
            auto_reconnect: true,
        }
    }
}

/// Client for the backend's realtime service
#[derive(Clone)]
pub struct RealtimeClient {
    url: String,
    key: String,
    options: RealtimeOptions,
}

impl RealtimeClient {
    /// Create a new RealtimeClient
    pub(crate) fn new(url: &str, key: &str, options: RealtimeOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            options,
        }
    }

    /// Get the websocket URL for the realtime service
    pub fn socket_url(&self) -> String {
        let url = self
            .url
            .replace("http://", "ws://")
            .replace("https://", "wss://");
        format!("{}/realtime/v1/websocket?apikey={}&vsn=2.0.0", url, self.key)
    }

    /// Create a channel subscription builder
    pub fn channel(&self, name: &str) -> ChannelBuilder {
        ChannelBuilder {
            client: self.clone(),
            name: name.to_string(),
            schema: "public".to_string(),
            table: None,
        }
    }
}

/// Builder for a single-table change subscription
pub struct ChannelBuilder {
    client: RealtimeClient,
    name: String,
    schema: String,
    table: Option<String>,
}

impl ChannelBuilder {
    /// Subscribe to a specific schema
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = schema.to_string();
        self
    }

    /// Subscribe to a specific table
    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Channel topic: `realtime:{schema}:{table}`
    pub fn topic(&self) -> String {
        let table = self.table.as_deref().unwrap_or("*");
        format!("realtime:{}:{}", self.schema, table)
    }

    fn join_message(&self) -> Value {
        let table = self.table.as_deref().unwrap_or("*");
        json!({
            "topic": self.topic(),
            "event": "phx_join",
            "payload": {
                "config": {
                    "postgres_changes": [
                        { "event": "*", "schema": self.schema, "table": table }
                    ]
                }
            },
            "ref": "1"
        })
    }

    /// Start the subscription. The connection is established lazily by a
    /// background task; events arrive through the returned handle.
    pub fn subscribe(self) -> Subscription {
        let (tx, rx) = mpsc::channel(32);
        let socket_url = self.client.socket_url();
        let topic = self.topic();
        let join = self.join_message();
        let options = self.client.options.clone();
        let name = self.name;

        let task = tokio::spawn(async move {
            loop {
                match run_channel(&socket_url, &topic, &join, &options, &tx).await {
                    Ok(()) => {
                        debug!(channel = %name, "subscription consumer gone, stopping");
                        break;
                    }
                    Err(e) => {
                        warn!(channel = %name, error = %e, "realtime connection lost");
                        if !options.auto_reconnect || tx.is_closed() {
                            break;
                        }
                        sleep(options.reconnect_interval).await;
                    }
                }
            }
        });

        Subscription { events: rx, task }
    }
}

/// Connect, join the channel, and pump events until the connection drops
/// (Err) or the consumer goes away (Ok).
async fn run_channel(
    socket_url: &str,
    topic: &str,
    join: &Value,
    options: &RealtimeOptions,
    tx: &mpsc::Sender<RowChange>,
) -> Result<(), Error> {
    let (ws_stream, _) = connect_async(socket_url)
        .await
        .map_err(|e| Error::realtime(format!("websocket connect failed: {}", e)))?;
    let (mut write, mut read) = ws_stream.split();

    write
        .send(Message::Text(join.to_string()))
        .await
        .map_err(|e| Error::realtime(format!("channel join failed: {}", e)))?;
    debug!(topic = %topic, "joined realtime channel");

    let mut heartbeat = interval(options.heartbeat_interval);
    heartbeat.tick().await; // first tick fires immediately
    let mut heartbeat_ref: u64 = 2;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let parsed: ChannelMessage = match serde_json::from_str(&text) {
                            Ok(parsed) => parsed,
                            Err(e) => {
                                debug!(topic = %topic, error = %e, "unparseable realtime message");
                                continue;
                            }
                        };
                        if parsed.event == "postgres_changes" && parsed.topic == topic {
                            match RowChange::from_payload(&parsed.payload) {
                                Some(change) => {
                                    if tx.send(change).await.is_err() {
                                        return Ok(());
                                    }
                                }
                                None => {
                                    debug!(topic = %topic, "change payload without a type, skipping");
                                }
                            }
                        }
                    }
                    Some(Ok(msg)) if msg.is_close() => {
                        return Err(Error::realtime("server closed the connection"));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(Error::realtime(format!("websocket read failed: {}", e)));
                    }
                    None => {
                        return Err(Error::realtime("websocket stream ended"));
                    }
                }
            }

            _ = heartbeat.tick() => {
                let message = json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": heartbeat_ref.to_string(),
                });
                heartbeat_ref += 1;
                if write.send(Message::Text(message.to_string())).await.is_err() {
                    return Err(Error::realtime("heartbeat send failed"));
                }
            }
        }
    }
}

/// Incoming Phoenix-protocol message
#[derive(Debug, Deserialize)]
struct ChannelMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Handle to a live change subscription. Dropping it stops the background
/// task and closes the connection.
pub struct Subscription {
    events: mpsc::Receiver<RowChange>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Receive the next change event; `None` once the subscription stopped
    pub async fn recv(&mut self) -> Option<RowChange> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
