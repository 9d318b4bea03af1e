//! Status/badge channel between the step interpreter and whatever UI
//! is watching it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

pub const BADGE_RUNNING_TEXT: &str = "RUN";
pub const BADGE_RUNNING_COLOR: &str = "#16a34a";
pub const BADGE_IDLE_TEXT: &str = "";
pub const BADGE_IDLE_COLOR: &str = "#4CAF50";

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("no subscribers listening")]
    NoSubscribers,
}

/// Outbound events of the status channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    StatusChanged { text: String },
    BadgeChanged { text: String, color: String },
}

impl StatusEvent {
    pub fn status(text: impl Into<String>) -> Self {
        StatusEvent::StatusChanged { text: text.into() }
    }

    pub fn badge(text: impl Into<String>, color: impl Into<String>) -> Self {
        StatusEvent::BadgeChanged {
            text: text.into(),
            color: color.into(),
        }
    }

    pub fn running_badge() -> Self {
        Self::badge(BADGE_RUNNING_TEXT, BADGE_RUNNING_COLOR)
    }

    pub fn idle_badge() -> Self {
        Self::badge(BADGE_IDLE_TEXT, BADGE_IDLE_COLOR)
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            StatusEvent::StatusChanged { text } => Some(text),
            StatusEvent::BadgeChanged { .. } => None,
        }
    }
}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), BusError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Simple in-memory bus backed by a tokio broadcast channel.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), BusError> {
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|_| BusError::NoSubscribers)
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Helper to materialise an mpsc receiver from the bus subscription
/// so callers can await events without handling broadcast semantics directly.
pub fn to_mpsc<E>(bus: Arc<InMemoryBus<E>>, capacity: usize) -> mpsc::Receiver<E>
where
    E: Event,
{
    let mut rx = bus.subscribe();
    let (tx, out_rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    if tx.send(ev).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "status subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
    out_rx
}
