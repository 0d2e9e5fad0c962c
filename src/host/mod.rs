//! Extension host: tabs, message delivery and clipboard
//!
//! Contexts share no memory. Everything crosses as a JSON value; requests
//! carry a one-shot reply channel, signals do not.

pub mod clipboard;
pub mod runtime;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use runtime::BrowserRuntime;

use crate::models::{Request, Signal};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Events the host raises for the background context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Installed,
    TabUpdated {
        tab: TabId,
        status: TabStatus,
        url: Option<String>,
    },
}

/// A message in flight to a content agent.
#[derive(Debug)]
pub struct Envelope {
    pub payload: Value,
    pub reply: Option<oneshot::Sender<Value>>,
}

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("no content agent is listening in tab {0}")]
    Unreachable(TabId),

    #[error("tab {0} went away before answering")]
    Dropped(TabId),

    #[error("tab {tab} did not answer within {timeout:?}")]
    TimedOut { tab: TabId, timeout: Duration },

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no active tab")]
    NoActiveTab,
}

/// Sending side of the message bus, used by the popup and background.
#[async_trait]
pub trait TabMessenger: Send + Sync {
    async fn active_tab(&self) -> Option<TabId>;

    /// Deliver a request and wait for its reply.
    async fn send_message(&self, tab: TabId, payload: Value) -> Result<Value, MessagingError>;

    /// Best-effort one-way delivery.
    fn send_signal(&self, tab: TabId, payload: Value) -> Result<(), MessagingError>;
}

/// Send a typed request and decode the reply into the matching response type.
pub async fn request<M, R>(messenger: &M, tab: TabId, request: &Request) -> Result<R, MessagingError>
where
    M: TabMessenger + ?Sized,
    R: DeserializeOwned,
{
    let reply = messenger.send_message(tab, request.to_value()?).await?;
    Ok(serde_json::from_value(reply)?)
}

pub fn notify<M>(messenger: &M, tab: TabId, signal: Signal) -> Result<(), MessagingError>
where
    M: TabMessenger + ?Sized,
{
    messenger.send_signal(tab, signal.to_value()?)
}
