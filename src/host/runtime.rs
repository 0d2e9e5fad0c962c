//! In-process extension host

use super::{Envelope, HostEvent, MessagingError, TabId, TabMessenger, TabStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
struct Tab {
    url: String,
    mailbox: Option<mpsc::UnboundedSender<Envelope>>,
}

#[derive(Debug, Default)]
struct Registry {
    next_tab: u32,
    active: Option<TabId>,
    tabs: HashMap<TabId, Tab>,
    listeners: Vec<mpsc::UnboundedSender<HostEvent>>,
}

impl Registry {
    fn emit(&mut self, event: HostEvent) {
        self.listeners.retain(|listener| listener.send(event.clone()).is_ok());
    }
}

/// Tab registry and message router shared by all contexts of one browser
/// session. Cloning yields another handle to the same session.
#[derive(Debug, Clone)]
pub struct BrowserRuntime {
    inner: Arc<Mutex<Registry>>,
    request_timeout: Option<Duration>,
}

impl BrowserRuntime {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::default())),
            request_timeout: None,
        }
    }

    /// Bound how long `send_message` waits for a reply. `None` waits forever.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive host events from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry().listeners.push(tx);
        rx
    }

    pub fn install(&self) {
        self.registry().emit(HostEvent::Installed);
    }

    /// Open a tab and make it active. It starts loading `url`.
    pub fn open_tab(&self, url: impl Into<String>) -> TabId {
        let url = url.into();
        let mut registry = self.registry();
        registry.next_tab += 1;
        let tab = TabId(registry.next_tab);

        registry.tabs.insert(
            tab,
            Tab {
                url: url.clone(),
                mailbox: None,
            },
        );
        registry.active = Some(tab);
        registry.emit(HostEvent::TabUpdated {
            tab,
            status: TabStatus::Loading,
            url: Some(url),
        });
        tab
    }

    /// Start loading a new document. The old content agent is disconnected.
    pub fn navigate(&self, tab: TabId, url: impl Into<String>) -> bool {
        let url = url.into();
        let mut registry = self.registry();
        match registry.tabs.get_mut(&tab) {
            Some(entry) => {
                entry.url = url.clone();
                entry.mailbox = None;
            }
            None => return false,
        }
        registry.emit(HostEvent::TabUpdated {
            tab,
            status: TabStatus::Loading,
            url: Some(url),
        });
        true
    }

    /// Mark the tab's current document as fully loaded.
    pub fn complete_navigation(&self, tab: TabId) -> bool {
        let mut registry = self.registry();
        let url = match registry.tabs.get(&tab) {
            Some(entry) => entry.url.clone(),
            None => return false,
        };
        registry.emit(HostEvent::TabUpdated {
            tab,
            status: TabStatus::Complete,
            url: Some(url),
        });
        true
    }

    pub fn activate(&self, tab: TabId) -> bool {
        let mut registry = self.registry();
        if !registry.tabs.contains_key(&tab) {
            return false;
        }
        registry.active = Some(tab);
        true
    }

    pub fn close_tab(&self, tab: TabId) {
        let mut registry = self.registry();
        registry.tabs.remove(&tab);
        if registry.active == Some(tab) {
            registry.active = None;
        }
    }

    /// Register the content agent for the tab's current document and hand
    /// back its mailbox. Replaces any previous agent.
    pub fn attach_content_agent(&self, tab: TabId) -> Option<mpsc::UnboundedReceiver<Envelope>> {
        let mut registry = self.registry();
        let entry = registry.tabs.get_mut(&tab)?;
        let (tx, rx) = mpsc::unbounded_channel();
        entry.mailbox = Some(tx);
        Some(rx)
    }

    fn deliver(&self, tab: TabId, envelope: Envelope) -> Result<(), MessagingError> {
        let registry = self.registry();
        let mailbox = registry
            .tabs
            .get(&tab)
            .and_then(|t| t.mailbox.as_ref())
            .ok_or(MessagingError::Unreachable(tab))?;
        mailbox
            .send(envelope)
            .map_err(|_| MessagingError::Unreachable(tab))
    }
}

impl Default for BrowserRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TabMessenger for BrowserRuntime {
    async fn active_tab(&self) -> Option<TabId> {
        self.registry().active
    }

    async fn send_message(&self, tab: TabId, payload: Value) -> Result<Value, MessagingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.deliver(
            tab,
            Envelope {
                payload,
                reply: Some(reply_tx),
            },
        )?;

        let reply = match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, reply_rx)
                .await
                .map_err(|_| MessagingError::TimedOut { tab, timeout })?,
            None => reply_rx.await,
        };
        reply.map_err(|_| MessagingError::Dropped(tab))
    }

    fn send_signal(&self, tab: TabId, payload: Value) -> Result<(), MessagingError> {
        self.deliver(tab, Envelope { payload, reply: None })
    }
}
