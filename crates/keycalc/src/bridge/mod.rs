//! Host bridge
//!
//! A host application may expose a small service object to the calculator:
//! version, echo, logging, key/value storage and event subscription. The
//! calculator only reflects whether one is attached; everything else here is
//! for the embedding application.

mod ready;

pub use ready::{readiness, PollPolicy, ReadyNotifier, ReadyVia, ReadyWaiter};

use crate::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Event pushed by the host to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Event name
    pub name: String,
    /// Event payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl BridgeEvent {
    /// Creates an event with a JSON payload
    #[must_use]
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Subscriber callback
pub type Listener = Box<dyn Fn(&BridgeEvent) + Send + Sync>;

/// Services a host exposes to the calculator
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Host runtime version
    async fn version(&self) -> BridgeResult<String>;

    /// Returns its input, as a round-trip check
    async fn echo(&self, text: &str) -> BridgeResult<String>;

    /// Writes a line to the host log; never fails
    fn log(&self, text: &str);

    /// Reads a stored value
    async fn storage_get(&self, key: &str) -> BridgeResult<Option<String>>;

    /// Stores a value
    async fn storage_set(&self, key: &str, value: &str) -> BridgeResult<()>;

    /// Registers an event listener
    fn subscribe(&self, listener: Listener);
}

/// In-process host bridge
///
/// Storage lives in memory for the lifetime of the value.
#[derive(Default)]
pub struct MemoryBridge {
    storage: Mutex<HashMap<String, String>>,
    listeners: Mutex<Vec<Listener>>,
    log: Mutex<Vec<String>>,
}

impl std::fmt::Debug for MemoryBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBridge")
            .field("storage", &self.storage)
            .field(
                "listeners",
                &self
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len(),
            )
            .field("log", &self.log)
            .finish()
    }
}

impl MemoryBridge {
    /// Creates an empty bridge
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers an event to every subscriber; returns how many received it
    ///
    /// Listeners run without the lock held, so they may subscribe or emit
    /// on the same bridge. Listeners added during delivery first see the
    /// next event.
    pub fn emit(&self, event: &BridgeEvent) -> usize {
        let listeners = std::mem::take(
            &mut *self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for listener in &listeners {
            listener(event);
        }
        let delivered = listeners.len();

        let mut current = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let added = std::mem::replace(&mut *current, listeners);
        current.extend(added);
        delivered
    }

    /// Lines written through [`HostBridge::log`]
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HostBridge for MemoryBridge {
    async fn version(&self) -> BridgeResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    async fn echo(&self, text: &str) -> BridgeResult<String> {
        Ok(text.to_string())
    }

    fn log(&self, text: &str) {
        info!(target: "keycalc::bridge", "{text}");
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
    }

    async fn storage_get(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self
            .storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn storage_set(&self, key: &str, value: &str) -> BridgeResult<()> {
        if key.is_empty() {
            return Err(BridgeError::call("storage_set", "empty key"));
        }
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn subscribe(&self, listener: Listener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

/// Storage key of the visit counter
pub const VISITS_KEY: &str = "visits";

/// Increments the visit counter and returns the new count
///
/// A missing or unparsable stored value counts as zero.
pub async fn record_visit(bridge: &dyn HostBridge) -> BridgeResult<u64> {
    let visits = bridge
        .storage_get(VISITS_KEY)
        .await?
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
        + 1;
    bridge.storage_set(VISITS_KEY, &visits.to_string()).await?;
    Ok(visits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_version_and_echo() {
        let bridge = MemoryBridge::new();
        assert_eq!(bridge.version().await.unwrap(), env!("CARGO_PKG_VERSION"));
        assert_eq!(bridge.echo("hello").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_storage_round_trip() {
        let bridge = MemoryBridge::new();
        assert_eq!(bridge.storage_get("k").await.unwrap(), None);
        bridge.storage_set("k", "v").await.unwrap();
        assert_eq!(bridge.storage_get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_storage_rejects_empty_key() {
        let bridge = MemoryBridge::new();
        let err = bridge.storage_set("", "v").await.unwrap_err();
        assert!(matches!(err, BridgeError::Call { call: "storage_set", .. }));
    }

    #[tokio::test]
    async fn test_record_visit_counts_up() {
        let bridge = MemoryBridge::new();
        assert_eq!(record_visit(&bridge).await.unwrap(), 1);
        assert_eq!(record_visit(&bridge).await.unwrap(), 2);
        assert_eq!(
            bridge.storage_get(VISITS_KEY).await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn test_record_visit_garbage_counts_as_zero() {
        let bridge = MemoryBridge::new();
        bridge.storage_set(VISITS_KEY, "lots").await.unwrap();
        assert_eq!(record_visit(&bridge).await.unwrap(), 1);
    }

    #[test]
    fn test_log_lines() {
        let bridge = MemoryBridge::new();
        bridge.log("bridge ready");
        assert_eq!(bridge.log_lines(), vec!["bridge ready".to_string()]);
    }

    #[test]
    fn test_emit_reaches_subscribers() {
        let bridge = MemoryBridge::new();
        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            bridge.subscribe(Box::new(move |event| {
                if event.name == "theme" {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        let delivered = bridge.emit(&BridgeEvent::new("theme", serde_json::json!({"dark": true})));
        assert_eq!(delivered, 2);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_may_subscribe_during_emit() {
        let bridge = Arc::new(MemoryBridge::new());
        let inner = Arc::clone(&bridge);
        bridge.subscribe(Box::new(move |event| {
            if event.name == "open" {
                inner.subscribe(Box::new(|_| {}));
            }
        }));

        assert_eq!(bridge.emit(&BridgeEvent::new("open", serde_json::Value::Null)), 1);
        assert_eq!(bridge.emit(&BridgeEvent::new("close", serde_json::Value::Null)), 2);
        assert!(format!("{bridge:?}").contains("listeners: 2"));
    }

    #[test]
    fn test_event_deserialize_without_payload() {
        let event: BridgeEvent = serde_json::from_str(r#"{"name":"ping"}"#).unwrap();
        assert_eq!(event.name, "ping");
        assert!(event.payload.is_null());
    }

    #[test]
    fn test_debug_shows_listener_count() {
        let bridge = MemoryBridge::new();
        bridge.subscribe(Box::new(|_| {}));
        assert!(format!("{bridge:?}").contains("listeners: 1"));
    }
}
