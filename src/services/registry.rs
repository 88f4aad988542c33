use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mongodb::bson::oid::ObjectId;
use tokio::sync::mpsc;

/// Process-local table of live sessions per owner.
///
/// This is also the real-time delivery channel: publishing an event means
/// broadcasting it to every handle currently registered for the owner
/// (broadcast/subscribe pattern). An event published while an owner has no
/// live session is dropped; two sessions for the same owner each get their
/// own copy. Per-owner ordering follows publish order.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<ObjectId, Vec<SessionHandle>>>>,
    next_id: Arc<AtomicU64>,
}

struct SessionHandle {
    id: u64,
    tx: mpsc::UnboundedSender<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<ObjectId, Vec<SessionHandle>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called on connect. Returns the session id and the receiving end the
    /// session loop reads frames from.
    pub fn register(&self, owner: ObjectId) -> (u64, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.table()
            .entry(owner)
            .or_default()
            .push(SessionHandle { id, tx });

        (id, rx)
    }

    /// Called on disconnect or session-loop error. Safe to call twice.
    pub fn deregister(&self, owner: ObjectId, session_id: u64) {
        let mut table = self.table();

        if let Some(handles) = table.get_mut(&owner) {
            handles.retain(|h| h.id != session_id);
            if handles.is_empty() {
                table.remove(&owner);
            }
        }
    }

    /// Send `payload` to every live session of `owner`. Handles whose
    /// receiving side is gone are removed during the attempt. Returns how
    /// many sessions accepted the frame.
    pub fn broadcast(&self, owner: ObjectId, payload: &str) -> usize {
        let mut table = self.table();

        let Some(handles) = table.get_mut(&owner) else {
            return 0;
        };

        handles.retain(|h| h.tx.send(payload.to_string()).is_ok());

        let delivered = handles.len();
        if handles.is_empty() {
            table.remove(&owner);
        }
        delivered
    }

    pub fn session_count(&self, owner: ObjectId) -> usize {
        self.table().get(&owner).map(|h| h.len()).unwrap_or(0)
    }

    /// Drop every held sender so all session loops see end-of-stream.
    pub fn shutdown(&self) {
        self.table().clear();
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
