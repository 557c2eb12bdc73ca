//! Connection registry and broadcast relay.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use beacon_core::Envelope;
use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::connection::ClientConnection;

/// Lifetime drop threshold past which a slow client is evicted.
///
/// A single queue-full drop is transient and only logged; a client that
/// keeps falling behind is holding a dead or stalled socket and gets
/// removed so the registry cannot retain it forever.
const MAX_TOTAL_DROPS: u64 = 100;

/// Registry of live connections plus best-effort fan-out.
///
/// Membership is keyed by connection ID; registration and removal are short
/// critical sections and the read-lock snapshot taken during a broadcast is
/// never held across socket I/O (sends go through each connection's bounded
/// queue).
pub struct Broadcaster {
    /// Live connections indexed by connection ID.
    connections: RwLock<HashMap<String, Arc<ClientConnection>>>,
    /// Atomic count of live connections (count queries skip the lock).
    active_count: AtomicUsize,
}

impl Broadcaster {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Add a connection. Must happen before the connection's loops start so
    /// no broadcast can target an unregistered handle.
    pub async fn register(&self, connection: Arc<ClientConnection>) {
        let mut conns = self.connections.write().await;
        if conns.insert(connection.id.clone(), connection).is_none() {
            let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Remove a connection by ID. Idempotent; close, error, and eviction all
    /// converge here.
    pub async fn unregister(&self, connection_id: &str) {
        let mut conns = self.connections.write().await;
        if conns.remove(connection_id).is_some() {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Number of live connections.
    pub fn client_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    /// Serialize the envelope once and fan it out to every connection in a
    /// point-in-time snapshot of the registry.
    ///
    /// Delivery is best-effort and independent per connection: a full queue
    /// drops the frame for that connection only and never aborts the batch.
    /// Returns the number of connections registered at snapshot time, not
    /// the number that completed delivery.
    pub async fn broadcast(&self, envelope: &Envelope) -> usize {
        let json = match serde_json::to_string(envelope) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(error = %e, "failed to serialize envelope");
                return 0;
            }
        };

        let mut evicted = Vec::new();
        let recipients;
        {
            let conns = self.connections.read().await;
            recipients = conns.len();
            for conn in conns.values() {
                if !conn.send(Arc::clone(&json)) {
                    counter!("ws_broadcast_drops_total").increment(1);
                    let drops = conn.drop_count();
                    if drops >= MAX_TOTAL_DROPS {
                        warn!(conn_id = %conn.id, drops, "evicting slow client");
                        evicted.push(conn.id.clone());
                    } else {
                        warn!(conn_id = %conn.id, drops, "outbound queue full, frame dropped");
                    }
                }
            }
            debug!(recipients, "broadcast envelope");
        }

        if !evicted.is_empty() {
            let mut conns = self.connections.write().await;
            for id in &evicted {
                if conns.remove(id).is_some() {
                    let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
                }
            }
        }

        recipients
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_connection(id: &str) -> (Arc<ClientConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(32);
        (Arc::new(ClientConnection::new(id.into(), tx)), rx)
    }

    #[tokio::test]
    async fn register_connection() {
        let hub = Broadcaster::new();
        let (conn, _rx) = make_connection("c1");
        hub.register(conn).await;
        assert_eq!(hub.client_count(), 1);
    }

    #[tokio::test]
    async fn unregister_connection() {
        let hub = Broadcaster::new();
        let (conn, _rx) = make_connection("c1");
        hub.register(conn).await;
        hub.unregister("c1").await;
        assert_eq!(hub.client_count(), 0);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let hub = Broadcaster::new();
        let (conn, _rx) = make_connection("c1");
        hub.register(conn).await;
        hub.unregister("c1").await;
        hub.unregister("c1").await;
        assert_eq!(hub.client_count(), 0);
    }

    #[tokio::test]
    async fn unregister_nonexistent() {
        let hub = Broadcaster::new();
        hub.unregister("no_such").await;
        assert_eq!(hub.client_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let hub = Broadcaster::new();
        let (c1, mut rx1) = make_connection("c1");
        let (c2, mut rx2) = make_connection("c2");
        hub.register(c1).await;
        hub.register(c2).await;

        let count = hub.broadcast(&Envelope::Reload).await;
        assert_eq!(count, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_to_empty_registry() {
        let hub = Broadcaster::new();
        assert_eq!(hub.broadcast(&Envelope::Reload).await, 0);
    }

    #[tokio::test]
    async fn unregistered_connection_receives_nothing() {
        let hub = Broadcaster::new();
        let (c1, mut rx1) = make_connection("c1");
        let (c2, mut rx2) = make_connection("c2");
        hub.register(c1).await;
        hub.register(c2).await;
        hub.unregister("c1").await;

        let count = hub.broadcast(&Envelope::Reload).await;
        assert_eq!(count, 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_wire_format() {
        let hub = Broadcaster::new();
        let (conn, mut rx) = make_connection("c1");
        hub.register(conn).await;

        let _ = hub.broadcast(&Envelope::Message { data: "hi".into() }).await;
        let frame = rx.recv().await.unwrap();
        assert_eq!(*frame, r#"{"type":"message","data":"hi"}"#);

        let _ = hub.broadcast(&Envelope::Reload).await;
        let frame = rx.recv().await.unwrap();
        assert_eq!(*frame, r#"{"type":"reload"}"#);
    }

    #[tokio::test]
    async fn dead_connection_does_not_abort_batch() {
        let hub = Broadcaster::new();
        // Receiver dropped: every send to this connection fails.
        let (dead_tx, dead_rx) = mpsc::channel(1);
        drop(dead_rx);
        let dead = Arc::new(ClientConnection::new("dead".into(), dead_tx));
        let (live, mut live_rx) = make_connection("live");
        hub.register(dead).await;
        hub.register(live).await;

        let count = hub.broadcast(&Envelope::Reload).await;
        // Count reflects the snapshot, not delivery outcomes.
        assert_eq!(count, 2);
        assert!(live_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn transient_drop_does_not_evict() {
        let hub = Broadcaster::new();
        let (tx, _rx) = mpsc::channel(1);
        let slow = Arc::new(ClientConnection::new("slow".into(), tx));
        hub.register(slow).await;

        // First broadcast fills the queue, second drops.
        let _ = hub.broadcast(&Envelope::Reload).await;
        let _ = hub.broadcast(&Envelope::Reload).await;
        assert_eq!(hub.client_count(), 1);
    }

    #[tokio::test]
    async fn persistent_drops_evict_slow_client() {
        let hub = Broadcaster::new();
        let (tx, _rx) = mpsc::channel(1);
        let slow = Arc::new(ClientConnection::new("slow".into(), tx));
        let (fast, mut fast_rx) = make_connection("fast");
        hub.register(slow).await;
        hub.register(fast).await;

        // Fill the slow queue, then exceed the drop threshold.
        let _ = hub.broadcast(&Envelope::Reload).await;
        for _ in 0..MAX_TOTAL_DROPS {
            let _ = hub.broadcast(&Envelope::Reload).await;
        }

        assert_eq!(hub.client_count(), 1);
        assert!(fast_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn fast_client_is_kept() {
        let hub = Broadcaster::new();
        let (fast, mut rx) = make_connection("fast");
        hub.register(fast).await;

        for _ in 0..20 {
            let _ = hub.broadcast(&Envelope::Reload).await;
            while rx.try_recv().is_ok() {}
        }
        assert_eq!(hub.client_count(), 1);
    }

    #[tokio::test]
    async fn payload_serialized_once_and_shared() {
        let hub = Broadcaster::new();
        let (c1, mut rx1) = make_connection("c1");
        let (c2, mut rx2) = make_connection("c2");
        hub.register(c1).await;
        hub.register(c2).await;

        let _ = hub.broadcast(&Envelope::Message { data: "shared".into() }).await;
        let f1 = rx1.recv().await.unwrap();
        let f2 = rx2.recv().await.unwrap();
        assert!(Arc::ptr_eq(&f1, &f2));
        assert_eq!(&*f1, &*f2);
    }

    #[test]
    fn drop_threshold_constant_value() {
        assert_eq!(MAX_TOTAL_DROPS, 100);
    }
}
