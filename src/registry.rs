use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

pub type ConnectionId = u64;

/// Registro delle sessioni attive, a solo scopo informativo (conteggio
/// dei client nei log): le sessioni non si coordinano mai attraverso di esso.
pub struct ConnectionRegistry {
    clients: Mutex<HashMap<ConnectionId, SocketAddr>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registra una nuova connessione; restituisce l'id assegnato e il
    /// numero totale di client collegati
    pub async fn register(&self, peer: SocketAddr) -> (ConnectionId, usize) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut clients = self.clients.lock().await;
        clients.insert(id, peer);
        (id, clients.len())
    }

    /// Rimuove una connessione; restituisce quanti client restano
    pub async fn unregister(&self, id: ConnectionId) -> usize {
        let mut clients = self.clients.lock().await;
        clients.remove(&id);
        clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[tokio::test]
    async fn test_register_and_unregister_counts() {
        let registry = ConnectionRegistry::new();

        let (first, total) = registry.register(peer(40001)).await;
        assert_eq!(total, 1);
        let (second, total) = registry.register(peer(40002)).await;
        assert_eq!(total, 2);
        assert_ne!(first, second);

        assert_eq!(registry.unregister(first).await, 1);
        assert_eq!(registry.unregister(second).await, 0);
    }

    #[tokio::test]
    async fn test_unregister_unknown_id_is_harmless() {
        let registry = ConnectionRegistry::new();
        registry.register(peer(40003)).await;
        assert_eq!(registry.unregister(9999).await, 1);
    }
}
