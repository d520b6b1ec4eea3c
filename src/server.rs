use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::net::TcpListener;

use crate::catalog::FileCatalog;
use crate::registry::ConnectionRegistry;
use crate::xfer::XferSession;

/// Parametri condivisi da tutte le sessioni
#[derive(Debug)]
pub struct ServerConfig {
    pub root_dir: PathBuf,
}

/// Stato di processo del server: configurazione, catalogo condiviso e
/// registro delle connessioni attive
pub struct Server {
    config: Arc<ServerConfig>,
    catalog: Arc<FileCatalog>,
    registry: Arc<ConnectionRegistry>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let catalog = Arc::new(FileCatalog::new(config.root_dir.clone()));
        Self {
            config: Arc::new(config),
            catalog,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Accetta connessioni all'infinito, una sessione per ciascuna in
    /// un task dedicato
    pub async fn serve(&self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let (id, total) = self.registry.register(peer).await;
                    info!("Connection from: {} ({} clients total)", peer, total);

                    let session =
                        XferSession::new(stream, peer, self.config.clone(), self.catalog.clone());
                    let registry = self.registry.clone();

                    tokio::spawn(async move {
                        if let Err(e) = session.run().await {
                            warn!("Session with {} ended with error: {}", peer, e);
                        }
                        let left = registry.unregister(id).await;
                        info!("Connection from {} lost ({} clients left)", peer, left);
                    });
                }
                Err(e) => error!("Failed to accept connection: {}", e),
            }
        }
    }
}
