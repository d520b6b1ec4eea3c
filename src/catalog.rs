use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use tokio::{fs, sync::Mutex};

use crate::hash;

/// Voce del catalogo: un file servito con i suoi metadati di integrità
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub checksum: String,
}

/// Snapshot completo del catalogo, iterato in ordine di nome
pub type CatalogSnapshot = BTreeMap<String, CatalogEntry>;

/// Cache condivisa del catalogo servito.
///
/// Lo snapshot viene sostituito in blocco sotto lock: le sessioni vedono
/// sempre o il risultato vecchio o quello nuovo, mai uno stato intermedio.
pub struct FileCatalog {
    root_dir: PathBuf,
    snapshot: Mutex<Option<Arc<CatalogSnapshot>>>,
}

impl FileCatalog {
    pub fn new(root_dir: PathBuf) -> Self {
        Self {
            root_dir,
            snapshot: Mutex::new(None),
        }
    }

    /// Riesegue sempre la scansione e pubblica il nuovo snapshot
    pub async fn rebuild(&self) -> io::Result<Arc<CatalogSnapshot>> {
        let mut guard = self.snapshot.lock().await;
        let snap = Arc::new(scan_directory(&self.root_dir).await?);
        *guard = Some(snap.clone());
        Ok(snap)
    }

    /// Restituisce lo snapshot corrente, rieseguendo la scansione solo se
    /// la cache è vuota (mai scansionata, invalidata, o senza alcun file)
    pub async fn snapshot_or_rebuild(&self) -> io::Result<Arc<CatalogSnapshot>> {
        let mut guard = self.snapshot.lock().await;
        if let Some(snap) = guard.as_ref() {
            if !snap.is_empty() {
                return Ok(snap.clone());
            }
        }

        let snap = Arc::new(scan_directory(&self.root_dir).await?);
        *guard = Some(snap.clone());
        Ok(snap)
    }

    /// Svuota la cache: la prossima richiesta rifarà la scansione
    pub async fn invalidate(&self) {
        *self.snapshot.lock().await = None;
    }
}

/// Enumera i file (non le directory) direttamente sotto `dir` calcolandone
/// dimensione e checksum. Una voce illeggibile viene saltata e il catalogo
/// risultante non la contiene; l'errore finisce solo nel log.
async fn scan_directory(dir: &Path) -> io::Result<CatalogSnapshot> {
    let mut entries = CatalogSnapshot::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();

        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                warn!("Couldn't read {:?}: {}", path, e);
                continue;
            }
        };
        if metadata.is_dir() {
            continue;
        }

        let checksum = match hash::digest_file(&path).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Couldn't read {:?}: {}", path, e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        entries.insert(
            name.clone(),
            CatalogEntry {
                name,
                path,
                size: metadata.len(),
                checksum,
            },
        );
    }

    debug!("Scanned {:?}: {} files", dir, entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn populate(dir: &Path) {
        fs::write(dir.join("a.txt"), b"xyz").await.unwrap();
        fs::write(dir.join("b.bin"), vec![0u8; 1536]).await.unwrap();
        fs::create_dir(dir.join("subdir")).await.unwrap();
        fs::write(dir.join("subdir").join("nested.txt"), b"hidden")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_scan_lists_files_not_directories() {
        let dir = TempDir::new().unwrap();
        populate(dir.path()).await;

        let snap = scan_directory(dir.path()).await.unwrap();
        assert_eq!(snap.len(), 2);
        assert!(snap.contains_key("a.txt"));
        assert!(snap.contains_key("b.bin"));
        assert!(!snap.contains_key("subdir"));
        assert!(!snap.contains_key("nested.txt"));

        let a = &snap["a.txt"];
        assert_eq!(a.size, 3);
        assert_eq!(a.checksum, hash::digest_bytes(b"xyz"));
        assert_eq!(a.path, dir.path().join("a.txt"));
    }

    #[tokio::test]
    async fn test_scan_twice_is_identical() {
        let dir = TempDir::new().unwrap();
        populate(dir.path()).await;

        let first = scan_directory(dir.path()).await.unwrap();
        let second = scan_directory(dir.path()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_snapshot_is_cached_until_invalidated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"xyz").await.unwrap();

        let catalog = FileCatalog::new(dir.path().to_path_buf());
        let first = catalog.snapshot_or_rebuild().await.unwrap();
        let second = catalog.snapshot_or_rebuild().await.unwrap();
        // nessuna nuova scansione: è lo stesso snapshot
        assert!(Arc::ptr_eq(&first, &second));

        // un file aggiunto dopo la scansione resta invisibile...
        fs::write(dir.path().join("new.txt"), b"later").await.unwrap();
        let stale = catalog.snapshot_or_rebuild().await.unwrap();
        assert!(!stale.contains_key("new.txt"));

        // ...finché la cache non viene invalidata
        catalog.invalidate().await;
        let fresh = catalog.snapshot_or_rebuild().await.unwrap();
        assert!(fresh.contains_key("new.txt"));
    }

    #[tokio::test]
    async fn test_rebuild_always_rescans() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"xyz").await.unwrap();

        let catalog = FileCatalog::new(dir.path().to_path_buf());
        catalog.snapshot_or_rebuild().await.unwrap();

        fs::write(dir.path().join("new.txt"), b"later").await.unwrap();
        let fresh = catalog.rebuild().await.unwrap();
        assert!(fresh.contains_key("new.txt"));
    }

    #[tokio::test]
    async fn test_empty_snapshot_counts_as_empty_cache() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path().to_path_buf());

        let empty = catalog.snapshot_or_rebuild().await.unwrap();
        assert!(empty.is_empty());

        // uno snapshot senza file non blocca la scansione successiva
        fs::write(dir.path().join("a.txt"), b"xyz").await.unwrap();
        let fresh = catalog.snapshot_or_rebuild().await.unwrap();
        assert!(fresh.contains_key("a.txt"));
    }
}
