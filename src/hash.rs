use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::{fs, io::AsyncReadExt};

/// Dimensione del buffer per il calcolo del digest su file
const READ_BUF_SIZE: usize = 64 * 1024;

/// Digest SHA-256 di un blocco di byte in memoria, controparte di
/// `digest_file` usata dai test per calcolare i valori attesi
#[cfg(test)]
pub fn digest_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Calcola il digest SHA-256 di un file, letto a blocchi per non
/// caricare in memoria file di grandi dimensioni
pub async fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
