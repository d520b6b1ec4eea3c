use anyhow::{Result, bail};
use log::info;
use tokio::{
    fs,
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
};

use crate::catalog::CatalogEntry;
use crate::xfer::frames;
use crate::xfer::session::XferSession;
use crate::xfer::utils::format::size_kb;

/// Dimensione dei blocchi di lettura in invio: limita la memoria
/// occupata dai file grandi
const CHUNK_SIZE: usize = 64 * 1024;

/// Comando LIST: riscansiona il catalogo e risponde con l'elenco
/// testuale dei file disponibili
pub async fn handle_list<S>(session: &mut XferSession<S>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let snapshot = session.catalog.rebuild().await?;

    let mut text = format!("Files ({}): \n\n", snapshot.len());
    for entry in snapshot.values() {
        text.push_str(&format!("- {} ({})\n", entry.name, size_kb(entry.size)));
    }

    session.send_txt(&text).await
}

/// Comando GET: invia un singolo file, oppure l'intero catalogo per il
/// nome riservato "all"
pub async fn handle_get<S>(session: &mut XferSession<S>, name: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let send_all = name == "all";

    // "all" riscansiona sempre, un nome singolo riusa la cache se piena
    let snapshot = if send_all {
        session.catalog.rebuild().await?
    } else {
        session.catalog.snapshot_or_rebuild().await?
    };

    let selected: Vec<&CatalogEntry> = if send_all {
        snapshot.values().collect()
    } else {
        match snapshot.get(name) {
            Some(entry) => vec![entry],
            None => {
                let reply = format!("File with filename {} does not exist", name);
                return session.send_txt(&reply).await;
            }
        }
    };

    if send_all {
        info!("Sending all {} files..", selected.len());
    }

    frames::write_files_header(&mut session.stream, selected.len()).await?;
    for entry in selected {
        send_single(session, entry).await?;
    }

    Ok(())
}

/// Invia intestazione e contenuto di un singolo file: esattamente i
/// byte promessi dall'intestazione, a blocchi
async fn send_single<S>(session: &mut XferSession<S>, entry: &CatalogEntry) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!(
        "Sending file: {} ({}, {})",
        entry.name,
        size_kb(entry.size),
        entry.checksum
    );

    frames::write_hash_header(&mut session.stream, entry).await?;

    let mut file = fs::File::open(&entry.path).await?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut remaining = entry.size;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let n = file.read(&mut buf[..want]).await?;
        if n == 0 {
            // il file si è accorciato dopo la scansione: l'intestazione
            // promette più byte di quanti ne restino
            bail!("file {:?} truncated while sending", entry.path);
        }
        session.stream.write_all(&buf[..n]).await?;
        remaining -= n as u64;
    }

    Ok(())
}
