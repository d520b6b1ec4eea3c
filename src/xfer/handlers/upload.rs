use std::mem;

use anyhow::{Result, bail};
use log::{info, warn};
use tokio::{
    fs,
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
};

use crate::hash;
use crate::xfer::session::XferSession;
use crate::xfer::session_state::{PendingUpload, SessionMode};
use crate::xfer::utils::format::size_kb;
use crate::xfer::utils::path_resolver;

/// Terminatore dell'upload: un blocco è l'ultimo solo se finisce con
/// questi due byte
const TERMINATOR: &[u8] = b"\r\n";

/// Comando PUT: registra l'upload atteso e porta la sessione in
/// modalità ricezione. Il filesystem non viene toccato finché non
/// arriva il primo blocco di dati.
pub async fn handle_put<S>(
    session: &mut XferSession<S>,
    name: String,
    checksum: String,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let dest = match path_resolver::resolve_upload_path(&session.config.root_dir, &name) {
        Ok(dest) => dest,
        Err(e) => {
            warn!("Rejected upload name from {}: {}", session.peer, e);
            return session.send_txt(&e.to_string()).await;
        }
    };

    info!("Receiving file: {}", name);
    session.mode = SessionMode::Receiving(PendingUpload::new(name, checksum, dest));
    Ok(())
}

/// Un blocco di byte grezzi in modalità ricezione.
///
/// Il blocco coincide con una lettura dal trasporto. Se termina con il
/// terminatore è l'ultimo: i due byte finali vengono scartati, il file
/// chiuso e verificato contro il checksum dichiarato dalla PUT.
pub async fn receive_chunk<S>(session: &mut XferSession<S>, chunk: &[u8]) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let completed = {
        let SessionMode::Receiving(pending) = &mut session.mode else {
            bail!("raw data received outside of an upload");
        };

        info!("Receiving file chunk ({})", size_kb(chunk.len() as u64));

        if pending.sink.is_none() {
            pending.sink = Some(fs::File::create(&pending.dest).await?);
        }
        let Some(sink) = pending.sink.as_mut() else {
            bail!("upload sink not available");
        };

        if let Some(body) = chunk.strip_suffix(TERMINATOR) {
            sink.write_all(body).await?;
            sink.flush().await?;
            true
        } else {
            sink.write_all(chunk).await?;
            false
        }
    };

    if !completed {
        return Ok(());
    }

    // l'upload completato esce dallo stato di sessione prima della
    // verifica: da qui in poi la sessione torna a interpretare comandi
    let SessionMode::Receiving(pending) =
        mem::replace(&mut session.mode, SessionMode::Command)
    else {
        bail!("upload state lost during reception");
    };
    let PendingUpload {
        file_name,
        expected_checksum,
        dest,
        sink,
    } = pending;
    drop(sink);

    let digest = match hash::digest_file(&dest).await {
        Ok(digest) => digest,
        Err(e) => {
            // un file non verificabile non deve restare sul disco
            let _ = fs::remove_file(&dest).await;
            return Err(e.into());
        }
    };

    if digest == expected_checksum {
        info!("File {} has been successfully transferred", file_name);
        session.catalog.invalidate().await;
        session
            .send_txt("File was successfully transferred and saved")
            .await
    } else {
        fs::remove_file(&dest).await?;
        info!(
            "File {} has been transferred, but deleted due to invalid checksum",
            file_name
        );
        session
            .send_txt("File was successfully transferred but not saved, due to invalid checksum")
            .await
    }
}
