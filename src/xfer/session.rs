use std::mem;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use bytes::BytesMut;
use log::{info, warn};
use tokio::{
    fs,
    io::{AsyncRead, AsyncReadExt, AsyncWrite},
};

use crate::catalog::FileCatalog;
use crate::server::ServerConfig;
use crate::xfer::command::{COMMANDS, Command};
use crate::xfer::frames;
use crate::xfer::handlers::{download, upload};
use crate::xfer::session_state::SessionMode;

/// Primo frame inviato a ogni connessione
const WELCOME: &str = "Welcome!\nType help for list of all the available commands";

/// Esito della gestione di una riga di comando
enum Flow {
    Continue,
    Quit,
}

/// Sessione di scambio file su una singola connessione.
///
/// Generica sul flusso di byte, così da girare nei test su stream in
/// memoria oltre che su socket TCP.
pub struct XferSession<S> {
    pub(crate) stream: S,
    pub(crate) peer: SocketAddr,
    pub(crate) config: Arc<ServerConfig>,
    pub(crate) catalog: Arc<FileCatalog>,
    pub(crate) mode: SessionMode,
    buf: BytesMut,
}

impl<S> XferSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        peer: SocketAddr,
        config: Arc<ServerConfig>,
        catalog: Arc<FileCatalog>,
    ) -> Self {
        Self {
            stream,
            peer,
            config,
            catalog,
            mode: SessionMode::Command,
            buf: BytesMut::with_capacity(8 * 1024),
        }
    }

    /// Serve la connessione fino alla chiusura. Qualunque uscita scarta
    /// l'eventuale upload rimasto a metà.
    pub async fn run(mut self) -> Result<()> {
        let result = self.drive().await;
        self.discard_pending_upload().await;
        result
    }

    async fn drive(&mut self) -> Result<()> {
        self.send_txt(WELCOME).await?;

        loop {
            if matches!(self.mode, SessionMode::Command) {
                if let Some(line) = take_line(&mut self.buf) {
                    match self.handle_line(&line).await? {
                        Flow::Continue => continue,
                        Flow::Quit => return Ok(()),
                    }
                }
            } else if !self.buf.is_empty() {
                // in ricezione tutto il contenuto del buffer è un unico
                // blocco, compresi i byte arrivati insieme alla PUT
                let chunk = self.buf.split();
                upload::receive_chunk(self, &chunk).await?;
                continue;
            }

            let n = self.stream.read_buf(&mut self.buf).await?;
            if n == 0 {
                // connessione chiusa; una riga incompleta si perde
                return Ok(());
            }
        }
    }

    /// Una riga completa in modalità comando: parsing e dispatch
    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        info!(
            "Received the following line from the client [{}]: {}",
            self.peer,
            line.trim_end()
        );

        match Command::parse(line) {
            Ok(Command::List) => download::handle_list(self).await?,
            Ok(Command::Get { name }) => download::handle_get(self, &name).await?,
            Ok(Command::Put { name, checksum }) => {
                upload::handle_put(self, name, checksum).await?
            }
            Ok(Command::Help) => self.send_help().await?,
            Ok(Command::Quit) => return Ok(Flow::Quit),
            Err(e) => self.send_txt(&e.to_string()).await?,
        }

        Ok(Flow::Continue)
    }

    async fn send_help(&mut self) -> Result<()> {
        let mut text = String::from("Available commands:\n\n");
        for (_, usage, description) in COMMANDS {
            text.push_str(&format!("{} - {}\n", usage, description));
        }
        self.send_txt(&text).await
    }

    pub(crate) async fn send_txt(&mut self, text: &str) -> Result<()> {
        frames::write_txt(&mut self.stream, text).await?;
        Ok(())
    }

    /// Se la sessione finisce con un upload aperto, il file parziale
    /// non deve restare sul disco. Un upload mai iniziato (sink mai
    /// aperto) non ha niente da scartare.
    async fn discard_pending_upload(&mut self) {
        if let SessionMode::Receiving(pending) = mem::replace(&mut self.mode, SessionMode::Command)
        {
            if pending.sink.is_some() {
                drop(pending.sink);
                match fs::remove_file(&pending.dest).await {
                    Ok(()) => info!("Discarded partial upload {:?}", pending.dest),
                    Err(e) => warn!("Failed to discard partial upload {:?}: {}", pending.dest, e),
                }
            }
        }
    }
}

/// Stacca dalla testa del buffer una riga terminata da `\n`, senza il
/// terminatore. `None` finché la riga non è completa.
fn take_line(buf: &mut BytesMut) -> Option<String> {
    let pos = buf.iter().position(|&b| b == b'\n')?;
    let line = buf.split_to(pos + 1);
    Some(String::from_utf8_lossy(&line[..pos]).into_owned())
}
