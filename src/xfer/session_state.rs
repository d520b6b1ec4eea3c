use std::path::PathBuf;

use tokio::fs;

/// Modalità corrente della sessione: o interpreta righe di comando,
/// o inoltra byte grezzi verso l'upload in corso.
#[derive(Debug)]
pub enum SessionMode {
    Command,
    Receiving(PendingUpload),
}

/// Upload annunciato da una PUT e non ancora completato.
///
/// Il sink viene aperto al primo blocco di dati ricevuto: fino a quel
/// momento il filesystem resta intatto.
#[derive(Debug)]
pub struct PendingUpload {
    pub file_name: String,
    pub expected_checksum: String,
    pub dest: PathBuf,
    pub sink: Option<fs::File>,
}

impl PendingUpload {
    pub fn new(file_name: String, expected_checksum: String, dest: PathBuf) -> Self {
        Self {
            file_name,
            expected_checksum,
            dest,
            sink: None,
        }
    }
}
