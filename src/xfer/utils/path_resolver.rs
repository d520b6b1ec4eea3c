use std::path::{Path, PathBuf};

use thiserror::Error;

/// Nome di file rifiutato: il testo dell'errore è la risposta inviata
/// al client
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid file name: {0}")]
pub struct InvalidFileName(pub String);

/// Risolve il nome di file indicato dal client dentro la directory
/// servita.
///
/// Sono ammessi solo nomi semplici: niente separatori di percorso,
/// niente `.` o `..`. Un nome che esce dalla directory servita viene
/// rifiutato prima di toccare il filesystem.
pub fn resolve_upload_path(root: &Path, name: &str) -> Result<PathBuf, InvalidFileName> {
    let rejected = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if rejected {
        return Err(InvalidFileName(name.to_string()));
    }

    Ok(root.join(name))
}
