use thiserror::Error;

/// Tabella dei comandi: (nome, sintassi, descrizione).
/// La risposta al comando HELP viene generata da qui.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("list", "list", "lists the files available for download"),
    (
        "get",
        "get <filename|all>",
        "downloads a single file, or every file in the catalog",
    ),
    (
        "put",
        "put <filename> <checksum>",
        "uploads a file, terminated by an empty line",
    ),
    ("help", "help", "shows this list of commands"),
    ("quit", "quit", "closes the connection"),
];

/// Comando riconosciuto in modalità testo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Get { name: String },
    Put { name: String, checksum: String },
    Help,
    Quit,
}

/// Errore di interpretazione di una riga: il testo dell'errore è la
/// risposta inviata al client
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid command")]
    Invalid,
    #[error("Missing filename")]
    MissingFilename,
    #[error("Missing filename or file checksum")]
    MissingUploadArgs,
}

impl Command {
    /// Interpreta una riga di comando.
    ///
    /// Il primo token seleziona il comando, senza distinzione tra
    /// maiuscole e minuscole; i token oltre a quelli attesi vengono
    /// ignorati.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = line.trim().split(' ').collect();
        let verb = tokens.first().copied().unwrap_or("");

        match verb.to_lowercase().as_str() {
            "list" => Ok(Self::List),
            "get" => match tokens.get(1) {
                Some(name) => Ok(Self::Get {
                    name: (*name).to_string(),
                }),
                None => Err(CommandError::MissingFilename),
            },
            "put" => match (tokens.get(1), tokens.get(2)) {
                (Some(name), Some(checksum)) => Ok(Self::Put {
                    name: (*name).to_string(),
                    checksum: (*checksum).to_string(),
                }),
                _ => Err(CommandError::MissingUploadArgs),
            },
            "help" => Ok(Self::Help),
            "quit" => Ok(Self::Quit),
            _ => Err(CommandError::Invalid),
        }
    }
}
