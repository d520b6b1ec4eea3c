use std::path::PathBuf;

use clap::Parser;

/// Configurazione da linea di comando
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Indirizzo IP su cui ascoltare
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Porta su cui ascoltare
    #[arg(short, long, default_value = "1234")]
    pub port: u16,

    /// Directory servita: sorgente dei download e destinazione degli upload
    #[arg(long, default_value = "/tmp/srv")]
    pub path: PathBuf,
}
