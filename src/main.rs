use args::Args;
use clap::Parser;
use log::{LevelFilter, error, info};
use server::{Server, ServerConfig};
use tokio::net::TcpListener;

mod args;
mod catalog;
mod hash;
mod registry;
mod server;
mod xfer;

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Debug)
        .init();

    // Parsing degli argomenti da linea di comando
    let args = Args::parse();

    // La directory servita viene creata se non esiste ancora
    if !args.path.exists() {
        if let Err(e) = tokio::fs::create_dir_all(&args.path).await {
            error!("Failed to create served directory {:?}: {}", args.path, e);
            std::process::exit(1);
        }
        info!("Created served directory {:?}", args.path);
    }

    if !args.path.is_dir() {
        error!("Served path {:?} is not a directory", args.path);
        std::process::exit(1);
    }

    // Canonicalizza il percorso della directory servita
    let root_dir = match args.path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!(
                "Failed to canonicalize served directory {:?}: {}",
                args.path, e
            );
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind((args.host.as_str(), args.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}:{}: {}", args.host, args.port, e);
            std::process::exit(1);
        }
    };

    info!(
        "Listening on port {}, serving files from directory: {:?}",
        args.port, root_dir
    );

    let server = Server::new(ServerConfig { root_dir });
    server.serve(listener).await;
}
