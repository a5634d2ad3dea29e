use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cardbox_core::DeckId;

#[derive(Debug, Clone, ValueEnum)]
pub enum StoreKind {
    Sqlite,
    Postgres,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "cardbox", version, about = "cardbox deck/card API and admin CLI")]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Sqlite)]
    pub store: StoreKind,

    /// SQLite DB path when --store sqlite (defaults to app data dir)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Postgres URL when --store postgres
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch Axum HTTP API
    Serve(ServeCmd),
    /// Deck operations
    #[command(subcommand)]
    Deck(DeckCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
}

#[derive(Debug, Args, Clone)]
pub struct ServeCmd {
    /// Bind address (host:port)
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Debug, Subcommand, Clone)]
pub enum DeckCmd {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long)]
        deck: DeckId,
    },
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub deck: DeckId,
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: Option<String>,
    #[arg(long)]
    pub hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_defaults() {
        let cli = Cli::try_parse_from(["cardbox", "serve"]).unwrap();
        assert!(matches!(cli.store, StoreKind::Sqlite));
        match cli.cmd {
            Command::Serve(s) => {
                assert_eq!(s.addr, "127.0.0.1:8080");
                assert_eq!(s.timeout, 30);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_card_add() {
        let cli = Cli::try_parse_from([
            "cardbox", "--store", "postgres", "card", "add", "--deck", "3", "--front", "hola",
        ])
        .unwrap();
        assert!(matches!(cli.store, StoreKind::Postgres));
        match cli.cmd {
            Command::Card(CardCmd::Add(a)) => {
                assert_eq!(a.deck, 3);
                assert_eq!(a.front, "hola");
                assert_eq!(a.back, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
