use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::cli::paths::default_sqlite_file;

use anyhow::{bail, Context, Result};
use cardbox_core::{NewCard, NewDeck, Predicate, Store};
use cardbox_pg::PostgresStore;
use cardbox_sqlite::SqliteStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run_cli(args: Cli) -> Result<()> {
    let store = open_store(&args).await?;
    match args.cmd {
        Command::Serve(cmd) => {
            let addr: SocketAddr = cmd
                .addr
                .parse()
                .with_context(|| format!("invalid bind address: {}", cmd.addr))?;
            api_server::run(store, addr, Duration::from_secs(cmd.timeout)).await
        }
        Command::Deck(cmd) => deck_cmd(store, cmd).await,
        Command::Card(cmd) => card_cmd(store, cmd).await,
    }
}

pub async fn open_store(args: &Cli) -> Result<Arc<dyn Store>> {
    match args.store {
        StoreKind::Sqlite => {
            let p = args.db_path.clone().unwrap_or_else(default_sqlite_file);
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            info!(path = %p.display(), "opening sqlite store");
            let s = SqliteStore::open_file(&p).await?;
            Ok(Arc::new(s))
        }
        StoreKind::Postgres => {
            let url = args
                .database_url
                .as_deref()
                .context("--database-url (or DATABASE_URL) is required for --store postgres")?;
            info!("connecting to postgres store");
            let s = PostgresStore::connect(url).await?;
            Ok(Arc::new(s))
        }
    }
}

async fn deck_cmd(store: Arc<dyn Store>, cmd: DeckCmd) -> Result<()> {
    let mut uow = store.begin().await?;
    match cmd {
        DeckCmd::Add { name, description } => {
            let d = uow.decks().create(NewDeck { name, description }).await?;
            println!("{}", d.id);
        }
        DeckCmd::List => {
            for d in uow.decks().list(None).await? {
                let description = d.description.as_deref().unwrap_or("-");
                println!("{}\t{}\t{}", d.id, d.name, description);
            }
        }
    }
    uow.commit().await?;
    Ok(())
}

async fn card_cmd(store: Arc<dyn Store>, cmd: CardCmd) -> Result<()> {
    let mut uow = store.begin().await?;
    match cmd {
        CardCmd::Add(a) => {
            let card = NewCard {
                front: a.front,
                back: a.back,
                hint: a.hint,
                deck_id: a.deck,
            };
            let c = uow.cards().create(card).await?;
            println!("{}", c.id);
        }
        CardCmd::List { deck } => {
            if uow
                .decks()
                .get_one_or_none(Predicate::id(deck), false)
                .await?
                .is_none()
            {
                bail!("deck not found: {}", deck);
            }
            for c in uow.cards().list(Some(Predicate::eq("deck_id", deck))).await? {
                println!(
                    "{}\t{}\t{}\thint={}",
                    c.id,
                    c.front,
                    c.back.as_deref().unwrap_or("-"),
                    c.hint.as_deref().unwrap_or("-")
                );
            }
        }
    }
    uow.commit().await?;
    Ok(())
}
