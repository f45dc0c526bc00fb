//! `kvdb`: a demo binary driving a single [`engine::Database`] file from the
//! command line.
//!
//! Each invocation opens the database, performs one operation, and closes it
//! again — there is no long-lived server or REPL here, just enough surface
//! to poke at the store from a shell.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    common::init_logging();
    let args = Args::parse();

    let config = common::Config::builder().data_dir(args.data_dir.clone()).build();
    let db_path = if args.db_path.is_relative() {
        config.data_dir.join(&args.db_path)
    } else {
        args.db_path.clone()
    };

    let mut db = engine::Database::open_with_config(&db_path, &config)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    match args.command {
        Command::Insert { key, value } => {
            db.insert(&key, &value)
                .with_context(|| format!("failed to insert {key:?}"))?;
            println!("inserted {key:?}");
        }
        Command::Get { key } => match db.get(&key) {
            Ok(value) => println!("{value}"),
            Err(common::DbError::NotFound) => {
                eprintln!("key {key:?} not found");
                db.close()?;
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        },
    }

    db.close()?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "kvdb", about = "Embedded key-value store")]
struct Args {
    /// Path to the database file, resolved against `data_dir` if relative
    #[arg(long, default_value = "kvdb.db")]
    db_path: PathBuf,

    /// Directory relative database paths are resolved against
    #[arg(long, default_value = "./db_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a new key-value pair
    Insert { key: String, value: String },
    /// Look up a key's value
    Get { key: String },
}
