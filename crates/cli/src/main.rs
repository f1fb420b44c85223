//! Storefront cart command line front-end

use std::{io, process};

use anyhow::Context;
use tracing::error;

use storefront_cart::prelude::*;

use crate::{commands::Session, config::CliConfig};

mod commands;
mod config;
mod logging;
mod outbox;
mod render;

fn main() {
    let config = CliConfig::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = logging::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        process::exit(1);
    }

    if let Err(run_error) = run(config) {
        error!("{run_error:#}");

        #[expect(
            clippy::print_stderr,
            reason = "the default filter may hide errors, so they are always echoed"
        )]
        {
            eprintln!("Error: {run_error:#}");
        }

        process::exit(1);
    }
}

fn run(config: CliConfig) -> anyhow::Result<()> {
    let catalog = Catalog::from_file(&config.catalog.catalog).with_context(|| {
        format!("failed to load catalog from {}", config.catalog.catalog.display())
    })?;

    let currency = render::parse_currency(&config.catalog.currency)?;

    let storage = FileStorage::open(&config.storage.storage_dir).with_context(|| {
        format!(
            "failed to open cart storage in {}",
            config.storage.storage_dir.display()
        )
    })?;

    let mut store = CartStore::open(storage);
    let outbox_dir = config.storage.storage_dir.join("orders");

    let mut session = Session {
        catalog: &catalog,
        store: &mut store,
        currency,
        outbox_dir: &outbox_dir,
    };

    session.execute(config.command, &mut io::stdout().lock())
}
