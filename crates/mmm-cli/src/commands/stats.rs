//! The `mmm stats` command.

use std::path::PathBuf;

use anyhow::{bail, Result};

use mmm_core::settings::{expand_home, load_app_settings};
use mmm_stats::{read_stats, render_table, summarize};
use mmm_store::MmmConfig;

use super::open_store;

pub fn execute(config: &MmmConfig, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => {
            let store = open_store(config)?;
            let app = load_app_settings(&store)?;
            if app.stats_path.trim().is_empty() {
                bail!(
                    "no stats file configured; pass --path or set stats_path with `mmm settings set app`"
                );
            }
            expand_home(&app.stats_path)
        }
    };

    if !path.exists() {
        bail!("stats file not found: {}", path.display());
    }

    let rows = read_stats(&path)?;
    if rows.is_empty() {
        println!("No solved challenges recorded in {}", path.display());
        return Ok(());
    }

    let summaries = summarize(&rows);
    println!("{}", render_table(&summaries));
    println!("{} solves in {}", rows.len(), path.display());
    Ok(())
}
