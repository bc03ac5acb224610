//! The `mmm play` command.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

use mmm_core::traits::{MemoryStore, SettingsStore};
use mmm_core::ChallengeKind;
use mmm_store::MmmConfig;

use super::open_store;
use crate::tui::{self, App};

pub async fn execute(config: &MmmConfig, challenge: Option<String>, ephemeral: bool) -> Result<()> {
    let kind = challenge
        .map(|c| c.parse::<ChallengeKind>())
        .transpose()?;

    let store: Arc<dyn SettingsStore> = if ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(open_store(config)?)
    };

    info!(
        target: "mmm::cli",
        database = %config.database.display(),
        ephemeral,
        "starting session"
    );

    let app = App::new(store, config.session_options(), kind, Instant::now())?;
    tui::run(app).await
}
