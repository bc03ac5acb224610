//! The `mmm init` command.

use anyhow::Result;

use mmm_store::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    if std::path::Path::new("mmm.toml").exists() {
        println!("mmm.toml already exists, skipping.");
    } else {
        std::fs::write("mmm.toml", SAMPLE_CONFIG)?;
        println!("Created mmm.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit mmm.toml to choose the database and penalty policy");
    println!("  2. Run: mmm play");
    println!("  3. Enable stats with: mmm settings set app save_stats=True stats_path=~/mmm-stats.csv");

    Ok(())
}
