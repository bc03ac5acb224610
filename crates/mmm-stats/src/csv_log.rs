//! Append-only CSV stats log.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use mmm_core::model::StatsRecord;
use mmm_core::settings::expand_home;
use mmm_core::traits::StatsSink;
use mmm_core::AppSettings;

/// Header line written when the log file is created.
pub const CSV_HEADER: &str = "datetime,challenge_name,level,solved_in_secs,first_try,settings";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stats sink writing one line per solve to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvStatsLog {
    path: PathBuf,
    include_settings: bool,
}

impl CsvStatsLog {
    pub fn new(path: impl Into<PathBuf>, include_settings: bool) -> Self {
        Self {
            path: path.into(),
            include_settings,
        }
    }

    /// The log configured by the app settings, if saving stats is enabled.
    pub fn from_app_settings(app: &AppSettings) -> Option<Self> {
        if !app.save_stats || app.stats_path.trim().is_empty() {
            return None;
        }
        Some(Self::new(
            expand_home(&app.stats_path),
            app.stats_include_settings,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row(&self, entry: &StatsRecord) -> [String; 6] {
        let settings = if self.include_settings {
            entry.settings.snapshot()
        } else {
            String::new()
        };
        [
            entry.timestamp.format(DATETIME_FORMAT).to_string(),
            entry.challenge.id().to_string(),
            entry.level.to_string(),
            format!("{:.1}", entry.seconds_elapsed),
            if entry.first_try { "True" } else { "False" }.to_string(),
            settings,
        ]
    }
}

impl StatsSink for CsvStatsLog {
    fn record(&self, entry: &StatsRecord) -> Result<()> {
        let is_new = !self.path.exists();
        if is_new {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open stats log: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(CSV_HEADER.split(','))?;
        }
        writer.write_record(self.row(entry))?;
        writer
            .flush()
            .with_context(|| format!("failed to write stats log: {}", self.path.display()))?;

        info!(
            target: "mmm::stats",
            challenge = entry.challenge.id(),
            level = entry.level,
            secs = entry.seconds_elapsed,
            "stats recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::read_stats;
    use chrono::NaiveDate;
    use mmm_core::{ChallengeKind, ChallengeSettings};

    fn record(kind: ChallengeKind, level: u32, secs: f64, first_try: bool) -> StatsRecord {
        StatsRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 7)
                .unwrap(),
            challenge: kind,
            level,
            seconds_elapsed: secs,
            first_try,
            settings: ChallengeSettings::defaults_for(kind),
        }
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvStatsLog::new(dir.path().join("stats.csv"), false);
        log.record(&record(ChallengeKind::StaticNumbers, 3, 4.26, true))
            .unwrap();
        log.record(&record(ChallengeKind::MathArithmetic, 2, 10.0, false))
            .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "2024-03-09 14:05:07,Static Number Sequence,3,4.3,True,"
        );
        assert_eq!(
            lines[2],
            "2024-03-09 14:05:07,Math (Arithmetic),2,10.0,False,"
        );
    }

    #[test]
    fn settings_snapshot_survives_separators() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvStatsLog::new(dir.path().join("nested").join("stats.csv"), true);
        let mut entry = record(ChallengeKind::Quotes, 1, 2.0, true);
        entry.settings.quotes_path = "my \"best\", quotes.csv".into();
        log.record(&entry).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert!(row.starts_with("2024-03-09 14:05:07,Quotes and Verses,1,2.0,True,\""));

        let rows = read_stats(log.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].settings, entry.settings.snapshot());
        assert!(rows[0].settings.contains("quotes_path=my \"best\", quotes.csv"));
    }

    #[test]
    fn disabled_without_path_or_flag() {
        let mut app = AppSettings::default();
        assert!(CsvStatsLog::from_app_settings(&app).is_none());
        app.save_stats = true;
        assert!(CsvStatsLog::from_app_settings(&app).is_none());
        app.stats_path = "/tmp/mmm-stats.csv".into();
        let log = CsvStatsLog::from_app_settings(&app).unwrap();
        assert_eq!(log.path(), Path::new("/tmp/mmm-stats.csv"));
        app.save_stats = false;
        assert!(CsvStatsLog::from_app_settings(&app).is_none());
    }
}
