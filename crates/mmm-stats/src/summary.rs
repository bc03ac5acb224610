//! Reading the stats log and aggregating it per challenge.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Deserialize;

/// One parsed row of the stats log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsRow {
    pub datetime: String,
    pub challenge_name: String,
    pub level: u32,
    pub solved_in_secs: f64,
    #[serde(deserialize_with = "python_bool")]
    pub first_try: bool,
    #[serde(default)]
    pub settings: String,
}

fn python_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid first_try value: {other}"
        ))),
    }
}

/// Aggregated results for one challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeSummary {
    pub challenge: String,
    pub solves: usize,
    pub first_try: usize,
    pub total_secs: f64,
    pub max_level: u32,
}

impl ChallengeSummary {
    fn new(challenge: &str) -> Self {
        Self {
            challenge: challenge.to_string(),
            solves: 0,
            first_try: 0,
            total_secs: 0.0,
            max_level: 0,
        }
    }

    pub fn first_try_rate(&self) -> f64 {
        if self.solves == 0 {
            0.0
        } else {
            self.first_try as f64 / self.solves as f64
        }
    }

    pub fn mean_secs(&self) -> f64 {
        if self.solves == 0 {
            0.0
        } else {
            self.total_secs / self.solves as f64
        }
    }
}

/// Parse every row of the stats log at `path`.
pub fn read_stats(path: &Path) -> Result<Vec<StatsRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open stats log: {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize::<StatsRow>().enumerate() {
        let row = row.with_context(|| format!("invalid stats row {}", idx + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Aggregate rows per challenge, ordered by challenge name.
pub fn summarize(rows: &[StatsRow]) -> Vec<ChallengeSummary> {
    let mut by_challenge: BTreeMap<&str, ChallengeSummary> = BTreeMap::new();
    for row in rows {
        let entry = by_challenge
            .entry(row.challenge_name.as_str())
            .or_insert_with(|| ChallengeSummary::new(&row.challenge_name));
        entry.solves += 1;
        entry.first_try += usize::from(row.first_try);
        entry.total_secs += row.solved_in_secs;
        entry.max_level = entry.max_level.max(row.level);
    }
    by_challenge.into_values().collect()
}

pub fn render_table(summaries: &[ChallengeSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Challenge",
        "Solves",
        "First try",
        "Mean secs",
        "Best level",
    ]);

    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.challenge),
            Cell::new(s.solves),
            Cell::new(format!("{:.1}%", s.first_try_rate() * 100.0)),
            Cell::new(format!("{:.1}", s.mean_secs())),
            Cell::new(s.max_level),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_log::CSV_HEADER;

    fn write_log(rows: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        let mut content = format!("{CSV_HEADER}\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_rows_with_and_without_settings() {
        let (_dir, path) = write_log(&[
            "2024-03-09 14:05:07,Static Number Sequence,3,4.3,True,",
            "2024-03-09 14:06:00,Quotes and Verses,2,12.0,False,\"level=2|words_max=999\"",
        ]);
        let rows = read_stats(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].first_try);
        assert_eq!(rows[0].settings, "");
        assert!(!rows[1].first_try);
        assert_eq!(rows[1].settings, "level=2|words_max=999");
    }

    #[test]
    fn aggregates_per_challenge() {
        let (_dir, path) = write_log(&[
            "2024-03-09 14:05:07,Static Number Sequence,3,4.0,True,",
            "2024-03-09 14:05:17,Static Number Sequence,4,6.0,False,",
            "2024-03-09 14:05:27,Math (Arithmetic),2,9.5,True,",
        ]);
        let summaries = summarize(&read_stats(&path).unwrap());
        assert_eq!(summaries.len(), 2);

        let math = &summaries[0];
        assert_eq!(math.challenge, "Math (Arithmetic)");
        assert_eq!(math.solves, 1);

        let numbers = &summaries[1];
        assert_eq!(numbers.solves, 2);
        assert_eq!(numbers.first_try, 1);
        assert_eq!(numbers.max_level, 4);
        assert!((numbers.mean_secs() - 5.0).abs() < 1e-9);
        assert!((numbers.first_try_rate() - 0.5).abs() < 1e-9);

        let table = render_table(&summaries).to_string();
        assert!(table.contains("Static Number Sequence"));
        assert!(table.contains("50.0%"));
    }

    #[test]
    fn invalid_row_is_reported() {
        let (_dir, path) = write_log(&["2024-03-09 14:05:07,Static Number Sequence,x,4.0,True,"]);
        let err = read_stats(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid stats row 2"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_stats(Path::new("/nonexistent/stats.csv")).is_err());
    }
}
