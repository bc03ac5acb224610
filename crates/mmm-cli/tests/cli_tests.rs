//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `mmm` isolated inside `dir`: its own HOME, data dir and database.
fn mmm(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mmm").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("MMM_DIR", dir.path().join("data"))
        .env_remove("MMM_DB_PATH")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(dir.path().join("test.sqlite3"));
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("settings"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn settings_show_creates_defaults() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "show", "quotes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"level_max\": 10"))
        .stdout(predicate::str::contains("\"ch_per_level\": 1"));
    assert!(dir.path().join("test.sqlite3").exists());
}

#[test]
fn settings_show_all_records() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Memory Master Mind"))
        .stdout(predicate::str::contains("Static Number Sequence"))
        .stdout(predicate::str::contains("Timed Number Sequence"))
        .stdout(predicate::str::contains("Math (Arithmetic)"))
        .stdout(predicate::str::contains("Quotes and Verses"));
}

#[test]
fn settings_set_persists() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "set", "math", "negatives=True", "operations=+-*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated Math (Arithmetic)"));

    mmm(&dir)
        .args(["settings", "show", "math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"negatives\": true"))
        .stdout(predicate::str::contains("\"*\""));
}

#[test]
fn settings_set_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "set", "static", "digits_min=5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("must not exceed digits_max"));

    mmm(&dir)
        .args(["settings", "set", "static", "digits_max=abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a whole number"));

    mmm(&dir)
        .args(["settings", "set", "static", "colour=red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn settings_set_rejects_out_of_range_values() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "set", "static", "seconds_per_level=3000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be at most 3600"));

    mmm(&dir)
        .args(["settings", "set", "quotes", "words_max=0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be at least 1"));

    mmm(&dir)
        .args(["settings", "set", "quotes", "words_max=1"])
        .assert()
        .success();
}

#[test]
fn settings_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "set", "timed", "seconds_per_level=9"])
        .assert()
        .success();
    mmm(&dir)
        .args(["settings", "reset", "timed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset Timed Number Sequence"));
    mmm(&dir)
        .args(["settings", "show", "timed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"seconds_per_level\": 5"));
}

#[test]
fn unknown_challenge_is_an_error() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["settings", "show", "sudoku"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown challenge: sudoku"));

    mmm(&dir)
        .args(["play", "--challenge", "sudoku"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown challenge"));
}

#[test]
fn stats_summarizes_log() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("stats.csv");
    std::fs::write(
        &log,
        "datetime,challenge_name,level,solved_in_secs,first_try,settings\n\
         2024-03-09 14:05:07,Static Number Sequence,3,4.0,True,\n\
         2024-03-09 14:05:17,Static Number Sequence,4,6.0,False,\n",
    )
    .unwrap();

    mmm(&dir)
        .arg("stats")
        .arg("--path")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Static Number Sequence"))
        .stdout(predicate::str::contains("50.0%"))
        .stdout(predicate::str::contains("2 solves"));
}

#[test]
fn stats_uses_configured_path() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("mine.csv"),
        "datetime,challenge_name,level,solved_in_secs,first_try,settings\n\
         2024-03-09 14:05:07,Quotes and Verses,2,12.5,True,\n",
    )
    .unwrap();

    mmm(&dir)
        .args(["settings", "set", "app", "save_stats=True", "stats_path=~/mine.csv"])
        .assert()
        .success();
    mmm(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quotes and Verses"))
        .stdout(predicate::str::contains("12.5"));
}

#[test]
fn stats_without_path_fails() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stats file configured"));
}

#[test]
fn quotes_reports_bundled_source() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .arg("quotes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Source: bundled quotes"))
        .stdout(predicate::str::contains("Quotes: 30"));
}

#[test]
fn quotes_filters_custom_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("quotes.csv");
    std::fs::write(
        &file,
        "\"Less is more. (Mies)\"\n\"The only way out is through, and then some more.\nRobert Frost\"\n",
    )
    .unwrap();

    mmm(&dir)
        .arg("quotes")
        .arg("--path")
        .arg(&file)
        .args(["--words-max", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quotes: 2"))
        .stdout(predicate::str::contains("With at most 3 words: 1"));
}

#[test]
fn quotes_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["quotes", "--path", "nonexistent.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open quote file"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    mmm(&dir)
        .args(["--config", "nope.toml", "settings", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn config_file_is_read() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("mmm.toml"),
        "quotes_path = \"from-config.csv\"\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("from-config.csv"), "\"One two three four.\"\n").unwrap();

    mmm(&dir)
        .arg("quotes")
        .assert()
        .success()
        .stdout(predicate::str::contains("from-config.csv"))
        .stdout(predicate::str::contains("Quotes: 1"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    mmm(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mmm.toml"));
    assert!(dir.path().join("mmm.toml").exists());

    mmm(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
