//! The `mmm settings` commands.

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use mmm_core::model::APP_ID;
use mmm_core::settings::{
    load_app_settings, load_challenge_settings, save_app_settings, save_challenge_settings,
};
use mmm_core::{AppSettings, ChallengeKind, ChallengeSettings};
use mmm_store::{MmmConfig, SqliteStore};

use super::open_store;

/// A settings record addressed from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    App,
    Challenge(ChallengeKind),
}

impl Target {
    fn parse(raw: &str) -> Result<Self> {
        let needle = raw.trim();
        if ["app", "home"].iter().any(|a| a.eq_ignore_ascii_case(needle))
            || needle.eq_ignore_ascii_case(APP_ID)
        {
            return Ok(Target::App);
        }
        Ok(Target::Challenge(needle.parse()?))
    }

    fn id(&self) -> &'static str {
        match self {
            Target::App => APP_ID,
            Target::Challenge(kind) => kind.id(),
        }
    }

    fn load(&self, store: &SqliteStore) -> Result<Value> {
        let value = match self {
            Target::App => serde_json::to_value(load_app_settings(store)?)?,
            Target::Challenge(kind) => {
                serde_json::to_value(load_challenge_settings(store, *kind)?)?
            }
        };
        Ok(value)
    }
}

fn parse_pairs(fields: &[String]) -> Result<Vec<(&str, &str)>> {
    fields
        .iter()
        .map(|f| match f.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
            _ => bail!("expected key=value, got '{f}'"),
        })
        .collect()
}

pub fn show(config: &MmmConfig, target: Option<String>) -> Result<()> {
    let store = open_store(config)?;

    let value = match target {
        Some(raw) => Target::parse(&raw)?.load(&store)?,
        None => {
            let mut all = Map::new();
            all.insert(APP_ID.to_string(), Target::App.load(&store)?);
            for kind in ChallengeKind::ALL {
                let target = Target::Challenge(kind);
                all.insert(target.id().to_string(), target.load(&store)?);
            }
            Value::Object(all)
        }
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn set(config: &MmmConfig, target: &str, fields: &[String]) -> Result<()> {
    let target = Target::parse(target)?;
    let pairs = parse_pairs(fields)?;
    let store = open_store(config)?;

    match target {
        Target::App => {
            let mut app = load_app_settings(&store)?;
            app.apply_fields(pairs.iter().copied())?;
            save_app_settings(&store, &app)?;
        }
        Target::Challenge(kind) => {
            let mut settings = load_challenge_settings(&store, kind)?;
            settings.apply_fields(pairs.iter().copied())?;
            save_challenge_settings(&store, kind, &settings)?;
        }
    }

    println!("Updated {}", target.id());
    for (key, value) in &pairs {
        println!("  {key} = {value}");
    }
    Ok(())
}

pub fn reset(config: &MmmConfig, target: &str) -> Result<()> {
    let target = Target::parse(target)?;
    let store = open_store(config)?;

    match target {
        Target::App => save_app_settings(&store, &AppSettings::default())?,
        Target::Challenge(kind) => {
            save_challenge_settings(&store, kind, &ChallengeSettings::defaults_for(kind))?
        }
    }

    println!("Reset {} to defaults", target.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names() {
        assert_eq!(Target::parse("app").unwrap(), Target::App);
        assert_eq!(Target::parse("Memory Master Mind").unwrap(), Target::App);
        assert_eq!(
            Target::parse("quotes").unwrap(),
            Target::Challenge(ChallengeKind::Quotes)
        );
        assert!(Target::parse("chess").is_err());
    }

    #[test]
    fn pairs_need_an_equals_sign() {
        let fields = vec!["level_max=12".to_string(), "quotes_path=a=b.csv".to_string()];
        assert_eq!(
            parse_pairs(&fields).unwrap(),
            vec![("level_max", "12"), ("quotes_path", "a=b.csv")]
        );
        assert!(parse_pairs(&["level_max".to_string()]).is_err());
        assert!(parse_pairs(&["=3".to_string()]).is_err());
    }
}
