//! Settings persistence helpers and preference-field editing.
//!
//! Records are read with get-or-create-default semantics: a missing record is
//! created from the defaults and persisted immediately, missing fields are
//! completed from the defaults, and a record that fails to parse is replaced.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::SettingsError;
use crate::model::{AppSettings, ChallengeKind, ChallengeSettings, APP_ID};
use crate::traits::SettingsStore;

/// Largest digit count a generator can draw without overflowing `u64`.
pub const DIGITS_LIMIT: u32 = 18;

/// Upper bound for `seconds_per_level`.
pub const SECONDS_PER_LEVEL_LIMIT: u32 = 3600;

/// Operators accepted in the arithmetic operator set.
pub const OPERATORS: [&str; 4] = ["+", "-", "*", "/"];

/// Expand a leading `~` to `$HOME`.
pub fn expand_home(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw == "~" || raw.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(raw.trim_start_matches('~').trim_start_matches('/'));
        }
    }
    PathBuf::from(raw)
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the settings of a challenge kind, creating defaults when absent.
pub fn load_challenge_settings(
    store: &dyn SettingsStore,
    kind: ChallengeKind,
) -> anyhow::Result<ChallengeSettings> {
    load_or_default(store, kind.id(), ChallengeSettings::defaults_for(kind))
}

/// Persist the settings of a challenge kind.
pub fn save_challenge_settings(
    store: &dyn SettingsStore,
    kind: ChallengeKind,
    settings: &ChallengeSettings,
) -> anyhow::Result<()> {
    store.put(kind.id(), &serde_json::to_value(settings)?)
}

/// Load the application settings, creating defaults when absent.
pub fn load_app_settings(store: &dyn SettingsStore) -> anyhow::Result<AppSettings> {
    load_or_default(store, APP_ID, AppSettings::default())
}

/// Persist the application settings.
pub fn save_app_settings(store: &dyn SettingsStore, settings: &AppSettings) -> anyhow::Result<()> {
    store.put(APP_ID, &serde_json::to_value(settings)?)
}

fn load_or_default<T>(store: &dyn SettingsStore, key: &str, defaults: T) -> anyhow::Result<T>
where
    T: Serialize + DeserializeOwned,
{
    match store.get(key)? {
        Some(stored) => match merge_with_defaults(stored, &defaults) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(target: "mmm::settings", %key, error = %e, "malformed settings record, restoring defaults");
                store.put(key, &serde_json::to_value(&defaults)?)?;
                Ok(defaults)
            }
        },
        None => {
            store.put(key, &serde_json::to_value(&defaults)?)?;
            Ok(defaults)
        }
    }
}

/// Overlay the stored fields on top of the defaults and deserialize.
fn merge_with_defaults<T>(stored: serde_json::Value, defaults: &T) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(defaults)?;
    match (&mut merged, stored) {
        (serde_json::Value::Object(base), serde_json::Value::Object(fields)) => {
            for (k, v) in fields {
                base.insert(k, v);
            }
        }
        (_, other) => merged = other,
    }
    serde_json::from_value(merged)
}

// ---------------------------------------------------------------------------
// Preference fields
// ---------------------------------------------------------------------------

/// Input class of an editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Digits only.
    Number,
    /// `True` / `False`.
    Bool,
    /// Free text (paths).
    Text,
    /// Characters from `+ - * /`.
    Operations,
}

impl FieldKind {
    /// Whether `c` may be typed into a field of this kind.
    pub fn accepts(&self, c: char) -> bool {
        match self {
            FieldKind::Number => c.is_ascii_digit(),
            FieldKind::Bool => c.is_ascii_alphabetic(),
            FieldKind::Text => !c.is_control(),
            FieldKind::Operations => matches!(c, '+' | '-' | '*' | '/' | ' '),
        }
    }
}

/// An editable preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { key, label, kind }
}

const NUMBER_FIELDS: &[FieldSpec] = &[
    field("digits_min", "Digits min:", FieldKind::Number),
    field("digits_max", "Digits max:", FieldKind::Number),
    field("level_max", "Level max:", FieldKind::Number),
    field("ch_per_level", "Challenges per level:", FieldKind::Number),
    field("seconds_per_level", "Seconds per level:", FieldKind::Number),
    field("primes_are_red", "Primes are red:", FieldKind::Bool),
    field("zero_padded", "Zero padded:", FieldKind::Bool),
];

const MATH_FIELDS: &[FieldSpec] = &[
    field("digits_min", "Digits min:", FieldKind::Number),
    field("digits_max", "Digits max:", FieldKind::Number),
    field("level_max", "Level max:", FieldKind::Number),
    field("ch_per_level", "Challenges per level:", FieldKind::Number),
    field("seconds_per_level", "Seconds per level:", FieldKind::Number),
    field("primes_are_red", "Primes are red:", FieldKind::Bool),
    field("operations", "Operations (+ - / *):", FieldKind::Operations),
    field("negatives", "Negatives:", FieldKind::Bool),
    field("solve_frac_dec", "Solve fractions to decimals:", FieldKind::Number),
];

const QUOTE_FIELDS: &[FieldSpec] = &[
    field("level_max", "Level max:", FieldKind::Number),
    field("ch_per_level", "Challenges per level:", FieldKind::Number),
    field("words_max", "Words max:", FieldKind::Number),
    field("show_first_letter", "Show first letter:", FieldKind::Bool),
    field("quotes_path", "Quotes CSV file path:", FieldKind::Text),
];

const APP_FIELDS: &[FieldSpec] = &[
    field("save_stats", "Save stats:", FieldKind::Bool),
    field("stats_include_settings", "Stats include settings:", FieldKind::Bool),
    field("stats_path", "Stats CSV file path:", FieldKind::Text),
];

/// Editable fields of a challenge kind, in display order.
pub fn challenge_fields(kind: ChallengeKind) -> &'static [FieldSpec] {
    match kind {
        ChallengeKind::StaticNumbers | ChallengeKind::TimedNumbers => NUMBER_FIELDS,
        ChallengeKind::MathArithmetic => MATH_FIELDS,
        ChallengeKind::Quotes => QUOTE_FIELDS,
    }
}

/// Editable application fields, in display order.
pub fn app_fields() -> &'static [FieldSpec] {
    APP_FIELDS
}

fn parse_number(key: &str, value: &str) -> Result<u32, SettingsError> {
    let v = value.trim();
    if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) {
        return Err(SettingsError::invalid(key, value, "expected a whole number"));
    }
    v.parse::<u32>()
        .map_err(|e| SettingsError::invalid(key, value, e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SettingsError::invalid(key, value, "expected True or False")),
    }
}

/// Parse an operator set such as `"+ -"` or `"+-*"`.
pub fn parse_operations(key: &str, value: &str) -> Result<Vec<String>, SettingsError> {
    let mut ops = Vec::new();
    for c in value.chars().filter(|c| !c.is_whitespace()) {
        let op = c.to_string();
        if !OPERATORS.contains(&op.as_str()) {
            return Err(SettingsError::invalid(key, value, format!("'{c}' is not an operator")));
        }
        ops.push(op);
    }
    if ops.is_empty() {
        return Err(SettingsError::invalid(key, value, "at least one operator is required"));
    }
    Ok(ops)
}

fn bool_text(b: bool) -> String {
    if b { "True" } else { "False" }.to_string()
}

impl ChallengeSettings {
    /// Current value of a field, formatted for editing.
    pub fn field_value(&self, key: &str) -> Option<String> {
        let v = match key {
            "digits_min" => self.digits_min.to_string(),
            "digits_max" => self.digits_max.to_string(),
            "ch_per_level" => self.ch_per_level.to_string(),
            "seconds_per_level" => self.seconds_per_level.to_string(),
            "level" => self.level.to_string(),
            "level_max" => self.level_max.to_string(),
            "zero_padded" => bool_text(self.zero_padded),
            "operations" => self.operations.join(" "),
            "negatives" => bool_text(self.negatives),
            "solve_frac_dec" => self.solve_frac_dec.to_string(),
            "words_max" => self.words_max.to_string(),
            "quotes_path" => self.quotes_path.clone(),
            "last_quote_idx" => self.last_quote_idx.to_string(),
            "show_first_letter" => bool_text(self.show_first_letter),
            "primes_are_red" => bool_text(self.primes_are_red),
            _ => return None,
        };
        Some(v)
    }

    /// Set one field from user input without cross-field validation.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "digits_min" => self.digits_min = parse_number(key, value)?,
            "digits_max" => self.digits_max = parse_number(key, value)?,
            "ch_per_level" => self.ch_per_level = parse_number(key, value)?,
            "seconds_per_level" => self.seconds_per_level = parse_number(key, value)?,
            "level" => self.level = parse_number(key, value)?,
            "level_max" => self.level_max = parse_number(key, value)?,
            "zero_padded" => self.zero_padded = parse_bool(key, value)?,
            "operations" => self.operations = parse_operations(key, value)?,
            "negatives" => self.negatives = parse_bool(key, value)?,
            "solve_frac_dec" => self.solve_frac_dec = parse_number(key, value)?,
            "words_max" => self.words_max = parse_number(key, value)?,
            "quotes_path" => self.quotes_path = value.trim().to_string(),
            "show_first_letter" => self.show_first_letter = parse_bool(key, value)?,
            "primes_are_red" => self.primes_are_red = parse_bool(key, value)?,
            _ => {
                return Err(SettingsError::UnknownField {
                    target: "challenge settings".into(),
                    field: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Cross-field checks run after a batch of edits.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.digits_min == 0 {
            return Err(SettingsError::invalid("digits_min", "0", "must be at least 1"));
        }
        if self.digits_max > DIGITS_LIMIT {
            return Err(SettingsError::invalid(
                "digits_max",
                &self.digits_max.to_string(),
                format!("must be at most {DIGITS_LIMIT}"),
            ));
        }
        if self.digits_min > self.digits_max {
            return Err(SettingsError::invalid(
                "digits_min",
                &self.digits_min.to_string(),
                "must not exceed digits_max",
            ));
        }
        if self.level_max == 0 {
            return Err(SettingsError::invalid("level_max", "0", "must be at least 1"));
        }
        if self.ch_per_level == 0 {
            return Err(SettingsError::invalid("ch_per_level", "0", "must be at least 1"));
        }
        if self.seconds_per_level > SECONDS_PER_LEVEL_LIMIT {
            return Err(SettingsError::invalid(
                "seconds_per_level",
                &self.seconds_per_level.to_string(),
                format!("must be at most {SECONDS_PER_LEVEL_LIMIT}"),
            ));
        }
        if self.words_max == 0 {
            return Err(SettingsError::invalid("words_max", "0", "must be at least 1"));
        }
        Ok(())
    }

    /// Apply several `key=value` edits atomically.
    pub fn apply_fields<'a, I>(&mut self, edits: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut next = self.clone();
        for (key, value) in edits {
            next.set_field(key, value)?;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// `key=value|key=value` snapshot used by the stats log.
    pub fn snapshot(&self) -> String {
        const KEYS: [&str; 15] = [
            "digits_min",
            "digits_max",
            "ch_per_level",
            "seconds_per_level",
            "level",
            "level_max",
            "zero_padded",
            "operations",
            "negatives",
            "solve_frac_dec",
            "words_max",
            "quotes_path",
            "last_quote_idx",
            "show_first_letter",
            "primes_are_red",
        ];
        KEYS.iter()
            .filter_map(|k| self.field_value(k).map(|v| format!("{k}={v}")))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl AppSettings {
    /// Current value of a field, formatted for editing.
    pub fn field_value(&self, key: &str) -> Option<String> {
        let v = match key {
            "last_challenge" => self.last_challenge.clone(),
            "save_stats" => bool_text(self.save_stats),
            "stats_include_settings" => bool_text(self.stats_include_settings),
            "stats_path" => self.stats_path.clone(),
            _ => return None,
        };
        Some(v)
    }

    /// Set one field from user input.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "save_stats" => self.save_stats = parse_bool(key, value)?,
            "stats_include_settings" => self.stats_include_settings = parse_bool(key, value)?,
            "stats_path" => self.stats_path = value.trim().to_string(),
            _ => {
                return Err(SettingsError::UnknownField {
                    target: "app settings".into(),
                    field: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Apply several `key=value` edits atomically.
    pub fn apply_fields<'a, I>(&mut self, edits: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut next = self.clone();
        for (key, value) in edits {
            next.set_field(key, value)?;
        }
        *self = next;
        Ok(())
    }
}
