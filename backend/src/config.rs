use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use shared::constants::FRAME_INTERVAL_MS;
use shared::roulette::SpinSettings;
use validator::{Validate, ValidationErrors};

use crate::session::DrawOptions;

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    Settings(ValidationErrors),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { key, value } => write!(f, "Invalid value for {}: {:?}", key, value),
            Self::Settings(e) => write!(f, "Invalid spin settings: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ValidationErrors> for ConfigError {
    fn from(err: ValidationErrors) -> Self {
        Self::Settings(err)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spin: SpinSettings,
    pub seed: Option<String>,
    pub exclude_previous_winners: bool,
    pub frame_interval: Duration,
    pub entries: Vec<String>,
    /// (prize name, winners for that prize), in draw order
    pub prizes: Vec<(String, i32)>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SpinSettings::default();
        let spin = SpinSettings {
            layout: parse_or(&lookup, "DRAW_LAYOUT", defaults.layout)?,
            spin_duration_ms: parse_or(&lookup, "DRAW_SPIN_DURATION_MS", defaults.spin_duration_ms)?,
            reveal_delay_ms: parse_or(&lookup, "DRAW_REVEAL_DELAY_MS", defaults.reveal_delay_ms)?,
            item_height: parse_or(&lookup, "DRAW_ITEM_HEIGHT", defaults.item_height)?,
            item_spacing: parse_or(&lookup, "DRAW_ITEM_SPACING", defaults.item_spacing)?,
            vertical_velocity: parse_or(&lookup, "DRAW_VERTICAL_VELOCITY", defaults.vertical_velocity)?,
            wheel_velocity: parse_or(&lookup, "DRAW_WHEEL_VELOCITY", defaults.wheel_velocity)?,
            min_spins: parse_or(&lookup, "DRAW_MIN_SPINS", defaults.min_spins)?,
            max_spins: parse_or(&lookup, "DRAW_MAX_SPINS", defaults.max_spins)?,
        };
        spin.validate()?;

        let seed = lookup("DRAW_SEED").filter(|s| !s.is_empty());
        let exclude_previous_winners = parse_or(&lookup, "DRAW_EXCLUDE_PREVIOUS_WINNERS", false)?;
        let frame_interval = Duration::from_millis(parse_or(&lookup, "DRAW_FRAME_INTERVAL_MS", FRAME_INTERVAL_MS)?);

        let entries = lookup("DRAW_ENTRIES")
            .map(|raw| split_list(&raw).map(str::to_string).collect())
            .unwrap_or_default();
        let prizes = match lookup("DRAW_PRIZES") {
            Some(raw) => parse_prizes(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            spin,
            seed,
            exclude_previous_winners,
            frame_interval,
            entries,
            prizes,
        })
    }

    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            seed: self.seed.clone(),
            exclude_previous_winners: self.exclude_previous_winners,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

// "Grand prize:1, Mug:3" ; a missing count means one winner
fn parse_prizes(raw: &str) -> Result<Vec<(String, i32)>, ConfigError> {
    split_list(raw)
        .map(|item| match item.rsplit_once(':') {
            Some((name, count)) => count
                .trim()
                .parse()
                .map(|count| (name.trim().to_string(), count))
                .map_err(|_| ConfigError::Invalid {
                    key: "DRAW_PRIZES",
                    value: item.to_string(),
                }),
            None => Ok((item.to_string(), 1)),
        })
        .collect()
}
