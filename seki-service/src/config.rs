use std::fmt::Display;
use std::str::FromStr;

use go_engine::game::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use go_engine::{ScoringRules, TieBreak};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: invalid value {value:?}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Where game events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifierKind {
    /// Logged as JSON through `tracing`.
    #[default]
    Log,
    /// Written to stdout as JSON lines, interleaved with replies.
    Stdout,
    None,
}

impl std::fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierKind::Log => write!(f, "log"),
            NotifierKind::Stdout => write!(f, "stdout"),
            NotifierKind::None => write!(f, "none"),
        }
    }
}

impl FromStr for NotifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(NotifierKind::Log),
            "stdout" => Ok(NotifierKind::Stdout),
            "none" => Ok(NotifierKind::None),
            _ => Err(format!("unknown notifier: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub rules: ScoringRules,
    pub default_board_size: u8,
    pub notifier: NotifierKind,
    /// Events buffered for the stdout notifier before the oldest are dropped.
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rules: ScoringRules::default(),
            default_board_size: 19,
            notifier: NotifierKind::default(),
            event_capacity: 256,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let komi: f64 = parse_var(&lookup, "SEKI_KOMI", defaults.rules.komi)?;
        if !komi.is_finite() {
            return Err(invalid("SEKI_KOMI", komi, "must be a finite number"));
        }
        let tie_break: TieBreak =
            parse_var(&lookup, "SEKI_TIE_BREAK", defaults.rules.tie_break)?;

        let default_board_size: u8 = parse_var(
            &lookup,
            "SEKI_DEFAULT_BOARD_SIZE",
            defaults.default_board_size,
        )?;
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&default_board_size) {
            return Err(invalid(
                "SEKI_DEFAULT_BOARD_SIZE",
                default_board_size,
                &format!("must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}"),
            ));
        }

        let notifier: NotifierKind = parse_var(&lookup, "SEKI_NOTIFIER", defaults.notifier)?;
        let event_capacity: usize =
            parse_var(&lookup, "SEKI_EVENT_CAPACITY", defaults.event_capacity)?;
        if event_capacity == 0 {
            return Err(invalid("SEKI_EVENT_CAPACITY", 0, "must be positive"));
        }

        Ok(Config {
            rules: ScoringRules { komi, tie_break },
            default_board_size,
            notifier,
            event_capacity,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, &raw, &e.to_string())),
    }
}

fn invalid(name: &'static str, value: impl Display, reason: &str) -> ConfigError {
    ConfigError {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
