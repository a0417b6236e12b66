//! Runtime settings, read from the environment (and a `.env` file when present).

use crate::backends::clock::parse_utc_offset;
use crate::engine::quota::DEFAULT_EMAIL_QUOTA;
use crate::engine::{MergeOptions, RunBudget};
use chrono::FixedOffset;
use log::warn;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// CSV file acting as the active sheet.
    pub sheet_path: PathBuf,
    /// Root of the local drive and mailbox.
    pub data_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub email_quota: usize,
    /// Execution time ceiling of one merge run; `None` for no ceiling.
    pub max_run: Option<Duration>,
    pub retain_working_copies: bool,
    /// Zone of `{{today's date}}`; the local zone when unset.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            sheet_path: PathBuf::from("./sheet.csv"),
            data_dir: PathBuf::from("./docmerge-data"),
            fonts_dir: PathBuf::from("./fonts"),
            email_quota: DEFAULT_EMAIL_QUOTA,
            max_run: Some(Duration::from_secs(360)),
            retain_working_copies: true,
            utc_offset: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unparsable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_run = match parse_or("DOCMERGE_MAX_RUN_SECS", get("DOCMERGE_MAX_RUN_SECS"), 360u64) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let utc_offset = get("DOCMERGE_UTC_OFFSET").and_then(|raw| {
            let parsed = parse_utc_offset(&raw);
            if parsed.is_none() {
                warn!("Ignoring invalid DOCMERGE_UTC_OFFSET \"{}\"", raw);
            }
            parsed
        });

        Self {
            host: get("DOCMERGE_HOST").unwrap_or(defaults.host),
            port: parse_or("DOCMERGE_PORT", get("DOCMERGE_PORT"), defaults.port),
            sheet_path: get("DOCMERGE_SHEET").map(PathBuf::from).unwrap_or(defaults.sheet_path),
            data_dir: get("DOCMERGE_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            fonts_dir: get("DOCMERGE_FONTS_DIR").map(PathBuf::from).unwrap_or(defaults.fonts_dir),
            email_quota: parse_or("DOCMERGE_EMAIL_QUOTA", get("DOCMERGE_EMAIL_QUOTA"), defaults.email_quota),
            max_run,
            retain_working_copies: parse_bool_or(
                "DOCMERGE_RETAIN_WORKING_COPIES",
                get("DOCMERGE_RETAIN_WORKING_COPIES"),
                defaults.retain_working_copies,
            ),
            utc_offset,
        }
    }

    pub fn drive_dir(&self) -> PathBuf {
        self.data_dir.join("drive")
    }

    pub fn mailbox_path(&self) -> PathBuf {
        self.data_dir.join("mail.sqlite")
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            retain_working_copies: self.retain_working_copies,
        }
    }

    /// A fresh budget for one run.
    pub fn run_budget(&self) -> RunBudget {
        match self.max_run {
            Some(limit) => RunBudget::with_time_limit(limit),
            None => RunBudget::unlimited(),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {} \"{}\"", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_bool_or(key: &str, raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => default,
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        Some(other) => {
            warn!("Ignoring invalid {} \"{}\"", key, other);
            default
        }
    }
}
