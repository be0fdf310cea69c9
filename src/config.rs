use crate::client::controller::DEFAULT_DEBOUNCE;
use crate::client::window::DEFAULT_MAX_ITEMS;
use crate::domain::criteria::PageBounds;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, read once at startup.
///
/// Everything has a default so the server runs with no environment at all;
/// each value can be overridden with an `ECOFINDER_*` variable. Malformed
/// numeric values degrade to the default rather than failing startup,
/// matching how query parameters are treated.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Path to the schema applied at startup.
    pub schema_path: String,
    /// Allowed page-size range for paginated queries.
    pub page_bounds: PageBounds,
    /// Retained-item cap for the client-side sliding window.
    pub window_size: usize,
    /// Quiescence delay between a filter edit and the fetch it triggers.
    pub debounce: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = PageBounds::default();
        let min = parse_or(lookup("ECOFINDER_PAGE_MIN"), defaults.min);
        let max = parse_or(lookup("ECOFINDER_PAGE_MAX"), defaults.max);

        Config {
            bind_addr: lookup("ECOFINDER_ADDR").unwrap_or_else(|| "127.0.0.1:3000".into()),
            database_path: lookup("ECOFINDER_DB").unwrap_or_else(|| "ecofinder.sqlite3".into()),
            schema_path: lookup("ECOFINDER_SCHEMA").unwrap_or_else(|| "sql/schema.sql".into()),
            page_bounds: checked_bounds(min, max),
            window_size: match parse_or(lookup("ECOFINDER_WINDOW"), DEFAULT_MAX_ITEMS) {
                0 => DEFAULT_MAX_ITEMS,
                n => n,
            },
            debounce: Duration::from_millis(parse_or(
                lookup("ECOFINDER_DEBOUNCE_MS"),
                DEFAULT_DEBOUNCE.as_millis() as u64,
            )),
        }
    }
}

fn parse_or<T: FromStr + Copy>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// An inverted or zero-based range cannot clamp anything sensibly, so the
/// pair falls back to the defaults as a unit.
fn checked_bounds(min: u32, max: u32) -> PageBounds {
    if min == 0 || min > max {
        PageBounds::default()
    } else {
        PageBounds { min, max }
    }
}
