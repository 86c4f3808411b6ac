use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

const APP_DIR: &str = "axe-monitor";

const LOG_FILE: &str = "monitor.log";

static DIFFICULTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*([kKMGTP]?)\s*$").expect("difficulty pattern is valid")
});

/// Parse a difficulty in the notation AxeOS uses for best shares, e.g.
/// `"4.29G"` or `"1000M"`. A bare number is taken as is.
pub fn parse_difficulty(input: &str) -> Option<f64> {
    let captures = DIFFICULTY.captures(input)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;

    let multiplier = match captures.get(2).map(|m| m.as_str()) {
        Some("k") | Some("K") => 1e3,
        Some("M") => 1e6,
        Some("G") => 1e9,
        Some("T") => 1e12,
        Some("P") => 1e15,
        _ => 1.0,
    };

    Some(value * multiplier)
}

/// Directory for the log file, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
        .join(APP_DIR)
}

pub fn default_log_path() -> PathBuf {
    data_dir().join(LOG_FILE)
}

/// Default location of the optional configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join(APP_DIR).join("config.toml"))
}
