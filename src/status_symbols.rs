//! Common status symbols used throughout the settings screens

/// Success indicator (✓)
pub const SUCCESS: &str = "✓";

/// Error indicator (✗)
pub const ERROR: &str = "✗";

/// Information indicator (ℹ)
pub const INFO: &str = "ℹ";

/// Warning indicator (⚠)
pub const WARNING: &str = "⚠";

pub fn success(msg: &str) -> String {
    format!("{} {}", SUCCESS, msg)
}

pub fn error(msg: &str) -> String {
    format!("{} {}", ERROR, msg)
}

pub fn info(msg: &str) -> String {
    format!("{} {}", INFO, msg)
}

pub fn warning(msg: &str) -> String {
    format!("{} {}", WARNING, msg)
}
