use std::{
    fmt,
    fs::{create_dir_all, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

pub mod cc {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RESET: &str = "\x1b[0m";
    pub const ORANGE: &str = "\x1b[38;5;208m";
    pub const LIGHT_GRAY: &str = "\x1b[38;5;245m";
    pub const LIGHT_GREEN: &str = "\x1b[92m";
    pub const LIGHT_BLUE: &str = "\x1b[94m";
    pub const LIGHT_RED: &str = "\x1b[91m";
}

pub const LOG_DIR: &str = "logs";

/// Set while the terminal UI owns the screen; stderr output would corrupt it.
static FILE_ONLY: AtomicBool = AtomicBool::new(false);

pub fn route_to_file(on: bool) {
    FILE_ONLY.store(on, Ordering::Relaxed);
}

fn debug_logs_enabled() -> bool {
    std::env::var("DEBUG_LOGS")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn log_file_path() -> PathBuf {
    let day = chrono::Utc::now().format("%Y-%m-%d");
    Path::new(LOG_DIR).join(format!("dappterm_{day}.txt"))
}

/// Backing function of the `log!` / `warn!` macros.
pub fn emit(color: &str, args: fmt::Arguments<'_>) {
    let time = chrono::Utc::now().format("%H:%M:%S%.3f");
    let file_only = FILE_ONLY.load(Ordering::Relaxed);

    if file_only || debug_logs_enabled() {
        let _ = append_line(&log_file_path(), &format!("[{time}] {args}"));
    }
    if !file_only {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{}{} | {}{}{}{}",
            cc::LIGHT_GRAY,
            time,
            cc::RESET,
            color,
            args,
            cc::RESET
        );
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

/// Newest-first tail of today's log file, for the Logs tab.
pub fn tail_log(max: usize) -> Vec<String> {
    let Ok(text) = std::fs::read_to_string(log_file_path()) else {
        return Vec::new();
    };
    text.lines().rev().take(max).map(str::to_string).collect()
}

#[macro_export]
macro_rules! log {
    ($fmt:literal $(,)?) => {
        $crate::libs::writing::emit($crate::libs::writing::cc::LIGHT_GRAY, format_args!($fmt))
    };
    ($fmt:literal, $($arg:tt)+) => {
        $crate::libs::writing::emit(
            $crate::libs::writing::cc::LIGHT_GRAY,
            format_args!($fmt, $($arg)+),
        )
    };
    // log!(cc::GREEN, "connected");
    ($color:expr, $fmt:literal $(,)?) => {
        $crate::libs::writing::emit($color, format_args!($fmt))
    };
    // log!(cc::GREEN, "chain: {}", id);
    ($color:expr, $fmt:literal, $($arg:tt)+) => {
        $crate::libs::writing::emit($color, format_args!($fmt, $($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::libs::writing::emit($crate::libs::writing::cc::ORANGE, format_args!($($arg)*))
    };
}
