// Pagefreeze platform abstraction
// Resolves where settings and the origin database live on each OS.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for Pagefreeze.
///
/// - **Linux**: `~/.config/pagefreeze` (or `$XDG_CONFIG_HOME/pagefreeze`)
/// - **macOS**: `~/Library/Preferences/Pagefreeze`
/// - **Windows**: `%APPDATA%/Pagefreeze`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory (holds `pagefreeze.db`).
///
/// - **Linux**: `~/.local/share/pagefreeze` (or `$XDG_DATA_HOME/pagefreeze`)
/// - **macOS**: `~/Library/Application Support/Pagefreeze`
/// - **Windows**: `%LOCALAPPDATA%/Pagefreeze`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
