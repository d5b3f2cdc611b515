// Pagefreeze platform paths for Linux
// Config: ~/.config/pagefreeze
// Data:   ~/.local/share/pagefreeze

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME/pagefreeze` if set, otherwise `~/.config/pagefreeze`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("pagefreeze"),
        _ => home_dir().join(".config").join("pagefreeze"),
    }
}

/// `$XDG_DATA_HOME/pagefreeze` if set, otherwise `~/.local/share/pagefreeze`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("pagefreeze"),
        _ => home_dir().join(".local").join("share").join("pagefreeze"),
    }
}
