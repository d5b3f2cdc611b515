// Pagefreeze platform paths for Windows
// Config: %APPDATA%/Pagefreeze
// Data:   %LOCALAPPDATA%/Pagefreeze

use std::env;
use std::path::PathBuf;

fn env_dir(var: &str) -> PathBuf {
    env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

pub fn get_config_dir() -> PathBuf {
    env_dir("APPDATA").join("Pagefreeze")
}

pub fn get_data_dir() -> PathBuf {
    env_dir("LOCALAPPDATA").join("Pagefreeze")
}
