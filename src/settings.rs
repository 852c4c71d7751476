use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchEngine {
    DuckDuckGo,
    Google,
    Bing,
    Brave,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::DuckDuckGo
    }
}

impl SearchEngine {
    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", q),
            Self::Google => format!("https://google.com/search?q={}", q),
            Self::Bing => format!("https://bing.com/search?q={}", q),
            Self::Brave => format!("https://search.brave.com/search?q={}", q),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_engine: SearchEngine,
    pub https_only: bool,
    pub telemetry_enabled: bool,
    /// Window in which repeated startup sync requests collapse into one.
    pub sync_debounce_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_engine: SearchEngine::default(),
            https_only: true,
            telemetry_enabled: true,
            sync_debounce_secs: 30,
        }
    }
}

impl Settings {
    pub fn get_path(data_dir: &Path) -> PathBuf {
        data_dir.join("settings.json")
    }

    pub fn sync_debounce(&self) -> Duration {
        Duration::from_secs(self.sync_debounce_secs)
    }

    pub fn load(data_dir: &Path) -> Self {
        let path = Self::get_path(data_dir);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), String> {
        let path = Self::get_path(data_dir);
        let tmp_path = path.with_extension("tmp");

        fs::create_dir_all(data_dir).map_err(|e| e.to_string())?;

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        fs::write(&tmp_path, json).map_err(|e| e.to_string())?;
        fs::rename(tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }
}
