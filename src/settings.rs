//! Game settings and preferences
//!
//! Leaderboard config comes from the host (`/api/config` on the web,
//! environment variables natively). Player preferences are persisted
//! separately in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::leaderboard::DEFAULT_LIMIT;

/// Default leaderboard refresh interval
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60_000;

/// Leaderboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardSettings {
    /// Rows shown and qualification cutoff
    pub max_entries: usize,
    /// How often an open leaderboard screen refetches
    pub refresh_interval_ms: u64,
    /// Hosted store endpoint; no URL means a disabled leaderboard
    pub store_url: Option<String>,
    pub store_key: Option<String>,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_LIMIT,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            store_url: None,
            store_key: None,
        }
    }
}

impl LeaderboardSettings {
    /// Whether both store credentials are present
    pub fn has_store(&self) -> bool {
        matches!((&self.store_url, &self.store_key), (Some(u), Some(k)) if !u.is_empty() && !k.is_empty())
    }

    /// Refresh interval in simulation frames (at least one)
    pub fn refresh_frames(&self) -> u64 {
        (self.refresh_interval_ms * crate::consts::TICKS_PER_SECOND as u64 / 1000).max(1)
    }

    /// Apply a config document served by the host
    pub fn merge(&mut self, config: ServerConfig) {
        if let Some(lb) = config.leaderboard {
            if let Some(n) = lb.max_entries.filter(|n| *n > 0) {
                self.max_entries = n;
            }
            if let Some(ms) = lb.refresh_interval.filter(|ms| *ms > 0) {
                self.refresh_interval_ms = ms;
            }
        }
        if let Some(store) = config.supabase {
            if store.url.is_some() {
                self.store_url = store.url;
            }
            if store.key.is_some() {
                self.store_key = store.key;
            }
        }
    }

    /// Read `LEADERBOARD_MAX_ENTRIES`, `LEADERBOARD_REFRESH_INTERVAL`,
    /// `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable numbers keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(v) = lookup("LEADERBOARD_MAX_ENTRIES") {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => settings.max_entries = n,
                _ => log::warn!("Ignoring LEADERBOARD_MAX_ENTRIES={v}"),
            }
        }
        if let Some(v) = lookup("LEADERBOARD_REFRESH_INTERVAL") {
            match v.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => settings.refresh_interval_ms = ms,
                _ => log::warn!("Ignoring LEADERBOARD_REFRESH_INTERVAL={v}"),
            }
        }
        settings.store_url = lookup("SUPABASE_URL").filter(|s| !s.is_empty());
        settings.store_key = lookup("SUPABASE_ANON_KEY").filter(|s| !s.is_empty());
        settings
    }
}

/// Shape of the host's `/api/config` document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    pub supabase: Option<StoreConfig>,
    pub leaderboard: Option<LeaderboardConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardConfig {
    pub max_entries: Option<usize>,
    pub refresh_interval: Option<u64>,
}

impl ServerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Not persisted; re-read from the host on every start
    #[serde(skip)]
    pub leaderboard: LeaderboardSettings,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Controls ===
    /// Auto-fire on touch devices unless the player turned it off
    pub touch_auto_fire: bool,

    // === Accessibility ===
    /// Reduced motion (no game-over shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            leaderboard: LeaderboardSettings::default(),

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            touch_auto_fire: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "meltdown_settings";

    /// Load preferences from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save preferences to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native: preferences are defaults, leaderboard config from env
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self {
            leaderboard: LeaderboardSettings::from_env(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_server() {
        let lb = LeaderboardSettings::default();
        assert_eq!(lb.max_entries, 10);
        assert_eq!(lb.refresh_interval_ms, 60_000);
        assert_eq!(lb.refresh_frames(), 3600);
        assert!(!lb.has_store());
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("LEADERBOARD_MAX_ENTRIES", "25"),
            ("LEADERBOARD_REFRESH_INTERVAL", "oops"),
            ("SUPABASE_URL", "https://db.example.com"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]
        .into_iter()
        .collect();
        let lb = LeaderboardSettings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(lb.max_entries, 25);
        assert_eq!(lb.refresh_interval_ms, 60_000);
        assert!(lb.has_store());
    }

    #[test]
    fn test_merge_server_config() {
        let config = ServerConfig::from_json(
            r#"{
                "supabase": { "url": "https://db.example.com", "key": "anon" },
                "leaderboard": { "maxEntries": 5, "refreshInterval": 30000 }
            }"#,
        )
        .unwrap();
        let mut lb = LeaderboardSettings::default();
        lb.merge(config);
        assert_eq!(lb.max_entries, 5);
        assert_eq!(lb.refresh_interval_ms, 30_000);
        assert_eq!(lb.store_url.as_deref(), Some("https://db.example.com"));
        assert!(lb.has_store());
    }

    #[test]
    fn test_merge_missing_sections_keeps_defaults() {
        let mut lb = LeaderboardSettings::default();
        lb.merge(ServerConfig::from_json("{}").unwrap());
        assert_eq!(lb, LeaderboardSettings::default());
    }

    #[test]
    fn test_preferences_roundtrip_skip_leaderboard() {
        let mut settings = Settings::default();
        settings.muted = true;
        settings.leaderboard.max_entries = 3;
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert!(back.muted);
        assert_eq!(back.leaderboard.max_entries, 10);
    }
}
