//! Runtime configuration for the terminal game.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::animation::DEFAULT_ANIMATION_DURATION;
use crate::session::SessionConfig;

/// Settings read once at startup.
///
/// Environment variables:
/// - `SOKOBAN_ANIMATION_MS` - duration of one step animation (default: 200)
/// - `SOKOBAN_WIN_BANNER_MS` - how long the win banner stays up (default: 1300)
/// - `SOKOBAN_WIN_SETTLE_MS` - pause after the banner before the next level (default: 200)
/// - `SOKOBAN_LEVEL_PACK` - JSON level pack; the built-in levels are used when unset
/// - `SOKOBAN_PROGRESS_FILE` - where the last played level is stored
/// - `SOKOBAN_SESSION` - key for the stored progress (default: "default")
/// - `SOKOBAN_LOG_DIR` - directory for the log file (default: "logs")
/// - `SOKOBAN_AUTO_ADVANCE` - load the next level after a win (default: true)
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub animation: Duration,
    pub win_banner: Duration,
    pub win_settle: Duration,
    pub level_pack: Option<PathBuf>,
    pub progress_file: PathBuf,
    pub session_id: String,
    pub log_dir: PathBuf,
    pub auto_advance: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            animation: DEFAULT_ANIMATION_DURATION,
            win_banner: Duration::from_millis(1300),
            win_settle: Duration::from_millis(200),
            level_pack: None,
            progress_file: PathBuf::from("sokoban_progress.json"),
            session_id: "default".to_string(),
            log_dir: PathBuf::from("logs"),
            auto_advance: true,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for
    /// missing or unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        let mut config = Self::default();

        if let Some(ms) = read::<u64>(lookup, "SOKOBAN_ANIMATION_MS") {
            config.animation = Duration::from_millis(ms);
        }
        if let Some(ms) = read::<u64>(lookup, "SOKOBAN_WIN_BANNER_MS") {
            config.win_banner = Duration::from_millis(ms);
        }
        if let Some(ms) = read::<u64>(lookup, "SOKOBAN_WIN_SETTLE_MS") {
            config.win_settle = Duration::from_millis(ms);
        }
        if let Some(path) = read::<PathBuf>(lookup, "SOKOBAN_LEVEL_PACK") {
            config.level_pack = Some(path);
        }
        if let Some(path) = read::<PathBuf>(lookup, "SOKOBAN_PROGRESS_FILE") {
            config.progress_file = path;
        }
        if let Some(id) = read::<String>(lookup, "SOKOBAN_SESSION").filter(|id| !id.is_empty())
        {
            config.session_id = id;
        }
        if let Some(path) = read::<PathBuf>(lookup, "SOKOBAN_LOG_DIR") {
            config.log_dir = path;
        }
        if let Some(auto_advance) = read::<bool>(lookup, "SOKOBAN_AUTO_ADVANCE") {
            config.auto_advance = auto_advance;
        }

        config
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            auto_advance: self.auto_advance,
        }
    }
}

fn read<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> GameConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GameConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.animation, Duration::from_millis(200));
        assert_eq!(config.win_banner, Duration::from_millis(1300));
        assert_eq!(config.win_settle, Duration::from_millis(200));
        assert_eq!(config.level_pack, None);
        assert_eq!(config.progress_file, PathBuf::from("sokoban_progress.json"));
        assert_eq!(config.session_id, "default");
        assert!(config.auto_advance);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("SOKOBAN_ANIMATION_MS", "50"),
            ("SOKOBAN_WIN_BANNER_MS", "10"),
            ("SOKOBAN_WIN_SETTLE_MS", "0"),
            ("SOKOBAN_LEVEL_PACK", "packs/classic.json"),
            ("SOKOBAN_PROGRESS_FILE", "save.json"),
            ("SOKOBAN_SESSION", "alice"),
            ("SOKOBAN_LOG_DIR", "/tmp/sokoban"),
            ("SOKOBAN_AUTO_ADVANCE", "false"),
        ]);

        assert_eq!(config.animation, Duration::from_millis(50));
        assert_eq!(config.win_banner, Duration::from_millis(10));
        assert_eq!(config.win_settle, Duration::ZERO);
        assert_eq!(config.level_pack, Some(PathBuf::from("packs/classic.json")));
        assert_eq!(config.progress_file, PathBuf::from("save.json"));
        assert_eq!(config.session_id, "alice");
        assert_eq!(config.log_dir, PathBuf::from("/tmp/sokoban"));
        assert!(!config.session().auto_advance);
    }

    #[test]
    fn empty_session_and_bad_numbers_are_ignored() {
        let config = config_from(&[
            ("SOKOBAN_SESSION", ""),
            ("SOKOBAN_ANIMATION_MS", "fast"),
            ("SOKOBAN_AUTO_ADVANCE", "maybe"),
        ]);

        assert_eq!(config.session_id, "default");
        assert_eq!(config.animation, DEFAULT_ANIMATION_DURATION);
        assert!(config.auto_advance);
    }
}
