//! Player configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Settings for the terminal player.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// How long a narration line stays up before auto-advancing.
    pub step_delay: Duration,
    /// Advance through non-branching beats without waiting for input.
    pub auto_advance: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(1500),
            auto_advance: false,
        }
    }
}

impl PlayerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PLAYER_STEP_DELAY_MS` - Delay before an auto-advancing beat ends (default: 1500)
    /// - `PLAYER_AUTO_ADVANCE` - Advance without input outside branches (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(millis) = read_env::<u64>("PLAYER_STEP_DELAY_MS") {
            config.step_delay = Duration::from_millis(millis);
        }

        if let Ok(raw) = env::var("PLAYER_AUTO_ADVANCE") {
            config.auto_advance = parse_flag(&raw);
        }

        config
    }
}

/// Reads an on/off switch. Only explicit "off" spellings disable it, so a bare
/// `PLAYER_AUTO_ADVANCE=` counts as on.
fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
