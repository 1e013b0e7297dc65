use std::env;

use scroller_engine::MissingAssetPolicy;
use tracing::warn;

pub(crate) const START_LEVEL_ENV_VAR: &str = "SCROLLER_START_LEVEL";
pub(crate) const TILE_SIZE_ENV_VAR: &str = "SCROLLER_TILE_SIZE";
pub(crate) const LENIENT_ASSETS_ENV_VAR: &str = "SCROLLER_LENIENT_ASSETS";

const DEFAULT_START_LEVEL: u32 = 1;
const DEFAULT_TILE_SIZE: u32 = 32;
const MIN_TILE_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GameSettings {
    pub(crate) start_level: u32,
    pub(crate) tile_size: u32,
    pub(crate) missing_asset_policy: MissingAssetPolicy,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            start_level: DEFAULT_START_LEVEL,
            tile_size: DEFAULT_TILE_SIZE,
            missing_asset_policy: MissingAssetPolicy::Abort,
        }
    }
}

impl GameSettings {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Unset variables keep their defaults; invalid ones warn and do too.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let start_level = lookup(START_LEVEL_ENV_VAR)
            .map(|raw| {
                parse_at_least(START_LEVEL_ENV_VAR, &raw, 1).unwrap_or(defaults.start_level)
            })
            .unwrap_or(defaults.start_level);
        let tile_size = lookup(TILE_SIZE_ENV_VAR)
            .map(|raw| {
                parse_at_least(TILE_SIZE_ENV_VAR, &raw, MIN_TILE_SIZE).unwrap_or(defaults.tile_size)
            })
            .unwrap_or(defaults.tile_size);
        let missing_asset_policy = lookup(LENIENT_ASSETS_ENV_VAR)
            .map(|raw| parse_asset_policy(&raw).unwrap_or(defaults.missing_asset_policy))
            .unwrap_or(defaults.missing_asset_policy);

        Self {
            start_level,
            tile_size,
            missing_asset_policy,
        }
    }
}

fn parse_at_least(env_var: &'static str, raw: &str, minimum: u32) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value >= minimum => Some(value),
        _ => {
            warn!(
                env_var,
                value = raw,
                minimum,
                "invalid env var value; falling back to default"
            );
            None
        }
    }
}

fn parse_asset_policy(raw: &str) -> Option<MissingAssetPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(MissingAssetPolicy::Placeholder),
        "0" | "false" | "no" | "" => Some(MissingAssetPolicy::Abort),
        _ => {
            warn!(
                env_var = LENIENT_ASSETS_ENV_VAR,
                value = raw,
                "invalid env var value; falling back to default"
            );
            None
        }
    }
}
