use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start or end with '/'")]
    EdgeSlash,
    #[error("asset key must not contain an empty segment")]
    EmptySegment,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys are relative, slash-separated paths under the graphics root, such as
/// `player/run` or `terrain/3`, without a file extension.
pub(crate) fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(AssetKeyError::EdgeSlash);
    }
    if key.contains("..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    if key.split('/').any(str::is_empty) {
        return Err(AssetKeyError::EmptySegment);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(AssetKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_level_asset_keys() {
        for key in ["player/idle", "terrain/12", "enemies/0", "world/portal", "a-b/c_d"] {
            assert!(validate_asset_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_eq!(validate_asset_key(""), Err(AssetKeyError::Empty));
        assert_eq!(validate_asset_key("/player"), Err(AssetKeyError::EdgeSlash));
        assert_eq!(validate_asset_key("player/"), Err(AssetKeyError::EdgeSlash));
        assert_eq!(validate_asset_key("a//b"), Err(AssetKeyError::EmptySegment));
        assert_eq!(validate_asset_key("a/../b"), Err(AssetKeyError::ParentTraversal));
        assert_eq!(
            validate_asset_key("Player"),
            Err(AssetKeyError::InvalidCharacter { character: 'P' })
        );
        assert!(validate_asset_key(r"a\b").is_err());
        assert!(validate_asset_key("a.png").is_err());
    }
}
