use thiserror::Error;

/// Asset keys name files under `assets/`, so they are restricted to a
/// lowercase relative-path alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start with '/'")]
    LeadingSlash,
    #[error("asset key must not contain '\\\\'")]
    Backslash,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    let allowed =
        |ch: char| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-');
    match key.chars().find(|ch| !allowed(*ch)) {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_atlas_and_background_keys() {
        for key in ["player", "backgrounds/sky_1", "ui/next-button"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_keys_that_could_escape_asset_dir() {
        assert_eq!(validate_sprite_key(""), Err(SpriteKeyError::Empty));
        assert_eq!(validate_sprite_key("/etc"), Err(SpriteKeyError::LeadingSlash));
        assert_eq!(validate_sprite_key(r"a\b"), Err(SpriteKeyError::Backslash));
        assert_eq!(
            validate_sprite_key("atlas/../secret"),
            Err(SpriteKeyError::ParentTraversal)
        );
        assert_eq!(
            validate_sprite_key("Player.png"),
            Err(SpriteKeyError::InvalidCharacter { character: 'P' })
        );
    }
}
