//! Story themes.

use std::fmt;

/// Themes the story server has prompt templates for.
pub const THEME_CATALOG: [&str; 4] = [
    "Haunted Space Station",
    "Lost Temple of the Jungle",
    "Cyberpunk Underworld",
    "Curse of the Banana King",
];

/// Theme used when the player does not pick one.
pub const DEFAULT_THEME: &str = "Curse of the Banana King";

/// A non-blank theme name.
///
/// Any non-blank name is accepted; the server falls back to its own default
/// for names outside [`THEME_CATALOG`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Theme(String);

impl Theme {
    /// Validates and wraps a theme name. Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the theme name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the server ships a template for this theme.
    #[must_use]
    pub fn is_cataloged(&self) -> bool {
        THEME_CATALOG.contains(&self.0.as_str())
    }

    /// All cataloged themes, in display order.
    pub fn catalog() -> impl Iterator<Item = Theme> {
        THEME_CATALOG.iter().map(|name| Self((*name).to_owned()))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self(DEFAULT_THEME.to_owned())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
