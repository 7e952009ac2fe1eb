//! Locales and translation namespaces

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Unrecognised locale or namespace name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not one of the supported display languages
    #[error("unsupported locale: {0}")]
    Locale(String),

    /// Not one of the translation namespaces
    #[error("unknown namespace: {0}")]
    Namespace(String),
}

/// Display language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locale {
    /// English
    #[default]
    En,

    /// Vietnamese
    Vi,
}

impl Locale {
    /// Every supported locale
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Vi];

    /// Language code, as used in resource paths and preferences
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Vi => "vi",
        }
    }

    /// Best-effort match on the primary subtag of a language tag.
    ///
    /// Accepts BCP-47 (`vi-VN`) and POSIX (`vi_VN.UTF-8`) forms.
    pub fn from_language_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .split(['-', '_', '.', '@'])
            .next()
            .unwrap_or_default();

        primary.parse().ok()
    }

    /// Pick the starting locale: a valid stored preference wins, then the
    /// language tag, then English.
    pub fn detect(stored: Option<&str>, language_tag: Option<&str>) -> Self {
        stored
            .and_then(|value| value.parse().ok())
            .or_else(|| language_tag.and_then(Self::from_language_tag))
            .unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        Self::ALL
            .into_iter()
            .find(|locale| locale.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::Locale(s.to_string()))
    }
}

/// Named partition of the translation dictionaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Shared chrome: navigation, footer, buttons
    Common,

    /// Landing page
    Home,

    /// Paint colour listings
    Colors,

    /// Product listings and details
    Products,

    /// Trade professionals page
    Professionals,

    /// Colour matching tool
    ColorMatch,

    /// Wood colour listings
    WoodColors,

    /// Wood inspiration gallery
    WoodIdeas,

    /// Shared component strings
    Components,
}

impl Namespace {
    /// Every namespace, in load order
    pub const ALL: [Namespace; 9] = [
        Namespace::Common,
        Namespace::Home,
        Namespace::Colors,
        Namespace::Products,
        Namespace::Professionals,
        Namespace::ColorMatch,
        Namespace::WoodColors,
        Namespace::WoodIdeas,
        Namespace::Components,
    ];

    /// Resource name of the namespace
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Home => "home",
            Self::Colors => "colors",
            Self::Products => "products",
            Self::Professionals => "professionals",
            Self::ColorMatch => "color-match",
            Self::WoodColors => "wood-colors",
            Self::WoodIdeas => "wood-ideas",
            Self::Components => "components",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|namespace| namespace.as_str() == s)
            .ok_or_else(|| ParseError::Namespace(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!("vi".parse(), Ok(Locale::Vi));
        assert_eq!("EN".parse(), Ok(Locale::En));
        assert_eq!(
            "fr".parse::<Locale>(),
            Err(ParseError::Locale("fr".to_string()))
        );
    }

    #[test]
    fn language_tags_use_primary_subtag() {
        assert_eq!(Locale::from_language_tag("vi-VN"), Some(Locale::Vi));
        assert_eq!(Locale::from_language_tag("vi_VN.UTF-8"), Some(Locale::Vi));
        assert_eq!(Locale::from_language_tag("en-GB"), Some(Locale::En));
        assert_eq!(Locale::from_language_tag("de-DE"), None);
        assert_eq!(Locale::from_language_tag(""), None);
    }

    #[test]
    fn detect_prefers_stored_value() {
        assert_eq!(Locale::detect(Some("vi"), Some("en-US")), Locale::Vi);
        assert_eq!(Locale::detect(Some("klingon"), Some("vi-VN")), Locale::Vi);
        assert_eq!(Locale::detect(None, Some("vi")), Locale::Vi);
        assert_eq!(Locale::detect(None, Some("C.UTF-8")), Locale::En);
        assert_eq!(Locale::detect(None, None), Locale::En);
    }

    #[test]
    fn namespaces_round_trip_through_names() {
        for namespace in Namespace::ALL {
            assert_eq!(namespace.as_str().parse(), Ok(namespace));
        }

        assert_eq!(Namespace::ColorMatch.to_string(), "color-match");
        assert!("colorCard".parse::<Namespace>().is_err());
    }
}
