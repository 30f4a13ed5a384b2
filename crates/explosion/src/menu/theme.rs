use crate::config::ThemeConfig;
use palette::{Srgb, Srgba, WithAlpha};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex color '{0}'")]
    InvalidHex(String),
}

pub fn parse_hex(value: &str, alpha: f64) -> Result<Srgba<f64>, ColorError> {
    Srgb::<u8>::from_str(value.trim())
        .map(|rgb| rgb.into_format::<f64>().with_alpha(alpha.clamp(0.0, 1.0)))
        .map_err(|_| ColorError::InvalidHex(value.to_string()))
}

/// Placeholder colors for the menu's nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub highlight: Srgba<f64>,
    pub anchor: Srgba<f64>,
    pub backdrop: Srgba<f64>,
    pub item: Srgba<f64>,
    pub accessory: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            highlight: Srgba::new(1.0, 0.0, 0.0, 0.5),
            anchor: Srgba::new(1.0, 1.0, 0.0, 1.0),
            backdrop: Srgba::new(0.0, 0.0, 0.0, 1.0),
            item: Srgba::new(0.2, 0.47, 0.96, 1.0),
            accessory: Srgba::new(0.11, 0.11, 0.12, 0.9),
        }
    }
}

impl ThemeColors {
    /// Unparseable entries fall back to the default color with a warning.
    pub fn from_config(theme: &ThemeConfig) -> Self {
        let fallback = Self::default();
        Self {
            highlight: Self::lookup_color(
                "highlight",
                &theme.highlight,
                fallback.highlight,
                Some(theme.highlight_alpha),
            ),
            anchor: Self::lookup_color("anchor", &theme.anchor, fallback.anchor, None),
            backdrop: Self::lookup_color("backdrop", &theme.backdrop, fallback.backdrop, None),
            item: Self::lookup_color("item", &theme.item, fallback.item, None),
            accessory: Self::lookup_color(
                "accessory",
                &theme.accessory,
                fallback.accessory,
                Some(fallback.accessory.alpha),
            ),
        }
    }

    fn lookup_color(
        name: &str,
        value: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        parse_hex(value, alpha_override.unwrap_or(1.0)).unwrap_or_else(|e| {
            log::warn!("theme color '{}': {}, using default", name, e);
            fallback
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let red = parse_hex("#ff0000", 0.5).unwrap();
        assert_eq!(red, Srgba::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(
            parse_hex("nope", 1.0),
            Err(ColorError::InvalidHex("nope".to_string()))
        );
    }

    #[test]
    fn test_invalid_entry_falls_back() {
        let theme = ThemeConfig {
            item: "#12345".to_string(),
            ..ThemeConfig::default()
        };
        let colors = ThemeColors::from_config(&theme);
        assert_eq!(colors.item, ThemeColors::default().item);
        assert_eq!(colors.highlight, ThemeColors::default().highlight);
    }
}
