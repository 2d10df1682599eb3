//! Theme colors, optionally overridden from the `[theme]` table of config.toml

use ratatui::style::Color;
use std::collections::BTreeMap;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,       // Active borders, buttons, links
    pub danger: Color,       // Field errors, Angry mood
    pub success: Color,      // Valid-field check mark
    pub warning: Color,      // Status toasts
    pub smiley: Color,       // Mood glyphs and selection highlight
    pub text: Color,         // Primary text
    pub text_dim: Color,     // Placeholders, hints
    pub bg_selected: Color,  // Highlighted list row
    pub inactive: Color,     // Unfocused borders
    pub header: Color,       // Section titles
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(100, 234, 250),     // #64eafa
            danger: Color::Rgb(239, 68, 68),       // #ef4444
            success: Color::Rgb(34, 197, 94),      // #22c55e
            warning: Color::Rgb(250, 204, 76),
            smiley: Color::Rgb(250, 204, 76),      // #facc4c
            text: Color::Rgb(226, 232, 240),
            text_dim: Color::Rgb(148, 163, 184),
            bg_selected: Color::Rgb(51, 65, 85),
            inactive: Color::Rgb(100, 116, 139),
            header: Color::Rgb(204, 251, 241),     // teal-100
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied. Unknown keys and bad colors are logged and skipped.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut theme = Self::default();

        for (key, value) in overrides {
            let Some(color) = Self::parse_hex_color(value) else {
                tracing::warn!("Ignoring theme.{}: {:?} is not a hex color", key, value);
                continue;
            };
            let slot = match key.as_str() {
                "accent" => &mut theme.accent,
                "danger" => &mut theme.danger,
                "success" => &mut theme.success,
                "warning" => &mut theme.warning,
                "smiley" => &mut theme.smiley,
                "text" => &mut theme.text,
                "text_dim" => &mut theme.text_dim,
                "bg_selected" => &mut theme.bg_selected,
                "inactive" => &mut theme.inactive,
                "header" => &mut theme.header,
                _ => {
                    tracing::warn!("Unknown theme key: {}", key);
                    continue;
                }
            };
            *slot = color;
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
