use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::task::Quadrant;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub selection_bg: Color,
    pub do_first: Color,
    pub schedule: Color,
    pub delegate: Color,
    pub eliminate: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            do_first: Color::Rgb(0xFF, 0x44, 0x44),
            schedule: Color::Rgb(0x44, 0x88, 0xFF),
            delegate: Color::Rgb(0xFF, 0xD7, 0x00),
            eliminate: Color::Rgb(0x7D, 0x78, 0xBF),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from `[ui.colors]`, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key, value, "ignoring invalid color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "selection_bg" => theme.selection_bg = color,
                "do_first" => theme.do_first = color,
                "schedule" => theme.schedule = color,
                "delegate" => theme.delegate = color,
                "eliminate" => theme.eliminate = color,
                _ => tracing::warn!(key, "unknown theme color"),
            }
        }

        theme
    }

    /// Accent color for a quadrant's border and title
    pub fn quadrant_color(&self, quadrant: Quadrant) -> Color {
        match quadrant {
            Quadrant::DoFirst => self.do_first,
            Quadrant::Schedule => self.schedule,
            Quadrant::Delegate => self.delegate,
            Quadrant::Eliminate => self.eliminate,
        }
    }
}
