// Colours for the dark dashboard theme

use plotters::style::{RGBAColor, RGBColor};

pub const BACKGROUND: RGBColor = RGBColor(17, 24, 39);
pub const PANEL: RGBColor = RGBColor(31, 41, 55);
pub const TEXT: RGBColor = RGBColor(255, 255, 255);
pub const MUTED_TEXT: RGBColor = RGBColor(156, 163, 175);
pub const HEADING: RGBColor = RGBColor(96, 165, 250);
pub const GRID: RGBColor = RGBColor(75, 85, 99);

/// Cycling list of colours handed out by index
#[derive(Debug, Clone)]
pub struct ColorPalette {
    fills: Vec<RGBColor>,
}

impl ColorPalette {
    /// Bars without an explicit colour
    pub fn categorical() -> Self {
        Self::from_hex(&["#3b82f6", "#fb923c", "#ef4444", "#10b981", "#a78bfa"])
    }

    /// Pie wedges
    pub fn pie() -> Self {
        Self::from_hex(&["#f87171", "#34d399", "#fde047", "#a78bfa", "#60a5fa", "#fb923c"])
    }

    fn from_hex(codes: &[&str]) -> Self {
        let fills = codes
            .iter()
            .filter_map(|c| parse_color(c))
            .map(|c| RGBColor(c.0, c.1, c.2))
            .collect();
        Self { fills }
    }

    pub fn get(&self, index: usize) -> RGBColor {
        if self.fills.is_empty() {
            return HEADING;
        }
        self.fills[index % self.fills.len()]
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}

/// Parse a CSS-like colour: a name, `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
pub fn parse_color(input: &str) -> Option<RGBAColor> {
    let s = input.trim().to_ascii_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(body) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return None;
        }
        let alpha: f64 = parts[3].parse().ok()?;
        return Some(RGBAColor(
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
            alpha.clamp(0.0, 1.0),
        ));
    }

    if let Some(body) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        return Some(RGBAColor(
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
            1.0,
        ));
    }

    let named = match s.as_str() {
        "red" => (239, 68, 68),
        "green" => (16, 185, 129),
        "blue" => (59, 130, 246),
        "orange" => (251, 146, 60),
        "yellow" => (253, 224, 71),
        "purple" => (167, 139, 250),
        "cyan" => (34, 211, 238),
        "magenta" => (236, 72, 153),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "gray" | "grey" => (156, 163, 175),
        _ => return None,
    };
    Some(RGBAColor(named.0, named.1, named.2, 1.0))
}

fn parse_hex(hex: &str) -> Option<RGBAColor> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                out[i] = v * 17;
            }
            Some(RGBAColor(out[0], out[1], out[2], 1.0))
        }
        6 => Some(RGBAColor(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
            1.0,
        )),
        _ => None,
    }
}

/// Resolve an optional colour string, falling back to `fallback`. `alpha`
/// multiplies whatever alpha the colour already carries.
pub fn resolve_color(color: Option<&str>, alpha: Option<f64>, fallback: RGBColor) -> RGBAColor {
    let base = match color.and_then(parse_color) {
        Some(c) => c,
        None => {
            if let Some(raw) = color {
                log::warn!("unrecognised colour '{}', using default", raw);
            }
            RGBAColor(fallback.0, fallback.1, fallback.2, 1.0)
        }
    };
    let alpha = alpha.unwrap_or(1.0).clamp(0.0, 1.0);
    RGBAColor(base.0, base.1, base.2, base.3 * alpha)
}
