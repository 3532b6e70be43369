//! Deterministic colors for categories and slots.

/// Slot bar and time-tag colors, cycled by slot index.
pub const SLOT_COLORS: [&str; 8] = [
    "#60a5fa", // blue
    "#fbbf24", // amber
    "#fb7185", // rose
    "#34d399", // emerald
    "#a78bfa", // violet
    "#22d3ee", // cyan
    "#f97316", // orange
    "#eab308", // yellow
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Accepts `#rgb` and `#rrggbb`, with or without the leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let h = hex.trim().trim_start_matches('#');
        let full: String = if h.len() == 3 {
            h.chars().flat_map(|c| [c, c]).collect()
        } else {
            h.to_string()
        };
        if full.len() != 6 {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(full.get(i..i + 2)?, 16).ok();
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
        })
    }

    /// ANSI truecolor foreground escape.
    pub fn fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

pub const ANSI_RESET: &str = "\x1b[0m";

/// Hue assigned to a category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hue(pub u16);

const SATURATION: f64 = 0.80;
const LIGHTNESS: f64 = 0.65;

impl Hue {
    pub fn rgb(&self) -> Rgb {
        let h = self.0 as f64 / 60.0;
        let c = (1.0 - (2.0 * LIGHTNESS - 1.0).abs()) * SATURATION;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = LIGHTNESS - c / 2.0;
        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
        }
    }
}

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
pub fn category_color(category: &str) -> Hue {
    let h = category
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as u32));
    Hue((h % 360) as u16)
}

pub fn slot_color(index: usize) -> &'static str {
    SLOT_COLORS[index % SLOT_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_color_is_deterministic() {
        assert_eq!(category_color("Biology"), category_color("Biology"));
        assert_eq!(category_color(""), Hue(0));
        // 'a' = 97
        assert_eq!(category_color("a"), Hue(97));
        // 97 * 31 + 98 = 3105 -> 3105 % 360 = 225
        assert_eq!(category_color("ab"), Hue(225));
        assert!(category_color("日本語").0 < 360);
    }

    #[test]
    fn hue_to_rgb() {
        let red = Hue(0).rgb();
        assert!(red.r > red.g && red.g == red.b);
    }

    #[test]
    fn slot_colors_cycle() {
        assert_eq!(slot_color(0), "#60a5fa");
        assert_eq!(slot_color(8), slot_color(0));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb { r: 255, g: 255, b: 255 }));
        assert_eq!(Rgb::from_hex("60a5fa"), Some(Rgb { r: 0x60, g: 0xa5, b: 0xfa }));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }
}
