//! Color utility functions shared across the application.
//!
//! Label colors are stored as `#RRGGBB` hex strings in the catalog; the
//! renderer needs them as RGB bytes.

/// Parse a `#RRGGBB` hex color string.
///
/// Returns `None` for anything that is not exactly `#` followed by six hex
/// digits.
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8A5B"), Some([0xFF, 0x8A, 0x5B]));
        assert_eq!(parse_hex_color("#000000"), Some([0, 0, 0]));
        assert_eq!(parse_hex_color("#ffffff"), Some([255, 255, 255]));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_hex_color("FF8A5B"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color(""), None);
    }
}
