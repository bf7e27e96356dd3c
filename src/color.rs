use once_cell::sync::Lazy;
use regex::Regex;

/// Returned by `to_hex` when the HSL triplet cannot be parsed.
pub const FALLBACK_HEX: &str = "#000000";
/// Returned by `to_hsl` when the hex string cannot be parsed.
pub const FALLBACK_HSL: &str = "0 0% 0%";

static TRIPLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s+(\d+(?:\.\d+)?)%\s+(\d+(?:\.\d+)?)%\s*$").unwrap()
});

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").unwrap());

/// Parse an `"H S% L%"` triplet into (hue degrees, saturation %, lightness %).
/// Out-of-range components are rejected.
pub fn parse_triplet(input: &str) -> Option<(f64, f64, f64)> {
    let caps = TRIPLET_RE.captures(input)?;
    let h: f64 = caps[1].parse().ok()?;
    let s: f64 = caps[2].parse().ok()?;
    let l: f64 = caps[3].parse().ok()?;
    if h > 360.0 || s > 100.0 || l > 100.0 {
        return None;
    }
    Some((h, s, l))
}

pub fn is_valid_triplet(input: &str) -> bool {
    parse_triplet(input).is_some()
}

/// Canonical stored form of an editor value: a valid triplet as-is, a hex
/// color converted to a triplet. Anything else is rejected.
pub fn normalize_color(input: &str) -> Option<String> {
    let input = input.trim();
    if is_valid_triplet(input) {
        return Some(input.to_string());
    }
    parse_hex(input).map(|_| to_hsl(input))
}

/// Convert an HSL triplet string to `#rrggbb`. Never fails: malformed input
/// (common while an admin is still typing) yields `FALLBACK_HEX`.
pub fn to_hex(hsl: &str) -> String {
    let (h, s, l) = match parse_triplet(hsl) {
        Some(v) => v,
        None => return FALLBACK_HEX.to_string(),
    };
    let (r, g, b) = hsl_to_rgb(h / 360.0, s / 100.0, l / 100.0);
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

/// Convert `#rrggbb` (or `#rgb`) to an `"H S% L%"` triplet. Malformed input
/// yields `FALLBACK_HSL`.
pub fn to_hsl(hex: &str) -> String {
    let (r, g, b) = match parse_hex(hex) {
        Some(v) => v,
        None => return FALLBACK_HSL.to_string(),
    };
    let (h, s, l) = rgb_to_hsl(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    format!(
        "{} {}% {}%",
        trim_number(h * 360.0),
        trim_number(s * 100.0),
        trim_number(l * 100.0)
    )
}

fn parse_hex(input: &str) -> Option<(u8, u8, u8)> {
    let caps = HEX_RE.captures(input.trim())?;
    let digits = &caps[1];
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some((r, g, b))
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Two decimals keep the round trip through hex pixel-exact.
fn trim_number(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_colors_convert_both_ways() {
        assert_eq!(to_hex("0 100% 50%"), "#ff0000");
        assert_eq!(to_hex("120 100% 50%"), "#00ff00");
        assert_eq!(to_hex("240 100% 50%"), "#0000ff");
        assert_eq!(to_hex("0 0% 100%"), "#ffffff");
        assert_eq!(to_hsl("#ff0000"), "0 100% 50%");
        assert_eq!(to_hsl("#ffffff"), "0 0% 100%");
        assert_eq!(to_hsl("#000"), "0 0% 0%");
    }

    #[test]
    fn malformed_hsl_falls_back() {
        for bad in ["", "45 90 55", "hsl(45, 90%, 55%)", "400 10% 10%", "45 190% 55%", "abc"] {
            assert_eq!(to_hex(bad), FALLBACK_HEX, "input {:?}", bad);
        }
    }

    #[test]
    fn malformed_hex_falls_back() {
        for bad in ["", "#12", "#gggggg", "ff00ff00", "#12345"] {
            assert_eq!(to_hsl(bad), FALLBACK_HSL, "input {:?}", bad);
        }
    }

    #[test]
    fn hex_round_trip_is_exact() {
        let mut n: u32 = 0;
        while n <= 0xFF_FF_FF {
            let hex = format!("#{:06x}", n);
            assert_eq!(to_hex(&to_hsl(&hex)), hex);
            n += 7919;
        }
        for hex in ["#d4a017", "#0a0a0a", "#7f7f80", "#123456", "#fefefe"] {
            assert_eq!(to_hex(&to_hsl(hex)), hex);
        }
    }

    #[test]
    fn short_hex_expands() {
        assert_eq!(to_hex(&to_hsl("#abc")), "#aabbcc");
    }

    #[test]
    fn editor_values_normalize_to_triplets() {
        assert_eq!(normalize_color(" 45 90% 55% "), Some("45 90% 55%".to_string()));
        assert_eq!(normalize_color("#ff0000"), Some("0 100% 50%".to_string()));
        assert_eq!(normalize_color("FFF"), Some("0 0% 100%".to_string()));
        assert_eq!(normalize_color("not-a-color"), None);
        assert_eq!(normalize_color(""), None);
    }

    #[test]
    fn triplet_validation() {
        assert!(is_valid_triplet("45 90% 55%"));
        assert!(is_valid_triplet(" 210.5 40.25% 12% "));
        assert!(!is_valid_triplet("45 90% 55"));
        assert!(!is_valid_triplet(""));
    }
}
