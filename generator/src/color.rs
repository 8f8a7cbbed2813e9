//! Formatting of okHsl colors into CSS and human readable strings.

use oklab::{OkHsl, OkLch, Oklab, Srgb};

/// Decimal places kept in formatted colors, so copied values are free of float noise.
pub const DECIMALS: i32 = 4;

/// Saturation and lightness of hue swatches in the editor chrome.
const PREVIEW: f64 = 0.7;
const PREVIEW_SELECTED: f64 = 0.75;

/// Round `value` to `decimals` places, with ties going up.
pub fn round(value: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    let r = (value * p + 0.5).floor() / p;
    // avoid printing "-0"
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Format the okHsl color `(hue, saturation, lightness)` as a CSS `oklch()` color.
pub fn to_css(hue: f64, saturation: f64, lightness: f64) -> String {
    let lch = OkLch::from(OkHsl::new(hue, saturation, lightness));
    let l = round(lch.l, DECIMALS);
    let c = round(lch.c, DECIMALS);
    if c == 0.0 {
        format!("oklch({} {} none)", l, c)
    } else {
        format!("oklch({} {} {})", l, c, round(lch.h, DECIMALS))
    }
}

/// Format the okHsl color `(hue, saturation, lightness)` for humans.
pub fn to_display(hue: f64, saturation: f64, lightness: f64) -> String {
    format!(
        "okhsl({}°, {}, {})",
        round(hue, DECIMALS),
        round(saturation, DECIMALS),
        round(lightness, DECIMALS)
    )
}

/// CSS color of a hue swatch, independent of the palette curve.
pub fn to_css_preview(hue: f64, selected: bool) -> String {
    let sl = if selected { PREVIEW_SELECTED } else { PREVIEW };
    let Oklab { l, a, b } = Oklab::from(OkHsl::new(hue, sl, sl));
    format!("oklab({} {} {})", l + 0.0, a + 0.0, b + 0.0)
}

/// `#rrggbb` of the okHsl color, clipped to sRGB.
pub fn to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    Srgb::from(OkHsl::new(hue, saturation, lightness))
        .to_srgb8()
        .to_hex()
}
