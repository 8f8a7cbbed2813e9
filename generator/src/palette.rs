use oklab::OkHsl;
use serde::Serialize;

use crate::{color, state::Settings};

/// A color of the derived palette.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaletteColor {
    /// CSS notation, for copying.
    pub css: String,
    /// Human readable notation.
    pub display: String,
    pub okhsl: OkHsl,
}

impl PaletteColor {
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            css: color::to_css(hue, saturation, lightness),
            display: color::to_display(hue, saturation, lightness),
            okhsl: OkHsl::new(hue, saturation, lightness),
        }
    }

    pub fn hex(&self) -> String {
        color::to_hex(self.okhsl.h, self.okhsl.s, self.okhsl.l)
    }
}

/// The colors of every hue: one row per hue, in hue order, with `steps` colors each.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivedPalette {
    swatches: Vec<Vec<PaletteColor>>,
}

impl DerivedPalette {
    pub fn swatches(&self) -> &[Vec<PaletteColor>] {
        &self.swatches
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Expand every hue into `steps` colors, from just after the minimum (saturation, lightness) up
/// to the maximum.
pub fn compute_palette(settings: &Settings) -> DerivedPalette {
    let steps = settings.steps.max(1);
    let swatches = settings
        .hues
        .iter()
        .map(|hue| {
            (1..=steps)
                .map(|j| {
                    let t = j as f64 / steps as f64;
                    let s = lerp(settings.min_saturation, settings.max_saturation, t);
                    let l = lerp(settings.min_lightness, settings.max_lightness, t);
                    PaletteColor::new(hue.value, s, l)
                })
                .collect()
        })
        .collect();
    DerivedPalette { swatches }
}
