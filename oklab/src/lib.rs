#![warn(missing_docs)]

//! Rust implemention of the Oklab color space, as described by [Björn Ottosson in his blog
//! post](https://bottosson.github.io/posts/oklab/), together with its polar form OkLCh and the
//! okHsl model built on top of it. These are designed to be perceptually uniform, meaning that
//! the same amount of distance between two colors is perceived as the same amount of difference
//! in color. Useful for picking colors, building palettes and rendering gradients.
//!
//! All components are `f64`, and hues are in degrees.

pub mod ok_color;

pub use ok_color::normalize_hue;

/// Represents a color in the sRGB color space.
///
/// This color space is gamma-corrected from a linear RGB color space, so it is not suitable to be
/// interpolated.
///
/// The represented color may not be in the sRGB gamut, being outside of the range [0.0, 1.0].
/// This can happen when converting from other color spaces. This can be fixed by calling the
/// clip() function.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Srgb {
    /// Red component, with gamut in the range [0.0, 1.0].
    pub r: f64,
    /// Green component, with gamut in the range [0.0, 1.0].
    pub g: f64,
    /// Blue component, with gamut in the range [0.0, 1.0].
    pub b: f64,
}
impl Srgb {
    /// Create a new color with the given red, green, blue components.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Convert to linear sRGB color space.
    pub fn to_linear(self) -> LinSrgb {
        LinSrgb::from(self)
    }

    /// Convert to sRGB color space with 8 bits per channel, clipping it to the sRGB gamut first.
    pub fn to_srgb8(self) -> Srgb8 {
        Srgb8::from(self)
    }

    /// Clip the color to the sRGB gamut, preserving lightness and hue.
    ///
    /// Lightness outside of the sRGB gamut will be clipped to 0.0 or 1.0, and chroma is projected
    /// into the gamut.
    pub fn clip(self) -> Srgb {
        let inside = |x: f64| (0.0..=1.0).contains(&x);
        if inside(self.r) && inside(self.g) && inside(self.b) {
            return self;
        }
        self.to_linear().clip().to_srgb()
    }
}

/// Represents a color in the linear sRGB color space.
///
/// The same color model as the sRGB color space, but the values are linear in respect to light
/// intensity.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinSrgb {
    /// Red component, normally in the range [0.0, 1.0].
    pub r: f64,
    /// Green component, normally in the range [0.0, 1.0].
    pub g: f64,
    /// Blue component, normally in the range [0.0, 1.0].
    pub b: f64,
}
impl LinSrgb {
    /// Create a new color with the given red, green, blue components.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Convert to sRGB color space.
    pub fn to_srgb(self) -> Srgb {
        Srgb::from(self)
    }

    /// Clip the color to the sRGB gamut, preserving lightness and hue.
    pub fn clip(self) -> LinSrgb {
        ok_color::gamut_clip_preserve_chroma(self)
    }
}

/// Represents a color in the Oklab color space.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Oklab {
    /// Perceived lightness.
    pub l: f64,
    /// Green-red component, normally around the range [-0.4, 0.4].
    pub a: f64,
    /// Blue-yellow component, normally around the range [-0.4, 0.4].
    pub b: f64,
}
impl Oklab {
    /// Create a new color with the given lightness, green-red and blue-yellow components.
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

/// Represents a color in the OkLCh color space.
///
/// This is a transformation of the Oklab color space, where the chromaticities `a` and `b` are
/// represented in polar coordinates, as chroma and hue.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OkLch {
    /// Perceived lightness.
    pub l: f64,
    /// Chroma, normally in the range [0.0, 0.4].
    pub c: f64,
    /// Hue in degrees, in the range [0.0, 360.0). Meaningless when `c` is zero.
    pub h: f64,
}
impl OkLch {
    /// Create a new color with the given lightness, chroma and hue.
    pub fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }
}

/// Represents a color in the okHsl color space.
///
/// This color space is similar to the HSL color space, but with a perceptually uniform
/// saturation and lightness, based on the Oklab/OkLCh color space.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OkHsl {
    /// Hue in degrees, as in the OkLCh color space.
    pub h: f64,
    /// Saturation, normally in the range [0.0, 1.0].
    pub s: f64,
    /// Lightness, normally in the range [0.0, 1.0], where 1.0 is white.
    pub l: f64,
}
impl OkHsl {
    /// Create a new color with the given hue, saturation and lightness.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }
}

/// Represents a color in the sRGB color space, with 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Srgb8 {
    /// Red component, in the range [0, 255]
    pub r: u8,
    /// Green component, in the range [0, 255]
    pub g: u8,
    /// Blue component, in the range [0, 255]
    pub b: u8,
}
impl Srgb8 {
    /// Format as a `#rrggbb` hex string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
impl From<Srgb> for Srgb8 {
    fn from(srgb: Srgb) -> Self {
        let srgb = srgb.clip();
        let channel = |x: f64| (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        Srgb8 {
            r: channel(srgb.r),
            g: channel(srgb.g),
            b: channel(srgb.b),
        }
    }
}

impl From<LinSrgb> for Srgb {
    fn from(lin_srgb: LinSrgb) -> Self {
        ok_color::linear_srgb_to_srgb(lin_srgb)
    }
}
impl From<Oklab> for Srgb {
    fn from(oklab: Oklab) -> Self {
        ok_color::linear_srgb_to_srgb(ok_color::oklab_to_linear_srgb(oklab))
    }
}
impl From<OkLch> for Srgb {
    fn from(oklch: OkLch) -> Self {
        Srgb::from(ok_color::oklch_to_oklab(oklch))
    }
}
impl From<OkHsl> for Srgb {
    fn from(okhsl: OkHsl) -> Self {
        Srgb::from(ok_color::okhsl_to_oklab(okhsl))
    }
}

impl From<Srgb> for LinSrgb {
    fn from(srgb: Srgb) -> Self {
        ok_color::srgb_to_linear_srgb(srgb)
    }
}
impl From<Oklab> for LinSrgb {
    fn from(oklab: Oklab) -> Self {
        ok_color::oklab_to_linear_srgb(oklab)
    }
}
impl From<OkLch> for LinSrgb {
    fn from(oklch: OkLch) -> Self {
        ok_color::oklab_to_linear_srgb(ok_color::oklch_to_oklab(oklch))
    }
}

impl From<Srgb> for Oklab {
    fn from(srgb: Srgb) -> Self {
        ok_color::linear_srgb_to_oklab(ok_color::srgb_to_linear_srgb(srgb))
    }
}
impl From<LinSrgb> for Oklab {
    fn from(lin_srgb: LinSrgb) -> Self {
        ok_color::linear_srgb_to_oklab(lin_srgb)
    }
}
impl From<OkLch> for Oklab {
    fn from(oklch: OkLch) -> Self {
        ok_color::oklch_to_oklab(oklch)
    }
}
impl From<OkHsl> for Oklab {
    fn from(okhsl: OkHsl) -> Self {
        ok_color::okhsl_to_oklab(okhsl)
    }
}

impl From<Oklab> for OkLch {
    fn from(oklab: Oklab) -> Self {
        ok_color::oklab_to_oklch(oklab)
    }
}
impl From<OkHsl> for OkLch {
    fn from(okhsl: OkHsl) -> Self {
        ok_color::oklab_to_oklch(ok_color::okhsl_to_oklab(okhsl))
    }
}

impl From<Oklab> for OkHsl {
    fn from(oklab: Oklab) -> Self {
        ok_color::oklab_to_okhsl(oklab)
    }
}
impl From<Srgb> for OkHsl {
    fn from(srgb: Srgb) -> Self {
        ok_color::oklab_to_okhsl(Oklab::from(srgb))
    }
}

#[cfg(test)]
mod test {
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn clip() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let x = Srgb::new(rng.gen(), rng.gen(), rng.gen());
            assert_eq!(x, x.clip());
        }
    }

    #[test]
    fn hex() {
        assert_eq!(Srgb::new(1.0, 0.0, 0.5).to_srgb8().to_hex(), "#ff0080");
        assert_eq!(Srgb::from(OkHsl::new(0.0, 0.0, 1.0)).to_srgb8().to_hex(), "#ffffff");
    }

    #[test]
    fn okhsl_gray_has_no_chroma() {
        let lch = OkLch::from(OkHsl::new(200.0, 0.0, 0.5));
        assert!(lch.c.abs() < 1e-12);
    }
}
