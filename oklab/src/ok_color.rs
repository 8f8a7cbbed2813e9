#![allow(missing_docs)]

//! Double precision port of the reference conversions published by Björn Ottosson at
//! [http://bottosson.github.io/misc/ok_color.h](http://bottosson.github.io/misc/ok_color.h),
//! restricted to the sRGB, Oklab, OkLCh and okHsl paths. Hues are expressed in degrees.

// Copyright(c) 2021 Björn Ottosson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this softwareand associated documentation files(the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and /or sell copies
// of the Software, and to permit persons to whom the Software is furnished to do
// so, subject to the following conditions :
// The above copyright noticeand this permission notice shall be included in all
// copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use super::*;

/// Rows of the LMS to linear sRGB matrix, shared by the conversion and the gamut searches.
const LMS_TO_R: [f64; 3] = [4.0767416621, -3.3077115913, 0.2309699292];
const LMS_TO_G: [f64; 3] = [-1.2684380046, 2.6097574011, -0.3413193965];
const LMS_TO_B: [f64; 3] = [-0.0041960863, -0.7034186147, 1.7076147010];

/// (L_cusp, C_cusp) of a hue slice.
#[derive(Clone, Copy)]
struct Cusp {
    l: f64,
    c: f64,
}

/// The cusp encoded so S = C_cusp/L_cusp and T = C_cusp/(1-L_cusp).
#[derive(Clone, Copy)]
struct St {
    s: f64,
    t: f64,
}

#[derive(Clone, Copy)]
struct ChromaStops {
    c_0: f64,
    c_mid: f64,
    c_max: f64,
}

fn dot(row: [f64; 3], l: f64, m: f64, s: f64) -> f64 {
    row[0] * l + row[1] * m + row[2] * s
}

fn srgb_transfer_function(a: f64) -> f64 {
    if a <= 0.0031308 {
        12.92 * a
    } else {
        1.055 * a.powf(1.0 / 2.4) - 0.055
    }
}

fn srgb_transfer_function_inv(a: f64) -> f64 {
    if a > 0.04045 {
        ((a + 0.055) / 1.055).powf(2.4)
    } else {
        a / 12.92
    }
}

pub fn linear_srgb_to_srgb(c: LinSrgb) -> Srgb {
    Srgb {
        r: srgb_transfer_function(c.r),
        g: srgb_transfer_function(c.g),
        b: srgb_transfer_function(c.b),
    }
}

pub fn srgb_to_linear_srgb(c: Srgb) -> LinSrgb {
    LinSrgb {
        r: srgb_transfer_function_inv(c.r),
        g: srgb_transfer_function_inv(c.g),
        b: srgb_transfer_function_inv(c.b),
    }
}

pub fn linear_srgb_to_oklab(c: LinSrgb) -> Oklab {
    let l = (0.4122214708 * c.r + 0.5363325363 * c.g + 0.0514459929 * c.b).cbrt();
    let m = (0.2119034982 * c.r + 0.6806995451 * c.g + 0.1073969566 * c.b).cbrt();
    let s = (0.0883024619 * c.r + 0.2817188376 * c.g + 0.6299787005 * c.b).cbrt();

    Oklab {
        l: 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
        a: 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
        b: 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
    }
}

pub fn oklab_to_linear_srgb(c: Oklab) -> LinSrgb {
    let l = (c.l + 0.3963377774 * c.a + 0.2158037573 * c.b).powi(3);
    let m = (c.l - 0.1055613458 * c.a - 0.0638541728 * c.b).powi(3);
    let s = (c.l - 0.0894841775 * c.a - 1.2914855480 * c.b).powi(3);

    LinSrgb {
        r: dot(LMS_TO_R, l, m, s),
        g: dot(LMS_TO_G, l, m, s),
        b: dot(LMS_TO_B, l, m, s),
    }
}

/// Derivatives of the non-linear LMS components along the direction (a, b).
fn lms_slopes(a: f64, b: f64) -> [f64; 3] {
    [
        0.3963377774 * a + 0.2158037573 * b,
        -0.1055613458 * a - 0.0638541728 * b,
        -0.0894841775 * a - 1.2914855480 * b,
    ]
}

// Maximum saturation (S = C/L) that fits in sRGB for the hue (a, b), where a^2 + b^2 == 1.
fn compute_max_saturation(a: f64, b: f64) -> f64 {
    // Max saturation will be when one of r, g or b goes below zero. Pick the polynomial for the
    // component that clips first.
    let (k, w) = if -1.88170328 * a - 0.80936493 * b > 1.0 {
        (
            [1.19086277, 1.76576728, 0.59662641, 0.75515197, 0.56771245],
            LMS_TO_R,
        )
    } else if 1.81444104 * a - 1.19445276 * b > 1.0 {
        (
            [0.73956515, -0.45954404, 0.08285427, 0.12541070, 0.14503204],
            LMS_TO_G,
        )
    } else {
        (
            [1.35733652, -0.00915799, -1.15130210, -0.50559606, 0.00692167],
            LMS_TO_B,
        )
    };

    let mut saturation = k[0] + k[1] * a + k[2] * b + k[3] * a * a + k[4] * a * b;

    // One step of Halley's method. Good to 10e6 except for some blue hues.
    let [k_l, k_m, k_s] = lms_slopes(a, b);

    let l_ = 1.0 + saturation * k_l;
    let m_ = 1.0 + saturation * k_m;
    let s_ = 1.0 + saturation * k_s;

    let f = dot(w, l_.powi(3), m_.powi(3), s_.powi(3));
    let f1 = dot(
        w,
        3.0 * k_l * l_ * l_,
        3.0 * k_m * m_ * m_,
        3.0 * k_s * s_ * s_,
    );
    let f2 = dot(
        w,
        6.0 * k_l * k_l * l_,
        6.0 * k_m * k_m * m_,
        6.0 * k_s * k_s * s_,
    );

    saturation -= f * f1 / (f1 * f1 - 0.5 * f * f2);
    saturation
}

fn find_cusp(a: f64, b: f64) -> Cusp {
    let s_cusp = compute_max_saturation(a, b);

    // Scale the lightness so the brightest channel of the cusp sits at 1.0.
    let rgb = oklab_to_linear_srgb(Oklab {
        l: 1.0,
        a: s_cusp * a,
        b: s_cusp * b,
    });
    let l_cusp = (1.0 / rgb.r.max(rgb.g).max(rgb.b)).cbrt();

    Cusp {
        l: l_cusp,
        c: l_cusp * s_cusp,
    }
}

// Intersection of the line L = L0 * (1 - t) + t * L1, C = t * C1 with the sRGB gamut, for the
// normalized hue (a, b).
fn find_gamut_intersection(a: f64, b: f64, l1: f64, c1: f64, l0: f64, cusp: Cusp) -> f64 {
    if (l1 - l0) * cusp.c - (cusp.l - l0) * c1 <= 0.0 {
        // Lower half, the triangle is exact.
        return cusp.c * l0 / (c1 * cusp.l + cusp.c * (l0 - l1));
    }

    // Upper half: intersect with the triangle, then refine with one Halley step per channel.
    let mut t = cusp.c * (l0 - 1.0) / (c1 * (cusp.l - 1.0) + cusp.c * (l0 - l1));

    let d_l = l1 - l0;
    let [k_l, k_m, k_s] = lms_slopes(a, b);

    let l_dt = d_l + c1 * k_l;
    let m_dt = d_l + c1 * k_m;
    let s_dt = d_l + c1 * k_s;

    let lightness = l0 * (1.0 - t) + t * l1;
    let chroma = t * c1;

    let l_ = lightness + chroma * k_l;
    let m_ = lightness + chroma * k_m;
    let s_ = lightness + chroma * k_s;

    let lms = (l_.powi(3), m_.powi(3), s_.powi(3));
    let lms_dt = (
        3.0 * l_dt * l_ * l_,
        3.0 * m_dt * m_ * m_,
        3.0 * s_dt * s_ * s_,
    );
    let lms_dt2 = (
        6.0 * l_dt * l_dt * l_,
        6.0 * m_dt * m_dt * m_,
        6.0 * s_dt * s_dt * s_,
    );

    let step = |row: [f64; 3]| {
        let v = dot(row, lms.0, lms.1, lms.2) - 1.0;
        let v1 = dot(row, lms_dt.0, lms_dt.1, lms_dt.2);
        let v2 = dot(row, lms_dt2.0, lms_dt2.1, lms_dt2.2);
        let u = v1 / (v1 * v1 - 0.5 * v * v2);
        if u >= 0.0 {
            -v * u
        } else {
            f64::MAX
        }
    };

    t += step(LMS_TO_R).min(step(LMS_TO_G)).min(step(LMS_TO_B));
    t
}

/// Clip a color to the sRGB gamut, keeping its lightness (clamped) and hue.
pub fn gamut_clip_preserve_chroma(rgb: LinSrgb) -> LinSrgb {
    if (0.0..1.0).contains(&rgb.r) && (0.0..1.0).contains(&rgb.g) && (0.0..1.0).contains(&rgb.b) {
        return rgb;
    }

    let lab = linear_srgb_to_oklab(rgb);

    let l = lab.l;
    let c = (lab.a * lab.a + lab.b * lab.b).sqrt().max(0.00001);
    let a_ = lab.a / c;
    let b_ = lab.b / c;

    let l0 = l.clamp(0.0, 1.0);

    let t = find_gamut_intersection(a_, b_, l, c, l0, find_cusp(a_, b_));
    let l_clipped = l0 * (1.0 - t) + t * l;
    let c_clipped = t * c;

    oklab_to_linear_srgb(Oklab {
        l: l_clipped,
        a: c_clipped * a_,
        b: c_clipped * b_,
    })
}

const K_1: f64 = 0.206;
const K_2: f64 = 0.03;
const K_3: f64 = (1.0 + K_1) / (1.0 + K_2);

fn toe(x: f64) -> f64 {
    let y = K_3 * x - K_1;
    0.5 * (y + (y * y + 4.0 * K_2 * K_3 * x).sqrt())
}

fn toe_inv(x: f64) -> f64 {
    (x * x + K_1 * x) / (K_3 * (x + K_2))
}

fn to_st(cusp: Cusp) -> St {
    St {
        s: cusp.c / cusp.l,
        t: cusp.c / (1.0 - cusp.l),
    }
}

// Smooth approximation of the cusp, fitted so that S_mid < S_max and T_mid < T_max.
fn get_st_mid(a_: f64, b_: f64) -> St {
    let s = 0.11516993
        + 1.0
            / (7.44778970
                + 4.15901240 * b_
                + a_ * (-2.19557347
                    + 1.75198401 * b_
                    + a_ * (-2.13704948 - 10.02301043 * b_
                        + a_ * (-4.24894561 + 5.38770819 * b_ + 4.69891013 * a_))));

    let t = 0.11239642
        + 1.0
            / (1.61320320 - 0.68124379 * b_
                + a_ * (0.40370612
                    + 0.90148123 * b_
                    + a_ * (-0.27087943
                        + 0.61223990 * b_
                        + a_ * (0.00299215 - 0.45399568 * b_ - 0.14661872 * a_))));

    St { s, t }
}

fn get_chroma_stops(l: f64, a_: f64, b_: f64) -> ChromaStops {
    let cusp = find_cusp(a_, b_);

    let c_max = find_gamut_intersection(a_, b_, l, 1.0, l, cusp);
    let st_max = to_st(cusp);

    // Compensates for the curved part of the gamut shape.
    let k = c_max / (l * st_max.s).min((1.0 - l) * st_max.t);

    // Soft minimums instead of a sharp triangle keep the chroma smooth.
    let st_mid = get_st_mid(a_, b_);
    let c_a = l * st_mid.s;
    let c_b = (1.0 - l) * st_mid.t;
    let c_mid = 0.9 * k * (1.0 / (1.0 / c_a.powi(4) + 1.0 / c_b.powi(4))).sqrt().sqrt();

    // Hue independent, roughly the average shape of the gamut.
    let c_a = l * 0.4;
    let c_b = (1.0 - l) * 0.8;
    let c_0 = (1.0 / (1.0 / (c_a * c_a) + 1.0 / (c_b * c_b))).sqrt();

    ChromaStops { c_0, c_mid, c_max }
}

const MID: f64 = 0.8;
const MID_INV: f64 = 1.25;

pub fn okhsl_to_oklab(hsl: OkHsl) -> Oklab {
    if hsl.l >= 1.0 {
        return Oklab::new(1.0, 0.0, 0.0);
    } else if hsl.l <= 0.0 {
        return Oklab::new(0.0, 0.0, 0.0);
    }

    let (b_, a_) = hsl.h.to_radians().sin_cos();
    let l = toe_inv(hsl.l);
    let s = hsl.s;

    let ChromaStops { c_0, c_mid, c_max } = get_chroma_stops(l, a_, b_);

    let c = if s < MID {
        let t = MID_INV * s;
        let k_1 = MID * c_0;
        let k_2 = 1.0 - k_1 / c_mid;
        t * k_1 / (1.0 - k_2 * t)
    } else {
        let t = (s - MID) / (1.0 - MID);
        let k_0 = c_mid;
        let k_1 = (1.0 - MID) * c_mid * c_mid * MID_INV * MID_INV / c_0;
        let k_2 = 1.0 - k_1 / (c_max - c_mid);
        k_0 + t * k_1 / (1.0 - k_2 * t)
    };

    Oklab {
        l,
        a: c * a_,
        b: c * b_,
    }
}

pub fn oklab_to_okhsl(lab: Oklab) -> OkHsl {
    let OkLch { l, c, h } = oklab_to_oklch(lab);

    if c == 0.0 || l <= 0.0 || l >= 1.0 {
        return OkHsl {
            h,
            s: 0.0,
            l: toe(l.clamp(0.0, 1.0)),
        };
    }

    let a_ = lab.a / c;
    let b_ = lab.b / c;

    let ChromaStops { c_0, c_mid, c_max } = get_chroma_stops(l, a_, b_);

    let s = if c < c_mid {
        let k_1 = MID * c_0;
        let k_2 = 1.0 - k_1 / c_mid;
        let t = c / (k_1 + k_2 * c);
        t * MID
    } else {
        let k_0 = c_mid;
        let k_1 = (1.0 - MID) * c_mid * c_mid * MID_INV * MID_INV / c_0;
        let k_2 = 1.0 - k_1 / (c_max - c_mid);
        let t = (c - k_0) / (k_1 + k_2 * (c - k_0));
        MID + (1.0 - MID) * t
    };

    OkHsl { h, s, l: toe(l) }
}

pub fn oklch_to_oklab(lch: OkLch) -> Oklab {
    let (sin, cos) = lch.h.to_radians().sin_cos();
    Oklab {
        l: lch.l,
        a: lch.c * cos,
        b: lch.c * sin,
    }
}

pub fn oklab_to_oklch(lab: Oklab) -> OkLch {
    let c = (lab.a * lab.a + lab.b * lab.b).sqrt();
    let h = if c == 0.0 {
        0.0
    } else {
        normalize_hue(lab.b.atan2(lab.a).to_degrees())
    };
    OkLch { l: lab.l, c, h }
}

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_hue(h: f64) -> f64 {
    let h = h % 360.0;
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn seeded_rng() -> impl Rng {
        rand::rngs::SmallRng::seed_from_u64(8947)
    }

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn srgb_conversions() {
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let x = LinSrgb::new(rng.gen(), rng.gen(), rng.gen());
            let y = srgb_to_linear_srgb(linear_srgb_to_srgb(x));
            assert!(close(x.r, y.r, 1e-9) && close(x.g, y.g, 1e-9) && close(x.b, y.b, 1e-9));
        }
    }

    #[test]
    fn oklab_conversions() {
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let x = LinSrgb::new(rng.gen(), rng.gen(), rng.gen());
            let y = oklab_to_linear_srgb(linear_srgb_to_oklab(x));
            assert!(close(x.r, y.r, 1e-6), "{:?} {:?}", x, y);
            assert!(close(x.g, y.g, 1e-6), "{:?} {:?}", x, y);
            assert!(close(x.b, y.b, 1e-6), "{:?} {:?}", x, y);
        }
    }

    #[test]
    fn white_is_neutral() {
        let lab = linear_srgb_to_oklab(LinSrgb::new(1.0, 1.0, 1.0));
        assert!(close(lab.l, 1.0, 1e-4));
        assert!(close(lab.a, 0.0, 1e-4));
        assert!(close(lab.b, 0.0, 1e-4));
    }

    #[test]
    fn oklch_conversions() {
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let lch = OkLch::new(rng.gen(), rng.gen_range(0.01..0.3), rng.gen_range(0.0..360.0));
            let back = oklab_to_oklch(oklch_to_oklab(lch));
            assert!(close(lch.l, back.l, 1e-9));
            assert!(close(lch.c, back.c, 1e-9));
            assert!(close(lch.h, back.h, 1e-6), "{:?} {:?}", lch, back);
        }
    }

    #[test]
    fn okhsl_conversions() {
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let hsl = OkHsl {
                h: rng.gen_range(0.0..360.0),
                s: rng.gen_range(0.05..0.95),
                l: rng.gen_range(0.05..0.95),
            };
            let back = oklab_to_okhsl(okhsl_to_oklab(hsl));
            assert!(close(hsl.h, back.h, 1e-4), "{:?} {:?}", hsl, back);
            assert!(close(hsl.s, back.s, 1e-4), "{:?} {:?}", hsl, back);
            assert!(close(hsl.l, back.l, 1e-4), "{:?} {:?}", hsl, back);
        }
    }

    #[test]
    fn okhsl_extremes() {
        assert_eq!(
            okhsl_to_oklab(OkHsl { h: 120.0, s: 1.0, l: 1.0 }),
            Oklab::new(1.0, 0.0, 0.0)
        );
        assert_eq!(
            okhsl_to_oklab(OkHsl { h: 120.0, s: 1.0, l: 0.0 }),
            Oklab::new(0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn clip_keeps_in_gamut_colors() {
        let x = LinSrgb::new(0.2, 0.4, 0.6);
        assert_eq!(gamut_clip_preserve_chroma(x), x);

        let y = gamut_clip_preserve_chroma(LinSrgb::new(1.4, -0.2, 0.3));
        for c in [y.r, y.g, y.b] {
            assert!((-1e-2..=1.0 + 1e-2).contains(&c), "{:?}", y);
        }
    }

    #[test]
    fn hue_normalization() {
        assert_eq!(normalize_hue(-90.0), 270.0);
        assert_eq!(normalize_hue(360.0), 0.0);
        assert_eq!(normalize_hue(725.0), 5.0);
    }
}
