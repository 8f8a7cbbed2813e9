//! Interactive editors for the palette generator: the hue circle and the saturation/lightness
//! curve.
//!
//! The editors are independent of any windowing system. The host feeds them pointer positions,
//! in the widget's own coordinates with `y` pointing down, and applies the edits they return to
//! the [`palette_generator::PaletteGenerator`]. Drawing produces plain data: an
//! [`image::RgbaImage`] for the hue ring and a [`chart::Chart`] display list for the curve.

pub mod chart;
pub mod curve;
pub mod drag;
pub mod hue_circle;

pub use chart::{Chart, Shape};
pub use curve::{CurveEdit, CurveEditor, CurveHandle};
pub use drag::{DragController, Gesture, WidgetId};
pub use hue_circle::HueCircle;

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("{widget} is too small: {width}x{height}, minimum size is {min}x{min}")]
    TooSmall {
        widget: &'static str,
        width: f32,
        height: f32,
        min: f32,
    },
    #[error("{widget} ring thickness {thickness} must be in (0, {max}]")]
    BadThickness {
        widget: &'static str,
        thickness: f32,
        max: f32,
    },
}
