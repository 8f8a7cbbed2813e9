//! A ring shaped hue picker, with a handle orbiting inside the ring.
//!
//! Hue 0 points up and grows clockwise, like on a color wheel.

use std::cell::OnceCell;

use emath::{pos2, vec2, Pos2, Vec2};
use image::{Rgba, RgbaImage};
use oklab::{OkLch, Srgb};
use palette_generator::PaletteState;

use crate::{
    drag::{DragController, Gesture, WidgetId},
    WidgetError,
};

pub const MIN_SIZE: f32 = 20.0;
pub const DEFAULT_THICKNESS: f32 = 12.0;
/// The ring is rasterized at least this big, and scaled down for display.
pub const MIN_RASTER_SIZE: u32 = 400;

const RING_LIGHTNESS: f64 = 0.8123;
const RING_CHROMA: f64 = 0.1709;

pub struct HueCircle {
    id: WidgetId,
    drag: DragController,
    size: f32,
    thickness: f32,
    raster_size: u32,
    hue: f64,
    ring: OnceCell<RgbaImage>,
}

impl HueCircle {
    /// A hue circle filling the largest square that fits in `width` x `height`.
    pub fn new(
        drag: DragController,
        width: f32,
        height: f32,
        thickness: f32,
    ) -> Result<Self, WidgetError> {
        let size = width.min(height);
        if !(size >= MIN_SIZE) {
            return Err(WidgetError::TooSmall {
                widget: "hue circle",
                width,
                height,
                min: MIN_SIZE,
            });
        }
        let radius = size / 2.0;
        if !(thickness > 0.0 && thickness <= radius) {
            return Err(WidgetError::BadThickness {
                widget: "hue circle",
                thickness,
                max: radius,
            });
        }

        let mut raster_size = (size.round() as u32).max(1);
        while raster_size < MIN_RASTER_SIZE {
            raster_size *= 2;
        }

        Ok(Self {
            id: drag.register(),
            drag,
            size,
            thickness,
            raster_size,
            hue: 0.0,
            ring: OnceCell::new(),
        })
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn center(&self) -> Pos2 {
        pos2(self.radius(), self.radius())
    }

    /// Distance from the center to the handle's center.
    pub fn handle_radius(&self) -> f32 {
        self.radius() - self.thickness / 2.0
    }

    pub fn raster_size(&self) -> u32 {
        self.raster_size
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    pub fn set_hue(&mut self, hue: f64) {
        self.hue = hue;
    }

    /// Follow the selected hue of the palette.
    pub fn sync(&mut self, state: &PaletteState) {
        self.set_hue(state.hue_circle_hue());
    }

    /// The hue in the direction of `point` from the center, in `[0, 360)`.
    pub fn hue_at(&self, point: Pos2) -> f64 {
        hue_of(point - self.center())
    }

    /// Where the handle sits for `hue`.
    pub fn handle_center(&self, hue: f64) -> Pos2 {
        let angle = (hue - 90.0).to_radians();
        let r = self.handle_radius() as f64;
        self.center() + vec2((angle.cos() * r) as f32, (angle.sin() * r) as f32)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active_for(self.id).is_some()
    }

    /// Start dragging if `point` is on the handle.
    pub fn pointer_down(&mut self, point: Pos2) -> bool {
        let handle = self.handle_center(self.hue);
        if (point - handle).length() > self.thickness {
            return false;
        }
        self.drag.begin(Gesture {
            widget: self.id,
            handle: 0,
            offset: point - handle,
        });
        true
    }

    /// Returns the new hue while dragging.
    pub fn pointer_move(&mut self, point: Pos2) -> Option<f64> {
        let gesture = self.drag.active_for(self.id)?;
        let handle = point - gesture.offset;
        self.hue = self.hue_at(handle);
        Some(self.hue)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.drag.end(self.id).is_some()
    }

    /// Detach from any gesture still in progress.
    pub fn dispose(&mut self) {
        self.drag.release(self.id);
    }

    /// The ring, rasterized on first use.
    pub fn ring(&self) -> &RgbaImage {
        self.ring.get_or_init(|| {
            let scale = self.raster_size as f32 / self.size;
            rasterize_ring(self.raster_size, scale * self.thickness)
        })
    }
}

impl Drop for HueCircle {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn hue_of(d: Vec2) -> f64 {
    let hue = (d.y as f64).atan2(d.x as f64).to_degrees() + 90.0;
    if hue < 0.0 {
        hue + 360.0
    } else {
        hue
    }
}

fn rasterize_ring(size: u32, thickness: f32) -> RgbaImage {
    let radius = size as f32 / 2.0;
    let mask_radius = radius - thickness;
    let start = std::time::Instant::now();
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let d = vec2(x as f32 - radius, y as f32 - radius);
        let r = d.length();
        if r < mask_radius || r > radius {
            return Rgba([0, 0, 0, 0]);
        }
        let color = Srgb::from(OkLch::new(RING_LIGHTNESS, RING_CHROMA, hue_of(d))).to_srgb8();
        Rgba([color.r, color.g, color.b, 255])
    });
    log::debug!("rasterized {}px hue ring in {:.2?}", size, start.elapsed());
    image
}
