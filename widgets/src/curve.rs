//! The saturation/lightness curve editor: a chart with saturation on the x axis and lightness on
//! the y axis, and two handles for the ends of the palette's straight line between them.

use std::time::Duration;

use emath::{lerp, pos2, remap_clamp, vec2, Pos2, Vec2};
use palette_generator::{FrameBudget, FrameRequest, PaletteState};

use crate::{
    chart::{Chart, Shape, BLACK, GRID, WHITE},
    drag::{DragController, Gesture, WidgetId},
    WidgetError,
};

const PADDING: f32 = 8.0;
const FONT_SIZE: f32 = 16.0;
const GRID_LINES: usize = 10;
const MARKER_RADIUS: f32 = 5.0;
/// How far from a handle's center it can be grabbed.
pub const HANDLE_RADIUS: f32 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveHandle {
    Min,
    Max,
}

impl CurveHandle {
    fn index(self) -> usize {
        match self {
            CurveHandle::Min => 0,
            CurveHandle::Max => 1,
        }
    }

    fn from_index(index: usize) -> Self {
        if index == 0 {
            CurveHandle::Min
        } else {
            CurveHandle::Max
        }
    }
}

/// A handle was dragged to a new (saturation, lightness), both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveEdit {
    pub handle: CurveHandle,
    pub saturation: f64,
    pub lightness: f64,
}

pub struct CurveEditor {
    id: WidgetId,
    drag: DragController,
    size: Vec2,
    origin: Pos2,
    extent: Pos2,
    min: (f64, f64),
    max: (f64, f64),
    steps: u32,
    redraw: FrameRequest,
    budget: FrameBudget,
}

impl CurveEditor {
    pub fn new(
        drag: DragController,
        width: f32,
        height: f32,
        budget: Duration,
    ) -> Result<Self, WidgetError> {
        let origin = pos2(FONT_SIZE + PADDING, height - FONT_SIZE - PADDING);
        let extent = pos2(width - 1.0, 0.0);
        if !(extent.x > origin.x && origin.y > extent.y) {
            return Err(WidgetError::TooSmall {
                widget: "curve editor",
                width,
                height,
                min: FONT_SIZE + PADDING + 2.0,
            });
        }

        let redraw = FrameRequest::new();
        redraw.request();
        Ok(Self {
            id: drag.register(),
            drag,
            size: vec2(width, height),
            origin,
            extent,
            min: (0.0, 0.0),
            max: (1.0, 1.0),
            steps: 1,
            redraw,
            budget: FrameBudget::new("curve editor redraw", budget),
        })
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The chart's origin, where saturation and lightness are 0.
    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    pub fn to_screen(&self, saturation: f64, lightness: f64) -> Pos2 {
        pos2(
            lerp(self.origin.x..=self.extent.x, saturation as f32),
            lerp(self.origin.y..=self.extent.y, lightness as f32),
        )
    }

    /// The (saturation, lightness) at `pos`, clamped to the chart.
    pub fn from_screen(&self, pos: Pos2) -> (f64, f64) {
        let s = remap_clamp(pos.x, self.origin.x..=self.extent.x, 0.0..=1.0);
        let l = remap_clamp(pos.y, self.origin.y..=self.extent.y, 0.0..=1.0);
        (s as f64, l as f64)
    }

    pub fn value(&self, handle: CurveHandle) -> (f64, f64) {
        match handle {
            CurveHandle::Min => self.min,
            CurveHandle::Max => self.max,
        }
    }

    pub fn handle_center(&self, handle: CurveHandle) -> Pos2 {
        let (s, l) = self.value(handle);
        self.to_screen(s, l)
    }

    /// The handle under `pos`, the nearest one if both are.
    pub fn hit_test(&self, pos: Pos2) -> Option<CurveHandle> {
        [CurveHandle::Min, CurveHandle::Max]
            .into_iter()
            .map(|handle| (handle, (pos - self.handle_center(handle)).length()))
            .filter(|&(_, d)| d <= HANDLE_RADIUS)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(handle, _)| handle)
    }

    /// Follow the palette state. Requests a redraw if anything shown changed.
    pub fn sync(&mut self, state: &PaletteState) {
        let changed =
            self.min != state.min() || self.max != state.max() || self.steps != state.steps();
        if changed {
            self.min = state.min();
            self.max = state.max();
            self.steps = state.steps();
            self.request_redraw();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active_for(self.id).is_some()
    }

    pub fn pointer_down(&mut self, pos: Pos2) -> Option<CurveHandle> {
        let handle = self.hit_test(pos)?;
        self.drag.begin(Gesture {
            widget: self.id,
            handle: handle.index(),
            offset: pos - self.handle_center(handle),
        });
        Some(handle)
    }

    /// Move the dragged handle, returning the new value for the palette.
    pub fn pointer_move(&mut self, pos: Pos2) -> Option<CurveEdit> {
        let gesture = self.drag.active_for(self.id)?;
        let handle = CurveHandle::from_index(gesture.handle);
        let (saturation, lightness) = self.from_screen(pos - gesture.offset);
        match handle {
            CurveHandle::Min => self.min = (saturation, lightness),
            CurveHandle::Max => self.max = (saturation, lightness),
        }
        self.request_redraw();
        Some(CurveEdit {
            handle,
            saturation,
            lightness,
        })
    }

    pub fn pointer_up(&mut self) -> bool {
        self.drag.end(self.id).is_some()
    }

    pub fn dispose(&mut self) {
        self.drag.release(self.id);
    }

    /// Ask for a redraw on the next frame. Returns true for the first request since the last
    /// frame.
    pub fn request_redraw(&self) -> bool {
        self.redraw.request()
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw.is_pending()
    }

    /// Frame callback: the redrawn chart, if a redraw was requested.
    pub fn frame(&mut self) -> Option<Chart> {
        if !self.redraw.take() {
            return None;
        }
        Some(self.budget.run(|| self.draw()))
    }

    pub fn draw(&self) -> Chart {
        let mut chart = Chart::new(self.size);
        let (origin, extent) = (self.origin, self.extent);
        let line = |from, to, width, color| Shape::Line {
            from,
            to,
            width,
            color,
        };

        // axes
        chart.push(line(origin, pos2(extent.x, origin.y), 2.0, BLACK));
        chart.push(line(origin, pos2(origin.x, extent.y), 2.0, BLACK));

        for i in 1..=GRID_LINES {
            let t = i as f32 / GRID_LINES as f32;
            let x = lerp(origin.x..=extent.x, t);
            chart.push(line(pos2(x, origin.y), pos2(x, extent.y), 1.0, GRID));
            let y = lerp(origin.y..=extent.y, t);
            chart.push(line(pos2(origin.x, y), pos2(extent.x, y), 1.0, GRID));
        }

        chart.push(Shape::Text {
            pos: pos2(lerp(origin.x..=extent.x, 0.5), origin.y + FONT_SIZE),
            text: "Saturation".into(),
            size: FONT_SIZE,
            angle: 0.0,
            color: BLACK,
        });
        chart.push(Shape::Text {
            pos: pos2(origin.x - FONT_SIZE, lerp(origin.y..=extent.y, 0.5)),
            text: "Lightness".into(),
            size: FONT_SIZE,
            angle: -90.0,
            color: BLACK,
        });

        let start = self.handle_center(CurveHandle::Min);
        let end = self.handle_center(CurveHandle::Max);
        chart.push(line(start, end, 2.0, BLACK));

        let markers = self.steps.max(1);
        for i in 0..markers {
            let t = if markers == 1 {
                0.0
            } else {
                i as f32 / (markers - 1) as f32
            };
            chart.push(Shape::Circle {
                center: start.lerp(end, t),
                radius: MARKER_RADIUS,
                fill: BLACK,
                stroke: Some((2.0, WHITE)),
            });
        }

        chart
    }
}

impl Drop for CurveEditor {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod test {
    use palette_generator::{GeneratorConfig, SequentialIds};

    use super::*;

    fn editor() -> CurveEditor {
        CurveEditor::new(DragController::new(), 224.0, 124.0, Duration::from_millis(16)).unwrap()
    }

    fn state() -> PaletteState {
        PaletteState::with_defaults(&GeneratorConfig::default(), Box::new(SequentialIds::new()))
    }

    #[test]
    fn too_small() {
        let drag = DragController::new();
        let budget = Duration::from_millis(16);
        assert!(CurveEditor::new(drag.clone(), 20.0, 200.0, budget).is_err());
        assert!(CurveEditor::new(drag.clone(), 200.0, 20.0, budget).is_err());
        assert!(CurveEditor::new(drag, 200.0, 200.0, budget).is_ok());
    }

    #[test]
    fn mapping() {
        let editor = editor();
        assert_eq!(editor.origin(), pos2(24.0, 100.0));
        assert_eq!(editor.to_screen(0.0, 0.0), pos2(24.0, 100.0));
        assert_eq!(editor.to_screen(1.0, 1.0), pos2(223.0, 0.0));
        assert_eq!(editor.to_screen(0.5, 0.5), pos2(123.5, 50.0));

        let (s, l) = editor.from_screen(pos2(123.5, 25.0));
        assert!((s - 0.5).abs() < 1e-6);
        assert!((l - 0.75).abs() < 1e-6);
        assert_eq!(editor.from_screen(pos2(-50.0, 500.0)), (0.0, 0.0));
        assert_eq!(editor.from_screen(pos2(1000.0, -500.0)), (1.0, 1.0));
    }

    #[test]
    fn drag_clamps() {
        let mut editor = editor();
        let mut state = state();
        editor.sync(&state);

        let min = editor.handle_center(CurveHandle::Min);
        assert_eq!(editor.pointer_down(min + vec2(3.0, 0.0)), Some(CurveHandle::Min));
        let edit = editor.pointer_move(pos2(-100.0, -100.0)).unwrap();
        assert_eq!(
            edit,
            CurveEdit {
                handle: CurveHandle::Min,
                saturation: 0.0,
                lightness: 1.0
            }
        );
        state.set_min(edit.saturation, edit.lightness);
        assert_eq!(state.min(), (0.0, 1.0));
        assert!(editor.pointer_up());
        assert_eq!(editor.pointer_move(pos2(50.0, 50.0)), None);
        assert!(!editor.pointer_up());
    }

    #[test]
    fn nearest_handle_wins() {
        let mut editor = editor();
        let mut state = state();
        state.set_min(0.5, 0.5);
        state.set_max(0.52, 0.5);
        editor.sync(&state);
        let max = editor.handle_center(CurveHandle::Max);
        assert_eq!(editor.hit_test(max + vec2(1.0, 0.0)), Some(CurveHandle::Max));
        assert_eq!(editor.hit_test(pos2(200.0, 90.0)), None);
    }

    #[test]
    fn redraws_coalesce() {
        let mut editor = editor();
        assert!(editor.frame().is_some());
        assert!(editor.frame().is_none());

        let mut state = state();
        editor.sync(&state);
        state.set_min(0.1, 0.1);
        editor.sync(&state);
        state.set_max(0.9, 0.9);
        editor.sync(&state);
        assert!(!editor.request_redraw());
        assert!(editor.frame().is_some());
        assert!(editor.frame().is_none());

        editor.sync(&state);
        assert!(!editor.needs_redraw());
    }

    #[test]
    fn chart() {
        let mut editor = editor();
        let mut state = state();
        state.set_steps(4);
        editor.sync(&state);
        let chart = editor.frame().unwrap();

        // 2 axes, 10 grid lines per axis, and the curve
        assert_eq!(chart.lines().count(), 23);
        assert_eq!(chart.texts().collect::<Vec<_>>(), ["Saturation", "Lightness"]);

        let markers: Vec<Pos2> = chart.circles().map(|(c, _)| c).collect();
        assert_eq!(markers.len(), 4);
        assert_eq!(markers[0], editor.handle_center(CurveHandle::Min));
        assert_eq!(markers[3], editor.handle_center(CurveHandle::Max));

        state.set_steps(1);
        editor.sync(&state);
        assert_eq!(editor.draw().circles().count(), 1);
    }

    #[test]
    fn dispose_detaches() {
        let drag = DragController::new();
        let mut editor =
            CurveEditor::new(drag.clone(), 224.0, 124.0, Duration::from_millis(16)).unwrap();
        editor.pointer_down(editor.handle_center(CurveHandle::Max));
        assert!(drag.is_active());
        editor.dispose();
        assert!(!drag.is_active());
    }
}
