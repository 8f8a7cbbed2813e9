use std::{cell::RefCell, rc::Rc};

use emath::Vec2;

/// Identifies a widget taking part in drag gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidgetId(u32);

/// A drag in progress: which widget and handle is being dragged, and where the handle was
/// grabbed, relative to its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub widget: WidgetId,
    pub handle: usize,
    pub offset: Vec2,
}

#[derive(Default)]
struct Inner {
    next_widget: u32,
    active: Option<Gesture>,
}

/// Owns the single drag gesture that may be active at a time.
///
/// While a gesture is active, the host routes every pointer move and release to the widget that
/// owns it, even when the pointer leaves the widget. Clones share the same gesture.
#[derive(Clone, Default)]
pub struct DragController {
    inner: Rc<RefCell<Inner>>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> WidgetId {
        let mut inner = self.inner.borrow_mut();
        inner.next_widget += 1;
        WidgetId(inner.next_widget)
    }

    /// Start a gesture, replacing any gesture still active.
    pub fn begin(&self, gesture: Gesture) {
        let previous = self.inner.borrow_mut().active.replace(gesture);
        if let Some(previous) = previous {
            log::debug!("drag of {:?} replaced by {:?}", previous.widget, gesture.widget);
        }
    }

    pub fn active(&self) -> Option<Gesture> {
        self.inner.borrow().active
    }

    /// The active gesture, if `widget` owns it.
    pub fn active_for(&self, widget: WidgetId) -> Option<Gesture> {
        self.active().filter(|gesture| gesture.widget == widget)
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().active.is_some()
    }

    /// End the gesture owned by `widget`, returning it.
    pub fn end(&self, widget: WidgetId) -> Option<Gesture> {
        let mut inner = self.inner.borrow_mut();
        if inner.active.map_or(false, |gesture| gesture.widget == widget) {
            inner.active.take()
        } else {
            None
        }
    }

    /// Called on teardown: end whatever gesture `widget` still owns.
    pub fn release(&self, widget: WidgetId) {
        if self.end(widget).is_some() {
            log::debug!("{:?} released while dragging", widget);
        }
    }
}
