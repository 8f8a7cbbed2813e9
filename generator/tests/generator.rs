use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use palette_generator::{
    Clipboard, ClipboardError, Confirm, ExportFormat, GeneratorConfig, KeyValueStore, Location,
    MemoryLocation, MemoryStore, Notifier, PaletteGenerator, PermalinkState, SequentialIds,
    Services, Toast, ToastKind,
};

const BASE: &str = "https://example.com/palette/";

#[derive(Clone, Default)]
struct Recorder {
    copied: Rc<RefCell<Vec<String>>>,
    toasts: Rc<RefCell<Vec<Toast>>>,
    confirmed: Rc<RefCell<Vec<String>>>,
    fail_clipboard: bool,
    answer: bool,
}

impl Clipboard for Recorder {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_clipboard {
            return Err(ClipboardError::Denied("not allowed".into()));
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

impl Notifier for Recorder {
    fn notify(&mut self, toast: Toast) {
        self.toasts.borrow_mut().push(toast);
    }
}

impl Confirm for Recorder {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirmed.borrow_mut().push(message.to_string());
        self.answer
    }
}

struct Harness {
    store: MemoryStore,
    location: MemoryLocation,
    recorder: Recorder,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            location: MemoryLocation::new(BASE),
            recorder: Recorder::default(),
        }
    }

    fn generator(&self) -> PaletteGenerator {
        let services = Services {
            store: Box::new(self.store.clone()),
            clipboard: Box::new(self.recorder.clone()),
            notifier: Box::new(self.recorder.clone()),
            confirm: Box::new(self.recorder.clone()),
            location: Box::new(self.location.clone()),
        };
        PaletteGenerator::new(
            GeneratorConfig::default(),
            services,
            Box::new(SequentialIds::new()),
        )
    }
}

#[test]
fn starts_with_default_palette() {
    let harness = Harness::new();
    let generator = harness.generator();
    assert_eq!(generator.state().hues().len(), 12);
    assert_eq!(generator.palette().len(), 12);
    assert!(generator.palette().swatches().iter().all(|row| row.len() == 10));
    assert_eq!(generator.computations(), 1);
    assert!(!generator.needs_frame());
}

#[test]
fn mutations_coalesce_into_one_computation() {
    let harness = Harness::new();
    let mut generator = harness.generator();
    let now = Instant::now();

    generator.set_steps(4);
    generator.set_steps(5);
    generator.set_steps(6);
    assert!(generator.needs_frame());
    assert_eq!(generator.computations(), 1);
    assert_eq!(generator.palette().swatches()[0].len(), 10);

    assert!(generator.frame(now));
    assert_eq!(generator.computations(), 2);
    assert_eq!(generator.palette().swatches()[0].len(), 6);

    assert!(!generator.frame(now + Duration::from_millis(16)));
    assert_eq!(generator.computations(), 2);
}

#[test]
fn selection_does_not_recompute() {
    let harness = Harness::new();
    let mut generator = harness.generator();
    let id = generator.state().hues()[2].id.clone();
    generator.select(Some(id));
    assert!(!generator.needs_frame());
    assert_eq!(generator.state().hue_circle_hue(), 60.0);
}

#[test]
fn changes_are_persisted() {
    let harness = Harness::new();
    let mut generator = harness.generator();
    generator.set_steps(3);
    generator.set_min(0.1, 0.2);
    let id = generator.state().hues()[0].id.clone();
    generator.rename_hue(&id, "red");

    assert_eq!(harness.store.get("_x_steps"), Some(3.into()));
    assert_eq!(harness.store.get("_x_min-saturation"), Some(0.1.into()));
    assert_eq!(harness.store.get("_x_min-lightness"), Some(0.2.into()));

    let reloaded = harness.generator();
    assert_eq!(reloaded.state().steps(), 3);
    assert_eq!(reloaded.state().min(), (0.1, 0.2));
    assert_eq!(reloaded.state().hues()[0].name.as_deref(), Some("red"));
}

#[test]
fn location_follows_after_debounce() {
    let harness = Harness::new();
    let mut generator = harness.generator();
    let now = Instant::now();

    generator.set_steps(7);
    generator.frame(now);
    generator.tick(now + Duration::from_millis(100));
    assert_eq!(harness.location.href(), BASE);

    generator.tick(now + Duration::from_millis(250));
    let href = harness.location.href();
    let (base, hash) = href.split_once('#').unwrap();
    assert_eq!(base, BASE);
    assert_eq!(PermalinkState::decode(hash).unwrap().steps, 7);
}

#[test]
fn restores_from_permalink() {
    let harness = Harness::new();
    let mut generator = harness.generator();
    generator.set_steps(4);
    generator.set_lightness_range(0.3, 0.6);
    let link = generator.permalink();

    let other = Harness::new();
    other.location.clone().replace(link);
    let restored = other.generator();
    assert_eq!(restored.state().steps(), 4);
    assert_eq!(restored.state().min().1, 0.3);
    assert_eq!(restored.state().max().1, 0.6);
    assert_eq!(restored.palette().swatches()[0].len(), 4);
    assert_eq!(other.store.get("_x_steps"), Some(4.into()));
}

#[test]
fn broken_permalink_keeps_stored_state() {
    let harness = Harness::new();
    harness.store.clone().set("_x_steps", 5.into());
    harness
        .location
        .clone()
        .replace(format!("{}#not-a-palette", BASE));
    let generator = harness.generator();
    assert_eq!(generator.state().steps(), 5);
}

#[test]
fn reset_asks_first() {
    let mut harness = Harness::new();
    let mut generator = harness.generator();
    generator.set_steps(3);
    assert!(!generator.reset());
    assert_eq!(generator.state().steps(), 3);
    assert_eq!(
        harness.recorder.confirmed.borrow().as_slice(),
        ["Are you sure you want to reset the generator?"]
    );

    harness.recorder.answer = true;
    let mut generator = harness.generator();
    generator.add_hue();
    assert!(generator.reset());
    assert_eq!(generator.state().steps(), 10);
    assert_eq!(generator.state().hues().len(), 12);
    assert_eq!(generator.palette().swatches()[0].len(), 10);
    assert_eq!(harness.store.get("_x_steps"), Some(10.into()));
}

#[test]
fn copy_palette_notifies() {
    let harness = Harness::new();
    let mut generator = harness.generator();
    generator.set_steps(2);
    generator.copy_palette(ExportFormat::Tailwind);

    let copied = harness.recorder.copied.borrow();
    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0].lines().count(), 24);
    assert!(copied[0].starts_with("  --color-rose-1: oklch("));

    let toasts = harness.recorder.toasts.borrow();
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(
        toasts[0].message,
        "Copied palette to clipboard as TailwindCSS colors"
    );
    assert_eq!(
        toasts[0].description.as_deref(),
        Some("Paste inside TailwindCSS @theme {} to use")
    );
}

#[test]
fn clipboard_failure_is_reported() {
    let mut harness = Harness::new();
    harness.recorder.fail_clipboard = true;
    let mut generator = harness.generator();
    generator.copy_permalink();
    let toasts = harness.recorder.toasts.borrow();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(harness.recorder.copied.borrow().is_empty());
}
