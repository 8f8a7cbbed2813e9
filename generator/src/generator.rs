use std::{cell::RefCell, rc::Rc, time::Instant};

use crate::{
    config::GeneratorConfig,
    export::{export, ExportFormat},
    host::{Services, Toast},
    hue::{HueId, IdAllocator},
    palette::{compute_palette, DerivedPalette},
    permalink::{permalink, PermalinkState},
    schedule::{Debounce, FrameBudget, FrameRequest},
    state::{Change, PaletteState},
    store::{self, Field},
};

/// The palette generator: the palette state, its derived palette, and the services around them.
///
/// Mutations are persisted right away, but the palette is only recomputed on the next
/// [`frame`](Self::frame), once for any number of mutations. The permalink in the location
/// follows a while after the palette settles, see [`tick`](Self::tick).
pub struct PaletteGenerator {
    config: GeneratorConfig,
    state: PaletteState,
    palette: DerivedPalette,
    services: Services,
    recompute: FrameRequest,
    changes: Rc<RefCell<Vec<Change>>>,
    url_update: Debounce,
    budget: FrameBudget,
    computations: u64,
}

impl PaletteGenerator {
    pub fn new(config: GeneratorConfig, services: Services, ids: Box<dyn IdAllocator>) -> Self {
        let mut ids = ids;
        let settings = store::load_settings(services.store.as_ref(), &config, ids.as_mut());
        let mut state = PaletteState::new(settings, ids);

        let recompute = FrameRequest::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        state.subscribe({
            let recompute = recompute.clone();
            let changes = changes.clone();
            move |change: Change| {
                changes.borrow_mut().push(change);
                if change.affects_palette() {
                    recompute.request();
                }
            }
        });

        let mut this = Self {
            url_update: Debounce::new(config.url_debounce()),
            budget: FrameBudget::new("palette computation", config.frame_budget()),
            config,
            state,
            palette: DerivedPalette::default(),
            services,
            recompute,
            changes,
            computations: 0,
        };

        if let Some(hash) = this.services.location.hash() {
            match PermalinkState::decode(&hash) {
                Ok(link) => {
                    log::info!("restoring palette from permalink");
                    let settings = link.into_settings(this.state.ids());
                    this.state.apply(settings);
                }
                Err(err) => log::error!("failed to restore palette from permalink: {}", err),
            }
        }
        this.persist();

        this.recompute.take();
        this.compute();
        this
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> &PaletteState {
        &self.state
    }

    /// The palette as of the last computation.
    pub fn palette(&self) -> &DerivedPalette {
        &self.palette
    }

    /// How many times the palette was computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Whether the host should call [`frame`](Self::frame).
    pub fn needs_frame(&self) -> bool {
        self.recompute.is_pending()
    }

    /// When the host should call [`tick`](Self::tick) next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.url_update.deadline()
    }

    /// Apply `f` to the state, then persist whatever it changed.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut PaletteState) -> T) -> T {
        let result = f(&mut self.state);
        self.persist();
        result
    }

    fn persist(&mut self) {
        let changes: Vec<Change> = self.changes.borrow_mut().drain(..).collect();
        let mut saved: Vec<Field> = Vec::new();
        for change in changes {
            for &field in Field::changed_by(change) {
                if !saved.contains(&field) {
                    store::save_field(self.services.store.as_mut(), self.state.settings(), field);
                    saved.push(field);
                }
            }
        }
    }

    fn compute(&mut self) {
        let settings = self.state.settings();
        self.palette = self.budget.run(|| compute_palette(settings));
        self.computations += 1;
        log::debug!(
            "computed palette of {} hues and {} steps",
            self.palette.len(),
            settings.steps
        );
    }

    /// Frame callback: recompute the palette if anything changed since the last frame.
    /// Returns whether it did.
    pub fn frame(&mut self, now: Instant) -> bool {
        if !self.recompute.take() {
            return false;
        }
        self.compute();
        self.url_update.schedule(now);
        true
    }

    /// Timer callback: update the location once the debounce elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.url_update.poll(now) {
            self.update_location();
        }
    }

    /// Perform any pending recomputation and location update right away.
    pub fn flush(&mut self) {
        if self.recompute.take() {
            self.compute();
            self.url_update.schedule(Instant::now());
        }
        if self.url_update.flush() {
            self.update_location();
        }
    }

    fn update_location(&mut self) {
        let href = permalink(&self.services.location.href(), self.state.settings());
        log::trace!("replacing location with {}", href);
        self.services.location.replace(href);
    }

    /// The current location, with the permalink of the current state as fragment.
    pub fn permalink(&self) -> String {
        permalink(&self.services.location.href(), self.state.settings())
    }

    pub fn export(&mut self, format: ExportFormat) -> String {
        if self.recompute.take() {
            self.compute();
            self.url_update.schedule(Instant::now());
        }
        export(&self.palette, self.state.hues(), format)
    }

    fn copy(&mut self, text: &str, success: Toast) {
        match self.services.clipboard.write_text(text) {
            Ok(()) => self.services.notifier.notify(success),
            Err(err) => {
                log::error!("failed to write to clipboard: {}", err);
                self.services.notifier.notify(
                    Toast::error("Failed to copy to clipboard").with_description(Some(err.to_string())),
                );
            }
        }
    }

    pub fn copy_palette(&mut self, format: ExportFormat) {
        let text = self.export(format);
        let toast = Toast::success(format.toast_message())
            .with_description(format.toast_description());
        self.copy(&text, toast);
    }

    pub fn copy_permalink(&mut self) {
        let text = self.permalink();
        self.copy(&text, Toast::success("Permalink copied to clipboard!"));
    }

    /// Restore the default palette, after asking the user.
    pub fn reset(&mut self) -> bool {
        let confirmed = self
            .state
            .reset(self.services.confirm.as_mut(), &self.config);
        if confirmed {
            self.persist();
            self.recompute.take();
            self.compute();
            self.url_update.schedule(Instant::now());
        }
        confirmed
    }

    pub fn add_hue(&mut self) -> HueId {
        self.mutate(|state| state.add_hue())
    }

    pub fn move_hue(&mut self, from: usize, to: usize) {
        self.mutate(|state| state.move_hue(from, to))
    }

    pub fn update_hue(&mut self, id: &HueId, raw: &str) -> bool {
        self.mutate(|state| state.update_hue(id, raw))
    }

    pub fn rename_hue(&mut self, id: &HueId, name: &str) {
        self.mutate(|state| state.rename_hue(id, name))
    }

    pub fn delete_hue(&mut self, id: &HueId) -> bool {
        self.mutate(|state| state.delete_hue(id))
    }

    pub fn select(&mut self, id: Option<HueId>) {
        self.mutate(|state| state.select(id))
    }

    pub fn set_hue_circle_hue(&mut self, value: f64) {
        self.mutate(|state| state.set_hue_circle_hue(value))
    }

    pub fn set_steps(&mut self, steps: u32) {
        self.mutate(|state| state.set_steps(steps))
    }

    pub fn set_saturation_range(&mut self, min: f64, max: f64) {
        self.mutate(|state| state.set_saturation_range(min, max))
    }

    pub fn set_lightness_range(&mut self, min: f64, max: f64) {
        self.mutate(|state| state.set_lightness_range(min, max))
    }

    pub fn set_min(&mut self, saturation: f64, lightness: f64) {
        self.mutate(|state| state.set_min(saturation, lightness))
    }

    pub fn set_max(&mut self, saturation: f64, lightness: f64) {
        self.mutate(|state| state.set_max(saturation, lightness))
    }
}
