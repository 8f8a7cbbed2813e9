use serde::{Deserialize, Serialize};

use crate::{
    config::GeneratorConfig,
    host::Confirm,
    hue::{Hue, HueId, IdAllocator},
};

pub const RESET_PROMPT: &str = "Are you sure you want to reset the generator?";

/// The persisted part of the palette state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub hues: Vec<Hue>,
    pub steps: u32,
    pub min_saturation: f64,
    pub max_saturation: f64,
    pub min_lightness: f64,
    pub max_lightness: f64,
}

/// What part of the state a notification is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    Hues,
    Steps,
    Saturation,
    Lightness,
    Selection,
    /// Everything was replaced at once.
    Reset,
}

impl Change {
    /// Whether the derived palette depends on this change.
    pub fn affects_palette(self) -> bool {
        !matches!(self, Change::Selection)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(Change)>;

/// The authoritative palette model: hues, steps, the saturation and lightness ranges, and the
/// selected hue.
///
/// Every mutation notifies the subscribers synchronously, in subscription order. Invalid input
/// is ignored without notifying anyone.
pub struct PaletteState {
    settings: Settings,
    selected: Option<HueId>,
    ids: Box<dyn IdAllocator>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl PaletteState {
    pub fn new(settings: Settings, ids: Box<dyn IdAllocator>) -> Self {
        let mut settings = settings;
        settings.steps = settings.steps.max(1);
        Self {
            settings,
            selected: None,
            ids,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_defaults(config: &GeneratorConfig, mut ids: Box<dyn IdAllocator>) -> Self {
        let settings = config.default_settings(ids.as_mut());
        Self::new(settings, ids)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hues(&self) -> &[Hue] {
        &self.settings.hues
    }

    pub fn steps(&self) -> u32 {
        self.settings.steps
    }

    pub fn min(&self) -> (f64, f64) {
        (self.settings.min_saturation, self.settings.min_lightness)
    }

    pub fn max(&self) -> (f64, f64) {
        (self.settings.max_saturation, self.settings.max_lightness)
    }

    pub fn ids(&mut self) -> &mut dyn IdAllocator {
        self.ids.as_mut()
    }

    pub fn find(&self, id: &HueId) -> Option<&Hue> {
        self.settings.hues.iter().find(|hue| &hue.id == id)
    }

    fn position(&self, id: &HueId) -> Option<usize> {
        self.settings.hues.iter().position(|hue| &hue.id == id)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Change) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(x, _)| *x != id);
    }

    fn notify(&mut self, change: Change) {
        log::debug!("state changed: {:?}", change);
        for (_, callback) in self.subscribers.iter_mut() {
            callback(change);
        }
    }

    /// Append a hue at 0°, with a fresh id, and select it.
    pub fn add_hue(&mut self) -> HueId {
        let id = loop {
            let id = self.ids.allocate();
            if self.position(&id).is_none() {
                break id;
            }
        };
        self.settings.hues.push(Hue::new(id.clone(), 0.0, None));
        self.notify(Change::Hues);
        self.select(Some(id.clone()));
        id
    }

    /// Move the hue at `from` to `to`, shifting the ones in between.
    pub fn move_hue(&mut self, from: usize, to: usize) {
        let len = self.settings.hues.len();
        if from == to || from >= len || to >= len {
            return;
        }
        let hue = self.settings.hues.remove(from);
        self.settings.hues.insert(to, hue);
        self.notify(Change::Hues);
    }

    /// Set the value of a hue from user input. Anything that does not parse to an integer in
    /// `[0, 360]` is ignored. Returns whether the hue was updated.
    pub fn update_hue(&mut self, id: &HueId, raw: &str) -> bool {
        let Some(value) = parse_int(raw) else {
            return false;
        };
        if !(0..=360).contains(&value) {
            return false;
        }
        self.set_hue_value(id, value as f64)
    }

    fn set_hue_value(&mut self, id: &HueId, value: f64) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        if self.settings.hues[i].value == value {
            return false;
        }
        self.settings.hues[i].value = value;
        self.notify(Change::Hues);
        true
    }

    /// Set the label of a hue. An empty name removes it.
    pub fn rename_hue(&mut self, id: &HueId, name: &str) {
        let Some(i) = self.position(id) else {
            return;
        };
        let name = Some(name.trim()).filter(|x| !x.is_empty()).map(String::from);
        if self.settings.hues[i].name != name {
            self.settings.hues[i].name = name;
            self.notify(Change::Hues);
        }
    }

    /// Remove a hue, unless it is the last one.
    pub fn delete_hue(&mut self, id: &HueId) -> bool {
        if self.settings.hues.len() <= 1 {
            return false;
        }
        let Some(i) = self.position(id) else {
            return false;
        };
        self.settings.hues.remove(i);
        self.notify(Change::Hues);
        if self.selected.as_ref() == Some(id) {
            self.select(None);
        }
        true
    }

    pub fn selected(&self) -> Option<&HueId> {
        self.selected.as_ref()
    }

    /// Select a hue by id. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<HueId>) {
        let id = id.filter(|id| self.position(id).is_some());
        if self.selected != id {
            self.selected = id;
            self.notify(Change::Selection);
        }
    }

    /// The hue shown by the hue circle: the selected hue's value, or 0 without a selection.
    pub fn hue_circle_hue(&self) -> f64 {
        self.selected
            .as_ref()
            .and_then(|id| self.find(id))
            .map_or(0.0, |hue| hue.value)
    }

    /// Write a hue picked on the circle into the selected hue, rounded to whole degrees.
    pub fn set_hue_circle_hue(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if let Some(id) = self.selected.clone() {
            self.set_hue_value(&id, (value + 0.5).floor());
        }
    }

    pub fn set_steps(&mut self, steps: u32) {
        if steps == 0 || steps == self.settings.steps {
            return;
        }
        self.settings.steps = steps;
        self.notify(Change::Steps);
    }

    pub fn set_saturation_range(&mut self, min: f64, max: f64) {
        if let (Some(min), Some(max)) = (unit(min), unit(max)) {
            let s = &mut self.settings;
            if (s.min_saturation, s.max_saturation) != (min, max) {
                s.min_saturation = min;
                s.max_saturation = max;
                self.notify(Change::Saturation);
            }
        }
    }

    pub fn set_lightness_range(&mut self, min: f64, max: f64) {
        if let (Some(min), Some(max)) = (unit(min), unit(max)) {
            let s = &mut self.settings;
            if (s.min_lightness, s.max_lightness) != (min, max) {
                s.min_lightness = min;
                s.max_lightness = max;
                self.notify(Change::Lightness);
            }
        }
    }

    /// Move the start point of the curve.
    pub fn set_min(&mut self, saturation: f64, lightness: f64) {
        let max_s = self.settings.max_saturation;
        let max_l = self.settings.max_lightness;
        self.set_saturation_range(saturation, max_s);
        self.set_lightness_range(lightness, max_l);
    }

    /// Move the end point of the curve.
    pub fn set_max(&mut self, saturation: f64, lightness: f64) {
        let min_s = self.settings.min_saturation;
        let min_l = self.settings.min_lightness;
        self.set_saturation_range(min_s, saturation);
        self.set_lightness_range(min_l, lightness);
    }

    /// Replace all settings at once. A settings without hues keeps the current hues.
    pub fn apply(&mut self, settings: Settings) {
        let mut settings = settings;
        if settings.hues.is_empty() {
            settings.hues = std::mem::take(&mut self.settings.hues);
        }
        settings.steps = settings.steps.max(1);
        self.settings = settings;
        // drops a selection whose hue is gone
        let selected = self.selected.clone();
        self.select(selected);
        self.notify(Change::Reset);
    }

    /// Restore the default palette, if the user confirms it.
    pub fn reset(&mut self, confirm: &mut dyn Confirm, config: &GeneratorConfig) -> bool {
        if !confirm.confirm(RESET_PROMPT) {
            return false;
        }
        let settings = config.default_settings(self.ids.as_mut());
        self.select(None);
        self.apply(settings);
        true
    }
}

fn unit(x: f64) -> Option<f64> {
    (!x.is_nan()).then(|| x.clamp(0.0, 1.0))
}

/// Parse the decimal integer at the start of `raw`, the way a browser's `parseInt(raw, 10)`
/// does: leading whitespace, an optional sign, then as many digits as there are. Trailing
/// garbage is ignored, so `"0x10"` is 0.
fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    let digits = &s[..end];
    if digits.is_empty() {
        return None;
    }
    // too many digits is out of range anyway
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::hue::SequentialIds;

    struct Answer(bool);
    impl Confirm for Answer {
        fn confirm(&mut self, _message: &str) -> bool {
            self.0
        }
    }

    fn state() -> PaletteState {
        PaletteState::with_defaults(&GeneratorConfig::default(), Box::new(SequentialIds::new()))
    }

    fn letters(state: &PaletteState) -> String {
        state
            .hues()
            .iter()
            .map(|hue| hue.name.clone().unwrap_or_default())
            .collect()
    }

    fn lettered() -> PaletteState {
        let mut ids = SequentialIds::new();
        let hues = "ABCDEF"
            .chars()
            .map(|c| Hue::new(ids.allocate(), 0.0, Some(c.to_string())))
            .collect();
        let settings = Settings {
            hues,
            ..GeneratorConfig::default().default_settings(&mut ids)
        };
        PaletteState::new(settings, Box::new(ids))
    }

    #[test]
    fn parse() {
        assert_eq!(parse_int("180"), Some(180));
        assert_eq!(parse_int("  42abc"), Some(42));
        assert_eq!(parse_int("-5"), Some(-5));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("3.9"), Some(3));
        assert_eq!(parse_int("0x1f"), Some(0));
        assert_eq!(parse_int("0X10"), Some(0));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn update_hue_ignores_invalid_input() {
        let mut state = state();
        let id = state.hues()[0].id.clone();
        assert!(!state.update_hue(&id, "400"));
        assert!(!state.update_hue(&id, "-5"));
        assert!(!state.update_hue(&id, "hello"));
        assert_eq!(state.hues()[0].value, 0.0);
        assert!(state.update_hue(&id, "180"));
        assert_eq!(state.hues()[0].value, 180.0);
        assert!(state.update_hue(&id, "0x2d"));
        assert_eq!(state.hues()[0].value, 0.0);
        assert!(state.update_hue(&id, "360"));
        assert_eq!(state.hues()[0].value, 360.0);
    }

    #[test]
    fn move_hue_is_stable() {
        let mut state = lettered();
        state.move_hue(1, 3);
        assert_eq!(letters(&state), "ACDBEF");

        let mut state = lettered();
        state.move_hue(3, 1);
        assert_eq!(letters(&state), "ADBCEF");

        state.move_hue(2, 2);
        state.move_hue(0, 6);
        state.move_hue(9, 0);
        assert_eq!(letters(&state), "ADBCEF");
    }

    #[test]
    fn last_hue_is_kept() {
        let mut state = state();
        let ids: Vec<HueId> = state.hues().iter().map(|hue| hue.id.clone()).collect();
        for id in &ids[1..] {
            assert!(state.delete_hue(id));
        }
        assert_eq!(state.hues().len(), 1);
        assert!(!state.delete_hue(&ids[0]));
        assert_eq!(state.hues().len(), 1);
    }

    #[test]
    fn add_hue_selects_it() {
        let mut state = state();
        let id = state.add_hue();
        assert_eq!(state.hues().len(), 13);
        assert_eq!(state.hues()[12].value, 0.0);
        assert_eq!(state.selected(), Some(&id));
        assert!(state.hues()[..12].iter().all(|hue| hue.id != id));
    }

    #[test]
    fn hue_circle_follows_selection() {
        let mut state = state();
        state.set_hue_circle_hue(100.0);
        assert_eq!(state.hue_circle_hue(), 0.0);

        let id = state.hues()[3].id.clone();
        state.select(Some(id.clone()));
        assert_eq!(state.hue_circle_hue(), 90.0);

        state.set_hue_circle_hue(123.5);
        assert_eq!(state.find(&id).unwrap().value, 124.0);
        assert_eq!(state.hue_circle_hue(), 124.0);

        state.update_hue(&id, "12");
        assert_eq!(state.hue_circle_hue(), 12.0);

        state.delete_hue(&id);
        assert_eq!(state.selected(), None);
        assert_eq!(state.hue_circle_hue(), 0.0);
    }

    #[test]
    fn ranges_are_clamped_and_may_cross() {
        let mut state = state();
        state.set_min(1.5, 0.9);
        state.set_max(0.2, -1.0);
        assert_eq!(state.min(), (1.0, 0.9));
        assert_eq!(state.max(), (0.2, 0.0));
        state.set_saturation_range(f64::NAN, 0.5);
        assert_eq!(state.max(), (0.2, 0.0));
    }

    #[test]
    fn notifications() {
        let mut state = state();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = state.subscribe({
            let log = log.clone();
            move |change| log.borrow_mut().push(change)
        });
        state.set_steps(5);
        state.set_steps(5);
        state.set_steps(0);
        let id = state.hues()[0].id.clone();
        state.update_hue(&id, "999");
        state.rename_hue(&id, "red");
        state.set_min(0.1, 0.2);
        assert_eq!(
            *log.borrow(),
            [Change::Steps, Change::Hues, Change::Saturation, Change::Lightness]
        );
        state.unsubscribe(sub);
        state.set_steps(6);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn reset_needs_confirmation() {
        let config = GeneratorConfig::default();
        let mut state = state();
        state.set_steps(3);
        let id = state.add_hue();
        assert!(!state.reset(&mut Answer(false), &config));
        assert_eq!(state.steps(), 3);
        assert!(state.reset(&mut Answer(true), &config));
        assert_eq!(state.steps(), 10);
        assert_eq!(state.hues().len(), 12);
        assert_eq!(state.selected(), None);
        assert!(state.find(&id).is_none());
    }

    #[test]
    fn reset_clears_selection_with_notification() {
        let config = GeneratorConfig::default();
        let mut state = state();
        let id = state.hues()[2].id.clone();
        state.select(Some(id));
        let log = Rc::new(RefCell::new(Vec::new()));
        state.subscribe({
            let log = log.clone();
            move |change| log.borrow_mut().push(change)
        });
        assert!(state.reset(&mut Answer(true), &config));
        assert_eq!(state.selected(), None);
        assert_eq!(*log.borrow(), [Change::Selection, Change::Reset]);
    }

    #[test]
    fn apply_drops_selection_of_missing_hue() {
        let mut state = state();
        let id = state.add_hue();
        let log = Rc::new(RefCell::new(Vec::new()));
        state.subscribe({
            let log = log.clone();
            move |change| log.borrow_mut().push(change)
        });
        let settings = GeneratorConfig::default().default_settings(&mut SequentialIds::new());
        state.apply(settings);
        assert_eq!(state.selected(), None);
        assert_eq!(*log.borrow(), [Change::Selection, Change::Reset]);
    }
}
