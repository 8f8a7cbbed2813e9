//! Persistence of the palette settings in a key/value store, one JSON value per field.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::GeneratorConfig,
    hue::{Hue, IdAllocator},
    state::{Change, Settings},
};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// A store in memory. Clones share the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }
}

/// A store backed by a single JSON object in a file, written back on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: serde_json::Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => serde_json::Map::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        if let Err(err) = self.save() {
            log::error!("failed to save {}: {}", self.path.display(), err);
        }
    }
}

/// A persisted field of [`Settings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Hues,
    Steps,
    MinSaturation,
    MaxSaturation,
    MinLightness,
    MaxLightness,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Hues,
        Field::Steps,
        Field::MinSaturation,
        Field::MaxSaturation,
        Field::MinLightness,
        Field::MaxLightness,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Hues => "_x_hues",
            Field::Steps => "_x_steps",
            Field::MinSaturation => "_x_min-saturation",
            Field::MaxSaturation => "_x_max-saturation",
            Field::MinLightness => "_x_min-lightness",
            Field::MaxLightness => "_x_max-lightness",
        }
    }

    /// The fields touched by a change.
    pub fn changed_by(change: Change) -> &'static [Field] {
        match change {
            Change::Hues => &[Field::Hues],
            Change::Steps => &[Field::Steps],
            Change::Saturation => &[Field::MinSaturation, Field::MaxSaturation],
            Change::Lightness => &[Field::MinLightness, Field::MaxLightness],
            Change::Selection => &[],
            Change::Reset => &Field::ALL,
        }
    }

    fn value(self, settings: &Settings) -> Value {
        match self {
            Field::Hues => serde_json::to_value(&settings.hues).unwrap_or(Value::Null),
            Field::Steps => settings.steps.into(),
            Field::MinSaturation => settings.min_saturation.into(),
            Field::MaxSaturation => settings.max_saturation.into(),
            Field::MinLightness => settings.min_lightness.into(),
            Field::MaxLightness => settings.max_lightness.into(),
        }
    }
}

fn read<T: DeserializeOwned>(store: &dyn KeyValueStore, field: Field) -> Option<T> {
    let value = store.get(field.key())?;
    match serde_json::from_value(value) {
        Ok(x) => Some(x),
        Err(err) => {
            log::warn!("ignoring stored {}: {}", field.key(), err);
            None
        }
    }
}

fn read_unit(store: &dyn KeyValueStore, field: Field, default: f64) -> f64 {
    match read::<f64>(store, field) {
        Some(x) if (0.0..=1.0).contains(&x) => x,
        Some(x) => {
            log::warn!("ignoring stored {}: {} is out of range", field.key(), x);
            default
        }
        None => default,
    }
}

/// Read the settings from the store, each missing or invalid field taking its default.
pub fn load_settings(
    store: &dyn KeyValueStore,
    config: &GeneratorConfig,
    ids: &mut dyn IdAllocator,
) -> Settings {
    let defaults = config.default_settings(ids);
    let hues = match read::<Vec<Hue>>(store, Field::Hues) {
        Some(hues) => match check_hues(&hues) {
            Ok(()) => hues,
            Err(reason) => {
                log::warn!("ignoring stored {}: {}", Field::Hues.key(), reason);
                defaults.hues
            }
        },
        None => defaults.hues,
    };
    let steps = match read::<u32>(store, Field::Steps) {
        Some(steps) if steps >= 1 => steps,
        _ => defaults.steps,
    };
    Settings {
        hues,
        steps,
        min_saturation: read_unit(store, Field::MinSaturation, defaults.min_saturation),
        max_saturation: read_unit(store, Field::MaxSaturation, defaults.max_saturation),
        min_lightness: read_unit(store, Field::MinLightness, defaults.min_lightness),
        max_lightness: read_unit(store, Field::MaxLightness, defaults.max_lightness),
    }
}

fn check_hues(hues: &[Hue]) -> Result<(), String> {
    if hues.is_empty() {
        return Err("no hues".to_string());
    }
    let mut seen = HashSet::new();
    for hue in hues {
        if !seen.insert(&hue.id) {
            return Err(format!("hue id {} is repeated", hue.id));
        }
        if !hue.value.is_finite() || !(0.0..=360.0).contains(&hue.value) {
            return Err(format!("hue {} is out of range", hue.value));
        }
    }
    Ok(())
}

pub fn save_field(store: &mut dyn KeyValueStore, settings: &Settings, field: Field) {
    log::trace!("saving {}", field.key());
    store.set(field.key(), field.value(settings));
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::hue::SequentialIds;

    #[test]
    fn empty_store_loads_defaults() {
        let config = GeneratorConfig::default();
        let settings = load_settings(&MemoryStore::new(), &config, &mut SequentialIds::new());
        assert_eq!(settings, config.default_settings(&mut SequentialIds::new()));
    }

    #[test]
    fn bad_fields_fall_back() {
        let mut store = MemoryStore::new();
        store.set("_x_hues", json!([]));
        store.set("_x_steps", json!("ten"));
        store.set("_x_min-saturation", json!(0.25));
        store.set("_x_max-lightness", json!(7));
        let settings = load_settings(
            &store,
            &GeneratorConfig::default(),
            &mut SequentialIds::new(),
        );
        assert_eq!(settings.hues.len(), 12);
        assert_eq!(settings.steps, 10);
        assert_eq!(settings.min_saturation, 0.25);
        assert_eq!(settings.max_lightness, 0.954);
    }

    #[test]
    fn broken_hues_fall_back() {
        let load = |hues: Value| {
            let mut store = MemoryStore::new();
            store.set("_x_hues", hues);
            load_settings(&store, &GeneratorConfig::default(), &mut SequentialIds::new()).hues
        };
        let defaults = GeneratorConfig::default()
            .default_settings(&mut SequentialIds::new())
            .hues;

        let repeated = json!([{ "id": "a", "value": 10 }, { "id": "a", "value": 20 }]);
        assert_eq!(load(repeated), defaults);
        let out_of_range = json!([{ "id": "a", "value": 10 }, { "id": "b", "value": 9999 }]);
        assert_eq!(load(out_of_range), defaults);
        let negative = json!([{ "id": "a", "value": -1 }]);
        assert_eq!(load(negative), defaults);

        let good = load(json!([{ "id": "a", "value": 0 }, { "id": "b", "value": 360 }]));
        assert_eq!(good.len(), 2);
        assert_eq!(good[1].value, 360.0);
    }

    #[test]
    fn save_and_load() {
        let config = GeneratorConfig::default();
        let mut settings = config.default_settings(&mut SequentialIds::new());
        settings.steps = 4;
        settings.hues.truncate(2);
        settings.hues[1].name = None;

        let mut store = MemoryStore::new();
        for field in Field::ALL {
            save_field(&mut store, &settings, field);
        }
        assert_eq!(store.len(), 6);
        assert_eq!(store.get("_x_steps"), Some(json!(4)));

        let loaded = load_settings(&store, &config, &mut SequentialIds::new());
        assert_eq!(loaded, settings);
    }

    #[test]
    fn file_store() {
        let path = std::env::temp_dir().join(format!("palette-store-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("_x_steps"), None);
        store.set("_x_steps", json!(7));

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("_x_steps"), Some(json!(7)));
        std::fs::remove_file(&path).unwrap();
    }
}
