use std::fmt;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The twelve hues a palette starts with, 30° apart.
pub const DEFAULT_HUES: [(f64, &str); 12] = [
    (0.0, "rose"),
    (30.0, "apricot"),
    (60.0, "orange"),
    (90.0, "amber"),
    (120.0, "lime"),
    (150.0, "emerald"),
    (180.0, "teal"),
    (210.0, "cyan"),
    (240.0, "ocean"),
    (270.0, "blue"),
    (300.0, "purple"),
    (330.0, "magenta"),
];

/// Identifies a hue within a palette. Stable while the hue is edited.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HueId(String);

impl HueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh hue identifiers.
pub trait IdAllocator {
    fn allocate(&mut self) -> HueId;
}

/// Allocates `h1`, `h2`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdAllocator for SequentialIds {
    fn allocate(&mut self) -> HueId {
        self.last += 1;
        HueId(format!("h{}", self.last))
    }
}

/// Allocates random 13 character base-36 identifiers, for palettes that outlive the process.
pub struct RandomIds<R = SmallRng> {
    rng: R,
}

impl RandomIds {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> IdAllocator for RandomIds<R> {
    fn allocate(&mut self) -> HueId {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let id = (0..13)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        HueId(id)
    }
}

/// A hue of the palette, in degrees, with an optional label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hue {
    pub id: HueId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: f64,
}

impl Hue {
    pub fn new(id: HueId, value: f64, name: Option<String>) -> Self {
        Self { id, name, value }
    }

    /// The name used in exports: the label, or `h<value>` for unnamed hues.
    pub fn label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("h{}", self.value),
        }
    }
}

pub fn default_hues(ids: &mut dyn IdAllocator) -> Vec<Hue> {
    DEFAULT_HUES
        .iter()
        .map(|&(value, name)| Hue::new(ids.allocate(), value, Some(name.to_string())))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sequential() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.allocate().as_str(), "h1");
        assert_eq!(ids.allocate().as_str(), "h2");
    }

    #[test]
    fn random_ids_are_base36() {
        let mut ids = RandomIds::seeded(3);
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 13);
        assert!(a
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn label_fallback() {
        let mut hue = Hue::new(HueId::new("x"), 42.0, None);
        assert_eq!(hue.label(), "h42");
        hue.name = Some(String::new());
        assert_eq!(hue.label(), "h42");
        hue.name = Some("sand".into());
        assert_eq!(hue.label(), "sand");
        hue.value = 42.5;
        hue.name = None;
        assert_eq!(hue.label(), "h42.5");
    }

    #[test]
    fn persisted_form() {
        let hue = Hue::new(HueId::new("abc"), 30.0, None);
        let json = serde_json::to_string(&hue).unwrap();
        assert_eq!(json, r#"{"id":"abc","value":30.0}"#);
        let back: Hue = serde_json::from_str(r#"{"id":"abc","value":30}"#).unwrap();
        assert_eq!(back, hue);
    }
}
