//! Shareable links: the palette settings as base64 encoded JSON in the URL fragment.
//!
//! The JSON has the form `{"h":[0,[30,"apricot"]],"st":10,"s1":0.8,"s2":1,"l1":0.08,"l2":0.954}`,
//! where unnamed hues are a bare number and named hues a `[value, name]` pair.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    hue::{Hue, IdAllocator},
    state::Settings,
};

#[derive(Debug, thiserror::Error)]
pub enum PermalinkError {
    #[error("permalink is empty")]
    Empty,
    #[error("permalink is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("permalink is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid permalink: {0}")]
    Schema(String),
}

/// The settings carried by a permalink. Hue ids are not part of it.
#[derive(Clone, Debug, PartialEq)]
pub struct PermalinkState {
    pub hues: Vec<(f64, Option<String>)>,
    pub steps: u32,
    pub min_saturation: f64,
    pub max_saturation: f64,
    pub min_lightness: f64,
    pub max_lightness: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireHue {
    Plain(f64),
    Named(f64, String),
}

#[derive(Deserialize)]
struct Wire {
    h: Vec<WireHue>,
    st: f64,
    s1: f64,
    s2: f64,
    l1: f64,
    l2: f64,
}

/// Whole numbers are written without a fractional part, like `30` instead of `30.0`.
fn number(x: f64) -> Value {
    if x.fract() == 0.0 && x.abs() < 9_007_199_254_740_992.0 {
        Value::from(x as i64)
    } else {
        Value::from(x)
    }
}

impl PermalinkState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            hues: settings
                .hues
                .iter()
                .map(|hue| {
                    let name = hue.name.clone().filter(|name| !name.is_empty());
                    (hue.value, name)
                })
                .collect(),
            steps: settings.steps,
            min_saturation: settings.min_saturation,
            max_saturation: settings.max_saturation,
            min_lightness: settings.min_lightness,
            max_lightness: settings.max_lightness,
        }
    }

    /// Build settings out of the permalink, giving each hue a fresh id.
    pub fn into_settings(self, ids: &mut dyn IdAllocator) -> Settings {
        Settings {
            hues: self
                .hues
                .into_iter()
                .map(|(value, name)| Hue::new(ids.allocate(), value, name))
                .collect(),
            steps: self.steps,
            min_saturation: self.min_saturation,
            max_saturation: self.max_saturation,
            min_lightness: self.min_lightness,
            max_lightness: self.max_lightness,
        }
    }

    pub fn to_json(&self) -> String {
        let hues = self
            .hues
            .iter()
            .map(|(value, name)| match name {
                Some(name) => Value::Array(vec![number(*value), Value::from(name.as_str())]),
                None => number(*value),
            })
            .collect();

        let mut map = Map::new();
        map.insert("h".into(), Value::Array(hues));
        map.insert("st".into(), Value::from(self.steps));
        map.insert("s1".into(), number(self.min_saturation));
        map.insert("s2".into(), number(self.max_saturation));
        map.insert("l1".into(), number(self.min_lightness));
        map.insert("l2".into(), number(self.max_lightness));
        Value::Object(map).to_string()
    }

    /// The URL fragment, without the `#`.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_json())
    }

    /// Parse a fragment, with or without `#`, or a whole URL containing one.
    ///
    /// Both the standard and the URL-safe base64 alphabets are accepted, padded or not, and with
    /// `+`, `/` and `=` possibly percent-escaped.
    pub fn decode(fragment: &str) -> Result<Self, PermalinkError> {
        let fragment = fragment
            .split_once('#')
            .map_or(fragment, |(_, hash)| hash)
            .trim();
        let fragment = percent_unescape(fragment);
        let fragment: String = fragment
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                c => c,
            })
            .collect();
        if fragment.is_empty() {
            return Err(PermalinkError::Empty);
        }

        let bytes = URL_SAFE_NO_PAD.decode(fragment)?;
        let wire: Wire = serde_json::from_slice(&bytes)?;
        Self::validate(wire)
    }

    fn validate(wire: Wire) -> Result<Self, PermalinkError> {
        let schema = |msg: String| Err(PermalinkError::Schema(msg));

        if wire.h.is_empty() {
            return schema("no hues".into());
        }
        let mut hues = Vec::with_capacity(wire.h.len());
        for hue in wire.h {
            let (value, name) = match hue {
                WireHue::Plain(value) => (value, None),
                WireHue::Named(value, name) => (value, Some(name).filter(|x| !x.is_empty())),
            };
            if !(0.0..=360.0).contains(&value) {
                return schema(format!("hue {} is out of range", value));
            }
            hues.push((value, name));
        }

        if !(wire.st >= 1.0 && wire.st <= u32::MAX as f64 && wire.st.fract() == 0.0) {
            return schema(format!("steps {} is not a positive integer", wire.st));
        }

        for (key, x) in [("s1", wire.s1), ("s2", wire.s2), ("l1", wire.l1), ("l2", wire.l2)] {
            if !(0.0..=1.0).contains(&x) {
                return schema(format!("{} {} is out of range", key, x));
            }
        }

        Ok(Self {
            hues,
            steps: wire.st as u32,
            min_saturation: wire.s1,
            max_saturation: wire.s2,
            min_lightness: wire.l1,
            max_lightness: wire.l2,
        })
    }
}

fn percent_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        let escaped = match rest.get(i + 1..i + 3) {
            Some(code) if code.eq_ignore_ascii_case("2B") => Some('+'),
            Some(code) if code.eq_ignore_ascii_case("2F") => Some('/'),
            Some(code) if code.eq_ignore_ascii_case("3D") => Some('='),
            _ => None,
        };
        match escaped {
            Some(c) => {
                out.push(c);
                rest = &rest[i + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[i + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `base_url` with its fragment replaced by the permalink of `settings`.
pub fn permalink(base_url: &str, settings: &Settings) -> String {
    let base = base_url.split('#').next().unwrap_or_default();
    format!(
        "{}#{}",
        base,
        PermalinkState::from_settings(settings).encode()
    )
}
