//! Text exports of a derived palette, for the clipboard.
//!
//! Steps are numbered from 1 and listed in reverse of the order they are computed in.

use std::{fmt, str::FromStr};

use serde_json::{Map, Value};

use crate::{hue::Hue, palette::DerivedPalette};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Custom properties inside `:root`.
    Css,
    /// `--color-*` custom properties, to paste inside a TailwindCSS `@theme`.
    Tailwind,
    /// `{"name": {"1": color}}`
    Json,
    /// `{"name": [color]}`
    JsonArrays,
    /// `{"name-1": color}`
    JsonFlat,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown export format '{0}', expected one of css, tailwind, json, json-arrays, json-flat")]
pub struct UnknownFormat(String);

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Css,
        ExportFormat::Tailwind,
        ExportFormat::Json,
        ExportFormat::JsonArrays,
        ExportFormat::JsonFlat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Css => "css",
            ExportFormat::Tailwind => "tailwind",
            ExportFormat::Json => "json",
            ExportFormat::JsonArrays => "json-arrays",
            ExportFormat::JsonFlat => "json-flat",
        }
    }

    pub fn toast_message(self) -> &'static str {
        match self {
            ExportFormat::Css => "Copied palette to clipboard as CSS variables",
            ExportFormat::Tailwind => "Copied palette to clipboard as TailwindCSS colors",
            ExportFormat::Json => "Copied palette to clipboard as JSON",
            ExportFormat::JsonArrays => "Copied palette to clipboard as JSON arrays",
            ExportFormat::JsonFlat => "Copied palette to clipboard as flat JSON",
        }
    }

    pub fn toast_description(self) -> Option<&'static str> {
        match self {
            ExportFormat::Tailwind => Some("Paste inside TailwindCSS @theme {} to use"),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Every hue's name with its colors as `(step, css)`, steps reversed and counted from 1.
fn entries<'a>(palette: &'a DerivedPalette, hues: &[Hue]) -> Vec<(String, Vec<(usize, &'a str)>)> {
    palette
        .swatches()
        .iter()
        .zip(hues)
        .map(|(swatch, hue)| {
            let colors = swatch
                .iter()
                .rev()
                .enumerate()
                .map(|(j, color)| (j + 1, color.css.as_str()))
                .collect();
            (hue.label(), colors)
        })
        .collect()
}

pub fn export(palette: &DerivedPalette, hues: &[Hue], format: ExportFormat) -> String {
    match format {
        ExportFormat::Css | ExportFormat::Tailwind => {
            let prefix = if format == ExportFormat::Css {
                "--"
            } else {
                "--color-"
            };
            let lines: Vec<String> = entries(palette, hues)
                .into_iter()
                .flat_map(|(name, colors)| {
                    colors
                        .into_iter()
                        .map(move |(j, css)| format!("  {}{}-{}: {};", prefix, name, j, css))
                })
                .collect();
            if format == ExportFormat::Css {
                format!(":root {{\n{}\n}}", lines.join("\n"))
            } else {
                lines.join("\n")
            }
        }
        ExportFormat::Json => {
            let map: Map<String, Value> = entries(palette, hues)
                .into_iter()
                .map(|(name, colors)| {
                    let steps = colors
                        .into_iter()
                        .map(|(j, css)| (j.to_string(), Value::from(css)))
                        .collect();
                    (name, Value::Object(steps))
                })
                .collect();
            Value::Object(map).to_string()
        }
        ExportFormat::JsonArrays => {
            let map: Map<String, Value> = entries(palette, hues)
                .into_iter()
                .map(|(name, colors)| {
                    let steps = colors.into_iter().map(|(_, css)| Value::from(css)).collect();
                    (name, Value::Array(steps))
                })
                .collect();
            Value::Object(map).to_string()
        }
        ExportFormat::JsonFlat => {
            let map: Map<String, Value> = entries(palette, hues)
                .into_iter()
                .flat_map(|(name, colors)| {
                    colors
                        .into_iter()
                        .map(move |(j, css)| (format!("{}-{}", name, j), Value::from(css)))
                })
                .collect();
            Value::Object(map).to_string()
        }
    }
}
