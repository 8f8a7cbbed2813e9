//! Palette generation over the okHsl color model.
//!
//! A palette is a list of hues, each expanded into `steps` colors by walking a straight line
//! between two (saturation, lightness) endpoints. [`PaletteGenerator`] ties the model to its
//! collaborators: persistence, the permalink in the location hash, the clipboard and
//! notifications.

pub mod color;
pub mod config;
pub mod export;
pub mod generator;
pub mod host;
pub mod hue;
pub mod palette;
pub mod permalink;
pub mod schedule;
pub mod state;
pub mod store;

pub use config::GeneratorConfig;
pub use export::{export, ExportFormat, UnknownFormat};
pub use generator::PaletteGenerator;
pub use host::{
    Clipboard, ClipboardError, Confirm, Location, MemoryLocation, Notifier, Services, Toast, ToastKind,
};
pub use hue::{Hue, HueId, IdAllocator, RandomIds, SequentialIds};
pub use palette::{compute_palette, DerivedPalette, PaletteColor};
pub use permalink::{permalink, PermalinkError, PermalinkState};
pub use schedule::{Debounce, FrameBudget, FrameRequest};
pub use state::{Change, PaletteState, Settings, SubscriptionId};
pub use store::{Field, JsonFileStore, KeyValueStore, MemoryStore, StoreError};
