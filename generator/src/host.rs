//! The collaborators a [`crate::PaletteGenerator`] talks to, supplied by the host.

use std::{cell::RefCell, rc::Rc};

use crate::store::KeyValueStore;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard write was denied: {0}")]
    Denied(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Shows transient, non-blocking feedback.
pub trait Notifier {
    fn notify(&mut self, toast: Toast);
}

/// A yes/no gate before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// The address the palette is shared through.
pub trait Location {
    fn href(&self) -> String;

    /// Replace the current address, without navigating.
    fn replace(&mut self, href: String);

    /// The fragment, without the `#`.
    fn hash(&self) -> Option<String> {
        let href = self.href();
        let (_, hash) = href.split_once('#')?;
        (!hash.is_empty()).then(|| hash.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastKind {
    #[default]
    Default,
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub description: Option<String>,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Default,
            description: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ToastKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ToastKind::Error)
    }

    pub fn with_kind(mut self, kind: ToastKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }
}

/// A location that lives in memory. Clones share the same address.
#[derive(Clone, Debug, Default)]
pub struct MemoryLocation {
    href: Rc<RefCell<String>>,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Rc::new(RefCell::new(href.into())),
        }
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> String {
        self.href.borrow().clone()
    }

    fn replace(&mut self, href: String) {
        *self.href.borrow_mut() = href;
    }
}

/// Everything the generator needs from its host.
pub struct Services {
    pub store: Box<dyn KeyValueStore>,
    pub clipboard: Box<dyn Clipboard>,
    pub notifier: Box<dyn Notifier>,
    pub confirm: Box<dyn Confirm>,
    pub location: Box<dyn Location>,
}
