//! Format registry: namespaced format identifier to validator.
//!
//! A [`FormatRegistry`] is filled once at startup and then shared read-only,
//! usually behind an `Arc`. Lookups need no locking. Deployments that load
//! format plugins after startup use a [`SharedFormatRegistry`], which swaps
//! in a new immutable snapshot on every registration so readers never see a
//! half-updated mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::formats;
use crate::plugin::FormatValidator;

/// Mapping from format identifier to its validator.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    validators: HashMap<String, Arc<dyn FormatValidator>>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in Indy and DIF validators.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        formats::register_defaults(&mut registry);
        registry
    }

    /// Registers `validator` for `format`, replacing any previous one.
    pub fn register(&mut self, format: impl Into<String>, validator: impl FormatValidator + 'static) {
        self.register_arc(format, Arc::new(validator));
    }

    /// Registers an already shared validator.
    pub fn register_arc(&mut self, format: impl Into<String>, validator: Arc<dyn FormatValidator>) {
        let format = format.into();
        if self.validators.insert(format.clone(), validator).is_some() {
            debug!("Replaced validator for format: {format}");
        } else {
            info!("Registered validator for format: {format}");
        }
    }

    /// Returns the validator registered for `format`.
    #[must_use]
    pub fn lookup(&self, format: &str) -> Option<&dyn FormatValidator> {
        self.validators.get(format).map(|validator| validator.as_ref())
    }

    /// Whether `format` has a registered validator.
    #[must_use]
    pub fn is_known(&self, format: &str) -> bool {
        self.validators.contains_key(format)
    }

    /// Registered format identifiers, in no particular order.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    /// Number of registered formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no format is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.formats().collect();
        formats.sort_unstable();
        f.debug_struct("FormatRegistry")
            .field("formats", &formats)
            .finish()
    }
}

/// A registry that accepts registrations while readers are active.
///
/// Readers take a [`snapshot`](Self::snapshot) and validate against it for as
/// long as they need; writers copy the current mapping, extend it and swap it
/// in under a short write lock.
#[derive(Debug, Default)]
pub struct SharedFormatRegistry {
    current: RwLock<Arc<FormatRegistry>>,
}

impl SharedFormatRegistry {
    /// Wraps an initial registry.
    #[must_use]
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// The registry as of now. Later registrations do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FormatRegistry> {
        Arc::clone(&self.current.read())
    }

    /// Publishes a new snapshot that also holds `validator` for `format`.
    pub fn register(&self, format: impl Into<String>, validator: impl FormatValidator + 'static) {
        let validator: Arc<dyn FormatValidator> = Arc::new(validator);
        let mut current = self.current.write();
        let mut next = FormatRegistry::clone(&current);
        next.register_arc(format, validator);
        *current = Arc::new(next);
    }
}
