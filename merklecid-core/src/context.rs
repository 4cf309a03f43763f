//! Observability capability handed to call sites that log
//!
//! Hashing functions never take a context. Command handlers receive one, fork
//! it per unit of work and log through it, so every event carries the
//! hierarchical name and location of the work that produced it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Span};

/// Leveled logging, hierarchical naming and key/value lookup
pub trait Context: Send + Sync {
    /// Dot-separated name, e.g. `cli.hash.2`
    fn name(&self) -> &str;

    /// Slash-separated location chain, e.g. `hash/manifest`
    fn location(&self) -> &str;

    /// Copy for a new unit of work, named with the next sequence number
    fn fork(&self) -> Self
    where
        Self: Sized;

    /// Copy with `name` appended to the hierarchical name
    fn fork_named(&self, name: &str) -> Self
    where
        Self: Sized;

    /// Copy with `location` appended to the location chain
    fn at(&self, location: &str) -> Self
    where
        Self: Sized;

    /// Copy carrying an extra key/value pair
    fn with_value(&self, key: &str, value: &str) -> Self
    where
        Self: Sized;

    /// Look up a value set on this context or an ancestor
    fn get(&self, key: &str) -> Option<&str>;

    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// [`Context`] backed by `tracing` events
#[derive(Debug, Clone)]
pub struct TracingContext {
    name: String,
    location: String,
    values: BTreeMap<String, String>,
    /// Sequence for unnamed forks; shared by clones, fresh for each fork
    tracker: Arc<AtomicU64>,
}

impl TracingContext {
    /// Root context with the given name
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: String::new(),
            values: BTreeMap::new(),
            tracker: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A span tagged with this context, for instrumenting async work
    pub fn span(&self) -> Span {
        tracing::info_span!("work", ctx = %self.name, location = %self.location)
    }

    fn derive(&self, name: Option<&str>, location: Option<&str>) -> Self {
        Self {
            name: join(&self.name, name, '.'),
            location: join(&self.location, location, '/'),
            values: self.values.clone(),
            tracker: Arc::new(AtomicU64::new(0)),
        }
    }
}

fn join(base: &str, part: Option<&str>, sep: char) -> String {
    match part {
        Some(p) if !p.is_empty() && !base.is_empty() => format!("{}{}{}", base, sep, p),
        Some(p) if !p.is_empty() => p.to_string(),
        _ => base.to_string(),
    }
}

impl Default for TracingContext {
    fn default() -> Self {
        Self::named("")
    }
}

impl Context for TracingContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn fork(&self) -> Self {
        let seq = self.tracker.fetch_add(1, Ordering::Relaxed) + 1;
        self.derive(Some(&seq.to_string()), None)
    }

    fn fork_named(&self, name: &str) -> Self {
        self.derive(Some(name), None)
    }

    fn at(&self, location: &str) -> Self {
        let mut ctx = self.derive(None, Some(location));
        // Moving location keeps the fork sequence of the same unit of work
        ctx.tracker = Arc::clone(&self.tracker);
        ctx
    }

    fn with_value(&self, key: &str, value: &str) -> Self {
        let mut ctx = self.clone();
        ctx.values.insert(key.to_string(), value.to_string());
        ctx
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn debug(&self, msg: &str) {
        debug!(ctx = %self.name, location = %self.location, "{}", msg);
    }

    fn info(&self, msg: &str) {
        info!(ctx = %self.name, location = %self.location, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        warn!(ctx = %self.name, location = %self.location, "{}", msg);
    }

    fn error(&self, msg: &str) {
        error!(ctx = %self.name, location = %self.location, "{}", msg);
    }
}
