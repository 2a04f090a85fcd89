//! Event subscription registry.
//!
//! Maps event keys to handlers. Every binding belongs to an [`ObserverId`],
//! which stands for one subscriber lifetime: detaching an observer removes all
//! of its bindings in one call, so a torn-down view never leaves a handler
//! behind.
//!
//! Binding the same `(key, observer)` pair twice replaces the earlier handler.
//! A single observer therefore never sees an event twice. Handlers of
//! different observers for the same key are returned in registration order.

use std::fmt;

/// Identity of one subscriber lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Raw id.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Binding<K, H> {
    key: K,
    observer: ObserverId,
    handler: H,
}

/// Registry of `(key, observer) -> handler` bindings.
#[derive(Debug, Clone)]
pub struct Registry<K, H> {
    bindings: Vec<Binding<K, H>>,
    next_observer: u64,
}

impl<K, H> Default for Registry<K, H> {
    fn default() -> Self {
        Self { bindings: Vec::new(), next_observer: 0 }
    }
}

impl<K: PartialEq, H> Registry<K, H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh observer lifetime.
    pub fn observer(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer = self.next_observer.wrapping_add(1);
        id
    }

    /// Bind `handler` to `key` for `observer`.
    ///
    /// Returns the handler it replaced, if the pair was already bound.
    pub fn bind(&mut self, key: K, observer: ObserverId, handler: H) -> Option<H> {
        if let Some(existing) =
            self.bindings.iter_mut().find(|b| b.key == key && b.observer == observer)
        {
            return Some(std::mem::replace(&mut existing.handler, handler));
        }

        self.bindings.push(Binding { key, observer, handler });
        None
    }

    /// Remove a single binding. Returns the removed handler.
    pub fn unbind(&mut self, key: &K, observer: ObserverId) -> Option<H> {
        let index = self.bindings.iter().position(|b| &b.key == key && b.observer == observer)?;
        Some(self.bindings.remove(index).handler)
    }

    /// Remove every binding held by `observer`. Returns how many were removed.
    pub fn detach(&mut self, observer: ObserverId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.observer != observer);
        before - self.bindings.len()
    }

    /// Handlers bound to `key`, in registration order.
    pub fn handlers<'a>(&'a self, key: &'a K) -> impl Iterator<Item = &'a H> + 'a {
        self.bindings.iter().filter(move |b| &b.key == key).map(|b| &b.handler)
    }

    /// True if `observer` has a handler for `key`.
    pub fn is_bound(&self, key: &K, observer: ObserverId) -> bool {
        self.bindings.iter().any(|b| &b.key == key && b.observer == observer)
    }

    /// Number of bindings held by `observer`.
    pub fn bindings_of(&self, observer: ObserverId) -> usize {
        self.bindings.iter().filter(|b| b.observer == observer).count()
    }

    /// Total number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_replaces_handler() {
        let mut registry: Registry<&str, u32> = Registry::new();
        let view = registry.observer();

        assert_eq!(registry.bind("receive_message", view, 1), None);
        assert_eq!(registry.bind("receive_message", view, 2), Some(1));

        let handlers: Vec<_> = registry.handlers(&"receive_message").copied().collect();
        assert_eq!(handlers, vec![2]);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut registry: Registry<&str, &str> = Registry::new();
        let first = registry.observer();
        let second = registry.observer();

        registry.bind("user_list", second, "b");
        registry.bind("user_list", first, "a");

        let handlers: Vec<_> = registry.handlers(&"user_list").copied().collect();
        assert_eq!(handlers, vec!["b", "a"]);
    }

    #[test]
    fn detach_removes_only_that_observer() {
        let mut registry: Registry<&str, u8> = Registry::new();
        let view = registry.observer();
        let other = registry.observer();

        registry.bind("connect", view, 0);
        registry.bind("disconnect", view, 0);
        registry.bind("connect", other, 1);

        assert_eq!(registry.detach(view), 2);
        assert_eq!(registry.bindings_of(view), 0);
        assert!(registry.is_bound(&"connect", other));
        assert_eq!(registry.detach(view), 0);
    }

    #[test]
    fn unbind_single_key() {
        let mut registry: Registry<&str, u8> = Registry::new();
        let view = registry.observer();
        registry.bind("connect", view, 7);

        assert_eq!(registry.unbind(&"connect", view), Some(7));
        assert_eq!(registry.unbind(&"connect", view), None);
        assert!(registry.is_empty());
    }
}
