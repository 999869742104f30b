//! Live-updatable settings shared between a component and its owner.
//!
//! Readers take cheap `Arc` snapshots through `ArcSwap`; writers replace the
//! whole value. A snapshot taken before an update keeps seeing the old value.

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a value that can be swapped at runtime.
pub struct DynamicConfig<T> {
    inner: Arc<ArcSwap<T>>,
}

impl<T> Clone for DynamicConfig<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynamicConfig").field(&self.inner.load()).finish()
    }
}

impl<T> DynamicConfig<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Arc::new(ArcSwap::from_pointee(value)) }
    }

    /// Snapshot the current value.
    pub fn get(&self) -> Arc<T> {
        self.inner.load_full()
    }

    /// Replace the value entirely.
    pub fn set(&self, value: T) {
        self.inner.store(Arc::new(value));
    }

    /// Derive the next value from the current one.
    ///
    /// Not atomic with respect to concurrent writers: the last store wins.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.inner.load_full();
        self.inner.store(Arc::new(f(&current)));
    }
}
