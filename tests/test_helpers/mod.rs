//! Scoped process-environment overrides for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Restores overridden variables when dropped.
///
/// Holds a process-wide lock so overrides from concurrent tests never
/// interleave.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Applies `overrides`; `None` removes the variable.
    pub fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved = overrides
            .iter()
            .map(|(key, value)| {
                let previous = env::var(key).ok();
                write_var(key, *value);
                ((*key).to_owned(), previous)
            })
            .collect();
        Self { saved, _lock: lock }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            write_var(&key, previous.as_deref());
        }
    }
}

fn write_var(key: &str, value: Option<&str>) {
    unsafe {
        // SAFETY: ENV_MUTEX serializes every environment mutation in tests.
        match value {
            Some(text) => env::set_var(key, text),
            None => env::remove_var(key),
        }
    }
}
