//! External services for the store.
//!
//! Services provide external dependencies (like time) to the store
//! without coupling it to specific implementations.

use chrono::{DateTime, Utc};
#[cfg(test)]
use chrono::Duration;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Services injected into the store for command handling.
#[derive(Debug, Clone, Default)]
pub struct StoreServices {
    pub clock: StoreClock,
}

/// Clock service for timestamp generation.
///
/// `Manual` holds a shared instant that only moves when advanced, which keeps
/// derived dates exact in tests.
#[derive(Debug, Clone, Default)]
pub enum StoreClock {
    #[default]
    System,
    #[cfg(test)]
    Manual(Arc<Mutex<DateTime<Utc>>>),
}

impl StoreClock {
    #[cfg(test)]
    pub fn manual(start: DateTime<Utc>) -> Self {
        Self::Manual(Arc::new(Mutex::new(start)))
    }

    /// Returns the current UTC timestamp.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            StoreClock::System => Utc::now(),
            #[cfg(test)]
            StoreClock::Manual(instant) => *instant.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    /// Moves a manual clock forward. No-op for the system clock.
    #[cfg(test)]
    pub fn advance(&self, by: Duration) {
        if let StoreClock::Manual(instant) = self {
            let mut guard = instant.lock().unwrap_or_else(|e| e.into_inner());
            *guard += by;
        }
    }
}
