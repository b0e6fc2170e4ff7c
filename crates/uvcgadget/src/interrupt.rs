// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Signal-driven shutdown
//!
//! A signal handler cannot be handed arbitrary context, so the event loop to
//! stop is published once in a process-wide slot before the handler is
//! registered. The slot is never reassigned. The handler only reads the slot
//! and forwards to [`RequestStop::request_stop`], which performs no
//! allocation, locking or blocking.

use crate::{events::RequestStop, Error};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    SigId,
};
use std::sync::{Arc, OnceLock};

static STOP_TARGET: OnceLock<Arc<dyn RequestStop>> = OnceLock::new();

/// Signals that request a clean shutdown
pub const SHUTDOWN_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Publish the event loop stopped by [`request_stop`].
///
/// Fails with [`Error::InterruptArmed`] if a target was already published.
pub fn set_stop_target(target: Arc<dyn RequestStop>) -> Result<(), Error> {
    STOP_TARGET.set(target).map_err(|_| Error::InterruptArmed)
}

/// Stop the published event loop, if any.
///
/// Safe to call from a signal handler.
pub fn request_stop() {
    if let Some(target) = STOP_TARGET.get() {
        target.request_stop();
    }
}

/// Register [`request_stop`] for SIGINT and SIGTERM.
///
/// The returned ids can be passed to [`uninstall`].
pub fn install() -> Result<Vec<SigId>, Error> {
    let mut ids = Vec::with_capacity(SHUTDOWN_SIGNALS.len());
    for signal in SHUTDOWN_SIGNALS {
        // SAFETY: request_stop only performs an atomic load and forwards to a
        // RequestStop implementation, which must be async-signal-safe.
        let id = unsafe { signal_hook::low_level::register(signal, request_stop) }?;
        ids.push(id);
    }

    log::debug!("Installed SIGINT/SIGTERM handlers");
    Ok(ids)
}

/// Remove handlers registered by [`install`].
pub fn uninstall(ids: impl IntoIterator<Item = SigId>) {
    for id in ids {
        signal_hook::low_level::unregister(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStop(AtomicUsize);

    impl RequestStop for CountingStop {
        fn request_stop(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    // The slot is process-wide and write-once, so every assertion about it
    // lives in this single test.
    #[test]
    #[serial]
    fn test_signal_reaches_stop_target() {
        let target = Arc::new(CountingStop(AtomicUsize::new(0)));
        set_stop_target(target.clone()).unwrap();
        assert!(matches!(
            set_stop_target(target.clone()),
            Err(Error::InterruptArmed)
        ));

        request_stop();
        assert_eq!(target.0.load(Ordering::SeqCst), 1);

        let ids = install().unwrap();
        assert_eq!(ids.len(), 2);
        signal_hook::low_level::raise(SIGINT).unwrap();
        signal_hook::low_level::raise(SIGTERM).unwrap();
        assert_eq!(target.0.load(Ordering::SeqCst), 3);
        uninstall(ids);
    }
}
