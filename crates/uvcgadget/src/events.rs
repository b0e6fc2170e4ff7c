// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{uvc, Error};
use std::{
    mem, ptr,
    sync::{
        atomic::{AtomicPtr, Ordering},
        Arc,
    },
};
use uvcgadget_sys as ffi;

/// Cooperative cancellation of a running event loop.
///
/// Implementations are invoked from a signal handler: they must not allocate,
/// lock or block.
pub trait RequestStop: Send + Sync {
    fn request_stop(&self);
}

/// An event loop multiplexing the file descriptors of the stream and source.
pub trait EventLoop {
    /// Handle that stops [`EventLoop::run`] at its next iteration.
    fn stopper(&self) -> Arc<dyn RequestStop>;

    /// Dispatch events until a stop is requested.
    fn run(&mut self) -> Result<(), Error>;
}

/// The libuvcgadget `struct events` select() loop.
///
/// The C structure lives on the heap so its address stays valid for the
/// stream, the source and the signal handler that all refer to it.
pub struct EventContext {
    ptr: *mut ffi::events,
    stopper: Arc<EventsStopper>,
}

struct EventsStopper {
    /// Null once the context is torn down, turning late signals into no-ops.
    events: AtomicPtr<ffi::events>,
    stop: unsafe extern "C" fn(*mut ffi::events),
}

impl EventsStopper {
    /// Turn every later stop request into a no-op.
    fn detach(&self) {
        self.events.store(ptr::null_mut(), Ordering::Release);
    }
}

impl RequestStop for EventsStopper {
    fn request_stop(&self) {
        let events = self.events.load(Ordering::Acquire);
        if !events.is_null() {
            // events_stop() only sets the done flag, which is async-signal-safe.
            unsafe { (self.stop)(events) };
        }
    }
}

impl EventContext {
    pub fn new() -> Result<Self, Error> {
        let lib = ffi::init()?;

        // All members are integers, pointers or bool, for which zero is valid.
        let ptr = Box::into_raw(Box::new(unsafe { mem::zeroed::<ffi::events>() }));
        unsafe { lib.events_init(ptr) };

        Ok(EventContext {
            ptr,
            stopper: Arc::new(EventsStopper {
                events: AtomicPtr::new(ptr),
                stop: lib.events_stop,
            }),
        })
    }

    pub(crate) fn as_ptr(&self) -> *mut ffi::events {
        self.ptr
    }
}

impl EventLoop for EventContext {
    fn stopper(&self) -> Arc<dyn RequestStop> {
        self.stopper.clone()
    }

    fn run(&mut self) -> Result<(), Error> {
        log::debug!("Entering event loop");
        let aborted = uvc!(events_loop(self.ptr));
        if aborted {
            log::warn!("Event loop terminated without a stop request");
        }
        Ok(())
    }
}

impl Drop for EventContext {
    fn drop(&mut self) {
        self.stopper.detach();

        if let Some(lib) = ffi::try_library() {
            unsafe { lib.events_cleanup(self.ptr) };
        }

        drop(unsafe { Box::from_raw(self.ptr) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    static STOPS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn counting_stop(events: *mut ffi::events) {
        STOPS.fetch_add(1, Ordering::SeqCst);
        unsafe { (*events).done = true };
    }

    #[test]
    fn test_stop_after_detach_is_ignored() {
        let events = Box::into_raw(Box::new(unsafe { mem::zeroed::<ffi::events>() }));
        let stopper = EventsStopper {
            events: AtomicPtr::new(events),
            stop: counting_stop,
        };

        stopper.request_stop();
        assert_eq!(STOPS.load(Ordering::SeqCst), 1);
        assert!(unsafe { (*events).done });

        unsafe { (*events).done = false };
        stopper.detach();
        stopper.request_stop();
        stopper.request_stop();
        assert_eq!(STOPS.load(Ordering::SeqCst), 1);
        assert!(!unsafe { (*events).done });

        drop(unsafe { Box::from_raw(events) });
    }
}
