// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{events::EventContext, function::FunctionConfig, source::Source, uvc, Error};
use uvcgadget_sys as ffi;

/// The UVC stream: consumes frames from a video source and serves them on
/// the gadget's video node.
pub struct Stream {
    ptr: *mut ffi::uvc_stream,
}

impl Stream {
    /// Open the function's video node and bind it to the event loop and the
    /// source. The stream keeps raw references to all three, so it must be
    /// released before any of them.
    pub fn new(
        function: &FunctionConfig,
        source: &mut Source,
        events: &mut EventContext,
    ) -> Result<Self, Error> {
        let video = function.video()?;
        let ptr = uvc!(uvc_stream_new(video.as_ptr()));
        if ptr.is_null() {
            return Err(Error::Attachment(format!(
                "cannot open {}",
                video.to_string_lossy()
            )));
        }

        let stream = Stream { ptr };
        uvc!(uvc_stream_set_event_handler(stream.ptr, events.as_ptr()));
        uvc!(uvc_stream_set_video_source(stream.ptr, source.as_ptr()));
        uvc!(uvc_stream_init_uvc(stream.ptr, function.as_ptr()));

        Ok(stream)
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        if let Some(lib) = ffi::try_library() {
            unsafe { lib.uvc_stream_delete(self.ptr) };
        }
    }
}
