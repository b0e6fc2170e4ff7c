// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

// Declarations mirror the public headers of libuvcgadget (configfs.h,
// events.h, stream.h, video-source.h and the per-source headers). Only the
// leading members of uvc_function_config are declared, the remainder is
// never touched from Rust.

use std::ffi::{c_char, c_int, c_long, OsStr};
use std::mem::size_of;

pub const FD_SETSIZE: usize = 1024;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct list_head {
    pub prev: *mut list_head,
    pub next: *mut list_head,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct fd_set {
    pub fds_bits: [c_long; FD_SETSIZE / (8 * size_of::<c_long>())],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct events {
    pub events: list_head,
    pub done: bool,
    pub maxfd: c_int,
    pub rfds: fd_set,
    pub wfds: fd_set,
    pub efds: fd_set,
}

#[repr(C)]
#[derive(Debug)]
pub struct uvc_function_config {
    pub video: *mut c_char,
    pub udc: *mut c_char,
    _rest: [u8; 0],
}

#[repr(C)]
#[derive(Debug)]
pub struct video_source {
    _private: [u8; 0],
}

#[repr(C)]
#[derive(Debug)]
pub struct uvc_stream {
    _private: [u8; 0],
}

/// Container for libcamera options. Float members use NaN and string members
/// use NULL to mean "not provided".
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct camera_arguments {
    pub af_range_mode: *mut c_char,
    pub af_speed_mode: *mut c_char,
    pub awb_mode: *mut c_char,
    pub exposure_mode: *mut c_char,
    pub colour_gain_r: f32,
    pub colour_gain_b: f32,
    pub lens_position: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub sharpness: f32,
    pub debug_report_enabled: c_int,
}

/// Entry points that only exist when libuvcgadget was built with libcamera.
#[derive(Debug, Copy, Clone)]
pub struct LibcameraSymbols {
    pub libcamera_source_create: unsafe extern "C" fn(*const c_char) -> *mut video_source,
    pub libcamera_source_set_controls:
        unsafe extern "C" fn(*mut video_source, *mut camera_arguments),
    pub libcamera_source_init: unsafe extern "C" fn(*mut video_source, *mut events),
}

unsafe fn symbol<T: Copy>(
    library: &::libloading::Library,
    name: &[u8],
) -> Result<T, ::libloading::Error> {
    let sym = library.get::<T>(name)?;
    Ok(*sym)
}

pub struct UvcGadgetLibrary {
    __library: ::libloading::Library,
    pub configfs_parse_uvc_function:
        unsafe extern "C" fn(*const c_char) -> *mut uvc_function_config,
    pub configfs_free_uvc_function: unsafe extern "C" fn(*mut uvc_function_config),
    pub events_init: unsafe extern "C" fn(*mut events),
    pub events_loop: unsafe extern "C" fn(*mut events) -> bool,
    pub events_stop: unsafe extern "C" fn(*mut events),
    pub events_cleanup: unsafe extern "C" fn(*mut events),
    pub uvc_stream_new: unsafe extern "C" fn(*const c_char) -> *mut uvc_stream,
    pub uvc_stream_init_uvc: unsafe extern "C" fn(*mut uvc_stream, *mut uvc_function_config),
    pub uvc_stream_set_event_handler: unsafe extern "C" fn(*mut uvc_stream, *mut events),
    pub uvc_stream_set_video_source: unsafe extern "C" fn(*mut uvc_stream, *mut video_source),
    pub uvc_stream_delete: unsafe extern "C" fn(*mut uvc_stream),
    pub v4l2_video_source_create: unsafe extern "C" fn(*const c_char) -> *mut video_source,
    pub v4l2_video_source_init: unsafe extern "C" fn(*mut video_source, *mut events),
    pub jpg_video_source_create: unsafe extern "C" fn(*const c_char) -> *mut video_source,
    pub slideshow_video_source_create: unsafe extern "C" fn(*const c_char) -> *mut video_source,
    pub test_video_source_create: unsafe extern "C" fn() -> *mut video_source,
    pub video_source_destroy: unsafe extern "C" fn(*mut video_source),
    pub libcamera: Option<LibcameraSymbols>,
}

impl UvcGadgetLibrary {
    pub unsafe fn new<P>(path: P) -> Result<Self, ::libloading::Error>
    where
        P: AsRef<OsStr>,
    {
        let library = ::libloading::Library::new(path)?;
        Self::from_library(library)
    }

    pub unsafe fn from_library<L>(library: L) -> Result<Self, ::libloading::Error>
    where
        L: Into<::libloading::Library>,
    {
        let __library = library.into();

        let configfs_parse_uvc_function = symbol(&__library, b"configfs_parse_uvc_function\0")?;
        let configfs_free_uvc_function = symbol(&__library, b"configfs_free_uvc_function\0")?;
        let events_init = symbol(&__library, b"events_init\0")?;
        let events_loop = symbol(&__library, b"events_loop\0")?;
        let events_stop = symbol(&__library, b"events_stop\0")?;
        let events_cleanup = symbol(&__library, b"events_cleanup\0")?;
        let uvc_stream_new = symbol(&__library, b"uvc_stream_new\0")?;
        let uvc_stream_init_uvc = symbol(&__library, b"uvc_stream_init_uvc\0")?;
        let uvc_stream_set_event_handler = symbol(&__library, b"uvc_stream_set_event_handler\0")?;
        let uvc_stream_set_video_source = symbol(&__library, b"uvc_stream_set_video_source\0")?;
        let uvc_stream_delete = symbol(&__library, b"uvc_stream_delete\0")?;
        let v4l2_video_source_create = symbol(&__library, b"v4l2_video_source_create\0")?;
        let v4l2_video_source_init = symbol(&__library, b"v4l2_video_source_init\0")?;
        let jpg_video_source_create = symbol(&__library, b"jpg_video_source_create\0")?;
        let slideshow_video_source_create =
            symbol(&__library, b"slideshow_video_source_create\0")?;
        let test_video_source_create = symbol(&__library, b"test_video_source_create\0")?;
        let video_source_destroy = symbol(&__library, b"video_source_destroy\0")?;

        let libcamera = Self::load_libcamera(&__library);

        Ok(UvcGadgetLibrary {
            __library,
            configfs_parse_uvc_function,
            configfs_free_uvc_function,
            events_init,
            events_loop,
            events_stop,
            events_cleanup,
            uvc_stream_new,
            uvc_stream_init_uvc,
            uvc_stream_set_event_handler,
            uvc_stream_set_video_source,
            uvc_stream_delete,
            v4l2_video_source_create,
            v4l2_video_source_init,
            jpg_video_source_create,
            slideshow_video_source_create,
            test_video_source_create,
            video_source_destroy,
            libcamera,
        })
    }

    unsafe fn load_libcamera(library: &::libloading::Library) -> Option<LibcameraSymbols> {
        Some(LibcameraSymbols {
            libcamera_source_create: symbol(library, b"libcamera_source_create\0").ok()?,
            libcamera_source_set_controls: symbol(library, b"libcamera_source_set_controls\0")
                .ok()?,
            libcamera_source_init: symbol(library, b"libcamera_source_init\0").ok()?,
        })
    }

    pub unsafe fn configfs_parse_uvc_function(
        &self,
        function: *const c_char,
    ) -> *mut uvc_function_config {
        (self.configfs_parse_uvc_function)(function)
    }

    pub unsafe fn configfs_free_uvc_function(&self, fc: *mut uvc_function_config) {
        (self.configfs_free_uvc_function)(fc)
    }

    pub unsafe fn events_init(&self, events: *mut events) {
        (self.events_init)(events)
    }

    pub unsafe fn events_loop(&self, events: *mut events) -> bool {
        (self.events_loop)(events)
    }

    pub unsafe fn events_stop(&self, events: *mut events) {
        (self.events_stop)(events)
    }

    pub unsafe fn events_cleanup(&self, events: *mut events) {
        (self.events_cleanup)(events)
    }

    pub unsafe fn uvc_stream_new(&self, uvc_device: *const c_char) -> *mut uvc_stream {
        (self.uvc_stream_new)(uvc_device)
    }

    pub unsafe fn uvc_stream_init_uvc(&self, stream: *mut uvc_stream, fc: *mut uvc_function_config) {
        (self.uvc_stream_init_uvc)(stream, fc)
    }

    pub unsafe fn uvc_stream_set_event_handler(&self, stream: *mut uvc_stream, events: *mut events) {
        (self.uvc_stream_set_event_handler)(stream, events)
    }

    pub unsafe fn uvc_stream_set_video_source(
        &self,
        stream: *mut uvc_stream,
        src: *mut video_source,
    ) {
        (self.uvc_stream_set_video_source)(stream, src)
    }

    pub unsafe fn uvc_stream_delete(&self, stream: *mut uvc_stream) {
        (self.uvc_stream_delete)(stream)
    }

    pub unsafe fn v4l2_video_source_create(&self, devname: *const c_char) -> *mut video_source {
        (self.v4l2_video_source_create)(devname)
    }

    pub unsafe fn v4l2_video_source_init(&self, src: *mut video_source, events: *mut events) {
        (self.v4l2_video_source_init)(src, events)
    }

    pub unsafe fn jpg_video_source_create(&self, img_path: *const c_char) -> *mut video_source {
        (self.jpg_video_source_create)(img_path)
    }

    pub unsafe fn slideshow_video_source_create(
        &self,
        img_dir: *const c_char,
    ) -> *mut video_source {
        (self.slideshow_video_source_create)(img_dir)
    }

    pub unsafe fn test_video_source_create(&self) -> *mut video_source {
        (self.test_video_source_create)()
    }

    pub unsafe fn video_source_destroy(&self, src: *mut video_source) {
        (self.video_source_destroy)(src)
    }
}
