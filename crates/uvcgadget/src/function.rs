// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{uvc, Error};
use std::{
    ffi::{CStr, CString},
    ptr,
};
use uvcgadget_sys as ffi;

/// UVC gadget function configuration parsed from ConfigFS.
///
/// The function is named by a specifier such as `uvc.0`, or
/// `g1/functions/uvc.0` when several gadgets are configured. For legacy
/// g_webcam instances the specifier is the UDC the function is bound to.
/// Without a specifier the first UVC function of the first gadget is used.
pub struct FunctionConfig {
    ptr: *mut ffi::uvc_function_config,
}

impl FunctionConfig {
    pub fn resolve(function: Option<&str>) -> Result<Self, Error> {
        let function_c = function.map(CString::new).transpose()?;
        let function_ptr = function_c.as_ref().map_or(ptr::null(), |f| f.as_ptr());

        let ptr = uvc!(configfs_parse_uvc_function(function_ptr));
        if ptr.is_null() {
            return Err(Error::Resolution(match function {
                Some(function) => format!("Failed to identify function configuration {}", function),
                None => "Failed to identify function configuration".to_string(),
            }));
        }

        let config = FunctionConfig { ptr };
        log::info!("Using UVC function on {}", config.video()?.to_string_lossy());
        Ok(config)
    }

    /// Video device node of the function, e.g. `/dev/video1`
    pub fn video(&self) -> Result<&CStr, Error> {
        let video = unsafe { (*self.ptr).video };
        if video.is_null() {
            return Err(Error::Resolution(
                "Function configuration has no video device".to_string(),
            ));
        }

        Ok(unsafe { CStr::from_ptr(video) })
    }

    pub(crate) fn as_ptr(&self) -> *mut ffi::uvc_function_config {
        self.ptr
    }
}

impl Drop for FunctionConfig {
    fn drop(&mut self) {
        if let Some(lib) = ffi::try_library() {
            unsafe { lib.configfs_free_uvc_function(self.ptr) };
        }
    }
}
