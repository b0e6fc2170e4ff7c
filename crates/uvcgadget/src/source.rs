// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::{
    controls::{ControlMode, ControlSet},
    events::EventContext,
    selection::{Backend, BackendKind},
    uvc, Error,
};
use std::{
    ffi::{c_char, c_int, CString},
    ptr,
};
use uvcgadget_sys as ffi;

/// Capability contract shared by every video source backend.
///
/// Creation belongs to the platform that knows how to resolve a
/// [`Backend`] locator; destruction is `Drop`, which runs exactly once per
/// successfully created source.
pub trait VideoSource {
    /// Event loop type the source registers its file descriptors with
    type Events;

    fn kind(&self) -> BackendKind;

    /// Wire the source into the event loop. Only sources owning a pollable
    /// device do anything here.
    fn initialize(&mut self, _events: &mut Self::Events) -> Result<(), Error> {
        Ok(())
    }

    /// Push every set control into the camera pipeline, leaving unset
    /// controls on their automatic defaults. Only the camera pipeline
    /// supports controls.
    fn apply_controls(&mut self, _controls: &ControlSet) -> Result<(), Error> {
        Err(Error::Unsupported(format!(
            "{} source has no camera controls",
            self.kind()
        )))
    }
}

/// A libuvcgadget `struct video_source`
pub struct Source {
    ptr: *mut ffi::video_source,
    kind: BackendKind,
    // libuvcgadget may hold on to these strings for the source's lifetime.
    _locator: Option<CString>,
    camera_arguments: Option<Box<CameraArguments>>,
}

fn libcamera() -> Result<&'static ffi::LibcameraSymbols, Error> {
    ffi::init()?.libcamera.as_ref().ok_or_else(|| {
        Error::Unsupported("libuvcgadget was built without libcamera support".to_string())
    })
}

impl Source {
    pub fn create(backend: &Backend) -> Result<Self, Error> {
        let locator = backend.locator().map(CString::new).transpose()?;
        let locator_ptr = locator.as_ref().map_or(ptr::null(), |l| l.as_ptr());

        let ptr = match backend {
            Backend::HardwareCapture(_) => uvc!(v4l2_video_source_create(locator_ptr)),
            Backend::CameraPipeline(_) => {
                let libcamera = libcamera()?;
                unsafe { (libcamera.libcamera_source_create)(locator_ptr) }
            }
            Backend::StaticImage(_) => uvc!(jpg_video_source_create(locator_ptr)),
            Backend::Slideshow(_) => uvc!(slideshow_video_source_create(locator_ptr)),
            Backend::SyntheticPattern => uvc!(test_video_source_create()),
        };

        if ptr.is_null() {
            return Err(Error::Creation {
                backend: backend.kind(),
                locator: backend.locator().map(String::from),
            });
        }

        log::debug!("Created {}", backend);
        Ok(Source {
            ptr,
            kind: backend.kind(),
            _locator: locator,
            camera_arguments: None,
        })
    }

    pub(crate) fn as_ptr(&self) -> *mut ffi::video_source {
        self.ptr
    }
}

impl VideoSource for Source {
    type Events = EventContext;

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn initialize(&mut self, events: &mut EventContext) -> Result<(), Error> {
        match self.kind {
            BackendKind::HardwareCapture => {
                uvc!(v4l2_video_source_init(self.ptr, events.as_ptr()));
            }
            BackendKind::CameraPipeline => {
                let libcamera = libcamera()?;
                unsafe { (libcamera.libcamera_source_init)(self.ptr, events.as_ptr()) };
            }
            BackendKind::StaticImage | BackendKind::Slideshow | BackendKind::SyntheticPattern => {}
        }
        Ok(())
    }

    fn apply_controls(&mut self, controls: &ControlSet) -> Result<(), Error> {
        if self.kind != BackendKind::CameraPipeline {
            return Err(Error::Unsupported(format!(
                "{} source has no camera controls",
                self.kind
            )));
        }

        let libcamera = libcamera()?;
        for request in controls.requests() {
            log::debug!("Camera control {}", request);
        }

        let mut arguments = Box::new(CameraArguments::new(controls)?);
        unsafe { (libcamera.libcamera_source_set_controls)(self.ptr, &mut arguments.raw) };
        self.camera_arguments = Some(arguments);
        Ok(())
    }
}

impl Drop for Source {
    fn drop(&mut self) {
        if let Some(lib) = ffi::try_library() {
            unsafe { lib.video_source_destroy(self.ptr) };
        }
    }
}

/// C view of a [`ControlSet`] plus the strings it points into.
///
/// The C side marks "not provided" with NULL strings and NaN floats, so that
/// encoding happens here and nowhere else.
struct CameraArguments {
    raw: ffi::camera_arguments,
    _strings: Vec<CString>,
}

impl CameraArguments {
    fn new(controls: &ControlSet) -> Result<Self, Error> {
        let mut strings = Vec::new();
        let mut mode = |value: Option<&'static str>| -> Result<*mut c_char, Error> {
            match value {
                Some(value) => {
                    let value = CString::new(value)?;
                    let value_ptr = value.as_ptr() as *mut c_char;
                    strings.push(value);
                    Ok(value_ptr)
                }
                None => Ok(ptr::null_mut()),
            }
        };

        let raw = ffi::camera_arguments {
            af_range_mode: mode(controls.af_range_mode.map(|m| m.as_str()))?,
            af_speed_mode: mode(controls.af_speed_mode.map(|m| m.as_str()))?,
            awb_mode: mode(controls.awb_mode.map(|m| m.as_str()))?,
            exposure_mode: mode(controls.exposure_mode.map(|m| m.canonical().as_str()))?,
            colour_gain_r: controls.colour_gain_r().unwrap_or(f32::NAN),
            colour_gain_b: controls.colour_gain_b().unwrap_or(f32::NAN),
            lens_position: controls.lens_position.unwrap_or(f32::NAN),
            brightness: controls.brightness.unwrap_or(f32::NAN),
            contrast: controls.contrast.unwrap_or(f32::NAN),
            saturation: controls.saturation.unwrap_or(f32::NAN),
            sharpness: controls.sharpness.unwrap_or(f32::NAN),
            debug_report_enabled: c_int::from(controls.debug_report_enabled),
        };

        Ok(CameraArguments {
            raw,
            _strings: strings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{ControlArguments, ExposureMode};
    use std::ffi::CStr;

    #[test]
    fn test_camera_arguments_unset() {
        let arguments = CameraArguments::new(&ControlSet::default()).unwrap();
        let raw = arguments.raw;
        assert!(raw.af_range_mode.is_null());
        assert!(raw.af_speed_mode.is_null());
        assert!(raw.awb_mode.is_null());
        assert!(raw.exposure_mode.is_null());
        assert!(raw.colour_gain_r.is_nan());
        assert!(raw.colour_gain_b.is_nan());
        assert!(raw.lens_position.is_nan());
        assert!(raw.brightness.is_nan());
        assert!(raw.contrast.is_nan());
        assert!(raw.saturation.is_nan());
        assert!(raw.sharpness.is_nan());
        assert_eq!(raw.debug_report_enabled, 0);
    }

    #[test]
    fn test_camera_arguments_set() {
        let controls = ControlSet::from_arguments(&ControlArguments {
            awb: Some("cloudy".into()),
            exposure: Some("sport".into()),
            colour_gains: Some("1.0,2.0".into()),
            brightness: Some("0.0".into()),
            debug_report: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(controls.exposure_mode, Some(ExposureMode::Sport));

        let arguments = CameraArguments::new(&controls).unwrap();
        let raw = arguments.raw;
        let awb = unsafe { CStr::from_ptr(raw.awb_mode) };
        let exposure = unsafe { CStr::from_ptr(raw.exposure_mode) };
        assert_eq!(awb.to_str().unwrap(), "cloudy");
        assert_eq!(exposure.to_str().unwrap(), "short");
        assert_eq!(raw.colour_gain_r, 1.0);
        assert_eq!(raw.colour_gain_b, 2.0);
        assert_eq!(raw.brightness, 0.0);
        assert!(raw.contrast.is_nan());
        assert_eq!(raw.debug_report_enabled, 1);
    }
}
