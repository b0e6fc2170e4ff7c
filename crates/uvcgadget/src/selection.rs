// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Backend selection
//!
//! The caller names at most one source: a capture device, a libcamera camera,
//! a still image or a slideshow directory. Naming none selects the synthetic
//! test pattern.
//!
//! A capture device together with a still image is rejected. Any other
//! combination resolves by priority, highest first:
//!
//! | Priority | Option | Backend |
//! |----------|--------|---------|
//! | 1 | `--device` | [`Backend::HardwareCapture`] |
//! | 2 | `--camera` | [`Backend::CameraPipeline`] |
//! | 3 | `--image` | [`Backend::StaticImage`] |
//! | 4 | `--slideshow` | [`Backend::Slideshow`] |
//! | 5 | none | [`Backend::SyntheticPattern`] |
//!
//! Lower-priority sources that lose are reported with a warning.

use crate::Error;
use serde::Serialize;
use std::fmt;

/// One way of naming a video source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceIntent {
    Device,
    Camera,
    Image,
    Slideshow,
}

impl SourceIntent {
    /// Command-line option that expresses this intent
    pub fn option(&self) -> &'static str {
        match self {
            SourceIntent::Device => "--device",
            SourceIntent::Camera => "--camera",
            SourceIntent::Image => "--image",
            SourceIntent::Slideshow => "--slideshow",
        }
    }

    fn backend(self, locator: &str) -> Backend {
        let locator = locator.to_owned();
        match self {
            SourceIntent::Device => Backend::HardwareCapture(locator),
            SourceIntent::Camera => Backend::CameraPipeline(locator),
            SourceIntent::Image => Backend::StaticImage(locator),
            SourceIntent::Slideshow => Backend::Slideshow(locator),
        }
    }
}

impl fmt::Display for SourceIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceIntent::Device => write!(f, "capture device"),
            SourceIntent::Camera => write!(f, "camera"),
            SourceIntent::Image => write!(f, "still image"),
            SourceIntent::Slideshow => write!(f, "slideshow directory"),
        }
    }
}

/// Kind of video source, without its locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    HardwareCapture,
    CameraPipeline,
    StaticImage,
    Slideshow,
    SyntheticPattern,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::HardwareCapture => write!(f, "V4L2 capture"),
            BackendKind::CameraPipeline => write!(f, "libcamera"),
            BackendKind::StaticImage => write!(f, "static image"),
            BackendKind::Slideshow => write!(f, "slideshow"),
            BackendKind::SyntheticPattern => write!(f, "test pattern"),
        }
    }
}

/// The selected backend together with its locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "locator", rename_all = "kebab-case")]
pub enum Backend {
    /// V4L2 capture device path
    HardwareCapture(String),
    /// libcamera camera index or id
    CameraPipeline(String),
    /// MJPEG image path
    StaticImage(String),
    /// Directory of slideshow images
    Slideshow(String),
    SyntheticPattern,
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::HardwareCapture(_) => BackendKind::HardwareCapture,
            Backend::CameraPipeline(_) => BackendKind::CameraPipeline,
            Backend::StaticImage(_) => BackendKind::StaticImage,
            Backend::Slideshow(_) => BackendKind::Slideshow,
            Backend::SyntheticPattern => BackendKind::SyntheticPattern,
        }
    }

    pub fn locator(&self) -> Option<&str> {
        match self {
            Backend::HardwareCapture(locator)
            | Backend::CameraPipeline(locator)
            | Backend::StaticImage(locator)
            | Backend::Slideshow(locator) => Some(locator),
            Backend::SyntheticPattern => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.locator() {
            Some(locator) => write!(f, "{} ({})", self.kind(), locator),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Source options as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub device: Option<String>,
    pub camera: Option<String>,
    pub image: Option<String>,
    pub slideshow: Option<String>,
}

impl SourceOptions {
    /// Given intents, highest priority first
    fn intents(&self) -> impl Iterator<Item = (SourceIntent, &str)> {
        [
            (SourceIntent::Device, &self.device),
            (SourceIntent::Camera, &self.camera),
            (SourceIntent::Image, &self.image),
            (SourceIntent::Slideshow, &self.slideshow),
        ]
        .into_iter()
        .filter_map(|(intent, locator)| locator.as_deref().map(|locator| (intent, locator)))
    }

    /// Decide which backend runs. Nothing is instantiated here.
    pub fn select(&self) -> Result<Backend, Error> {
        if self.device.is_some() && self.image.is_some() {
            return Err(Error::SelectionConflict {
                first: SourceIntent::Device,
                second: SourceIntent::Image,
            });
        }

        let mut intents = self.intents();
        let backend = match intents.next() {
            Some((intent, locator)) => intent.backend(locator),
            None => Backend::SyntheticPattern,
        };

        for (ignored, locator) in intents {
            log::warn!(
                "Ignoring {} {}, {} takes priority",
                ignored.option(),
                locator,
                backend.kind()
            );
        }

        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(
        device: Option<&str>,
        camera: Option<&str>,
        image: Option<&str>,
        slideshow: Option<&str>,
    ) -> SourceOptions {
        SourceOptions {
            device: device.map(String::from),
            camera: camera.map(String::from),
            image: image.map(String::from),
            slideshow: slideshow.map(String::from),
        }
    }

    #[test]
    fn test_default_is_test_pattern() {
        let backend = SourceOptions::default().select().unwrap();
        assert_eq!(backend, Backend::SyntheticPattern);
        assert_eq!(backend.locator(), None);
    }

    #[test]
    fn test_single_intents() {
        let cases = [
            (options(Some("/dev/video0"), None, None, None), BackendKind::HardwareCapture),
            (options(None, Some("0"), None, None), BackendKind::CameraPipeline),
            (options(None, None, Some("a.jpg"), None), BackendKind::StaticImage),
            (options(None, None, None, Some("/srv/slides")), BackendKind::Slideshow),
        ];

        for (options, kind) in cases {
            let backend = options.select().unwrap();
            assert_eq!(backend.kind(), kind);
            assert!(backend.locator().is_some());
        }
    }

    #[test]
    fn test_device_and_image_conflict() {
        let err = options(Some("/dev/video0"), None, Some("a.jpg"), None)
            .select()
            .unwrap_err();
        match err {
            Error::SelectionConflict { first, second } => {
                assert_eq!(first, SourceIntent::Device);
                assert_eq!(second, SourceIntent::Image);
            }
            other => panic!("unexpected {:?}", other),
        }

        // The conflict wins even when every other intent is present too.
        assert!(options(Some("d"), Some("c"), Some("i"), Some("s"))
            .select()
            .is_err());
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(
            options(Some("/dev/video0"), Some("0"), None, Some("s")).select().unwrap(),
            Backend::HardwareCapture("/dev/video0".into())
        );
        assert_eq!(
            options(None, Some("0"), Some("a.jpg"), Some("s")).select().unwrap(),
            Backend::CameraPipeline("0".into())
        );
        assert_eq!(
            options(None, None, Some("a.jpg"), Some("s")).select().unwrap(),
            Backend::StaticImage("a.jpg".into())
        );
        assert_eq!(
            options(Some("/dev/video0"), None, None, Some("s")).select().unwrap(),
            Backend::HardwareCapture("/dev/video0".into())
        );
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(
            Backend::CameraPipeline("imx708".into()).to_string(),
            "libcamera (imx708)"
        );
        assert_eq!(Backend::SyntheticPattern.to_string(), "test pattern");
    }
}
