// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Camera-pipeline tuning controls
//!
//! Every tuning option of the libcamera source arrives as text on the command
//! line. This module turns that text into typed values, rejecting anything
//! outside the accepted modes or numeric ranges, and collects the results in a
//! [`ControlSet`].
//!
//! A control that was not given stays `None`. This is distinct from any
//! concrete value, notably `0.0`, so the camera pipeline keeps running its own
//! algorithm for every control the user did not touch.
//!
//! ```
//! use uvcgadget::controls::{ControlArguments, ControlSet};
//!
//! let args = ControlArguments {
//!     colour_gains: Some("1.0,2.0".into()),
//!     ..Default::default()
//! };
//! let controls = ControlSet::from_arguments(&args)?;
//! assert_eq!(controls.colour_gain_r(), Some(1.0));
//! assert!(controls.disables_awb());
//! assert_eq!(controls.brightness, None);
//! # Ok::<(), uvcgadget::controls::ValidationError>(())
//! ```

use serde::Serialize;
use std::{error, fmt};

/// Closed interval `[min, max]` accepted by a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Bounds { min, max }
    }

    /// Inclusive on both ends. NaN is never contained.
    ///
    /// Takes the value before narrowing to `f32`, so input just outside a
    /// bound cannot round onto it.
    pub fn contains(&self, value: f64) -> bool {
        value >= f64::from(self.min) && value <= f64::from(self.max)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}, {:.1}]", self.min, self.max)
    }
}

/// A control whose value is one entry of a fixed allow-list.
///
/// Matching is exact and case-sensitive.
pub trait ControlMode: Copy + Sized + 'static {
    /// Long option name, without the leading dashes.
    const OPTION: &'static str;

    /// Every accepted spelling, in the order shown to the user.
    const NAMES: &'static [&'static str];

    /// Every accepted value, index-aligned with [`ControlMode::NAMES`].
    const VALUES: &'static [Self];

    fn as_str(&self) -> &'static str;
}

macro_rules! control_mode {
    (
        $(#[$meta:meta])*
        $name:ident, $option:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl ControlMode for $name {
            const OPTION: &'static str = $option;
            const NAMES: &'static [&'static str] = &[$($text),+];
            const VALUES: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

control_mode! {
    /// Distance range scanned by the autofocus algorithm
    AfRangeMode, "autofocus-range" {
        Normal => "normal",
        Macro => "macro",
    }
}

control_mode! {
    /// Speed of lens movement while the autofocus algorithm changes focus
    AfSpeedMode, "autofocus-speed" {
        Normal => "normal",
        Fast => "fast",
    }
}

control_mode! {
    /// Automatic white balance algorithm mode
    AwbMode, "awb" {
        Auto => "auto",
        Incandescent => "incandescent",
        Tungsten => "tungsten",
        Fluorescent => "fluorescent",
        Indoor => "indoor",
        Daylight => "daylight",
        Cloudy => "cloudy",
    }
}

control_mode! {
    /// Exposure mode of the AEGC algorithm
    ExposureMode, "exposure" {
        Normal => "normal",
        Short => "short",
        /// rpicam-apps spelling of [`ExposureMode::Short`]
        Sport => "sport",
        Long => "long",
    }
}

impl ExposureMode {
    /// Folds synonyms onto the mode the camera pipeline understands.
    pub fn canonical(self) -> Self {
        match self {
            ExposureMode::Sport => ExposureMode::Short,
            mode => mode,
        }
    }
}

/// A numeric control: its option name and accepted range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericControl {
    pub option: &'static str,
    pub bounds: Bounds,
}

pub const COLOUR_GAINS: NumericControl = NumericControl {
    option: "colour-gains",
    bounds: Bounds::new(0.0, 32.0),
};

pub const LENS_POSITION: NumericControl = NumericControl {
    option: "lens-position",
    bounds: Bounds::new(0.0, 32.0),
};

pub const BRIGHTNESS: NumericControl = NumericControl {
    option: "brightness",
    bounds: Bounds::new(-1.0, 1.0),
};

pub const CONTRAST: NumericControl = NumericControl {
    option: "contrast",
    bounds: Bounds::new(0.0, 32.0),
};

pub const SATURATION: NumericControl = NumericControl {
    option: "saturation",
    bounds: Bounds::new(0.0, 32.0),
};

pub const SHARPNESS: NumericControl = NumericControl {
    option: "sharpness",
    bounds: Bounds::new(0.0, 16.0),
};

impl NumericControl {
    /// Parse a single floating-point token and check it against the bounds.
    pub fn parse(&self, text: &str) -> Result<f32, ValidationError> {
        let value = parse_float(text).ok_or_else(|| self.invalid_format(text, "<value>"))?;
        self.check(value, text)
    }

    /// Parse exactly two floating-point tokens separated by a comma, checking
    /// both against the bounds.
    pub fn parse_pair(&self, text: &str) -> Result<(f32, f32), ValidationError> {
        let pair = text
            .split_once(',')
            .and_then(|(first, second)| Some((parse_float(first)?, parse_float(second)?)));

        let (first, second) = pair.ok_or_else(|| self.invalid_format(text, "<value>,<value>"))?;
        Ok((self.check(first, text)?, self.check(second, text)?))
    }

    fn check(&self, value: f64, text: &str) -> Result<f32, ValidationError> {
        if self.bounds.contains(value) {
            Ok(value as f32)
        } else {
            Err(ValidationError::OutOfRange {
                option: self.option,
                value: text.to_owned(),
                bounds: self.bounds,
            })
        }
    }

    fn invalid_format(&self, text: &str, expected: &'static str) -> ValidationError {
        ValidationError::InvalidFormat {
            option: self.option,
            value: text.to_owned(),
            expected,
        }
    }
}

fn parse_float(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Validate an enumerated control against its allow-list.
pub fn parse_mode<M: ControlMode>(text: &str) -> Result<M, ValidationError> {
    M::VALUES
        .iter()
        .copied()
        .find(|mode| mode.as_str() == text)
        .ok_or_else(|| ValidationError::InvalidMode {
            option: M::OPTION,
            value: text.to_owned(),
            allowed: M::NAMES,
        })
}

/// Rejection of a single control value
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value is not a member of the control's allow-list
    InvalidMode {
        option: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// Value could not be parsed into the expected number of floats
    InvalidFormat {
        option: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Value parsed but lies outside the closed range of the control
    OutOfRange {
        option: &'static str,
        value: String,
        bounds: Bounds,
    },
}

impl ValidationError {
    /// Long option name of the rejected control, without leading dashes
    pub fn option(&self) -> &'static str {
        match self {
            ValidationError::InvalidMode { option, .. }
            | ValidationError::InvalidFormat { option, .. }
            | ValidationError::OutOfRange { option, .. } => option,
        }
    }

    /// The rejected input, verbatim
    pub fn value(&self) -> &str {
        match self {
            ValidationError::InvalidMode { value, .. }
            | ValidationError::InvalidFormat { value, .. }
            | ValidationError::OutOfRange { value, .. } => value,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidMode {
                option,
                value,
                allowed,
            } => write!(
                f,
                "Invalid --{} value: {} (values: {})",
                option,
                value,
                allowed.join(", ")
            ),
            ValidationError::InvalidFormat {
                option,
                value,
                expected,
            } => write!(
                f,
                "Invalid --{} value - invalid format, expected {}: {}",
                option, expected, value
            ),
            ValidationError::OutOfRange {
                option,
                value,
                bounds,
            } => write!(
                f,
                "Invalid --{} value - out of range {}: {}",
                option, bounds, value
            ),
        }
    }
}

impl error::Error for ValidationError {}

/// Tuning options as given on the command line, before validation
#[derive(Debug, Clone, Default)]
pub struct ControlArguments {
    pub af_range: Option<String>,
    pub af_speed: Option<String>,
    pub lens_position: Option<String>,
    pub awb: Option<String>,
    pub colour_gains: Option<String>,
    pub exposure: Option<String>,
    pub brightness: Option<String>,
    pub contrast: Option<String>,
    pub saturation: Option<String>,
    pub sharpness: Option<String>,
    pub debug_report: bool,
}

impl ControlArguments {
    /// True when any camera tuning option was given.
    pub fn any(&self) -> bool {
        self.debug_report
            || [
                &self.af_range,
                &self.af_speed,
                &self.lens_position,
                &self.awb,
                &self.colour_gains,
                &self.exposure,
                &self.brightness,
                &self.contrast,
                &self.saturation,
                &self.sharpness,
            ]
            .iter()
            .any(|arg| arg.is_some())
    }
}

/// Explicit red and blue white-balance gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColourGains {
    pub red: f32,
    pub blue: f32,
}

/// Validated camera-pipeline controls.
///
/// `None` means the control was not given and the pipeline keeps its default
/// or automatic behaviour for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlSet {
    pub af_range_mode: Option<AfRangeMode>,
    pub af_speed_mode: Option<AfSpeedMode>,
    pub awb_mode: Option<AwbMode>,
    pub exposure_mode: Option<ExposureMode>,
    pub colour_gains: Option<ColourGains>,
    pub lens_position: Option<f32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub sharpness: Option<f32>,
    pub debug_report_enabled: bool,
}

fn validate<T>(
    text: &Option<String>,
    parse: impl FnOnce(&str) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    text.as_deref().map(parse).transpose()
}

impl ControlSet {
    /// Validate every given option. The first rejection fails the whole set.
    pub fn from_arguments(args: &ControlArguments) -> Result<Self, ValidationError> {
        let controls = ControlSet {
            af_range_mode: validate(&args.af_range, parse_mode)?,
            af_speed_mode: validate(&args.af_speed, parse_mode)?,
            awb_mode: validate(&args.awb, parse_mode)?,
            exposure_mode: validate(&args.exposure, parse_mode)?,
            colour_gains: validate(&args.colour_gains, |text| {
                COLOUR_GAINS
                    .parse_pair(text)
                    .map(|(red, blue)| ColourGains { red, blue })
            })?,
            lens_position: validate(&args.lens_position, |text| LENS_POSITION.parse(text))?,
            brightness: validate(&args.brightness, |text| BRIGHTNESS.parse(text))?,
            contrast: validate(&args.contrast, |text| CONTRAST.parse(text))?,
            saturation: validate(&args.saturation, |text| SATURATION.parse(text))?,
            sharpness: validate(&args.sharpness, |text| SHARPNESS.parse(text))?,
            debug_report_enabled: args.debug_report,
        };

        if controls.disables_awb() && controls.awb_mode.is_some() {
            log::warn!("--awb has no effect while --colour-gains disables the AWB algorithm");
        }
        if controls.disables_autofocus()
            && (controls.af_range_mode.is_some() || controls.af_speed_mode.is_some())
        {
            log::warn!(
                "--autofocus-range/--autofocus-speed have no effect while --lens-position disables autofocus"
            );
        }

        Ok(controls)
    }

    pub fn colour_gain_r(&self) -> Option<f32> {
        self.colour_gains.map(|gains| gains.red)
    }

    pub fn colour_gain_b(&self) -> Option<f32> {
        self.colour_gains.map(|gains| gains.blue)
    }

    /// Explicit colour gains switch the AWB algorithm off.
    pub fn disables_awb(&self) -> bool {
        self.colour_gains.is_some()
    }

    /// An explicit lens position switches autofocus off.
    pub fn disables_autofocus(&self) -> bool {
        self.lens_position.is_some()
    }

    /// True when nothing was set, leaving the pipeline fully automatic.
    pub fn is_unset(&self) -> bool {
        self.requests().is_empty() && !self.debug_report_enabled
    }

    /// The control writes applying this set produces, in application order.
    ///
    /// Unset controls produce nothing. Explicit gains and lens position are
    /// preceded by the write that disables the matching algorithm, and
    /// exposure synonyms are folded onto their canonical mode.
    pub fn requests(&self) -> Vec<ControlRequest> {
        let mut requests = Vec::new();

        if let Some(mode) = self.af_range_mode {
            requests.push(ControlRequest::AfRange(mode));
        }
        if let Some(mode) = self.af_speed_mode {
            requests.push(ControlRequest::AfSpeed(mode));
        }
        if let Some(position) = self.lens_position {
            requests.push(ControlRequest::AfModeManual);
            requests.push(ControlRequest::LensPosition(position));
        }
        if let Some(mode) = self.awb_mode {
            requests.push(ControlRequest::AwbMode(mode));
        }
        if let Some(gains) = self.colour_gains {
            requests.push(ControlRequest::AwbEnable(false));
            requests.push(ControlRequest::ColourGains([gains.red, gains.blue]));
        }
        if let Some(mode) = self.exposure_mode {
            requests.push(ControlRequest::AeExposureMode(mode.canonical()));
        }
        if let Some(value) = self.brightness {
            requests.push(ControlRequest::Brightness(value));
        }
        if let Some(value) = self.contrast {
            requests.push(ControlRequest::Contrast(value));
        }
        if let Some(value) = self.saturation {
            requests.push(ControlRequest::Saturation(value));
        }
        if let Some(value) = self.sharpness {
            requests.push(ControlRequest::Sharpness(value));
        }

        requests
    }
}

/// A single write into the camera pipeline's control list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "control", content = "value")]
pub enum ControlRequest {
    AfRange(AfRangeMode),
    AfSpeed(AfSpeedMode),
    AfModeManual,
    LensPosition(f32),
    AwbMode(AwbMode),
    AwbEnable(bool),
    ColourGains([f32; 2]),
    AeExposureMode(ExposureMode),
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Sharpness(f32),
}

impl fmt::Display for ControlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlRequest::AfRange(mode) => write!(f, "AfRange = {}", mode),
            ControlRequest::AfSpeed(mode) => write!(f, "AfSpeed = {}", mode),
            ControlRequest::AfModeManual => write!(f, "AfMode = manual"),
            ControlRequest::LensPosition(value) => write!(f, "LensPosition = {}", value),
            ControlRequest::AwbMode(mode) => write!(f, "AwbMode = {}", mode),
            ControlRequest::AwbEnable(enable) => write!(f, "AwbEnable = {}", enable),
            ControlRequest::ColourGains([red, blue]) => {
                write!(f, "ColourGains = [{}, {}]", red, blue)
            }
            ControlRequest::AeExposureMode(mode) => write!(f, "AeExposureMode = {}", mode),
            ControlRequest::Brightness(value) => write!(f, "Brightness = {}", value),
            ControlRequest::Contrast(value) => write!(f, "Contrast = {}", value),
            ControlRequest::Saturation(value) => write!(f, "Saturation = {}", value),
            ControlRequest::Sharpness(value) => write!(f, "Sharpness = {}", value),
        }
    }
}
