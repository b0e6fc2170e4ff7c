// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use clap::Args as ClapArgs;
use serde::Serialize;
use uvcgadget::{
    controls::{ControlArguments, ControlRequest, ControlSet},
    selection::{Backend, SourceOptions},
    session::{Gadget, Options, Orchestrator, Plan},
};

pub const FUNCTION_HELP: &str = "\
UVC function:
  With ConfigFS, name the function as <function> to use the first gadget
  providing it (e.g. uvc.1), or as <gadget>/functions/<function> to select
  one gadget explicitly (e.g. g1/functions/uvc.1).

  With the legacy g_webcam module, name the UDC the gadget is bound to
  (e.g. musb-hdrc.0.auto).

  Without a function the first UVC function found is used.

Sources:
  Only one of --device, --camera, --image and --slideshow is used. A capture
  device takes priority over a camera, a camera over an image, and an image
  over a slideshow. --device and --image may not be combined. Without any
  source a test pattern is streamed.";

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// UVC function specifier (uvc.0, g1/functions/uvc.0 or a UDC name)
    #[arg(value_name = "UVC_FUNCTION")]
    function: Option<String>,

    /// V4L2 capture device
    #[arg(short, long, value_name = "DEVICE")]
    device: Option<String>,

    /// libcamera camera index or id
    #[arg(short, long, value_name = "INDEX|ID")]
    camera: Option<String>,

    /// MJPEG image
    #[arg(short, long, value_name = "IMAGE")]
    image: Option<String>,

    /// Directory of MJPEG images shown as a slideshow
    #[arg(short, long, value_name = "DIRECTORY")]
    slideshow: Option<String>,

    /// Autofocus range [normal, macro]
    #[arg(long, value_name = "MODE", requires = "camera", help_heading = "Camera")]
    autofocus_range: Option<String>,

    /// Autofocus speed [normal, fast]
    #[arg(long, value_name = "MODE", requires = "camera", help_heading = "Camera")]
    autofocus_speed: Option<String>,

    /// Manual lens position in dioptres [0.0 - 32.0], disables autofocus
    /// (0.0 = infinity, 0.5 = 2m, 2.0 = 50cm)
    #[arg(long, value_name = "VALUE", requires = "camera", help_heading = "Camera")]
    lens_position: Option<String>,

    /// White balance mode [auto, incandescent, tungsten, fluorescent,
    /// indoor, daylight, cloudy]
    #[arg(long, value_name = "MODE", requires = "camera", help_heading = "Camera")]
    awb: Option<String>,

    /// Red and blue colour gains [0.0 - 32.0], disables AWB
    #[arg(
        long,
        visible_alias = "awbgains",
        value_name = "RED,BLUE",
        requires = "camera",
        help_heading = "Camera"
    )]
    colour_gains: Option<String>,

    /// Exposure mode [normal, short, sport, long]
    #[arg(long, value_name = "MODE", requires = "camera", help_heading = "Camera")]
    exposure: Option<String>,

    /// Brightness [-1.0 - 1.0]
    #[arg(
        long,
        value_name = "VALUE",
        allow_negative_numbers = true,
        requires = "camera",
        help_heading = "Camera"
    )]
    brightness: Option<String>,

    /// Contrast [0.0 - 32.0], 1.0 is normal
    #[arg(long, value_name = "VALUE", requires = "camera", help_heading = "Camera")]
    contrast: Option<String>,

    /// Saturation [0.0 - 32.0], 0.0 is greyscale, 1.0 is normal
    #[arg(long, value_name = "VALUE", requires = "camera", help_heading = "Camera")]
    saturation: Option<String>,

    /// Sharpness [0.0 - 16.0], 1.0 is normal
    #[arg(long, value_name = "VALUE", requires = "camera", help_heading = "Camera")]
    sharpness: Option<String>,

    /// Print the lens position and colour gains every second
    #[arg(long, requires = "camera", help_heading = "Camera")]
    camera_debug_report: bool,

    /// Validate the options and print the selected source without starting
    /// the gadget
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn options(self) -> Options {
        Options {
            function: self.function,
            sources: SourceOptions {
                device: self.device,
                camera: self.camera,
                image: self.image,
                slideshow: self.slideshow,
            },
            controls: ControlArguments {
                af_range: self.autofocus_range,
                af_speed: self.autofocus_speed,
                lens_position: self.lens_position,
                awb: self.awb,
                colour_gains: self.colour_gains,
                exposure: self.exposure,
                brightness: self.brightness,
                contrast: self.contrast,
                saturation: self.saturation,
                sharpness: self.sharpness,
                debug_report: self.camera_debug_report,
            },
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    backend: &'a Backend,
    controls: &'a ControlSet,
    requests: Vec<ControlRequest>,
}

fn print_plan(plan: &Plan, json: bool) -> Result<(), CliError> {
    let requests = plan.controls.requests();

    if json {
        let report = Report {
            backend: &plan.backend,
            controls: &plan.controls,
            requests,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Source: {}", plan.backend);
    if requests.is_empty() {
        println!("Controls: automatic");
    } else {
        println!("Controls:");
        for request in &requests {
            println!("  {}", request);
        }
    }
    if plan.controls.debug_report_enabled {
        println!("Debug report: enabled");
    }

    Ok(())
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    let dry_run = args.dry_run;
    let options = args.options();
    log::debug!("Options: {:?}", options);

    if dry_run {
        let plan = options.plan()?;
        return print_plan(&plan, json);
    }

    Orchestrator::new(Gadget::new()).run(&options)?;
    Ok(())
}
