// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Orchestration of a gadget run
//!
//! [`Orchestrator::run`] walks the states below. A failure at any step jumps
//! straight to teardown, which releases whatever was acquired so far in
//! reverse order: stream, source, event loop, function configuration.
//!
//! ```text
//! Idle -> ArgumentsParsed -> Selected -> Validated -> SourceCreated
//!      -> SourceInitialized -> StreamAttached -> Running
//!      -> ShuttingDown -> Terminated
//! ```
//!
//! The collaborators are abstracted by [`Platform`] so the sequence can be
//! exercised without a gadget. [`Gadget`] is the libuvcgadget implementation.

use crate::{
    controls::{ControlArguments, ControlSet},
    events::{EventContext, EventLoop, RequestStop},
    function::FunctionConfig,
    interrupt,
    selection::{Backend, BackendKind, SourceOptions},
    source::{Source, VideoSource},
    stream::Stream,
    Error,
};
use serde::Serialize;
use signal_hook::SigId;
use std::{fmt, sync::Arc};

/// Factory for the collaborators a run needs.
pub trait Platform {
    type Function;
    type Events: EventLoop;
    type Source: VideoSource<Events = Self::Events>;
    type Stream;

    /// Resolve the gadget function, the first one found when `None`.
    fn resolve_function(&mut self, function: Option<&str>) -> Result<Self::Function, Error>;

    fn create_events(&mut self) -> Result<Self::Events, Error>;

    /// Route the interrupt signal to `target` for the rest of the process.
    fn arm_interrupt(&mut self, target: Arc<dyn RequestStop>) -> Result<(), Error>;

    fn create_source(&mut self, backend: &Backend) -> Result<Self::Source, Error>;

    fn attach_stream(
        &mut self,
        function: &Self::Function,
        source: &mut Self::Source,
        events: &mut Self::Events,
    ) -> Result<Self::Stream, Error>;
}

/// Everything a run is configured with, still in textual form
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// UVC function specifier, see [`FunctionConfig`]
    pub function: Option<String>,
    pub sources: SourceOptions,
    pub controls: ControlArguments,
}

/// The outcome of selection and validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub backend: Backend,
    pub controls: ControlSet,
}

impl Options {
    /// Select the backend and validate the controls without touching any
    /// device.
    pub fn plan(&self) -> Result<Plan, Error> {
        let backend = self.sources.select()?;
        let controls = ControlSet::from_arguments(&self.controls)?;

        if backend.kind() != BackendKind::CameraPipeline && self.controls.any() {
            log::warn!("Camera controls are ignored by the {} source", backend.kind());
        }

        Ok(Plan { backend, controls })
    }
}

/// Lifecycle state of an [`Orchestrator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Idle,
    ArgumentsParsed,
    Selected,
    Validated,
    SourceCreated,
    SourceInitialized,
    StreamAttached,
    Running,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Resources acquired during a run, released in reverse acquisition order.
struct Session<P: Platform> {
    stream: Option<P::Stream>,
    source: Option<P::Source>,
    events: Option<P::Events>,
    function: Option<P::Function>,
}

impl<P: Platform> Session<P> {
    fn new() -> Self {
        Session {
            stream: None,
            source: None,
            events: None,
            function: None,
        }
    }

    /// Release what was acquired. Each resource is taken out of its slot, so
    /// calling this again is a no-op.
    fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("Releasing UVC stream");
            drop(stream);
        }
        if let Some(source) = self.source.take() {
            log::debug!("Releasing {} source", source.kind());
            drop(source);
        }
        if let Some(events) = self.events.take() {
            log::debug!("Releasing event loop");
            drop(events);
        }
        if let Some(function) = self.function.take() {
            log::debug!("Releasing function configuration");
            drop(function);
        }
    }
}

impl<P: Platform> Drop for Session<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drives one run of the gadget on a [`Platform`].
pub struct Orchestrator<P: Platform> {
    platform: P,
    state: State,
    transitions: Vec<State>,
}

impl<P: Platform> Orchestrator<P> {
    pub fn new(platform: P) -> Self {
        Orchestrator {
            platform,
            state: State::Idle,
            transitions: vec![State::Idle],
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Every state entered so far, starting with [`State::Idle`].
    pub fn transitions(&self) -> &[State] {
        &self.transitions
    }

    fn transition(&mut self, next: State) {
        log::debug!("{} -> {}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    /// Run until interrupted. Returns once every acquired resource has been
    /// released, with the first error encountered if any.
    ///
    /// Selection and validation failures terminate directly, nothing has
    /// been acquired at that point.
    pub fn run(&mut self, options: &Options) -> Result<(), Error> {
        self.transition(State::ArgumentsParsed);

        let plan = match options.plan() {
            Ok(plan) => plan,
            Err(err) => {
                self.transition(State::Terminated);
                return Err(err);
            }
        };
        self.transition(State::Selected);
        self.transition(State::Validated);

        let mut session = Session::<P>::new();
        let result = self.drive(&plan, options.function.as_deref(), &mut session);
        if let Err(err) = &result {
            log::debug!("Aborting in state {}: {}", self.state, err);
        }

        self.transition(State::ShuttingDown);
        session.teardown();
        self.transition(State::Terminated);

        result
    }

    fn drive(
        &mut self,
        plan: &Plan,
        function: Option<&str>,
        session: &mut Session<P>,
    ) -> Result<(), Error> {
        let function = session
            .function
            .insert(self.platform.resolve_function(function)?);
        let events = session.events.insert(self.platform.create_events()?);
        self.platform.arm_interrupt(events.stopper())?;

        log::info!("Starting {} source", plan.backend);
        let source = session
            .source
            .insert(self.platform.create_source(&plan.backend)?);
        self.transition(State::SourceCreated);

        if source.kind() == BackendKind::CameraPipeline {
            source.apply_controls(&plan.controls)?;
        }
        source.initialize(events)?;
        self.transition(State::SourceInitialized);

        session.stream = Some(self.platform.attach_stream(function, source, events)?);
        self.transition(State::StreamAttached);

        log::info!("Streaming (Ctrl+C to stop)...");
        self.transition(State::Running);
        events.run()?;

        log::info!("Stop requested, shutting down");
        Ok(())
    }
}

/// libuvcgadget-backed [`Platform`]
#[derive(Debug, Default)]
pub struct Gadget {
    signals: Vec<SigId>,
}

impl Gadget {
    pub fn new() -> Self {
        Gadget::default()
    }
}

impl Platform for Gadget {
    type Function = FunctionConfig;
    type Events = EventContext;
    type Source = Source;
    type Stream = Stream;

    fn resolve_function(&mut self, function: Option<&str>) -> Result<FunctionConfig, Error> {
        FunctionConfig::resolve(function)
    }

    fn create_events(&mut self) -> Result<EventContext, Error> {
        EventContext::new()
    }

    fn arm_interrupt(&mut self, target: Arc<dyn RequestStop>) -> Result<(), Error> {
        interrupt::set_stop_target(target)?;
        self.signals = interrupt::install()?;
        Ok(())
    }

    fn create_source(&mut self, backend: &Backend) -> Result<Source, Error> {
        Source::create(backend)
    }

    fn attach_stream(
        &mut self,
        function: &FunctionConfig,
        source: &mut Source,
        events: &mut EventContext,
    ) -> Result<Stream, Error> {
        Stream::new(function, source, events)
    }
}

impl Drop for Gadget {
    fn drop(&mut self) {
        interrupt::uninstall(self.signals.drain(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ExposureMode;

    #[test]
    fn test_plan_default() {
        let plan = Options::default().plan().unwrap();
        assert_eq!(plan.backend, Backend::SyntheticPattern);
        assert!(plan.controls.is_unset());
    }

    #[test]
    fn test_plan_camera_controls() {
        let mut options = Options::default();
        options.sources.camera = Some("0".into());
        options.controls.exposure = Some("long".into());

        let plan = options.plan().unwrap();
        assert_eq!(plan.backend, Backend::CameraPipeline("0".into()));
        assert_eq!(plan.controls.exposure_mode, Some(ExposureMode::Long));
    }

    #[test]
    fn test_plan_rejects_before_validation() {
        let mut options = Options::default();
        options.sources.device = Some("/dev/video0".into());
        options.sources.image = Some("a.jpg".into());
        options.controls.brightness = Some("5".into());

        assert!(matches!(
            options.plan(),
            Err(Error::SelectionConflict { .. })
        ));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(State::StreamAttached.to_string(), "StreamAttached");
    }
}
