//! Windowing toolkit
//!
//! A small GLUT-style layer over winit and the render crate:
//!
//! 1. [`Toolkit::init`] creates the process-wide event loop and consumes
//!    toolkit flags from the process arguments.
//! 2. Setup calls record the display mode, window, clear color and display
//!    callback into [`ToolkitState`].
//! 3. [`Toolkit::main_loop`] creates the window and its render context, then
//!    dispatches redraws to the display callback until the window closes.
//!
//! The toolkit owns the window's [`RenderContext`](redtri_render::RenderContext)
//! and lends it to the callback through a [`Gl`] for each redraw.

mod app;
pub mod args;

use bitflags::bitflags;
use redtri_render::{ContextError, DrawError, Gl, GlState, RenderError, RenderTarget};
use winit::event_loop::EventLoop;

pub use args::{Geometry, ToolkitOptions};

bitflags! {
    /// Framebuffer capabilities requested for new windows
    ///
    /// `RGB` and `SINGLE` are zero, so every mode `contains` them. Test for
    /// single buffering with [`DisplayMode::is_double_buffered`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DisplayMode: u32 {
        /// RGB color buffer (always present)
        const RGB = 0;
        /// Single buffering; zero, meaning `DOUBLE` is not set
        const SINGLE = 0;
        /// Draw to a back buffer and present with `swap_buffers`
        const DOUBLE = 1 << 1;
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::RGB | DisplayMode::SINGLE
    }
}

impl DisplayMode {
    pub fn is_double_buffered(&self) -> bool {
        self.contains(DisplayMode::DOUBLE)
    }
}

/// Toolkit errors
#[derive(Debug)]
pub enum ToolkitError {
    /// The event loop could not be created (no display available)
    EventLoop(String),
    /// A flag that takes a value was last on the command line
    MissingFlagValue(&'static str),
    /// Malformed `-geometry` value
    InvalidGeometry(String),
    /// Both `-direct` and `-indirect` were given
    AmbiguousRendering,
    /// Window dimensions must be non-zero
    InvalidWindowSize { width: u32, height: u32 },
    /// Only one window is supported
    WindowAlreadyCreated,
    /// `main_loop` called before `create_window`
    NoWindow,
    /// `main_loop` called before `display_func`
    NoDisplayCallback,
    /// The native window could not be created
    WindowCreation(String),
    /// The render context could not be created
    Context(ContextError),
    /// Fatal error while presenting a frame
    Render(RenderError),
}

impl std::fmt::Display for ToolkitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolkitError::EventLoop(msg) => write!(f, "Failed to initialize event loop: {}", msg),
            ToolkitError::MissingFlagValue(flag) => write!(f, "Missing value for {}", flag),
            ToolkitError::InvalidGeometry(spec) => write!(f, "Invalid geometry: {}", spec),
            ToolkitError::AmbiguousRendering => {
                write!(f, "-direct and -indirect are mutually exclusive")
            }
            ToolkitError::InvalidWindowSize { width, height } => {
                write!(f, "Invalid window size {}x{}", width, height)
            }
            ToolkitError::WindowAlreadyCreated => write!(f, "A window has already been created"),
            ToolkitError::NoWindow => write!(f, "main_loop called with no window"),
            ToolkitError::NoDisplayCallback => write!(f, "No display callback registered"),
            ToolkitError::WindowCreation(msg) => write!(f, "Window creation failed: {}", msg),
            ToolkitError::Context(err) => write!(f, "{}", err),
            ToolkitError::Render(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ToolkitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolkitError::Context(err) => Some(err),
            ToolkitError::Render(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContextError> for ToolkitError {
    fn from(err: ContextError) -> Self {
        ToolkitError::Context(err)
    }
}

/// Requested window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub position: Option<(i32, i32)>,
    pub iconic: bool,
    pub display_mode: DisplayMode,
}

/// Display callback, invoked once per redraw
pub type DisplayCallback = Box<dyn FnMut(&mut Gl<'_>) -> Result<(), DrawError>>;

/// Toolkit state that does not depend on the event loop
pub struct ToolkitState {
    options: ToolkitOptions,
    display_mode: DisplayMode,
    window: Option<WindowSpec>,
    gl: GlState,
    display: Option<DisplayCallback>,
}

impl ToolkitState {
    pub fn new(options: ToolkitOptions) -> Self {
        Self {
            options,
            display_mode: DisplayMode::default(),
            window: None,
            gl: GlState::default(),
            display: None,
        }
    }

    pub fn options(&self) -> &ToolkitOptions {
        &self.options
    }

    /// The requested window, once created
    pub fn window(&self) -> Option<&WindowSpec> {
        self.window.as_ref()
    }

    pub fn gl_state(&self) -> &GlState {
        &self.gl
    }

    pub fn has_display_callback(&self) -> bool {
        self.display.is_some()
    }

    /// Set the display mode for windows created afterwards
    pub fn init_display_mode(&mut self, mode: DisplayMode) {
        if self.window.is_some() {
            log::warn!(
                "Display mode set after window creation; the window keeps {:?}",
                self.display_mode
            );
        }
        self.display_mode = mode;
    }

    /// Request the program's window
    pub fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
    ) -> Result<(), ToolkitError> {
        if width == 0 || height == 0 {
            return Err(ToolkitError::InvalidWindowSize { width, height });
        }
        if self.window.is_some() {
            return Err(ToolkitError::WindowAlreadyCreated);
        }

        // The program's size wins over -geometry, only the position is taken
        if let Some((w, h)) = self.options.geometry.and_then(|g| g.size) {
            log::debug!("-geometry size {}x{} overridden by {}x{}", w, h, width, height);
        }

        self.window = Some(WindowSpec {
            width,
            height,
            title: title.to_string(),
            position: self.options.initial_position(),
            iconic: self.options.iconic,
            display_mode: self.display_mode,
        });
        Ok(())
    }

    /// Set the color used by `Gl::clear`, each channel clamped to [0, 1]
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.set_clear_color(r, g, b, a);
    }

    /// Register the display callback, replacing any previous one
    pub fn display_func<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Gl<'_>) -> Result<(), DrawError> + 'static,
    {
        self.display = Some(Box::new(callback));
    }

    /// Check that the loop has a window and a display callback to run
    pub fn check_ready(&self) -> Result<(), ToolkitError> {
        if self.window.is_none() {
            return Err(ToolkitError::NoWindow);
        }
        if self.display.is_none() {
            return Err(ToolkitError::NoDisplayCallback);
        }
        Ok(())
    }

    /// Invoke the display callback once against `target`.
    ///
    /// A batch left open when the callback returns is discarded and reported
    /// as [`DrawError::UnterminatedBatch`].
    pub fn redisplay(&mut self, target: &mut dyn RenderTarget) -> Result<(), DrawError> {
        let Some(display) = self.display.as_mut() else {
            log::debug!("Redisplay with no display callback");
            return Ok(());
        };

        let mut gl = Gl::new(&mut self.gl, target);
        let result = display(&mut gl);
        let finished = gl.finish();
        result.and(finished)
    }
}

/// The process-wide toolkit: event loop plus state
pub struct Toolkit {
    event_loop: EventLoop<()>,
    state: ToolkitState,
}

impl Toolkit {
    /// Initialize the toolkit from the process arguments.
    ///
    /// Returns the toolkit and the arguments it did not consume.
    pub fn init<I>(args: I) -> Result<(Self, Vec<String>), ToolkitError>
    where
        I: IntoIterator<Item = String>,
    {
        let (options, remaining) = args::parse_args(args)?;
        let event_loop = EventLoop::new().map_err(|e| ToolkitError::EventLoop(e.to_string()))?;
        log::debug!("Toolkit initialized with {:?}", options);

        Ok((
            Self {
                event_loop,
                state: ToolkitState::new(options),
            },
            remaining,
        ))
    }

    /// Setup calls go through the state
    pub fn state_mut(&mut self) -> &mut ToolkitState {
        &mut self.state
    }

    /// Run the event loop until the window closes
    pub fn main_loop(self, gpu: redtri_render::GpuOptions) -> Result<(), ToolkitError> {
        self.state.check_ready()?;

        let mut app = app::ToolkitApp::new(self.state, gpu);
        self.event_loop
            .run_app(&mut app)
            .map_err(|e| ToolkitError::EventLoop(e.to_string()))?;

        match app.into_fatal_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
