//! Capabilities the core consumes from the host system.
//!
//! The mirror and the overlay never call the OS directly. They talk to three
//! traits:
//!
//! ```text
//! WindowSystem          windows, classes, timers, geometry, cursor, DPI, message pump
//! ThumbnailCompositor   register / update / unregister a live thumbnail
//! RenderBackend         drawing + text factories, per-window drawing surfaces
//!   +-- DrawSurface     begin / clear / primitives / end
//! ```
//!
//! # Modules
//!
//! - `win32` - real implementations (DWM, Direct2D, DirectWrite), Windows only
//! - `fake` - in-memory implementations for unit tests

use std::rc::Rc;
use std::time::Duration;

use crate::error::MirrorResult;
use crate::types::{
    Color, Point, PointF, Rect, RectF, Size, SizeF, ThumbnailId, TimerId, WindowId,
};

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub mod fake;

// ============================================================================
// Window system
// ============================================================================

/// Kind of native window a component asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// Resizable, decorated window hosting the thumbnail
    MirrorHost,
    /// Borderless, topmost, click-through, fully composited window
    Overlay,
}

/// Host-system notification, already decoded from the native message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Client area changed size
    Resized,
    /// A timer registered on the window fired
    Timer(TimerId),
    /// Window moved to a monitor with another DPI; `suggested` is the new outer rect
    DpiChanged { dpi: u32, suggested: Rect },
    /// Window is being destroyed by the system (user closed it)
    Destroyed,
}

/// A host event together with the window it was delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    pub window: WindowId,
    pub event: HostEvent,
}

/// Result of one non-blocking pass over the message queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// Queue drained, keep going
    Continue,
    /// Quit message retrieved with this exit code
    Quit(i32),
}

/// What the driver loop should do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit(i32),
}

/// Handler run from inside the window procedure.
///
/// Returns false when it cannot take the event right now (for instance while
/// its owner is busy further up the stack); the event is then queued instead.
pub type EventHandler = Rc<dyn Fn(WindowEvent) -> bool>;

/// Native windowing operations.
///
/// Implementations are cheap handles (methods take `&self`); the components
/// each hold their own clone.
pub trait WindowSystem {
    /// Whether the handle currently refers to a live window
    fn is_window(&self, window: WindowId) -> bool;

    /// Register a window class. Registering twice is not an error.
    fn register_class(&self, class: WindowClass) -> MirrorResult<()>;

    /// Create a window of a registered class with the given outer size
    fn create_window(&self, class: WindowClass, size: Size) -> MirrorResult<WindowId>;

    fn destroy_window(&self, window: WindowId);

    fn show_window(&self, window: WindowId);

    /// Outer window rectangle in screen coordinates
    fn window_rect(&self, window: WindowId) -> Option<Rect>;

    /// Client rectangle in client coordinates (origin at 0,0)
    fn client_rect(&self, window: WindowId) -> Option<Rect>;

    /// Client rectangle relative to the window's outer top-left corner
    fn client_rect_in_window(&self, window: WindowId) -> Option<Rect>;

    fn client_to_screen(&self, window: WindowId, point: Point) -> Option<Point>;

    fn screen_to_client(&self, window: WindowId, point: Point) -> Option<Point>;

    /// Global cursor position in screen coordinates
    fn cursor_position(&self) -> Option<Point>;

    /// Whether the system cursor is currently showing
    fn is_cursor_showing(&self) -> bool;

    /// Effective DPI of the monitor nearest to the window
    fn dpi_for_window(&self, window: WindowId) -> u32;

    /// Resize without moving or changing z-order
    fn resize_window(&self, window: WindowId, size: Size);

    /// Move and resize; `topmost` also raises into the topmost band and shows
    fn set_window_bounds(&self, window: WindowId, bounds: Rect, topmost: bool);

    /// Minimum outer size the window may be resized to interactively
    fn set_min_track_size(&self, window: WindowId, size: Size);

    fn set_timer(&self, window: WindowId, timer: TimerId, period: Duration) -> MirrorResult<()>;

    fn kill_timer(&self, window: WindowId, timer: TimerId);

    /// Dispatch every pending message without blocking
    fn pump_messages(&self) -> PumpStatus;

    /// Take the host events produced since the last call, in delivery order
    fn take_events(&self) -> Vec<WindowEvent>;

    /// Install (or with `None`, remove) the synchronous handler of `window`.
    ///
    /// `Resized`, `Timer` and `DpiChanged` reach the handler as the message
    /// arrives, including inside the system's modal size/move loop. Declined
    /// events and every `Destroyed` go to the queue read by `take_events`.
    fn set_event_handler(&self, window: WindowId, handler: Option<EventHandler>);
}

// ============================================================================
// Compositor
// ============================================================================

/// Geometry pushed to a thumbnail link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailProperties {
    /// Region of the source window (window-relative) to mirror
    pub source: Rect,
    /// Region of the host client area to project into
    pub destination: Rect,
    pub opacity: u8,
    pub visible: bool,
}

/// Live-thumbnail service of the desktop compositor.
pub trait ThumbnailCompositor {
    fn register(&self, host: WindowId, source: WindowId) -> MirrorResult<ThumbnailId>;

    fn update(&self, link: ThumbnailId, properties: &ThumbnailProperties) -> MirrorResult<()>;

    fn unregister(&self, link: ThumbnailId);
}

// ============================================================================
// Rendering
// ============================================================================

/// Outcome of closing a drawing batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawStatus {
    Ok,
    /// The surface and its device must be recreated
    DeviceLost,
    Failed(String),
}

/// One pass of a layered text draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayer {
    pub origin: PointF,
    pub color: Color,
}

/// Font and locale used to build the backend's text format.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub locale: String,
    pub size: f32,
}

/// A drawing surface bound to one window at a fixed pixel size.
///
/// Every primitive creates and releases its own brush.
pub trait DrawSurface {
    fn pixel_size(&self) -> Size;

    fn begin_draw(&mut self);

    fn clear(&mut self, color: Color);

    fn draw_line(&mut self, start: PointF, end: PointF, stroke_width: f32, color: Color);

    fn fill_ellipse(&mut self, center: PointF, radius: f32, color: Color);

    fn draw_ellipse(&mut self, center: PointF, radius: f32, stroke_width: f32, color: Color);

    fn fill_rect(&mut self, rect: RectF, color: Color);

    fn draw_rect(&mut self, rect: RectF, stroke_width: f32, color: Color);

    /// Draw one text layout several times, once per layer, in order
    fn draw_text_layers(&mut self, text: &str, font_size: f32, layers: &[TextLayer]);

    fn end_draw(&mut self) -> DrawStatus;
}

/// 2D drawing and text backend.
pub trait RenderBackend {
    type Surface: DrawSurface;

    /// Create the drawing factory, text factory and text format.
    /// On failure nothing created so far may be kept.
    fn initialize(&mut self, style: &TextStyle) -> MirrorResult<()>;

    fn is_initialized(&self) -> bool;

    fn create_surface(&mut self, window: WindowId, size: Size) -> MirrorResult<Self::Surface>;

    /// Drop device-dependent state after a lost device
    fn handle_device_lost(&mut self);

    fn measure_text(&self, text: &str, font_size: f32) -> Option<SizeF>;

    /// Release text format, text factory and drawing factory, in that order
    fn release(&mut self);
}
