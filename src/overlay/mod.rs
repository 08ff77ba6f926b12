//! Click-through annotation layer above the mirror.
//!
//! The overlay is a borderless, topmost, fully composited window placed
//! exactly over the mirror's destination rectangle. A retained drawing surface
//! is sized to that rectangle and re-created whenever its pixel size changes
//! or the device is lost. Size changes requested while a frame is being drawn
//! are applied after the batch is presented, and a lost device is rebuilt once,
//! lazily, before the next frame.
//!
//! # Architecture
//!
//! ```text
//! mod.rs (AnnotationOverlay lifecycle, placement, render pass)
//!   |
//!   +-- draw.rs (drawing primitives and their geometry)
//! ```

mod draw;


pub use draw::{corner_box_segments, diamond_segments, outline_layers};

use crate::config::OverlayConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::mirror::OwnedWindow;
use crate::platform::{
    DrawStatus, DrawSurface, RenderBackend, TextStyle, WindowClass, WindowSystem,
};
use crate::types::{colors, Point, Rect, RelativeCursor, Size, WindowId};

/// Per-frame annotation hook: `(overlay, width, height)`.
pub type DrawCallback<W, B> = Box<dyn FnMut(&mut AnnotationOverlay<W, B>, i32, i32)>;

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No drawing surface yet
    Skipped,
    Presented,
    /// The device was lost; the surface is rebuilt once from current geometry
    /// before the next frame
    Recovered,
    /// The batch failed, or the rebuild after a device loss did
    Failed,
}

/// Annotation overlay bound to one mirror host window.
pub struct AnnotationOverlay<W, B>
where
    W: WindowSystem + Clone,
    B: RenderBackend,
{
    windows: W,
    backend: B,
    config: OverlayConfig,
    mirror_host: WindowId,
    // Declared before `window`: the surface must go before the window it draws to
    surface: Option<B::Surface>,
    window: Option<OwnedWindow<W>>,
    /// Mirror destination rectangle, host client coordinates
    destination: Rect,
    cursor: RelativeCursor,
    cursor_visible: bool,
    callback: Option<DrawCallback<W, B>>,
    callback_generation: u64,
    /// Rebuild the surface before it is used again (set by a device loss)
    surface_stale: bool,
    /// A frame is being drawn; surface changes wait for `end_draw`
    in_render: bool,
}

impl<W, B> AnnotationOverlay<W, B>
where
    W: WindowSystem + Clone,
    B: RenderBackend,
{
    pub fn new(windows: W, backend: B, mirror_host: WindowId, config: OverlayConfig) -> Self {
        Self {
            windows,
            backend,
            config,
            mirror_host,
            surface: None,
            window: None,
            destination: Rect::default(),
            cursor: RelativeCursor::UNKNOWN,
            cursor_visible: true,
            callback: None,
            callback_generation: 0,
            surface_stale: false,
            in_render: false,
        }
    }

    /// Create the overlay window and the drawing and text factories.
    ///
    /// The drawing surface itself is created by the first `reposition`.
    pub fn initialize(&mut self) -> MirrorResult<()> {
        if self.window.is_some() {
            self.teardown();
        }

        self.windows.register_class(WindowClass::Overlay)?;
        let window = OwnedWindow::create(self.windows.clone(), WindowClass::Overlay, Size::default())?;

        let style = TextStyle {
            family: self.config.font_family.clone(),
            locale: self.config.locale.clone(),
            size: self.config.font_size,
        };
        if let Err(e) = self.backend.initialize(&style) {
            log::warn!("[AnnotationOverlay] Backend initialization failed: {}", e);
            self.backend.release();
            return Err(match e {
                MirrorError::DeviceInit(_) => e,
                other => MirrorError::DeviceInit(other.to_string()),
            });
        }

        log::info!(
            "[AnnotationOverlay] Created overlay {:?} over host {:#x} ({} {}pt)",
            window.id(),
            self.mirror_host.0,
            style.family,
            style.size
        );
        self.window = Some(window);
        Ok(())
    }

    /// Follow a new mirror host window, e.g. after the mirror was re-initialized
    pub fn set_mirror_host(&mut self, host: WindowId) {
        self.mirror_host = host;
    }

    /// Move the overlay over `destination` (mirror host client coordinates).
    ///
    /// The drawing surface is only re-created when its pixel size changes.
    /// A degenerate destination drops the surface until a usable size arrives.
    /// Called from a draw callback, the window moves at once but the surface
    /// keeps its size until the frame has been presented.
    pub fn reposition(&mut self, destination: Rect) -> MirrorResult<()> {
        let window = self
            .window_id()
            .ok_or(MirrorError::NotInitialized("overlay window"))?;
        let origin = self
            .windows
            .client_to_screen(self.mirror_host, Point::new(0, 0))
            .ok_or(MirrorError::NotInitialized("mirror host window"))?;

        self.destination = destination;
        self.windows
            .set_window_bounds(window, destination.offset(origin.x, origin.y), true);

        if self.in_render {
            return Ok(());
        }
        self.sync_surface(window)
    }

    /// Replace the per-frame draw callback. Takes effect on the next render.
    pub fn set_draw_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Self, i32, i32) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self.callback_generation += 1;
    }

    pub fn clear_draw_callback(&mut self) {
        self.callback = None;
        self.callback_generation += 1;
    }

    pub fn has_draw_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Store the cursor sample used by the next render's cursor indicator
    pub fn update_cursor_state(&mut self, position: RelativeCursor, visible: bool) {
        self.cursor = position;
        self.cursor_visible = visible;
    }

    /// Draw one frame: clear, caller annotations, cursor indicator, present.
    ///
    /// A render requested from inside a draw callback is skipped.
    pub fn render(&mut self) -> RenderOutcome {
        if self.in_render {
            return RenderOutcome::Skipped;
        }
        if self.surface_stale {
            let Some(window) = self.window_id() else {
                return RenderOutcome::Skipped;
            };
            if let Err(e) = self.sync_surface(window) {
                let e = MirrorError::DeviceLost(format!("surface rebuild failed: {}", e));
                log::warn!("[AnnotationOverlay] {}", e);
                return RenderOutcome::Failed;
            }
        }
        let Some(surface) = self.surface.as_mut() else {
            return RenderOutcome::Skipped;
        };

        let (width, height) = (self.destination.width(), self.destination.height());
        surface.begin_draw();
        surface.clear(colors::TRANSPARENT);

        self.in_render = true;
        self.run_callback(width, height);
        self.draw_cursor(width, height);
        self.in_render = false;

        // The callback may have torn the overlay down
        let Some(surface) = self.surface.as_mut() else {
            log::debug!("[AnnotationOverlay] Surface released during render");
            return RenderOutcome::Failed;
        };

        match surface.end_draw() {
            DrawStatus::Ok => {
                self.apply_deferred_resize();
                RenderOutcome::Presented
            }
            DrawStatus::DeviceLost => self.discard_lost_surface(),
            DrawStatus::Failed(reason) => {
                log::warn!("[AnnotationOverlay] Draw batch failed: {}", reason);
                RenderOutcome::Failed
            }
        }
    }

    /// Drop the surface, the backend factories and the overlay window, in that order.
    pub fn teardown(&mut self) {
        self.surface = None;
        self.backend.release();
        if let Some(mut window) = self.window.take() {
            window.release();
        }
        self.destination = Rect::default();
        self.surface_stale = false;
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window.as_ref().and_then(|w| w.id())
    }

    pub fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    pub fn destination(&self) -> Rect {
        self.destination
    }

    pub fn cursor_state(&self) -> (RelativeCursor, bool) {
        (self.cursor, self.cursor_visible)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    fn rebuild_surface(&mut self, window: WindowId, size: Size) -> MirrorResult<()> {
        self.surface = None;
        if size.is_empty() {
            return Ok(());
        }

        let surface = self.backend.create_surface(window, size)?;
        log::debug!(
            "[AnnotationOverlay] Drawing surface {}x{}",
            size.width,
            size.height
        );
        self.surface = Some(surface);
        Ok(())
    }

    /// Bring the surface in line with the destination size
    fn sync_surface(&mut self, window: WindowId) -> MirrorResult<()> {
        let size = self.destination.size();
        if !self.surface_stale {
            if let Some(surface) = &self.surface {
                if surface.pixel_size() == size {
                    return Ok(());
                }
            }
        }
        self.rebuild_surface(window, size)?;
        self.surface_stale = false;
        Ok(())
    }

    fn apply_deferred_resize(&mut self) {
        let Some(window) = self.window_id() else {
            return;
        };
        if let Err(e) = self.sync_surface(window) {
            log::debug!("[AnnotationOverlay] Deferred surface resize failed: {}", e);
        }
    }

    fn discard_lost_surface(&mut self) -> RenderOutcome {
        log::warn!("[AnnotationOverlay] Device lost, drawing surface will be rebuilt");
        self.surface = None;
        self.surface_stale = true;
        self.backend.handle_device_lost();
        RenderOutcome::Recovered
    }

    fn run_callback(&mut self, width: i32, height: i32) {
        let Some(mut callback) = self.callback.take() else {
            return;
        };
        let generation = self.callback_generation;
        callback(self, width, height);

        // Keep a replacement installed from inside the callback
        if self.callback_generation == generation {
            self.callback = Some(callback);
        }
    }

    fn draw_cursor(&mut self, width: i32, height: i32) {
        if !self.cursor_visible {
            return;
        }
        let Some(center) = self.cursor.to_pixels(width, height) else {
            return;
        };

        let radius = self.config.cursor_radius;
        self.draw_solid_circle(center, radius, colors::WHITE);
        self.draw_hollow_circle(center, radius, self.config.cursor_outline_width, colors::BLACK);
    }
}

impl<W, B> Drop for AnnotationOverlay<W, B>
where
    W: WindowSystem + Clone,
    B: RenderBackend,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
