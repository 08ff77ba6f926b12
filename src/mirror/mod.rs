//! Live compositor mirror of a foreign window.
//!
//! `MirrorSurface` owns a host window and a thumbnail link projecting the
//! source window's client area into it. The projection is re-fitted when the
//! host is resized, moves across monitors, or the source's client area
//! changes size.
//!
//! The compositor has no change notification for a foreign window's client
//! size, so the source is re-read on a host timer. A source resize is picked
//! up at most one poll period late.
//!
//! Host size, timer and DPI events are handled from inside the host window
//! procedure through a registered handler, so the projection keeps up while
//! the user drags the host's frame. The handler only holds a weak reference
//! to the mirror state; an event arriving while that state is already in use
//! further up the stack is queued and reaches `handle_event` via the driver.
//!
//! # Architecture
//!
//! ```text
//! mod.rs (MirrorSurface, host event state machine)
//!   |
//!   +-- projection.rs (aspect fitting, minimum host size)
//!   +-- resources.rs (owned window, thumbnail link, timer)
//! ```

pub mod projection;
mod resources;


pub use resources::{OwnedWindow, ThumbnailLink, WindowTimer};

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::platform::{
    EventHandler, HostEvent, LoopControl, ThumbnailCompositor, ThumbnailProperties, WindowClass,
    WindowEvent, WindowSystem,
};
use crate::types::{Rect, RelativeCursor, Size, WindowId, SOURCE_POLL_TIMER};

use projection::{chrome_size, fit_centered, minimum_host_size};

/// Full opacity for the thumbnail projection
const THUMBNAIL_OPACITY: u8 = 255;

/// Compositor-backed mirror of one source window.
///
/// A handle over state shared with the host window's event handler.
pub struct MirrorSurface<W, C>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
{
    state: Rc<RefCell<MirrorState<W, C>>>,
}

/// Resource fields are released timer first, then link, then host window.
struct MirrorState<W, C>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
{
    windows: W,
    compositor: C,
    config: MirrorConfig,
    source: Option<WindowId>,
    timer: Option<WindowTimer<W>>,
    link: Option<ThumbnailLink<C>>,
    host: Option<OwnedWindow<W>>,
    /// Source client area relative to the source window origin (baseline)
    source_client: Rect,
    /// Current projection target inside the host client area
    destination: Rect,
}

impl<W, C> MirrorSurface<W, C>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
{
    pub fn new(windows: W, compositor: C, config: MirrorConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(MirrorState {
                windows,
                compositor,
                config,
                source: None,
                timer: None,
                link: None,
                host: None,
                source_client: Rect::default(),
                destination: Rect::default(),
            })),
        }
    }

    /// Create the host window, link it to `source` and start handling host
    /// events as they arrive.
    ///
    /// On failure every resource acquired so far is released before returning.
    pub fn initialize(&mut self, source: WindowId) -> MirrorResult<()>
    where
        W: 'static,
        C: 'static,
    {
        self.state.borrow_mut().initialize(source)?;

        let state = self.state.borrow();
        if let Some(host) = state.host_window() {
            state.windows.set_event_handler(host, Some(host_handler(&self.state)));
        }
        Ok(())
    }

    /// Minimum outer host size keeping the mirrored content at physical 1:1.
    pub fn compute_minimum_host_size(&self) -> Size {
        self.state.borrow().compute_minimum_host_size()
    }

    /// Re-fit the source into the host client area and push it to the link.
    ///
    /// Fails without touching the link when the link or host is missing or
    /// either area is degenerate.
    pub fn refresh_projection(&mut self) -> MirrorResult<Rect> {
        self.state.borrow_mut().refresh_projection()
    }

    /// Re-read the source client area; re-project when it changed.
    ///
    /// Returns true when a change was detected.
    pub fn poll_source_resize(&mut self) -> bool {
        self.state.borrow_mut().poll_source_resize()
    }

    /// Cursor position inside the source client area on the 0..=1000 scale,
    /// or the sentinel when unknown or outside.
    pub fn relative_mouse_position(&self) -> RelativeCursor {
        self.state.borrow().relative_mouse_position()
    }

    /// Whether the cursor lies on the source's on-screen client area
    /// (right/bottom edges excluded).
    pub fn is_cursor_over_source(&self) -> bool {
        self.state.borrow().is_cursor_over_source()
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.state.borrow().windows.is_cursor_showing()
    }

    /// Host window state machine, for events that came through the queue.
    pub fn handle_event(&mut self, event: WindowEvent) -> LoopControl {
        self.state.borrow_mut().handle_event(event)
    }

    /// Release timer, link and host window. Safe to call at any time, any number of times.
    pub fn teardown(&mut self) {
        self.state.borrow_mut().teardown();
    }

    pub fn host_window(&self) -> Option<WindowId> {
        self.state.borrow().host_window()
    }

    pub fn source_window(&self) -> Option<WindowId> {
        self.state.borrow().source
    }

    /// Last computed projection target, host client coordinates
    pub fn destination_rect(&self) -> Rect {
        self.state.borrow().destination
    }

    /// Baseline source client area, source window coordinates
    pub fn source_client_rect(&self) -> Rect {
        self.state.borrow().source_client
    }

    pub fn is_linked(&self) -> bool {
        self.state.borrow().link.is_some()
    }
}

/// Handler run by the host window procedure. Declines while the state is
/// borrowed, which sends the event to the queue instead.
fn host_handler<W, C>(state: &Rc<RefCell<MirrorState<W, C>>>) -> EventHandler
where
    W: WindowSystem + Clone + 'static,
    C: ThumbnailCompositor + Clone + 'static,
{
    let state = Rc::downgrade(state);
    Rc::new(move |event: WindowEvent| {
        let Some(state) = state.upgrade() else {
            return false;
        };
        let handled = match state.try_borrow_mut() {
            Ok(mut state) => {
                state.handle_event(event);
                true
            }
            Err(_) => false,
        };
        handled
    })
}

impl<W, C> MirrorState<W, C>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
{
    fn initialize(&mut self, source: WindowId) -> MirrorResult<()> {
        if self.host.is_some() {
            self.teardown();
        }

        if source.is_null() || !self.windows.is_window(source) {
            return Err(MirrorError::InvalidSource(format!("{:#x}", source.0)));
        }

        self.windows.register_class(WindowClass::MirrorHost)?;

        let initial = Size::new(self.config.initial_host_width, self.config.initial_host_height);
        let host_id = self.windows.create_window(WindowClass::MirrorHost, initial)?;
        let host = OwnedWindow::adopt(self.windows.clone(), host_id);

        let link = ThumbnailLink::register(self.compositor.clone(), host_id, source).map_err(|e| {
            log::warn!("[MirrorSurface] Compositor refused thumbnail: {}", e);
            match e {
                MirrorError::Registration(_) => e,
                other => MirrorError::Registration(other.to_string()),
            }
        })?;

        let source_client = self.windows.client_rect_in_window(source).ok_or_else(|| {
            MirrorError::Registration("source client area unavailable".to_string())
        })?;

        let timer = WindowTimer::start(
            self.windows.clone(),
            host_id,
            SOURCE_POLL_TIMER,
            self.config.poll_interval(),
        )?;

        self.source = Some(source);
        self.source_client = source_client;
        self.timer = Some(timer);
        self.link = Some(link);
        self.host = Some(host);

        let min = self.compute_minimum_host_size();
        self.windows.set_min_track_size(host_id, min);
        if let Some(rect) = self.windows.window_rect(host_id) {
            if rect.width() < min.width || rect.height() < min.height {
                self.windows.resize_window(
                    host_id,
                    Size::new(rect.width().max(min.width), rect.height().max(min.height)),
                );
            }
        }

        self.windows.show_window(host_id);
        if let Err(e) = self.refresh_projection() {
            log::debug!("[MirrorSurface] Initial projection skipped: {}", e);
        }

        log::info!(
            "[MirrorSurface] Mirroring {:#x} into {:#x}, source client {:?}, min host {:?}",
            source.0,
            host_id.0,
            source_client,
            min
        );
        Ok(())
    }

    fn compute_minimum_host_size(&self) -> Size {
        let fallback = Size::new(self.config.fallback_min_width, self.config.fallback_min_height);

        let (Some(source), Some(host)) = (self.live_source(), self.host_window()) else {
            return fallback;
        };
        let Some(client) = self.windows.client_rect_in_window(source) else {
            return fallback;
        };
        if client.is_empty() {
            return fallback;
        }

        let chrome = match (self.windows.window_rect(host), self.windows.client_rect(host)) {
            (Some(window), Some(client)) => chrome_size(window, client),
            _ => Size::default(),
        };

        minimum_host_size(
            client.size(),
            self.windows.dpi_for_window(source),
            self.windows.dpi_for_window(host),
            self.config.content_margin,
            chrome,
        )
    }

    fn refresh_projection(&mut self) -> MirrorResult<Rect> {
        let link = self
            .link
            .as_ref()
            .ok_or(MirrorError::NotInitialized("thumbnail link"))?;
        let host = self
            .host
            .as_ref()
            .and_then(|h| h.id())
            .filter(|h| self.windows.is_window(*h))
            .ok_or(MirrorError::NotInitialized("host window"))?;
        let client = self
            .windows
            .client_rect(host)
            .ok_or(MirrorError::NotInitialized("host client area"))?;

        let destination = fit_centered(self.source_client.size(), client.size()).ok_or_else(|| {
            MirrorError::DegenerateGeometry(format!(
                "source {}x{}, host {}x{}",
                self.source_client.width(),
                self.source_client.height(),
                client.width(),
                client.height()
            ))
        })?;

        self.destination = destination;
        link.update(&ThumbnailProperties {
            source: self.source_client,
            destination,
            opacity: THUMBNAIL_OPACITY,
            visible: true,
        })?;

        Ok(destination)
    }

    fn poll_source_resize(&mut self) -> bool {
        let Some(source) = self.live_source() else {
            return false;
        };
        let Some(current) = self.windows.client_rect_in_window(source) else {
            return false;
        };
        if current == self.source_client {
            return false;
        }

        log::debug!(
            "[MirrorSurface] Source client changed {:?} -> {:?}",
            self.source_client,
            current
        );
        self.source_client = current;
        self.publish_min_track_size();
        if let Err(e) = self.refresh_projection() {
            log::debug!("[MirrorSurface] Projection skipped: {}", e);
        }
        true
    }

    fn relative_mouse_position(&self) -> RelativeCursor {
        let Some(source) = self.live_source() else {
            return RelativeCursor::UNKNOWN;
        };
        let Some(cursor) = self.windows.cursor_position() else {
            return RelativeCursor::UNKNOWN;
        };
        match (
            self.windows.screen_to_client(source, cursor),
            self.windows.client_rect(source),
        ) {
            (Some(point), Some(client)) => RelativeCursor::from_client_point(point, client),
            _ => RelativeCursor::UNKNOWN,
        }
    }

    fn is_cursor_over_source(&self) -> bool {
        let Some(source) = self.live_source() else {
            return false;
        };
        let (Some(cursor), Some(client)) =
            (self.windows.cursor_position(), self.windows.client_rect(source))
        else {
            return false;
        };
        match (
            self.windows.client_to_screen(source, client.top_left()),
            self.windows.client_to_screen(source, client.bottom_right()),
        ) {
            (Some(top_left), Some(bottom_right)) => {
                Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y).contains(cursor)
            }
            _ => false,
        }
    }

    fn handle_event(&mut self, event: WindowEvent) -> LoopControl {
        let Some(host) = self.host_window() else {
            return LoopControl::Continue;
        };
        if event.window != host {
            return LoopControl::Continue;
        }

        match event.event {
            HostEvent::Resized => {
                if self.link.is_some() {
                    if let Err(e) = self.refresh_projection() {
                        log::debug!("[MirrorSurface] Resize projection skipped: {}", e);
                    }
                }
            }
            HostEvent::Timer(timer) if timer == SOURCE_POLL_TIMER => {
                self.poll_source_resize();
            }
            HostEvent::Timer(_) => {}
            HostEvent::DpiChanged { dpi, suggested } => {
                log::info!("[MirrorSurface] Host DPI changed to {}, bounds {:?}", dpi, suggested);
                self.windows.set_window_bounds(host, suggested, false);
                self.publish_min_track_size();
                if let Err(e) = self.refresh_projection() {
                    log::debug!("[MirrorSurface] DPI projection skipped: {}", e);
                }
            }
            HostEvent::Destroyed => {
                log::info!("[MirrorSurface] Host window destroyed");
                self.windows.set_event_handler(host, None);
                self.release_link();
                if let Some(mut host) = self.host.take() {
                    host.forget();
                }
                return LoopControl::Exit(0);
            }
        }
        LoopControl::Continue
    }

    fn teardown(&mut self) {
        if let Some(host) = self.host_window() {
            self.windows.set_event_handler(host, None);
        }
        self.release_link();
        if let Some(mut host) = self.host.take() {
            host.release();
        }
        self.source = None;
        self.source_client = Rect::default();
        self.destination = Rect::default();
    }

    fn host_window(&self) -> Option<WindowId> {
        self.host.as_ref().and_then(|h| h.id())
    }

    fn live_source(&self) -> Option<WindowId> {
        self.source.filter(|s| self.windows.is_window(*s))
    }

    fn release_link(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.release();
        }
        if let Some(mut link) = self.link.take() {
            link.release();
        }
    }

    fn publish_min_track_size(&self) {
        if let Some(host) = self.host_window() {
            let min = self.compute_minimum_host_size();
            self.windows.set_min_track_size(host, min);
        }
    }
}

impl<W, C> Drop for MirrorState<W, C>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
