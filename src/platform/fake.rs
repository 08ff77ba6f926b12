//! In-memory platform used by the unit tests.
//!
//! Each fake is a cheap handle over shared state so a test can keep a clone,
//! hand another to the component under test, then script and inspect it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::error::MirrorError;

// ============================================================================
// Window system
// ============================================================================

/// Non-client chrome of a fake window, in pixels per edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chrome {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Chrome {
    pub const NONE: Chrome = Chrome { left: 0, top: 0, right: 0, bottom: 0 };

    /// Typical decorated window: 8px borders, 31px caption
    pub const DECORATED: Chrome = Chrome { left: 8, top: 31, right: 8, bottom: 8 };
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub class: Option<WindowClass>,
    /// Outer rectangle in screen coordinates
    pub rect: Rect,
    pub chrome: Chrome,
    pub dpi: u32,
    pub visible: bool,
    pub topmost: bool,
    pub min_track: Option<Size>,
    pub timers: HashMap<TimerId, Duration>,
}

impl FakeWindow {
    fn client_size(&self) -> Size {
        Size::new(
            (self.rect.width() - self.chrome.left - self.chrome.right).max(0),
            (self.rect.height() - self.chrome.top - self.chrome.bottom).max(0),
        )
    }

    fn client_origin(&self) -> Point {
        Point::new(self.rect.left + self.chrome.left, self.rect.top + self.chrome.top)
    }
}

#[derive(Debug)]
pub struct DesktopState {
    pub windows: HashMap<WindowId, FakeWindow>,
    pub registered: HashSet<&'static str>,
    pub next_id: isize,
    pub cursor: Option<Point>,
    pub cursor_showing: bool,
    pub events: Vec<WindowEvent>,
    pub quit: Option<i32>,
    pub fail_register_class: bool,
    pub fail_create: Option<WindowClass>,
    pub destroyed: Vec<WindowId>,
    pub bounds_calls: Vec<(WindowId, Rect, bool)>,
    /// Deliver `Resized` when our own calls change a window's size, as the
    /// system does with WM_SIZE
    pub size_events: bool,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            windows: HashMap::new(),
            registered: HashSet::new(),
            next_id: 0x100,
            cursor: None,
            cursor_showing: true,
            events: Vec::new(),
            quit: None,
            fail_register_class: false,
            fail_create: None,
            destroyed: Vec::new(),
            bounds_calls: Vec::new(),
            size_events: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeWindows {
    pub state: Rc<RefCell<DesktopState>>,
    handlers: Rc<RefCell<HashMap<WindowId, EventHandler>>>,
}

impl FakeWindows {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self, window: FakeWindow) -> WindowId {
        let mut state = self.state.borrow_mut();
        state.next_id += 0x10;
        let id = WindowId(state.next_id);
        state.windows.insert(id, window);
        id
    }

    /// Add a foreign window whose client area sits at `client` (screen coordinates)
    pub fn add_source(&self, client: Rect, chrome: Chrome, dpi: u32) -> WindowId {
        self.allocate(FakeWindow {
            class: None,
            rect: Rect::new(
                client.left - chrome.left,
                client.top - chrome.top,
                client.right + chrome.right,
                client.bottom + chrome.bottom,
            ),
            chrome,
            dpi,
            visible: true,
            topmost: false,
            min_track: None,
            timers: HashMap::new(),
        })
    }

    /// Resize a window so that its client area has the given size
    pub fn set_client_size(&self, window: WindowId, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        let w = state.windows.get_mut(&window).expect("unknown window");
        w.rect.right = w.rect.left + width + w.chrome.left + w.chrome.right;
        w.rect.bottom = w.rect.top + height + w.chrome.top + w.chrome.bottom;
    }

    pub fn move_to(&self, window: WindowId, left: i32, top: i32) {
        let mut state = self.state.borrow_mut();
        let w = state.windows.get_mut(&window).expect("unknown window");
        let (width, height) = (w.rect.width(), w.rect.height());
        w.rect = Rect::from_xywh(left, top, width, height);
    }

    pub fn set_dpi(&self, window: WindowId, dpi: u32) {
        self.state.borrow_mut().windows.get_mut(&window).expect("unknown window").dpi = dpi;
    }

    /// Simulate a window closing behind our back
    pub fn close(&self, window: WindowId) {
        self.state.borrow_mut().windows.remove(&window);
        self.handlers.borrow_mut().remove(&window);
    }

    pub fn set_cursor(&self, point: Option<Point>) {
        self.state.borrow_mut().cursor = point;
    }

    pub fn set_cursor_showing(&self, showing: bool) {
        self.state.borrow_mut().cursor_showing = showing;
    }

    /// Deliver an event the way a window procedure does: to the window's
    /// handler when it takes it, otherwise onto the queue.
    pub fn push_event(&self, window: WindowId, event: HostEvent) {
        let event = WindowEvent { window, event };
        if event.event != HostEvent::Destroyed {
            let handler = self.handlers.borrow().get(&window).cloned();
            if let Some(handler) = handler {
                if handler(event) {
                    return;
                }
            }
        }
        self.state.borrow_mut().events.push(event);
    }

    pub fn has_event_handler(&self, window: WindowId) -> bool {
        self.handlers.borrow().contains_key(&window)
    }

    pub fn emit_size_events(&self, enabled: bool) {
        self.state.borrow_mut().size_events = enabled;
    }

    fn notify_resized(&self, window: WindowId, before: Option<Size>) {
        let (enabled, after) = {
            let state = self.state.borrow();
            (state.size_events, state.windows.get(&window).map(|w| w.client_size()))
        };
        if enabled && after.is_some() && after != before {
            self.push_event(window, HostEvent::Resized);
        }
    }

    fn client_size_of(&self, window: WindowId) -> Option<Size> {
        self.state.borrow().windows.get(&window).map(|w| w.client_size())
    }

    pub fn post_quit(&self, code: i32) {
        self.state.borrow_mut().quit = Some(code);
    }

    pub fn window(&self, window: WindowId) -> Option<FakeWindow> {
        self.state.borrow().windows.get(&window).cloned()
    }

    pub fn windows_of(&self, class: WindowClass) -> Vec<WindowId> {
        self.state
            .borrow()
            .windows
            .iter()
            .filter(|(_, w)| w.class == Some(class))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn live_timers(&self) -> usize {
        self.state.borrow().windows.values().map(|w| w.timers.len()).sum()
    }
}

impl WindowSystem for FakeWindows {
    fn is_window(&self, window: WindowId) -> bool {
        self.state.borrow().windows.contains_key(&window)
    }

    fn register_class(&self, class: WindowClass) -> MirrorResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_register_class {
            return Err(MirrorError::Window("class registration refused".to_string()));
        }
        let name = match class {
            WindowClass::MirrorHost => crate::types::HOST_CLASS_NAME,
            WindowClass::Overlay => crate::types::OVERLAY_CLASS_NAME,
        };
        state.registered.insert(name);
        Ok(())
    }

    fn create_window(&self, class: WindowClass, size: Size) -> MirrorResult<WindowId> {
        if self.state.borrow().fail_create == Some(class) {
            return Err(MirrorError::Window(format!("{:?} creation refused", class)));
        }
        let chrome = match class {
            WindowClass::MirrorHost => Chrome::DECORATED,
            WindowClass::Overlay => Chrome::NONE,
        };
        Ok(self.allocate(FakeWindow {
            class: Some(class),
            rect: Rect::from_xywh(100, 100, size.width, size.height),
            chrome,
            dpi: DEFAULT_DPI_FOR_TESTS,
            visible: class == WindowClass::Overlay,
            topmost: false,
            min_track: None,
            timers: HashMap::new(),
        }))
    }

    fn destroy_window(&self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&window);
        state.destroyed.push(window);
        self.handlers.borrow_mut().remove(&window);
    }

    fn show_window(&self, window: WindowId) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.visible = true;
        }
    }

    fn window_rect(&self, window: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&window).map(|w| w.rect)
    }

    fn client_rect(&self, window: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&window).map(|w| {
            let size = w.client_size();
            Rect::new(0, 0, size.width, size.height)
        })
    }

    fn client_rect_in_window(&self, window: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&window).map(|w| {
            let size = w.client_size();
            Rect::from_xywh(w.chrome.left, w.chrome.top, size.width, size.height)
        })
    }

    fn client_to_screen(&self, window: WindowId, point: Point) -> Option<Point> {
        self.state.borrow().windows.get(&window).map(|w| {
            let origin = w.client_origin();
            Point::new(point.x + origin.x, point.y + origin.y)
        })
    }

    fn screen_to_client(&self, window: WindowId, point: Point) -> Option<Point> {
        self.state.borrow().windows.get(&window).map(|w| {
            let origin = w.client_origin();
            Point::new(point.x - origin.x, point.y - origin.y)
        })
    }

    fn cursor_position(&self) -> Option<Point> {
        self.state.borrow().cursor
    }

    fn is_cursor_showing(&self) -> bool {
        self.state.borrow().cursor_showing
    }

    fn dpi_for_window(&self, window: WindowId) -> u32 {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|w| w.dpi)
            .unwrap_or(DEFAULT_DPI_FOR_TESTS)
    }

    fn resize_window(&self, window: WindowId, size: Size) {
        let before = self.client_size_of(window);
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.rect = Rect::from_xywh(w.rect.left, w.rect.top, size.width, size.height);
        }
        self.notify_resized(window, before);
    }

    fn set_window_bounds(&self, window: WindowId, bounds: Rect, topmost: bool) {
        let before = self.client_size_of(window);
        {
            let mut state = self.state.borrow_mut();
            state.bounds_calls.push((window, bounds, topmost));
            if let Some(w) = state.windows.get_mut(&window) {
                w.rect = bounds;
                if topmost {
                    w.topmost = true;
                    w.visible = true;
                }
            }
        }
        self.notify_resized(window, before);
    }

    fn set_min_track_size(&self, window: WindowId, size: Size) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.min_track = Some(size);
        }
    }

    fn set_timer(&self, window: WindowId, timer: TimerId, period: Duration) -> MirrorResult<()> {
        match self.state.borrow_mut().windows.get_mut(&window) {
            Some(w) => {
                w.timers.insert(timer, period);
                Ok(())
            }
            None => Err(MirrorError::Window("timer on dead window".to_string())),
        }
    }

    fn kill_timer(&self, window: WindowId, timer: TimerId) {
        if let Some(w) = self.state.borrow_mut().windows.get_mut(&window) {
            w.timers.remove(&timer);
        }
    }

    fn pump_messages(&self) -> PumpStatus {
        match self.state.borrow_mut().quit.take() {
            Some(code) => PumpStatus::Quit(code),
            None => PumpStatus::Continue,
        }
    }

    fn take_events(&self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    fn set_event_handler(&self, window: WindowId, handler: Option<EventHandler>) {
        let mut handlers = self.handlers.borrow_mut();
        match handler {
            Some(handler) => {
                handlers.insert(window, handler);
            }
            None => {
                handlers.remove(&window);
            }
        }
    }
}

const DEFAULT_DPI_FOR_TESTS: u32 = crate::types::DEFAULT_DPI;

// ============================================================================
// Compositor
// ============================================================================

#[derive(Debug, Default)]
pub struct CompositorState {
    pub links: HashMap<ThumbnailId, (WindowId, WindowId)>,
    pub next_id: isize,
    pub refuse: bool,
    pub updates: Vec<(ThumbnailId, ThumbnailProperties)>,
    pub unregistered: Vec<ThumbnailId>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCompositor {
    pub state: Rc<RefCell<CompositorState>>,
}

impl FakeCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        let compositor = Self::default();
        compositor.state.borrow_mut().refuse = true;
        compositor
    }

    pub fn live_links(&self) -> usize {
        self.state.borrow().links.len()
    }

    pub fn update_count(&self) -> usize {
        self.state.borrow().updates.len()
    }

    pub fn last_update(&self) -> Option<ThumbnailProperties> {
        self.state.borrow().updates.last().map(|(_, p)| *p)
    }
}

impl ThumbnailCompositor for FakeCompositor {
    fn register(&self, host: WindowId, source: WindowId) -> MirrorResult<ThumbnailId> {
        let mut state = self.state.borrow_mut();
        if state.refuse {
            return Err(MirrorError::Registration("E_INVALIDARG".to_string()));
        }
        state.next_id += 1;
        let id = ThumbnailId(state.next_id);
        state.links.insert(id, (host, source));
        Ok(id)
    }

    fn update(&self, link: ThumbnailId, properties: &ThumbnailProperties) -> MirrorResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.links.contains_key(&link) {
            return Err(MirrorError::NotInitialized("thumbnail link"));
        }
        state.updates.push((link, *properties));
        Ok(())
    }

    fn unregister(&self, link: ThumbnailId) {
        let mut state = self.state.borrow_mut();
        state.links.remove(&link);
        state.unregistered.push(link);
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Every call a fake surface received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Begin,
    Clear(Color),
    Line { start: PointF, end: PointF, width: f32, color: Color },
    FillEllipse { center: PointF, radius: f32, color: Color },
    DrawEllipse { center: PointF, radius: f32, width: f32, color: Color },
    FillRect { rect: RectF, color: Color },
    DrawRect { rect: RectF, width: f32, color: Color },
    Text { text: String, font_size: f32, layers: Vec<TextLayer> },
    End,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub initialized: bool,
    pub fail_initialize: bool,
    pub fail_surface: bool,
    pub style: Option<TextStyle>,
    pub next_surface_id: u32,
    pub surfaces_created: u32,
    /// Number of upcoming `end_draw` calls that report a lost device
    pub lose_device: u32,
    pub device_lost_handled: u32,
    pub releases: u32,
    pub calls: Vec<DrawCall>,
    /// Surface of the batch currently open
    pub open_batch: Option<u32>,
    /// `(began on, ended on)` per finished batch
    pub batches: Vec<(Option<u32>, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub state: Rc<RefCell<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().fail_initialize = true;
        backend
    }

    pub fn surfaces_created(&self) -> u32 {
        self.state.borrow().surfaces_created
    }

    pub fn lose_device(&self, times: u32) {
        self.state.borrow_mut().lose_device = times;
    }

    pub fn take_calls(&self) -> Vec<DrawCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }
}

#[derive(Debug)]
pub struct FakeSurface {
    pub id: u32,
    pub window: WindowId,
    pub size: Size,
    state: Rc<RefCell<BackendState>>,
}

impl FakeSurface {
    fn record(&self, call: DrawCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl DrawSurface for FakeSurface {
    fn pixel_size(&self) -> Size {
        self.size
    }

    fn begin_draw(&mut self) {
        self.state.borrow_mut().open_batch = Some(self.id);
        self.record(DrawCall::Begin);
    }

    fn clear(&mut self, color: Color) {
        self.record(DrawCall::Clear(color));
    }

    fn draw_line(&mut self, start: PointF, end: PointF, stroke_width: f32, color: Color) {
        self.record(DrawCall::Line { start, end, width: stroke_width, color });
    }

    fn fill_ellipse(&mut self, center: PointF, radius: f32, color: Color) {
        self.record(DrawCall::FillEllipse { center, radius, color });
    }

    fn draw_ellipse(&mut self, center: PointF, radius: f32, stroke_width: f32, color: Color) {
        self.record(DrawCall::DrawEllipse { center, radius, width: stroke_width, color });
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) {
        self.record(DrawCall::FillRect { rect, color });
    }

    fn draw_rect(&mut self, rect: RectF, stroke_width: f32, color: Color) {
        self.record(DrawCall::DrawRect { rect, width: stroke_width, color });
    }

    fn draw_text_layers(&mut self, text: &str, font_size: f32, layers: &[TextLayer]) {
        self.record(DrawCall::Text {
            text: text.to_string(),
            font_size,
            layers: layers.to_vec(),
        });
    }

    fn end_draw(&mut self) -> DrawStatus {
        let mut state = self.state.borrow_mut();
        state.calls.push(DrawCall::End);
        let began = state.open_batch.take();
        state.batches.push((began, self.id));
        if state.lose_device > 0 {
            state.lose_device -= 1;
            DrawStatus::DeviceLost
        } else {
            DrawStatus::Ok
        }
    }
}

impl RenderBackend for FakeBackend {
    type Surface = FakeSurface;

    fn initialize(&mut self, style: &TextStyle) -> MirrorResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_initialize {
            return Err(MirrorError::DeviceInit("factory creation refused".to_string()));
        }
        state.initialized = true;
        state.style = Some(style.clone());
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    fn create_surface(&mut self, window: WindowId, size: Size) -> MirrorResult<FakeSurface> {
        let mut state = self.state.borrow_mut();
        if state.fail_surface {
            return Err(MirrorError::DeviceInit("render target refused".to_string()));
        }
        state.next_surface_id += 1;
        state.surfaces_created += 1;
        Ok(FakeSurface {
            id: state.next_surface_id,
            window,
            size,
            state: Rc::clone(&self.state),
        })
    }

    fn handle_device_lost(&mut self) {
        self.state.borrow_mut().device_lost_handled += 1;
    }

    fn measure_text(&self, text: &str, font_size: f32) -> Option<SizeF> {
        if !self.state.borrow().initialized {
            return None;
        }
        // Monospace stand-in: half an em per character, one em tall
        Some(SizeF::new(text.chars().count() as f32 * font_size * 0.5, font_size))
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.initialized {
            state.initialized = false;
            state.releases += 1;
        }
    }
}
