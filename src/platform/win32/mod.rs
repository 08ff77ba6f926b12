//! Win32 implementations of the platform capabilities.
//!
//! # Architecture
//!
//! ```text
//! mod.rs (Win32Windows: classes, windows, geometry, timers, message pump)
//!   |
//!   +-- wndproc.rs (window procedures, host event queue)
//!   +-- dwm.rs (DWM thumbnails)
//!   +-- d2d.rs (Direct2D surfaces, DirectWrite text)
//! ```

mod d2d;
mod dwm;
mod wndproc;

pub use d2d::{Direct2dBackend, Direct2dSurface};
pub use dwm::DwmThumbnails;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Dwm::DwmExtendFrameIntoClientArea;
use windows::Win32::Graphics::Gdi::{
    ClientToScreen, GetStockObject, MonitorFromWindow, ScreenToClient, UpdateWindow, BLACK_BRUSH,
    HBRUSH, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::Media::{timeBeginPeriod, timeEndPeriod};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::MARGINS;
use windows::Win32::UI::HiDpi::{
    GetDpiForMonitor, SetProcessDpiAwareness, MDT_EFFECTIVE_DPI, PROCESS_PER_MONITOR_DPI_AWARE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DestroyWindow, DispatchMessageW, FindWindowW, GetClientRect, GetCursorInfo,
    GetCursorPos, GetWindowInfo, GetWindowRect, IsWindow, KillTimer, LoadCursorW, PeekMessageW,
    RegisterClassW, SetTimer, SetWindowLongW, SetWindowPos, ShowWindow, TranslateMessage,
    CS_HREDRAW, CS_VREDRAW, CURSORINFO, CURSOR_SHOWING, CW_USEDEFAULT, GWL_EXSTYLE, HWND_TOPMOST,
    IDC_ARROW, MSG, PM_REMOVE, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOZORDER, SWP_SHOWWINDOW, SW_SHOW,
    WINDOWINFO, WINDOW_EX_STYLE, WM_QUIT, WNDCLASSW, WS_EX_LAYERED,
    WS_EX_TOOLWINDOW, WS_EX_TRANSPARENT, WS_OVERLAPPEDWINDOW, WS_POPUP, WS_VISIBLE,
};

use crate::error::{MirrorError, MirrorResult, ResultExt};
use crate::platform::{EventHandler, PumpStatus, WindowClass, WindowEvent, WindowSystem};
use crate::types::{
    Point, Rect, Size, TimerId, WindowId, DEFAULT_DPI, HOST_CLASS_NAME, OVERLAY_CLASS_NAME,
};

type WndProc = unsafe extern "system" fn(HWND, u32, WPARAM, LPARAM) -> LRESULT;

/// Track if the mirror host window class has been registered
static HOST_CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Track if the overlay window class has been registered
static OVERLAY_CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

pub(crate) fn hwnd(window: WindowId) -> HWND {
    HWND(window.0 as *mut _)
}

fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as isize)
}

/// Null-terminated UTF-16 copy of `s`
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn from_rect(r: RECT) -> Rect {
    Rect::new(r.left, r.top, r.right, r.bottom)
}

fn class_name(class: WindowClass) -> &'static str {
    match class {
        WindowClass::MirrorHost => HOST_CLASS_NAME,
        WindowClass::Overlay => OVERLAY_CLASS_NAME,
    }
}

// ============================================================================
// Process setup
// ============================================================================

/// Opt into per-monitor DPI awareness so geometry is in physical pixels.
pub fn enable_per_monitor_dpi() {
    if let Err(e) = unsafe { SetProcessDpiAwareness(PROCESS_PER_MONITOR_DPI_AWARE) } {
        // Already set by a manifest or an earlier call
        log::debug!("[Driver] SetProcessDpiAwareness: {:?}", e);
    }
}

/// 1 ms system timer resolution for as long as the guard lives.
pub struct TimerResolution {
    period: u32,
}

impl TimerResolution {
    pub fn new(period_ms: u32) -> Self {
        unsafe { timeBeginPeriod(period_ms) };
        Self { period: period_ms }
    }
}

impl Drop for TimerResolution {
    fn drop(&mut self) {
        unsafe { timeEndPeriod(self.period) };
    }
}

/// Top-level window by class name and, optionally, exact title.
pub fn find_window(class: &str, title: Option<&str>) -> Option<WindowId> {
    let class = wide(class);
    let title = title.map(wide);
    let title_ptr = title
        .as_ref()
        .map(|t| PCWSTR(t.as_ptr()))
        .unwrap_or(PCWSTR::null());

    unsafe { FindWindowW(PCWSTR(class.as_ptr()), title_ptr) }
        .ok()
        .filter(|h| !h.is_invalid())
        .map(window_id)
}

// ============================================================================
// Window system
// ============================================================================

/// Win32 windowing for the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Windows;

impl Win32Windows {
    pub fn new() -> Self {
        Self
    }

    /// Extend the frame over the whole client area and make the window
    /// layered, click-through and absent from the taskbar.
    fn make_click_through(hwnd: HWND) -> windows::core::Result<()> {
        let margins = MARGINS {
            cxLeftWidth: -1,
            cxRightWidth: -1,
            cyTopHeight: -1,
            cyBottomHeight: -1,
        };
        unsafe {
            DwmExtendFrameIntoClientArea(hwnd, &margins)?;
            SetWindowLongW(
                hwnd,
                GWL_EXSTYLE,
                (WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOOLWINDOW).0 as i32,
            );
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }
        Ok(())
    }
}

impl WindowSystem for Win32Windows {
    fn is_window(&self, window: WindowId) -> bool {
        !window.is_null() && unsafe { IsWindow(hwnd(window)) }.as_bool()
    }

    fn register_class(&self, class: WindowClass) -> MirrorResult<()> {
        let registered = match class {
            WindowClass::MirrorHost => &HOST_CLASS_REGISTERED,
            WindowClass::Overlay => &OVERLAY_CLASS_REGISTERED,
        };
        if registered.load(Ordering::SeqCst) {
            return Ok(());
        }

        unsafe {
            let hinstance = GetModuleHandleW(None).context("Failed to get module handle")?;
            let name = wide(class_name(class));

            let (wnd_proc, background): (WndProc, HBRUSH) = match class {
                WindowClass::MirrorHost => (
                    wndproc::host_wnd_proc,
                    HBRUSH(GetStockObject(BLACK_BRUSH).0),
                ),
                WindowClass::Overlay => (wndproc::overlay_wnd_proc, HBRUSH::default()),
            };

            let wc = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(wnd_proc),
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(name.as_ptr()),
                hCursor: LoadCursorW(None, IDC_ARROW).context("Failed to load arrow cursor")?,
                hbrBackground: background,
                ..Default::default()
            };

            if RegisterClassW(&wc) == 0 {
                return Err(MirrorError::Window(format!(
                    "Failed to register window class {}",
                    class_name(class)
                )));
            }
        }

        registered.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn create_window(&self, class: WindowClass, size: Size) -> MirrorResult<WindowId> {
        let name = wide(class_name(class));
        let (ex_style, style, x, y) = match class {
            WindowClass::MirrorHost => (
                WINDOW_EX_STYLE::default(),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
            ),
            WindowClass::Overlay => (WS_EX_TOOLWINDOW, WS_POPUP | WS_VISIBLE, 0, 0),
        };

        let hwnd = unsafe {
            let hinstance: HINSTANCE = GetModuleHandleW(None)
                .context("Failed to get module handle")?
                .into();
            CreateWindowExW(
                ex_style,
                PCWSTR(name.as_ptr()),
                PCWSTR(name.as_ptr()),
                style,
                x,
                y,
                size.width,
                size.height,
                None,
                None,
                hinstance,
                None,
            )
            .map_err(|e| MirrorError::Window(format!("Failed to create window: {:?}", e)))?
        };

        if class == WindowClass::Overlay {
            if let Err(e) = Self::make_click_through(hwnd) {
                self.destroy_window(window_id(hwnd));
                return Err(MirrorError::Window(format!(
                    "Failed to make overlay click-through: {:?}",
                    e
                )));
            }
        }

        Ok(window_id(hwnd))
    }

    fn destroy_window(&self, window: WindowId) {
        let handle = hwnd(window);
        wndproc::begin_owner_close(handle);
        if let Err(e) = unsafe { DestroyWindow(handle) } {
            log::debug!("DestroyWindow({:#x}) failed: {:?}", window.0, e);
        }
        wndproc::end_owner_close(handle);
    }

    fn show_window(&self, window: WindowId) {
        unsafe {
            let _ = ShowWindow(hwnd(window), SW_SHOW);
            let _ = UpdateWindow(hwnd(window));
        }
    }

    fn window_rect(&self, window: WindowId) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd(window), &mut rect) }.ok()?;
        Some(from_rect(rect))
    }

    fn client_rect(&self, window: WindowId) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd(window), &mut rect) }.ok()?;
        Some(from_rect(rect))
    }

    fn client_rect_in_window(&self, window: WindowId) -> Option<Rect> {
        let mut info = WINDOWINFO {
            cbSize: std::mem::size_of::<WINDOWINFO>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowInfo(hwnd(window), &mut info) }.ok()?;

        let (client, outer) = (info.rcClient, info.rcWindow);
        Some(Rect::new(
            client.left - outer.left,
            client.top - outer.top,
            client.right - outer.left,
            client.bottom - outer.top,
        ))
    }

    fn client_to_screen(&self, window: WindowId, point: Point) -> Option<Point> {
        let mut pt = POINT {
            x: point.x,
            y: point.y,
        };
        unsafe { ClientToScreen(hwnd(window), &mut pt) }
            .as_bool()
            .then(|| Point::new(pt.x, pt.y))
    }

    fn screen_to_client(&self, window: WindowId, point: Point) -> Option<Point> {
        let mut pt = POINT {
            x: point.x,
            y: point.y,
        };
        unsafe { ScreenToClient(hwnd(window), &mut pt) }
            .as_bool()
            .then(|| Point::new(pt.x, pt.y))
    }

    fn cursor_position(&self) -> Option<Point> {
        let mut pt = POINT::default();
        unsafe { GetCursorPos(&mut pt) }.ok()?;
        Some(Point::new(pt.x, pt.y))
    }

    fn is_cursor_showing(&self) -> bool {
        let mut info = CURSORINFO {
            cbSize: std::mem::size_of::<CURSORINFO>() as u32,
            ..Default::default()
        };
        match unsafe { GetCursorInfo(&mut info) } {
            Ok(()) => (info.flags.0 & CURSOR_SHOWING.0) != 0,
            Err(_) => true,
        }
    }

    fn dpi_for_window(&self, window: WindowId) -> u32 {
        unsafe {
            let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
            if monitor.is_invalid() {
                return DEFAULT_DPI;
            }
            let (mut dpi_x, mut dpi_y) = (0u32, 0u32);
            match GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) {
                Ok(()) if dpi_x > 0 => dpi_x,
                _ => DEFAULT_DPI,
            }
        }
    }

    fn resize_window(&self, window: WindowId, size: Size) {
        let result = unsafe {
            SetWindowPos(
                hwnd(window),
                HWND::default(),
                0,
                0,
                size.width,
                size.height,
                SWP_NOMOVE | SWP_NOZORDER,
            )
        };
        if let Err(e) = result {
            log::debug!("SetWindowPos (resize) failed: {:?}", e);
        }
    }

    fn set_window_bounds(&self, window: WindowId, bounds: Rect, topmost: bool) {
        let (after, flags) = if topmost {
            (HWND_TOPMOST, SWP_SHOWWINDOW)
        } else {
            (HWND::default(), SWP_NOZORDER | SWP_NOACTIVATE)
        };
        let result = unsafe {
            SetWindowPos(
                hwnd(window),
                after,
                bounds.left,
                bounds.top,
                bounds.width(),
                bounds.height(),
                flags,
            )
        };
        if let Err(e) = result {
            log::debug!("SetWindowPos (bounds) failed: {:?}", e);
        }
    }

    fn set_min_track_size(&self, window: WindowId, size: Size) {
        wndproc::publish_min_track_size(hwnd(window), size);
    }

    fn set_timer(&self, window: WindowId, timer: TimerId, period: Duration) -> MirrorResult<()> {
        let elapse = period.as_millis().min(u128::from(u32::MAX)) as u32;
        let id = unsafe { SetTimer(hwnd(window), timer.0, elapse, None) };
        if id == 0 {
            return Err(MirrorError::Window(format!("SetTimer({}) failed", timer.0)));
        }
        Ok(())
    }

    fn kill_timer(&self, window: WindowId, timer: TimerId) {
        let _ = unsafe { KillTimer(hwnd(window), timer.0) };
    }

    fn pump_messages(&self) -> PumpStatus {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    return PumpStatus::Quit(msg.wParam.0 as i32);
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        PumpStatus::Continue
    }

    fn take_events(&self) -> Vec<WindowEvent> {
        wndproc::take_events()
    }

    fn set_event_handler(&self, window: WindowId, handler: Option<EventHandler>) {
        wndproc::set_event_handler(hwnd(window), handler);
    }
}
