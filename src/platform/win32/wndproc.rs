//! Window procedures for the mirror host and the overlay.
//!
//! The procedures decode the messages the components care about into
//! `HostEvent`s. Size, timer and DPI events go straight to the handler the
//! owning component registered, so they are honored inside the system's modal
//! size/move loop too. Everything else, and whatever a busy handler declines,
//! is queued for the driver, which drains the queue after each message pump.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    DefWindowProcW, PostQuitMessage, SetWindowPos, MINMAXINFO, SC_KEYMENU, SWP_NOACTIVATE,
    SWP_NOZORDER, WM_DESTROY, WM_DPICHANGED, WM_GETMINMAXINFO, WM_SIZE, WM_SYSCOMMAND, WM_TIMER,
};

use crate::platform::{EventHandler, HostEvent, WindowEvent};
use crate::types::{Rect, Size, TimerId, WindowId};

thread_local! {
    /// Host events in delivery order, drained by `take_events`
    static EVENTS: RefCell<Vec<WindowEvent>> = RefCell::new(Vec::new());

    /// Minimum track size per window, answered on WM_GETMINMAXINFO
    static MIN_TRACK: RefCell<HashMap<isize, Size>> = RefCell::new(HashMap::new());

    /// Windows being destroyed by their owner rather than by the user
    static CLOSING: RefCell<HashSet<isize>> = RefCell::new(HashSet::new());

    /// Synchronous per-window event handlers
    static HANDLERS: RefCell<HashMap<isize, EventHandler>> = RefCell::new(HashMap::new());
}

fn key(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

fn push_event(hwnd: HWND, event: HostEvent) {
    EVENTS.with(|events| {
        events.borrow_mut().push(WindowEvent {
            window: WindowId(key(hwnd)),
            event,
        })
    });
}

/// Hand the event to the window's handler, or queue it when there is none
/// or the handler declines.
fn deliver(hwnd: HWND, event: HostEvent) {
    let handler = HANDLERS.with(|handlers| handlers.borrow().get(&key(hwnd)).cloned());
    let event = WindowEvent {
        window: WindowId(key(hwnd)),
        event,
    };
    if handler.map_or(false, |handler| handler(event)) {
        return;
    }
    EVENTS.with(|events| events.borrow_mut().push(event));
}

pub(super) fn set_event_handler(hwnd: HWND, handler: Option<EventHandler>) {
    HANDLERS.with(|handlers| {
        let mut handlers = handlers.borrow_mut();
        match handler {
            Some(handler) => handlers.insert(key(hwnd), handler),
            None => handlers.remove(&key(hwnd)),
        }
    });
}

pub(super) fn take_events() -> Vec<WindowEvent> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

pub(super) fn publish_min_track_size(hwnd: HWND, size: Size) {
    MIN_TRACK.with(|map| map.borrow_mut().insert(key(hwnd), size));
}

/// Mark a window as closed by its owner: no event and no quit message on WM_DESTROY
pub(super) fn begin_owner_close(hwnd: HWND) {
    CLOSING.with(|set| set.borrow_mut().insert(key(hwnd)));
}

pub(super) fn end_owner_close(hwnd: HWND) {
    CLOSING.with(|set| set.borrow_mut().remove(&key(hwnd)));
    MIN_TRACK.with(|map| map.borrow_mut().remove(&key(hwnd)));
}

/// Window procedure of the mirror host.
///
/// # Safety
/// Win32 callback; `lparam` is interpreted per message as documented.
pub unsafe extern "system" fn host_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_SIZE => {
            deliver(hwnd, HostEvent::Resized);
            LRESULT(0)
        }
        WM_TIMER => {
            deliver(hwnd, HostEvent::Timer(TimerId(wparam.0)));
            LRESULT(0)
        }
        WM_GETMINMAXINFO => handle_min_max_info(hwnd, msg, wparam, lparam),
        WM_DPICHANGED => handle_dpi_changed(hwnd, wparam, lparam),
        WM_DESTROY => handle_destroy(hwnd),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Window procedure of the overlay.
///
/// # Safety
/// Win32 callback.
pub unsafe extern "system" fn overlay_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // Surface size follows reposition, not WM_SIZE
        WM_SIZE => LRESULT(0),
        // Swallow Alt so the overlay never enters menu mode
        WM_SYSCOMMAND if (wparam.0 & 0xFFF0) as u32 == SC_KEYMENU => LRESULT(0),
        WM_DESTROY => handle_destroy(hwnd),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe fn handle_min_max_info(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let min = MIN_TRACK.with(|map| map.borrow().get(&key(hwnd)).copied());
    let info = lparam.0 as *mut MINMAXINFO;

    match min {
        Some(size) if !info.is_null() => {
            (*info).ptMinTrackSize = POINT {
                x: size.width,
                y: size.height,
            };
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe fn handle_dpi_changed(hwnd: HWND, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let dpi = ((wparam.0 >> 16) & 0xFFFF) as u32;
    let suggested = lparam.0 as *const RECT;
    if suggested.is_null() {
        return LRESULT(0);
    }
    let r = *suggested;

    // Apply right away so the system sees the new size before the next message
    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        r.left,
        r.top,
        r.right - r.left,
        r.bottom - r.top,
        SWP_NOZORDER | SWP_NOACTIVATE,
    );

    deliver(
        hwnd,
        HostEvent::DpiChanged {
            dpi,
            suggested: Rect::new(r.left, r.top, r.right, r.bottom),
        },
    );
    LRESULT(0)
}

unsafe fn handle_destroy(hwnd: HWND) -> LRESULT {
    let owner_close = CLOSING.with(|set| set.borrow().contains(&key(hwnd)));
    MIN_TRACK.with(|map| map.borrow_mut().remove(&key(hwnd)));
    HANDLERS.with(|handlers| handlers.borrow_mut().remove(&key(hwnd)));

    if !owner_close {
        push_event(hwnd, HostEvent::Destroyed);
        PostQuitMessage(0);
    }
    LRESULT(0)
}
