//! Single-threaded loop tying the mirror to the overlay.
//!
//! Each tick drains the host message queue without blocking, routes host
//! events to the component owning the window, then pushes the mirror's cursor
//! sample and destination rectangle into the overlay and renders a frame.
//! The overlay is always repositioned before it renders in the same tick.

use std::thread;
use std::time::Duration;

use crate::config::MirrorConfig;
use crate::mirror::MirrorSurface;
use crate::overlay::AnnotationOverlay;
use crate::platform::{
    HostEvent, LoopControl, PumpStatus, RenderBackend, ThumbnailCompositor, WindowEvent,
    WindowSystem,
};

pub struct Driver<W, C, B>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
    B: RenderBackend,
{
    windows: W,
    // Overlay first: it is dropped before the mirror host it sits on
    overlay: AnnotationOverlay<W, B>,
    mirror: MirrorSurface<W, C>,
    frame_interval: Duration,
    ticks: u64,
}

impl<W, C, B> Driver<W, C, B>
where
    W: WindowSystem + Clone,
    C: ThumbnailCompositor + Clone,
    B: RenderBackend,
{
    /// Both components are expected to be initialized already.
    pub fn new(
        windows: W,
        mirror: MirrorSurface<W, C>,
        overlay: AnnotationOverlay<W, B>,
        config: &MirrorConfig,
    ) -> Self {
        Self {
            windows,
            overlay,
            mirror,
            frame_interval: config.frame_interval(),
            ticks: 0,
        }
    }

    /// One loop iteration: messages, events, cursor, placement, render.
    pub fn tick(&mut self) -> LoopControl {
        if let PumpStatus::Quit(code) = self.windows.pump_messages() {
            log::info!("[Driver] Quit message received ({})", code);
            return LoopControl::Exit(code);
        }

        for event in self.windows.take_events() {
            if let LoopControl::Exit(code) = self.dispatch(event) {
                return LoopControl::Exit(code);
            }
        }

        let position = self.mirror.relative_mouse_position();
        let visible = self.mirror.is_cursor_visible() && self.mirror.is_cursor_over_source();
        self.overlay.update_cursor_state(position, visible);

        if let Err(e) = self.overlay.reposition(self.mirror.destination_rect()) {
            log::debug!("[Driver] Overlay placement skipped: {}", e);
        }
        self.overlay.render();

        self.ticks += 1;
        LoopControl::Continue
    }

    /// Tick until a quit message or the destruction of a component window.
    /// Returns the process exit code.
    pub fn run(&mut self) -> i32 {
        log::info!("[Driver] Loop started, frame interval {:?}", self.frame_interval);
        loop {
            if let LoopControl::Exit(code) = self.tick() {
                log::info!("[Driver] Loop finished after {} ticks with code {}", self.ticks, code);
                return code;
            }
            if !self.frame_interval.is_zero() {
                thread::sleep(self.frame_interval);
            }
        }
    }

    pub fn mirror(&self) -> &MirrorSurface<W, C> {
        &self.mirror
    }

    pub fn overlay(&self) -> &AnnotationOverlay<W, B> {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut AnnotationOverlay<W, B> {
        &mut self.overlay
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn dispatch(&mut self, event: WindowEvent) -> LoopControl {
        if Some(event.window) == self.mirror.host_window() {
            return self.mirror.handle_event(event);
        }
        if Some(event.window) == self.overlay.window_id() && event.event == HostEvent::Destroyed {
            log::info!("[Driver] Overlay window destroyed");
            return LoopControl::Exit(0);
        }
        LoopControl::Continue
    }
}
