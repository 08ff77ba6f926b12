//! Scoped ownership of the mirror's native resources.
//!
//! Each wrapper owns one resource, releases it on `release()` or drop, and
//! tolerates being released twice or never having held anything.

use std::time::Duration;

use crate::error::MirrorResult;
use crate::platform::{ThumbnailCompositor, ThumbnailProperties, WindowClass, WindowSystem};
use crate::types::{Size, ThumbnailId, TimerId, WindowId};

/// An owned native window, destroyed on release.
pub struct OwnedWindow<W: WindowSystem> {
    windows: W,
    id: Option<WindowId>,
}

impl<W: WindowSystem> OwnedWindow<W> {
    pub fn create(windows: W, class: WindowClass, size: Size) -> MirrorResult<Self> {
        let id = windows.create_window(class, size)?;
        Ok(Self::adopt(windows, id))
    }

    /// Take ownership of an already created window
    pub fn adopt(windows: W, id: WindowId) -> Self {
        Self { windows, id: Some(id) }
    }

    pub fn id(&self) -> Option<WindowId> {
        self.id
    }

    /// Drop ownership without destroying, for windows the system already destroyed
    pub fn forget(&mut self) {
        self.id = None;
    }

    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            if self.windows.is_window(id) {
                self.windows.destroy_window(id);
            }
        }
    }
}

impl<W: WindowSystem> Drop for OwnedWindow<W> {
    fn drop(&mut self) {
        self.release();
    }
}

/// A registered thumbnail link, unregistered on release.
pub struct ThumbnailLink<C: ThumbnailCompositor> {
    compositor: C,
    id: Option<ThumbnailId>,
}

impl<C: ThumbnailCompositor> ThumbnailLink<C> {
    pub fn register(compositor: C, host: WindowId, source: WindowId) -> MirrorResult<Self> {
        let id = compositor.register(host, source)?;
        Ok(Self { compositor, id: Some(id) })
    }

    pub fn update(&self, properties: &ThumbnailProperties) -> MirrorResult<()> {
        match self.id {
            Some(id) => self.compositor.update(id, properties),
            None => Err(crate::error::MirrorError::NotInitialized("thumbnail link")),
        }
    }

    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.compositor.unregister(id);
        }
    }
}

impl<C: ThumbnailCompositor> Drop for ThumbnailLink<C> {
    fn drop(&mut self) {
        self.release();
    }
}

/// A periodic window timer, killed on release.
pub struct WindowTimer<W: WindowSystem> {
    windows: W,
    window: WindowId,
    timer: Option<TimerId>,
}

impl<W: WindowSystem> WindowTimer<W> {
    pub fn start(windows: W, window: WindowId, timer: TimerId, period: Duration) -> MirrorResult<Self> {
        windows.set_timer(window, timer, period)?;
        Ok(Self {
            windows,
            window,
            timer: Some(timer),
        })
    }

    pub fn release(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.windows.kill_timer(self.window, timer);
        }
    }
}

impl<W: WindowSystem> Drop for WindowTimer<W> {
    fn drop(&mut self) {
        self.release();
    }
}
