//! DWM live thumbnails.

use windows::Win32::Foundation::{BOOL, RECT};
use windows::Win32::Graphics::Dwm::{
    DwmRegisterThumbnail, DwmUnregisterThumbnail, DwmUpdateThumbnailProperties,
    DWM_THUMBNAIL_PROPERTIES, DWM_TNP_OPACITY, DWM_TNP_RECTDESTINATION, DWM_TNP_RECTSOURCE,
    DWM_TNP_VISIBLE,
};

use super::hwnd;
use crate::error::{MirrorError, MirrorResult};
use crate::platform::{ThumbnailCompositor, ThumbnailProperties};
use crate::types::{Rect, ThumbnailId, WindowId};

/// Thumbnail service of the desktop window manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct DwmThumbnails;

fn to_rect(r: Rect) -> RECT {
    RECT {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    }
}

impl ThumbnailCompositor for DwmThumbnails {
    fn register(&self, host: WindowId, source: WindowId) -> MirrorResult<ThumbnailId> {
        unsafe { DwmRegisterThumbnail(hwnd(host), hwnd(source)) }
            .map(ThumbnailId)
            .map_err(|e| MirrorError::Registration(format!("DwmRegisterThumbnail: {:?}", e)))
    }

    fn update(&self, link: ThumbnailId, properties: &ThumbnailProperties) -> MirrorResult<()> {
        let props = DWM_THUMBNAIL_PROPERTIES {
            dwFlags: DWM_TNP_VISIBLE | DWM_TNP_RECTDESTINATION | DWM_TNP_RECTSOURCE | DWM_TNP_OPACITY,
            rcDestination: to_rect(properties.destination),
            rcSource: to_rect(properties.source),
            opacity: properties.opacity,
            fVisible: BOOL::from(properties.visible),
            fSourceClientAreaOnly: BOOL::from(false),
        };

        unsafe { DwmUpdateThumbnailProperties(link.0, &props) }
            .map_err(|e| MirrorError::Other(format!("DwmUpdateThumbnailProperties: {:?}", e)))
    }

    fn unregister(&self, link: ThumbnailId) {
        if let Err(e) = unsafe { DwmUnregisterThumbnail(link.0) } {
            log::debug!("[MirrorSurface] DwmUnregisterThumbnail failed: {:?}", e);
        }
    }
}
