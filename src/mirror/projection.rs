//! Pure geometry of the thumbnail projection.
//!
//! Kept free of any window-system access so the fitting rules can be checked
//! exhaustively.

use crate::types::{Rect, Size, DEFAULT_DPI};

/// Fit `source` into `host` preserving aspect ratio, centered.
///
/// When the source is wider than the host (by aspect ratio) the width is
/// clamped to the host width, otherwise the height is clamped. The derived
/// dimension is floored. Returns `None` if either size is degenerate.
pub fn fit_centered(source: Size, host: Size) -> Option<Rect> {
    if source.is_empty() || host.is_empty() {
        return None;
    }

    let (sw, sh) = (i64::from(source.width), i64::from(source.height));
    let (hw, hh) = (i64::from(host.width), i64::from(host.height));

    // sw/sh > hw/hh, cross-multiplied to stay exact
    let (width, height) = if sw * hh > hw * sh {
        (hw, hw * sh / sw)
    } else {
        (hh * sw / sh, hh)
    };

    let x = (hw - width) / 2;
    let y = (hh - height) / 2;
    Some(Rect::from_xywh(x as i32, y as i32, width as i32, height as i32))
}

/// Smallest outer host size that still shows the source at 1:1 physical scale.
///
/// The source client size is scaled by `host_dpi / source_dpi`, padded by
/// `margin` on each axis, then grown by the host's non-client `chrome`.
pub fn minimum_host_size(
    source_client: Size,
    source_dpi: u32,
    host_dpi: u32,
    margin: i32,
    chrome: Size,
) -> Size {
    let source_dpi = if source_dpi == 0 { DEFAULT_DPI } else { source_dpi };
    let host_dpi = if host_dpi == 0 { DEFAULT_DPI } else { host_dpi };
    let ratio = host_dpi as f32 / source_dpi as f32;

    let content_width = (source_client.width as f32 * ratio) as i32 + margin;
    let content_height = (source_client.height as f32 * ratio) as i32 + margin;

    Size::new(content_width + chrome.width, content_height + chrome.height)
}

/// Non-client size of a window: outer size minus client size
pub fn chrome_size(window: Rect, client: Rect) -> Size {
    Size::new(
        window.width() - client.width(),
        window.height() - client.height(),
    )
}
