//! Live window mirror with a click-through annotation overlay.
//!
//! # Architecture
//!
//! ```text
//! driver.rs (single-threaded loop)
//!   |
//!   +-- mirror/   (MirrorSurface: host window + live thumbnail of the source)
//!   +-- overlay/  (AnnotationOverlay: transparent topmost drawing surface)
//!   |
//! platform/ (WindowSystem, ThumbnailCompositor, RenderBackend)
//!   +-- win32/  (DWM, Direct2D, DirectWrite)
//!   +-- fake    (tests)
//! ```
//!
//! Both components are generic over the platform traits so the geometry,
//! lifecycle and device-loss logic runs the same against the in-memory fakes.

pub mod config;
pub mod driver;
pub mod error;
pub mod mirror;
pub mod overlay;
pub mod platform;
pub mod types;

pub use config::{MirrorConfig, OverlayConfig};
pub use driver::Driver;
pub use error::{MirrorError, MirrorResult};
pub use mirror::MirrorSurface;
pub use overlay::{AnnotationOverlay, RenderOutcome};
pub use types::{Color, Point, PointF, Rect, RectF, RelativeCursor, Size, WindowId};

/// Initialize `env_logger` with an `info` default, overridable via `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
