#[cfg(windows)]
fn main() {
    thumbmirror::init_logging();

    let code = match demo::run() {
        Ok(code) => code,
        Err(e) => {
            log::error!("[Driver] Startup failed: {}", e);
            1
        }
    };
    std::process::exit(code);
}

#[cfg(not(windows))]
fn main() {
    thumbmirror::init_logging();
    log::error!("thumbmirror needs the Windows desktop window manager");
    std::process::exit(1);
}

#[cfg(windows)]
mod demo {
    use thumbmirror::error::{MirrorResult, OptionExt};
    use thumbmirror::platform::win32::{
        enable_per_monitor_dpi, find_window, Direct2dBackend, DwmThumbnails, TimerResolution,
        Win32Windows,
    };
    use thumbmirror::{AnnotationOverlay, Color, Driver, MirrorConfig, MirrorSurface, PointF};

    const RING_RADIUS: f32 = 100.0;
    const RING_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.4);
    const CROSSHAIR_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.15);

    /// Mirror the configured source window until either window closes.
    pub fn run() -> MirrorResult<i32> {
        let config = MirrorConfig::load_from_env()?;

        enable_per_monitor_dpi();
        let _resolution = TimerResolution::new(1);

        let source = find_window(&config.source_class, config.source_title.as_deref())
            .with_context(|| {
                format!(
                    "No window of class {:?} (title {:?})",
                    config.source_class, config.source_title
                )
            })?;

        let windows = Win32Windows::new();

        let mut mirror = MirrorSurface::new(windows, DwmThumbnails, config.clone());
        mirror.initialize(source)?;
        let host = mirror.host_window().context("Mirror host window missing")?;

        let mut overlay =
            AnnotationOverlay::new(windows, Direct2dBackend::new(), host, config.overlay.clone());
        overlay.initialize()?;

        overlay.set_draw_callback(|overlay, width, height| {
            let center = PointF::new(width as f32 / 2.0, height as f32 / 2.0);
            overlay.draw_crosshair(center, width, height, 1.0, CROSSHAIR_COLOR);
            overlay.draw_hollow_circle(center, RING_RADIUS, 2.0, RING_COLOR);
        });

        if let Err(e) = overlay.reposition(mirror.destination_rect()) {
            log::debug!("[Driver] Initial overlay placement skipped: {}", e);
        }

        let mut driver = Driver::new(windows, mirror, overlay, &config);
        Ok(driver.run())
    }
}
