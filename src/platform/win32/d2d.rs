//! Direct2D drawing surfaces and DirectWrite text.
//!
//! The backend owns the three device-independent objects (drawing factory,
//! text factory, text format). Each surface is an HWND render target with
//! premultiplied alpha so cleared pixels stay see-through. Brushes and text
//! layouts are created per primitive and released when it returns.

use windows::core::{Result, PCWSTR};
use windows::Win32::Foundation::D2DERR_RECREATE_TARGET;
use windows::Win32::Graphics::Direct2D::Common::{
    D2D1_ALPHA_MODE_PREMULTIPLIED, D2D1_COLOR_F, D2D1_PIXEL_FORMAT, D2D_POINT_2F, D2D_RECT_F,
    D2D_SIZE_U,
};
use windows::Win32::Graphics::Direct2D::{
    D2D1CreateFactory, ID2D1Factory, ID2D1HwndRenderTarget, ID2D1SolidColorBrush,
    D2D1_ANTIALIAS_MODE_PER_PRIMITIVE, D2D1_DRAW_TEXT_OPTIONS_NONE, D2D1_ELLIPSE,
    D2D1_FACTORY_TYPE_SINGLE_THREADED, D2D1_FEATURE_LEVEL_DEFAULT,
    D2D1_HWND_RENDER_TARGET_PROPERTIES, D2D1_PRESENT_OPTIONS_NONE,
    D2D1_RENDER_TARGET_PROPERTIES, D2D1_RENDER_TARGET_TYPE_DEFAULT,
    D2D1_RENDER_TARGET_USAGE_NONE, D2D1_TEXT_ANTIALIAS_MODE_DEFAULT,
};
use windows::Win32::Graphics::DirectWrite::{
    DWriteCreateFactory, IDWriteFactory, IDWriteTextFormat, IDWriteTextLayout,
    DWRITE_FACTORY_TYPE_SHARED, DWRITE_FONT_STRETCH_NORMAL, DWRITE_FONT_STYLE_NORMAL,
    DWRITE_FONT_WEIGHT_NORMAL, DWRITE_TEXT_METRICS, DWRITE_TEXT_RANGE,
};
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_UNKNOWN;

use super::{hwnd, wide};
use crate::error::{MirrorError, MirrorResult};
use crate::platform::{DrawStatus, DrawSurface, RenderBackend, TextLayer, TextStyle};
use crate::types::{Color, PointF, RectF, Size, SizeF, WindowId};

fn color(c: Color) -> D2D1_COLOR_F {
    D2D1_COLOR_F {
        r: c.r,
        g: c.g,
        b: c.b,
        a: c.a,
    }
}

fn point(p: PointF) -> D2D_POINT_2F {
    D2D_POINT_2F { x: p.x, y: p.y }
}

fn rect(r: RectF) -> D2D_RECT_F {
    D2D_RECT_F {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    }
}

fn ellipse(center: PointF, radius: f32) -> D2D1_ELLIPSE {
    D2D1_ELLIPSE {
        point: point(center),
        radiusX: radius,
        radiusY: radius,
    }
}

/// Unbounded layout of `text` with the font size overridden for the whole run.
fn create_layout(
    factory: &IDWriteFactory,
    format: &IDWriteTextFormat,
    text: &str,
    font_size: f32,
) -> Result<IDWriteTextLayout> {
    let chars: Vec<u16> = text.encode_utf16().collect();
    unsafe {
        let layout = factory.CreateTextLayout(&chars, format, f32::MAX, f32::MAX)?;
        layout.SetFontSize(
            font_size,
            DWRITE_TEXT_RANGE {
                startPosition: 0,
                length: chars.len() as u32,
            },
        )?;
        Ok(layout)
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Direct2D + DirectWrite factories.
#[derive(Default)]
pub struct Direct2dBackend {
    factory: Option<ID2D1Factory>,
    write_factory: Option<IDWriteFactory>,
    text_format: Option<IDWriteTextFormat>,
}

impl Direct2dBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn create_factories(style: &TextStyle) -> Result<(ID2D1Factory, IDWriteFactory, IDWriteTextFormat)> {
    unsafe {
        let factory: ID2D1Factory = D2D1CreateFactory(D2D1_FACTORY_TYPE_SINGLE_THREADED, None)?;
        let write_factory: IDWriteFactory = DWriteCreateFactory(DWRITE_FACTORY_TYPE_SHARED)?;

        let family = wide(&style.family);
        let locale = wide(&style.locale);
        let text_format = write_factory.CreateTextFormat(
            PCWSTR(family.as_ptr()),
            None,
            DWRITE_FONT_WEIGHT_NORMAL,
            DWRITE_FONT_STYLE_NORMAL,
            DWRITE_FONT_STRETCH_NORMAL,
            style.size,
            PCWSTR(locale.as_ptr()),
        )?;

        Ok((factory, write_factory, text_format))
    }
}

impl RenderBackend for Direct2dBackend {
    type Surface = Direct2dSurface;

    fn initialize(&mut self, style: &TextStyle) -> MirrorResult<()> {
        self.release();
        let (factory, write_factory, text_format) = create_factories(style)
            .map_err(|e| MirrorError::DeviceInit(format!("{:?}", e)))?;

        self.factory = Some(factory);
        self.write_factory = Some(write_factory);
        self.text_format = Some(text_format);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.factory.is_some() && self.write_factory.is_some() && self.text_format.is_some()
    }

    fn create_surface(&mut self, window: WindowId, size: Size) -> MirrorResult<Direct2dSurface> {
        let (Some(factory), Some(write_factory), Some(text_format)) =
            (&self.factory, &self.write_factory, &self.text_format)
        else {
            return Err(MirrorError::NotInitialized("drawing factory"));
        };

        let props = D2D1_RENDER_TARGET_PROPERTIES {
            r#type: D2D1_RENDER_TARGET_TYPE_DEFAULT,
            pixelFormat: D2D1_PIXEL_FORMAT {
                format: DXGI_FORMAT_UNKNOWN,
                alphaMode: D2D1_ALPHA_MODE_PREMULTIPLIED,
            },
            dpiX: 0.0,
            dpiY: 0.0,
            usage: D2D1_RENDER_TARGET_USAGE_NONE,
            minLevel: D2D1_FEATURE_LEVEL_DEFAULT,
        };
        let hwnd_props = D2D1_HWND_RENDER_TARGET_PROPERTIES {
            hwnd: hwnd(window),
            pixelSize: D2D_SIZE_U {
                width: size.width.max(0) as u32,
                height: size.height.max(0) as u32,
            },
            presentOptions: D2D1_PRESENT_OPTIONS_NONE,
        };

        let target = unsafe {
            let target = factory
                .CreateHwndRenderTarget(&props, &hwnd_props)
                .map_err(|e| MirrorError::DeviceInit(format!("CreateHwndRenderTarget: {:?}", e)))?;
            target.SetAntialiasMode(D2D1_ANTIALIAS_MODE_PER_PRIMITIVE);
            target.SetTextAntialiasMode(D2D1_TEXT_ANTIALIAS_MODE_DEFAULT);
            target
        };

        Ok(Direct2dSurface {
            target,
            write_factory: write_factory.clone(),
            text_format: text_format.clone(),
            size,
        })
    }

    fn handle_device_lost(&mut self) {
        // Only the render target is device-bound; the factories survive
        log::debug!("[AnnotationOverlay] Render target discarded after device loss");
    }

    fn measure_text(&self, text: &str, font_size: f32) -> Option<SizeF> {
        let (Some(write_factory), Some(text_format)) = (&self.write_factory, &self.text_format) else {
            return None;
        };

        let layout = create_layout(write_factory, text_format, text, font_size).ok()?;
        let mut metrics = DWRITE_TEXT_METRICS::default();
        unsafe { layout.GetMetrics(&mut metrics) }.ok()?;
        Some(SizeF::new(metrics.width, metrics.height))
    }

    fn release(&mut self) {
        self.text_format = None;
        self.write_factory = None;
        self.factory = None;
    }
}

// ============================================================================
// Surface
// ============================================================================

/// HWND render target bound to the overlay window at a fixed pixel size.
pub struct Direct2dSurface {
    target: ID2D1HwndRenderTarget,
    write_factory: IDWriteFactory,
    text_format: IDWriteTextFormat,
    size: Size,
}

impl Direct2dSurface {
    fn brush(&self, c: Color) -> Option<ID2D1SolidColorBrush> {
        match unsafe { self.target.CreateSolidColorBrush(&color(c), None) } {
            Ok(brush) => Some(brush),
            Err(e) => {
                log::debug!("[AnnotationOverlay] Brush creation failed: {:?}", e);
                None
            }
        }
    }
}

impl DrawSurface for Direct2dSurface {
    fn pixel_size(&self) -> Size {
        self.size
    }

    fn begin_draw(&mut self) {
        unsafe { self.target.BeginDraw() };
    }

    fn clear(&mut self, c: Color) {
        unsafe { self.target.Clear(Some(&color(c))) };
    }

    fn draw_line(&mut self, start: PointF, end: PointF, stroke_width: f32, c: Color) {
        if let Some(brush) = self.brush(c) {
            unsafe {
                self.target
                    .DrawLine(point(start), point(end), &brush, stroke_width, None)
            };
        }
    }

    fn fill_ellipse(&mut self, center: PointF, radius: f32, c: Color) {
        if let Some(brush) = self.brush(c) {
            unsafe { self.target.FillEllipse(&ellipse(center, radius), &brush) };
        }
    }

    fn draw_ellipse(&mut self, center: PointF, radius: f32, stroke_width: f32, c: Color) {
        if let Some(brush) = self.brush(c) {
            unsafe {
                self.target
                    .DrawEllipse(&ellipse(center, radius), &brush, stroke_width, None)
            };
        }
    }

    fn fill_rect(&mut self, r: RectF, c: Color) {
        if let Some(brush) = self.brush(c) {
            unsafe { self.target.FillRectangle(&rect(r), &brush) };
        }
    }

    fn draw_rect(&mut self, r: RectF, stroke_width: f32, c: Color) {
        if let Some(brush) = self.brush(c) {
            unsafe { self.target.DrawRectangle(&rect(r), &brush, stroke_width, None) };
        }
    }

    fn draw_text_layers(&mut self, text: &str, font_size: f32, layers: &[TextLayer]) {
        let layout = match create_layout(&self.write_factory, &self.text_format, text, font_size) {
            Ok(layout) => layout,
            Err(e) => {
                log::debug!("[AnnotationOverlay] Text layout failed: {:?}", e);
                return;
            }
        };

        for layer in layers {
            if let Some(brush) = self.brush(layer.color) {
                unsafe {
                    self.target.DrawTextLayout(
                        point(layer.origin),
                        &layout,
                        &brush,
                        D2D1_DRAW_TEXT_OPTIONS_NONE,
                    )
                };
            }
        }
    }

    fn end_draw(&mut self) -> DrawStatus {
        match unsafe { self.target.EndDraw(None, None) } {
            Ok(()) => DrawStatus::Ok,
            Err(e) if e.code() == D2DERR_RECREATE_TARGET => DrawStatus::DeviceLost,
            Err(e) => DrawStatus::Failed(format!("EndDraw: {:?}", e)),
        }
    }
}
