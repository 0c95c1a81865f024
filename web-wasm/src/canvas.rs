//! `<canvas>` 2Dコンテキストへの描画

use dental_ai_common::overlay::{Color, Font, Rect, Surface, TextStyle};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: u32, height: u32) {
        // width/heightの代入で内容も消える
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn text_width(&self, text: &str, font: &Font) -> f64 {
        self.ctx.set_font(&font.to_css());
        self.ctx
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or_else(|_| dental_ai_common::overlay::approx_text_width(text, font))
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ctx.set_font(&style.font.to_css());
        self.ctx.set_line_join("round");
        self.ctx.set_stroke_style_str(&style.outline.to_css());
        self.ctx.set_line_width(style.outline_width);
        let _ = self.ctx.stroke_text(text, x, y);
        self.ctx.set_fill_style_str(&style.fill.to_css());
        let _ = self.ctx.fill_text(text, x, y);
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use dental_ai_common::{render_detections, BoundingBox, Detection, DisplayGeometry};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn surface() -> (HtmlCanvasElement, CanvasSurface) {
        let canvas: HtmlCanvasElement = web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap();
        let surface = CanvasSurface::new(canvas.clone()).unwrap();
        (canvas, surface)
    }

    fn is_blank(surface: &CanvasSurface) -> bool {
        let (w, h) = (surface.canvas.width() as f64, surface.canvas.height() as f64);
        let data = surface.ctx.get_image_data(0.0, 0.0, w, h).unwrap().data();
        data.0.chunks(4).all(|px| px[3] == 0)
    }

    #[wasm_bindgen_test]
    fn test_resize_sets_pixel_size() {
        let (canvas, mut surface) = surface();
        surface.resize(320, 180);
        assert_eq!((canvas.width(), canvas.height()), (320, 180));
    }

    #[wasm_bindgen_test]
    fn test_render_resizes_to_displayed_size() {
        let (canvas, mut surface) = surface();
        let geometry = DisplayGeometry::new((800, 600), (400.7, 300.2)).unwrap();
        let detections = [Detection::new("Calculus", 0.9, BoundingBox::new(100.0, 100.0, 500.0, 400.0))];

        let summary = render_detections(&mut surface, &detections, &geometry);
        assert_eq!(summary.drawn, 1);
        assert_eq!((canvas.width(), canvas.height()), (400, 300));
        assert!(!is_blank(&surface));
    }

    #[wasm_bindgen_test]
    fn test_clear_keeps_size_and_empties_pixels() {
        let (canvas, mut surface) = surface();
        surface.resize(50, 40);
        surface.fill_rect(Rect::new(0.0, 0.0, 50.0, 40.0), Color::BLACK);
        assert!(!is_blank(&surface));

        surface.clear();
        assert!(is_blank(&surface));
        assert_eq!((canvas.width(), canvas.height()), (50, 40));
    }

    #[wasm_bindgen_test]
    fn test_text_width_is_measured() {
        let (_, surface) = surface();
        let short = surface.text_width("Caries", &Font::LABEL);
        let long = surface.text_width("Caries 80.0%", &Font::LABEL);
        assert!(short > 0.0);
        assert!(long > short);
    }
}
