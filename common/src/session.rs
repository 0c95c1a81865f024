//! オーバーレイの表示状態
//!
//! 現在表示中の検出結果と元画像サイズだけを保持し、
//! 表示サイズが変わるたびに `redraw` で描き直す。
//! リサイズイベントの登録・解除は呼び出し側（ページのコントローラ）が
//! このセッションの寿命に合わせて行う。

use crate::overlay::{clear_overlay, render_detections, DisplayGeometry, RenderSummary, Surface};
use crate::types::Detection;

#[derive(Debug, Clone, Default)]
pub struct OverlaySession {
    detections: Vec<Detection>,
    natural_size: Option<(u32, u32)>,
}

impl OverlaySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい検出結果で置き換える（以前の結果は破棄）
    pub fn show(&mut self, detections: Vec<Detection>, natural_size: (u32, u32)) {
        self.detections = detections;
        self.natural_size = Some(natural_size);
    }

    /// 描画対象があるか
    pub fn is_active(&self) -> bool {
        self.natural_size.is_some() && !self.detections.is_empty()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// 現在の表示サイズで描き直す
    ///
    /// 表示サイズから毎回スケールを計算する。
    /// 描画対象がない、または寸法が不正な場合はキャンバスを消すだけ。
    pub fn redraw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        displayed_size: (f64, f64),
    ) -> RenderSummary {
        let geometry = self
            .natural_size
            .and_then(|natural| DisplayGeometry::new(natural, displayed_size));

        match geometry {
            Some(geometry) if !self.detections.is_empty() => {
                render_detections(surface, &self.detections, &geometry)
            }
            _ => {
                clear_overlay(surface);
                RenderSummary::default()
            }
        }
    }

    /// 結果を破棄してキャンバスを消す
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.detections.clear();
        self.natural_size = None;
        clear_overlay(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{DrawList, Rect};
    use crate::types::BoundingBox;

    fn session_with_one_box() -> OverlaySession {
        let mut session = OverlaySession::new();
        session.show(
            vec![Detection::new("Calculus", 0.5, BoundingBox::new(10.0, 10.0, 110.0, 60.0))],
            (200, 100),
        );
        session
    }

    #[test]
    fn test_redraw_follows_display_size() {
        let session = session_with_one_box();
        let mut surface = DrawList::new();

        session.redraw(&mut surface, (200.0, 100.0));
        assert_eq!(surface.boxes(), vec![Rect::new(10.0, 10.0, 100.0, 50.0)]);

        // ウィンドウ拡大
        session.redraw(&mut surface, (400.0, 200.0));
        assert_eq!(surface.size(), (400, 200));
        assert_eq!(surface.boxes(), vec![Rect::new(20.0, 20.0, 200.0, 100.0)]);

        // 縮小して戻す（キャッシュされた座標を使わない）
        session.redraw(&mut surface, (100.0, 50.0));
        assert_eq!(surface.boxes(), vec![Rect::new(5.0, 5.0, 50.0, 25.0)]);
    }

    #[test]
    fn test_show_replaces_previous_detections() {
        let mut session = session_with_one_box();
        session.show(
            vec![Detection::new("Gingivitis", 0.9, BoundingBox::new(0.0, 50.0, 20.0, 90.0))],
            (200, 100),
        );
        let mut surface = DrawList::new();
        session.redraw(&mut surface, (200.0, 100.0));
        assert_eq!(surface.boxes(), vec![Rect::new(0.0, 50.0, 20.0, 40.0)]);
    }

    #[test]
    fn test_reset_clears_canvas() {
        let mut session = session_with_one_box();
        let mut surface = DrawList::new();
        session.redraw(&mut surface, (200.0, 100.0));
        assert!(!surface.is_blank());

        session.reset(&mut surface);
        assert!(surface.is_blank());
        assert!(!session.is_active());

        let summary = session.redraw(&mut surface, (200.0, 100.0));
        assert_eq!(summary.drawn, 0);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_redraw_with_zero_natural_size_only_clears() {
        let mut session = OverlaySession::new();
        session.show(
            vec![Detection::new("Calculus", 0.5, BoundingBox::new(1.0, 1.0, 2.0, 2.0))],
            (0, 0),
        );
        let mut surface = DrawList::new();
        let summary = session.redraw(&mut surface, (100.0, 100.0));
        assert_eq!(summary.drawn, 0);
        assert!(surface.is_blank());
    }
}
