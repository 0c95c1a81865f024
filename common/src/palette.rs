//! 検出クラスの表示色

use crate::overlay::Color;

/// 未登録クラスの色（純赤）
pub const DEFAULT_COLOR: Color = Color::rgb(0xFF, 0x00, 0x00);

/// クラス名 → 色
///
/// YOLOモデルの7クラスと、CV検出器が返すベトナム語クラス名。
const CLASS_COLORS: &[(&str, Color)] = &[
    ("Data caries", Color::rgb(0xFF, 0x00, 0x00)),
    ("Mouth Ulcer", Color::rgb(0xFF, 0x00, 0xFF)),
    ("Tooth Discoloration", Color::rgb(0x00, 0xFF, 0xFF)),
    ("hypodontia", Color::rgb(0xFF, 0xA5, 0x00)),
    ("Gingivitis", Color::rgb(0xFF, 0x45, 0x00)),
    ("Calculus", Color::rgb(0xFF, 0xFF, 0x00)),
    ("Caries_Gingivitus_ToothDiscoloration_Ulcer", Color::rgb(0x94, 0x00, 0xD3)),
    ("Sâu răng", Color::rgb(0xDC, 0x14, 0x3C)),
    ("Cao răng", Color::rgb(0xFF, 0xD7, 0x00)),
    ("Răng đổi màu", Color::rgb(0xFF, 0x8C, 0x00)),
    ("Viêm lợi", Color::rgb(0xC7, 0x15, 0x85)),
    ("Răng khỏe mạnh", Color::rgb(0x00, 0xFF, 0x00)),
];

/// クラス名の色を取得（未登録ならDEFAULT_COLOR）
pub fn color_for(class_name: &str) -> Color {
    CLASS_COLORS
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// 登録済みクラス名の一覧
pub fn known_classes() -> impl Iterator<Item = &'static str> {
    CLASS_COLORS.iter().map(|(name, _)| *name)
}
