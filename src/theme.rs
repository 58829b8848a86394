// Rendering configuration and default colors
// All colors are 0xRRGGBBAA

use serde::{Deserialize, Serialize};

/// Default document text color
pub const TEXT_COLOR: u32 = 0x000000FF;
/// Code-block text color; light-on-dark, independent of the document color
pub const CODE_TEXT_COLOR: u32 = 0xDCDCDCFF;
/// Quote bar and thematic break color
pub const BORDER_COLOR: u32 = 0xCCCCCCFF;
/// Color substituted on every label while the document is disabled
pub const DISABLED_COLOR: u32 = 0x888888FF;
/// Width of the block quote bar
pub const QUOTE_BAR_WIDTH: f32 = 4.0;
/// Left indentation applied per list nesting level
pub const LIST_INDENT: f32 = 20.0;
/// Fixed width reserved for list item markers
pub const LIST_MARKER_WIDTH: f32 = 24.0;
/// Height assigned to image widgets until their natural size is known
pub const IMAGE_PLACEHOLDER_HEIGHT: f32 = 100.0;

/// Configuration consumed by both renderers; immutable per render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub base_font_size: f32,
    /// Font family for regular text; None uses the toolkit default
    pub font_name: Option<String>,
    pub code_font_name: String,
    pub link_color: u32,
    pub code_bg_color: u32,
    /// When enabled, link labels are additionally wrapped in color markup
    pub styled_links: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            base_font_size: 15.0,
            font_name: None,
            code_font_name: "monospace".to_string(),
            link_color: 0x0000EEFF,
            code_bg_color: 0x1E1E1EFF,
            styled_links: false,
        }
    }
}

/// Font size multiplier for a heading level; levels are clamped to 1..=6
pub fn heading_scale(level: u8) -> f32 {
    match level.clamp(1, 6) {
        1 => 2.5,
        2 => 2.0,
        3 => 1.75,
        4 => 1.5,
        5 => 1.25,
        _ => 1.0,
    }
}
