//! Colors, fonts and node positions shared by every chart.

/// Price line color
pub const BLUE: &str = "#8eacd5";
/// Node color for income and profit
pub const DARK_GREEN: &str = "#acd58e";
/// Node color for costs, expenses and losses
pub const DARK_RED: &str = "#d58eac";
/// Link color for profit
pub const LIGHT_GREEN: &str = "#c8e3b4";
/// Link color for costs, expenses and losses
pub const LIGHT_RED: &str = "#e3b4c8";
/// Fully transparent, used for spacer nodes and backgrounds
pub const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";
/// Text color
pub const FONT_COLOR: &str = "#7b8ab8";
/// Font stack
pub const FONT_FAMILY: &str = "Nunito,-apple-system,BlinkMacSystemFont,\"Segoe UI\",Roboto,\"Helvetica Neue\",Arial,sans-serif,\"Apple Color Emoji\",\"Segoe UI Emoji\",\"Segoe UI Symbol\"";
/// Font size in points
pub const FONT_SIZE: u32 = 14;

/// Valuation band fills, lowest multiple first
pub const BAND_COLORS: [&str; 6] = [
    "#0077b6", "#0096C7", "#00b4d8", "#48CAE4", "#90E0EF", "#ADE8F4",
];

/// Color of the band at `index`, repeating the palette past its end.
pub fn band_color(index: usize) -> &'static str {
    BAND_COLORS[index % BAND_COLORS.len()]
}

/// Horizontal node positions, in [`crate::sankey::Node`] order.
pub const NODE_X: [f64; 9] = [-0.67, -0.33, 0.01, 0.33, 0.33, 0.67, 0.67, 1.0, 1.0];
/// Vertical node positions, in [`crate::sankey::Node`] order.
pub const NODE_Y: [f64; 9] = [0.64, 0.64, 0.64, 1.0, 0.29, 0.57, 0.01, 0.34, 0.8];

/// Time each frame is shown during playback, in milliseconds.
pub const FRAME_DURATION_MS: u64 = 2000;

/// Days of prices shown past a frame's date.
pub const PRICE_LOOKAHEAD_DAYS: i64 = 7;
