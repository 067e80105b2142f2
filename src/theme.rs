use ratatui::style::Color;

// Centralized theme colors.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Floating widgets
pub fn widget_border() -> Color {
    Color::Gray
}
pub fn widget_border_grabbed() -> Color {
    accent()
}
pub fn widget_bg() -> Color {
    Color::Black
}

// Forum
pub fn selection_bg() -> Color {
    Color::DarkGray
}
pub fn upvoted_fg() -> Color {
    Color::Green
}
pub fn meta_fg() -> Color {
    Color::Gray
}

// Status line
pub fn status_bg() -> Color {
    Color::Blue
}
pub fn status_fg() -> Color {
    Color::White
}
pub fn error_fg() -> Color {
    Color::Red
}
