//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{DeadlineClass, Status};

/// Used for Completed
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for Waiting
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for overdue deadlines and the error banner
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Used for Accepted
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
/// Used for near-deadline highlighting
pub const ORANGE: Color = Color::Rgb(230, 120, 0);

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => Color::DarkGray,
        Status::Accepted => DARK_PURPLE,
        Status::InProgress => Color::Blue,
        Status::Waiting => GOLD,
        Status::Completed => DARK_GREEN,
    }
}

pub fn deadline_color(class: DeadlineClass) -> Color {
    match class {
        DeadlineClass::Overdue => DARK_RED,
        DeadlineClass::NearDeadline => ORANGE,
        DeadlineClass::Normal => Color::Reset,
    }
}

/// Readable foreground on top of `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD | ORANGE => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
