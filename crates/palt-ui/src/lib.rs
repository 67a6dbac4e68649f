use iced::Color;
use palt_core::StateColor;

/// Design System Constants
pub mod colors {
    use iced::Color;

    pub const BG_PRIMARY: Color = Color::from_rgb(0.227, 0.227, 0.227); // #3a3a3a
    pub const BG_LIST: Color = Color::from_rgb(0.196, 0.196, 0.196); // #323232
    pub const BORDER: Color = Color::from_rgb(0.141, 0.141, 0.141); // #242424

    pub const ACCENT: Color = Color::from_rgb(0.875, 0.29, 0.086); // #df4a16

    pub const BUTTON: Color = Color::from_rgb(0.224, 0.224, 0.224); // #393939
    pub const BUTTON_HOVER: Color = Color::from_rgb(0.235, 0.235, 0.235); // #3c3c3c
    pub const BUTTON_PRESSED: Color = Color::from_rgb(0.125, 0.125, 0.125); // #202020

    pub const TEXT_PRIMARY: Color = Color::WHITE;
    pub const TEXT_DARK: Color = Color::from_rgb(0.08, 0.08, 0.08);
    pub const TEXT_ERROR: Color = Color::from_rgb(1.0, 0.42, 0.42); // #ff6b6b

    pub const STATE_GREEN: Color = Color::from_rgb(0.3, 0.69, 0.31); // #4caf50
    pub const STATE_YELLOW: Color = Color::from_rgb(0.98, 0.8, 0.2); // #facc33
    pub const STATE_RED: Color = Color::from_rgb(0.83, 0.24, 0.24); // #d43d3d
}

/// Row background for a display category.
pub fn state_color(color: StateColor) -> Color {
    match color {
        StateColor::Green => colors::STATE_GREEN,
        StateColor::Yellow => colors::STATE_YELLOW,
        StateColor::Red => colors::STATE_RED,
        StateColor::Neutral => colors::BG_LIST,
    }
}

/// Readable text colour on top of `state_color(color)`.
pub fn state_text_color(color: StateColor) -> Color {
    match color {
        StateColor::Green | StateColor::Yellow => colors::TEXT_DARK,
        StateColor::Red | StateColor::Neutral => colors::TEXT_PRIMARY,
    }
}

/// Custom Styles for Iced Widgets
pub mod styles {
    use super::{colors, state_color, state_text_color};
    use iced::widget::{button, container};
    use iced::{Background, Border, Theme};
    use palt_core::StateColor;

    fn border(color: iced::Color, radius: f32) -> Border {
        Border {
            color,
            width: 1.0,
            radius: radius.into(),
        }
    }

    pub fn window(_theme: &Theme) -> container::Style {
        container::Style {
            background: Some(Background::Color(colors::BG_PRIMARY)),
            text_color: Some(colors::TEXT_PRIMARY),
            ..container::Style::default()
        }
    }

    pub fn list_frame(_theme: &Theme) -> container::Style {
        container::Style {
            background: Some(Background::Color(colors::BG_LIST)),
            text_color: Some(colors::TEXT_PRIMARY),
            border: border(colors::BORDER, 2.0),
            ..container::Style::default()
        }
    }

    pub fn action(_theme: &Theme, status: button::Status) -> button::Style {
        let background = match status {
            button::Status::Hovered => colors::BUTTON_HOVER,
            button::Status::Pressed => colors::BUTTON_PRESSED,
            button::Status::Active | button::Status::Disabled => colors::BUTTON,
        };
        button::Style {
            background: Some(Background::Color(background)),
            text_color: colors::TEXT_PRIMARY,
            border: border(colors::BORDER, 3.0),
            ..button::Style::default()
        }
    }

    pub fn tab(selected: bool) -> impl Fn(&Theme, button::Status) -> button::Style {
        move |theme, status| {
            if selected {
                button::Style {
                    background: Some(Background::Color(colors::ACCENT)),
                    text_color: colors::TEXT_PRIMARY,
                    border: border(colors::BORDER, 0.0),
                    ..button::Style::default()
                }
            } else {
                button::Style {
                    border: border(colors::BORDER, 0.0),
                    ..action(theme, status)
                }
            }
        }
    }

    /// A clickable list entry coloured by its state category.
    pub fn list_row(color: StateColor) -> impl Fn(&Theme, button::Status) -> button::Style {
        move |_theme, status| {
            let border_color = match status {
                button::Status::Hovered | button::Status::Pressed => colors::ACCENT,
                _ => state_color(color),
            };
            button::Style {
                background: Some(Background::Color(state_color(color))),
                text_color: state_text_color(color),
                border: border(border_color, 0.0),
                ..button::Style::default()
            }
        }
    }
}
