use anstyle::{AnsiColor, Reset, RgbColor, Style};

const ACCENT_RGB: (u8, u8, u8) = (207, 106, 76);

const PRIMARY_COLOR: Style = Style::new().fg_color(Some(anstyle::Color::Rgb(RgbColor(
    ACCENT_RGB.0,
    ACCENT_RGB.1,
    ACCENT_RGB.2,
))));
const SUCCESS_COLOR: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Green)));
const ERROR_COLOR: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Red)));

fn render_arrow() -> String {
    format!("{PRIMARY_COLOR}❱{Reset}")
}

fn render_success() -> String {
    format!("{SUCCESS_COLOR}✓{Reset}")
}

pub(crate) fn render_error() -> String {
    format!("{ERROR_COLOR}✘{Reset}")
}

/// Banner printed when a session is shown.
#[must_use]
pub fn format_start_message(session_name: &str) -> Vec<u8> {
    format!("{} {}\r\n\r\n", render_arrow(), session_name).into()
}

/// Line printed once the session's shell has exited.
#[must_use]
pub fn format_exit_message(session_name: &str, exit_code: u32) -> Vec<u8> {
    if exit_code == 0 {
        format!(
            "\r\n{} {} finished {}\r\n",
            render_arrow(),
            session_name,
            render_success()
        )
        .into()
    } else {
        format!(
            "\r\n{} {} failed {} (exit code {})\r\n",
            render_arrow(),
            session_name,
            render_error(),
            exit_code
        )
        .into()
    }
}
