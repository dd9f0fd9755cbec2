//! Styled diagnostic output, reused from the teacher's `uwu_colors` module
//! verbatim: style only applies when stderr actually supports color (§10.1).

use owo_colors::{OwoColorize, Style, Styled};
use supports_color::Stream::Stderr;

pub trait ErrStyle {
    fn errstyle(&self, style: Style) -> Styled<&Self>;
}

impl<D> ErrStyle for D {
    fn errstyle(&self, style: Style) -> Styled<&Self> {
        self.style(get_errstyle(style))
    }
}

pub fn get_errstyle(style: Style) -> Style {
    supports_color::on(Stderr)
        .filter(|f| f.has_basic)
        .map_or_else(Style::new, |_| style)
}

/// Render a `(story_id, asset path)` pair the way the worker-pool log lines
/// do (§10.1): story id in green, path in yellow.
pub fn format_story_asset<P: std::fmt::Display>(story_id: &str, path: P) -> String {
    format!(
        "{} ({})",
        story_id.errstyle(Style::new().green()),
        path.errstyle(Style::new().yellow())
    )
}
