//! Terminal styling passed explicitly to every printing function.

use colored::Colorize;
use sr_core::ConversionStatus;

/// Whether output is coloured. Plain when disabled.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Style {
    color: bool,
}

impl Style {
    pub(crate) fn new(no_color: bool) -> Self {
        Self { color: !no_color }
    }

    #[cfg(test)]
    pub(crate) fn plain() -> Self {
        Self { color: false }
    }

    pub(crate) fn heading(&self, text: &str) -> String {
        self.paint(text, |s| s.bold().to_string())
    }

    pub(crate) fn success(&self, text: &str) -> String {
        self.paint(text, |s| s.green().to_string())
    }

    pub(crate) fn warning(&self, text: &str) -> String {
        self.paint(text, |s| s.yellow().to_string())
    }

    pub(crate) fn error(&self, text: &str) -> String {
        self.paint(text, |s| s.red().bold().to_string())
    }

    pub(crate) fn dim(&self, text: &str) -> String {
        self.paint(text, |s| s.dimmed().to_string())
    }

    /// Call ids and file locations.
    pub(crate) fn id(&self, text: &str) -> String {
        self.paint(text, |s| s.cyan().to_string())
    }

    pub(crate) fn status(&self, status: ConversionStatus) -> String {
        let label = format!("{} {}", status.glyph(), status.label());
        match status {
            ConversionStatus::QueryBuilder | ConversionStatus::Orm => self.success(&label),
            ConversionStatus::HasTodo => self.warning(&label),
            ConversionStatus::ManualReview => self.error(&label),
        }
    }

    fn paint(&self, text: &str, f: impl FnOnce(&str) -> String) -> String {
        if self.color {
            f(text)
        } else {
            text.to_string()
        }
    }
}
