//! Write-only clipboard seam used by the share action.
//!
//! The clipboard that matters lives on the user's machine, so the server
//! side only ever sees this trait; [`MemoryClipboard`] backs tests and
//! in-process views.

use crate::error::AppError;

/// Write-only clipboard.
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<(), AppError>;
}

/// In-memory clipboard holding the most recent write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), AppError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
