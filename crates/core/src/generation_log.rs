//! Plain-text decision trace written once per generation run.
//!
//! The trace is persisted next to the playlist for postmortem debugging, so
//! it records every demand decision and every placement in the order they
//! were made.

/// Append-only line buffer.
#[derive(Debug, Default, Clone)]
pub struct GenerationLog {
    text: String,
}

impl GenerationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_newline_terminated() {
        let mut log = GenerationLog::new();
        log.line("first");
        log.line(format!("second {}", 2));
        assert_eq!(log.as_str(), "first\nsecond 2\n");
    }
}
