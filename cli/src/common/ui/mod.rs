//! # zfpack UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! User-facing progress output. The packaging pipeline reports through the
//! line-oriented `MessageSink` trait instead of printing directly, so the same
//! pipeline can write to the terminal or be observed in tests.
//!
//! - **`ConsoleSink`**: prints each line to stdout.
//! - **`MemorySink`**: records lines in memory (test builds only).
//!
//! Diagnostic logging stays on `tracing` (stderr); only the messages meant
//! for the user go through a sink.
//!

/// Receives user-facing progress lines.
pub trait MessageSink {
    /// Emits one complete line (no trailing newline expected).
    fn line(&mut self, message: &str);
}

/// Writes messages to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn line(&mut self, message: &str) {
        // Progress goes to stdout; logs stay on stderr.
        println!("{}", message);
    }
}

/// Keeps messages in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl MessageSink for MemorySink {
    fn line(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let mut sink = MemorySink::default();
        sink.line("Creating package \"shop.zip\"...");
        sink.line("[DONE]");
        assert_eq!(sink.lines, vec!["Creating package \"shop.zip\"...", "[DONE]"]);
    }
}
