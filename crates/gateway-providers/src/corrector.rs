//! Import repair for DeepSeek output.
//!
//! DeepSeek tends to open with a mangled React import or to repeat it later
//! in the response. The corrector holds back text until the first
//! `import React` appears, rewrites that prefix so it carries exactly one
//! canonical import, and afterwards drops fragments that try to import React
//! again.

use async_stream::try_stream;
use bytes::Bytes;
use futures_util::StreamExt;
use gateway_core::CodeStream;
use once_cell::sync::Lazy;
use regex::Regex;

/// Text whose appearance ends the buffering phase
pub const MARKER: &str = "import React";

/// The import line every corrected response starts with
pub const CANONICAL_IMPORT: &str = r#"import React, { useState } from "react";"#;

#[allow(clippy::unwrap_used)]
static REACT_NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:import\s+)?React,\s*\{[^}]*\}\s*from\s*['"]react['"];?\n?"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingImport,
    Streaming,
}

/// Per-stream correction state
#[derive(Debug)]
pub struct ImportCorrector {
    phase: Phase,
    buffer: String,
}

impl Default for ImportCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportCorrector {
    /// Start in the buffering phase
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingImport,
            buffer: String::new(),
        }
    }

    /// Feed one decoded fragment; returns the text to forward, if any.
    pub fn push(&mut self, fragment: &str) -> Option<String> {
        match self.phase {
            Phase::AwaitingImport => {
                self.buffer.push_str(fragment);
                if !self.buffer.contains(MARKER) {
                    return None;
                }

                self.phase = Phase::Streaming;
                let pending = std::mem::take(&mut self.buffer);
                let mut rewritten = REACT_NAMED_IMPORT.replace_all(&pending, "").into_owned();
                if !rewritten.contains(MARKER) {
                    rewritten.insert(0, '\n');
                    rewritten.insert_str(0, CANONICAL_IMPORT);
                }
                Some(rewritten)
            }
            Phase::Streaming => {
                let reimports = fragment.contains(MARKER) && fragment.trim() != CANONICAL_IMPORT;
                if reimports {
                    None
                } else {
                    Some(fragment.to_string())
                }
            }
        }
    }

    /// Flush at end of stream.
    ///
    /// A response that never mentioned the marker still gets the canonical
    /// import in front of everything that was held back.
    pub fn finish(&mut self) -> Option<String> {
        if self.phase == Phase::Streaming || self.buffer.is_empty() {
            return None;
        }
        self.phase = Phase::Streaming;
        let pending = std::mem::take(&mut self.buffer);
        Some(format!("{CANONICAL_IMPORT}\n{pending}"))
    }
}

/// Run a decoded stream through a fresh [`ImportCorrector`]
pub fn correct_imports(mut inner: CodeStream) -> CodeStream {
    let stream = try_stream! {
        let mut corrector = ImportCorrector::new();

        while let Some(fragment) = inner.next().await {
            let fragment = fragment?;
            if let Some(text) = corrector.push(&String::from_utf8_lossy(&fragment)) {
                yield Bytes::from(text);
            }
        }

        if let Some(text) = corrector.finish() {
            yield Bytes::from(text);
        }
    };

    Box::pin(stream)
}
