//! Text enhancement collaborators used when parsing yields too few records.
//!
//! The selector only depends on a `(text) -> text` capability, so OCR
//! cleanup, generative rewriting, or a no-op can be swapped in freely.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::EnhancementError;
use crate::models::config::EnhancerKind;

/// A `(text) -> text` rewriting capability.
///
/// Returning empty or unchanged text is valid; the selector simply
/// re-parses whatever comes back.
pub trait TextEnhancer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Rewrite `text` into something the parser is more likely to match.
    fn enhance(&self, text: &str) -> Result<String, EnhancementError>;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEnhancer;

impl TextEnhancer for IdentityEnhancer {
    fn name(&self) -> &str {
        "identity"
    }

    fn enhance(&self, text: &str) -> Result<String, EnhancementError> {
        Ok(text.to_string())
    }
}

lazy_static! {
    static ref SPLIT_NUMBER: Regex = Regex::new(r"(\d)[ \t]*([,.])[ \t]*(\d)").unwrap();
}

/// OCR-style cleanup of extracted text.
///
/// - non-breaking spaces and runs of blanks collapse to one space
/// - separators split off by stray spaces are rejoined (`1 ,234 . 56`)
/// - `O`/`o`, `I`/`l` and `S` inside numeric tokens become `0`, `1`, `5`
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupEnhancer;

impl CleanupEnhancer {
    pub fn new() -> Self {
        Self
    }

    fn clean_line(line: &str) -> String {
        let collapsed = line
            .replace('\u{00a0}', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let joined = SPLIT_NUMBER.replace_all(&collapsed, "${1}${2}${3}");

        joined
            .split(' ')
            .map(Self::fix_numeric_token)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fix_numeric_token(token: &str) -> String {
        let confusable = |c: char| matches!(c, 'O' | 'o' | 'I' | 'l' | 'S');
        let numeric_like = token.chars().any(|c| c.is_ascii_digit())
            && token
                .chars()
                .all(|c| c.is_ascii_digit() || confusable(c) || matches!(c, ',' | '.' | '-' | '+' | '/'));

        if !numeric_like {
            return token.to_string();
        }

        token
            .chars()
            .map(|c| match c {
                'O' | 'o' => '0',
                'I' | 'l' => '1',
                'S' => '5',
                other => other,
            })
            .collect()
    }
}

impl TextEnhancer for CleanupEnhancer {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn enhance(&self, text: &str) -> Result<String, EnhancementError> {
        Ok(text.lines().map(Self::clean_line).collect::<Vec<_>>().join("\n"))
    }
}

/// Adapts a closure into a [`TextEnhancer`].
pub struct FnEnhancer<F> {
    name: String,
    func: F,
}

impl<F> FnEnhancer<F>
where
    F: Fn(&str) -> Result<String, EnhancementError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self { name: name.into(), func }
    }
}

impl<F> TextEnhancer for FnEnhancer<F>
where
    F: Fn(&str) -> Result<String, EnhancementError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn enhance(&self, text: &str) -> Result<String, EnhancementError> {
        (self.func)(text)
    }
}

/// Build the enhancer named by configuration.
pub fn create_enhancer(kind: EnhancerKind) -> Arc<dyn TextEnhancer> {
    match kind {
        EnhancerKind::Identity => Arc::new(IdentityEnhancer),
        EnhancerKind::Cleanup => Arc::new(CleanupEnhancer::new()),
    }
}

/// Run `enhancer` on `text`, giving up after `timeout`.
///
/// With a timeout the call runs on a worker thread; a timed-out worker is
/// left to finish on its own and its output is discarded.
pub fn enhance_with_timeout(
    enhancer: &Arc<dyn TextEnhancer>,
    text: &str,
    timeout: Option<Duration>,
) -> Result<String, EnhancementError> {
    let Some(timeout) = timeout else {
        return enhancer.enhance(text);
    };

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(enhancer);
    let input = text.to_string();

    thread::Builder::new()
        .name("bankstmt-enhancer".to_string())
        .spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send(worker.enhance(&input));
        })
        .map_err(|e| {
            warn!("Failed to start enhancer thread: {}", e);
            EnhancementError::Unavailable
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            debug!("Enhancer {} finished", enhancer.name());
            result
        }
        Err(RecvTimeoutError::Timeout) => Err(EnhancementError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(EnhancementError::Failed(format!("enhancer {} panicked", enhancer.name())))
        }
    }
}
