//! Bounded retry around a single backend call.

use super::Translator;
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Default number of backend calls per translation unit.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between two attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Some backends inject zero-width spaces into their output.
const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// How often and how patiently a translation unit is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Fixed delay between attempts; there is no exponential backoff.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Translate `text`, retrying failed or empty backend answers.
///
/// The first non-blank answer is returned with zero-width spaces removed.
/// Between attempts the backend is [reset](Translator::reset) and we sleep for
/// `policy.delay`. When every attempt fails the result is
/// [`Error::TranslationExhausted`] carrying `text` and the last failure.
pub async fn translate_with_retry<T>(
    translator: &mut T,
    text: &str,
    target_lang: &str,
    policy: &RetryPolicy,
) -> Result<String>
where
    T: Translator + ?Sized,
{
    trace!("translate_with_retry text={text:?} target_lang={target_lang}");
    let mut reason = String::from("no attempt made");
    for attempt in 1..=policy.max_attempts {
        match translator.translate(text, target_lang).await {
            Ok(translated) => {
                let cleaned = strip_zero_width(&translated);
                if !cleaned.trim().is_empty() {
                    debug!("{} translated {text:?} to {cleaned:?}", translator.name());
                    return Ok(cleaned);
                }
                reason = format!("{} returned an empty translation", translator.name());
            }
            Err(err) => reason = format!("{err:#}"),
        }
        if attempt < policy.max_attempts {
            warn!(
                "translation failed, trying again (attempt {attempt} of {}): {reason}",
                policy.max_attempts
            );
            translator.reset();
            tokio::time::sleep(policy.delay).await;
        }
    }
    error!("giving up on {text:?} after {} attempts", policy.max_attempts);
    Err(Error::TranslationExhausted {
        text: text.to_string(),
        attempts: policy.max_attempts,
        reason,
    })
}

/// Remove zero-width spaces left behind by the backend.
pub fn strip_zero_width(text: &str) -> String {
    text.chars().filter(|&c| c != ZERO_WIDTH_SPACE).collect()
}
