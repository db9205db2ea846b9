//! Translation orchestration utilities.
//! This module wires encoding detection, subtitle parsing, the reflow
//! heuristic, backend calls and output writing.

use crate::error::Result;
use crate::srt::Caption;
use crate::{encoding, reflow, srt};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub mod deepl;
pub mod google;
pub mod openai;
pub mod retry;

pub use retry::{translate_with_retry, RetryPolicy};

/// A translation backend: text in, translated text out.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the language identified by `target_lang`.
    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String>;

    /// Rebuild any client state after a failed call.
    /// Stateless backends keep the default no-op.
    fn reset(&mut self) {}

    /// Short backend name used in logs.
    fn name(&self) -> &'static str;
}

/// Translate the text of one caption.
///
/// Wrapped sentences are flattened, translated as one unit and wrapped again
/// to the original number of lines. Captions that look like separate
/// sentences or speakers are translated line by line.
pub async fn translate_content<T>(
    translator: &mut T,
    content: &str,
    target_lang: &str,
    policy: &RetryPolicy,
) -> Result<String>
where
    T: Translator + ?Sized,
{
    if content.trim().is_empty() {
        return Ok(content.to_string());
    }
    if reflow::should_merge_lines(content) {
        let (flat, breaks) = reflow::flatten(content);
        let translated = translate_with_retry(translator, &flat, target_lang, policy).await?;
        if breaks == 0 {
            return Ok(translated);
        }
        debug!("reflowing translation into {} lines", breaks + 1);
        return Ok(reflow::reflow(&translated, breaks));
    }
    let mut lines = Vec::new();
    for line in content.split('\n') {
        if line.trim().is_empty() {
            lines.push(line.to_string());
        } else {
            lines.push(translate_with_retry(translator, line, target_lang, policy).await?);
        }
    }
    Ok(lines.join("\n"))
}

/// Translate every caption in order, replacing only its content.
/// Captions are processed one at a time; the first exhausted unit aborts.
pub async fn translate_captions<T>(
    translator: &mut T,
    captions: &mut [Caption],
    target_lang: &str,
    policy: &RetryPolicy,
) -> Result<()>
where
    T: Translator + ?Sized,
{
    let total = captions.len();
    let begin = Instant::now();
    let mut last_percent = None;
    for (done, caption) in captions.iter_mut().enumerate() {
        trace!("translating caption {}", caption.index);
        caption.content = translate_content(translator, &caption.content, target_lang, policy).await?;
        let done = done + 1;
        let percent = done * 100 / total;
        if last_percent != Some(percent) {
            last_percent = Some(percent);
            let eta = estimate_remaining(begin.elapsed(), done, total - done);
            info!("completed {percent}% (ETA: {})", format_eta(eta));
        }
    }
    Ok(())
}

/// Build `<stem>.<lang>.<ext>` next to `input`.
pub fn output_path(input: &Path, target_lang: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{stem}.{target_lang}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{target_lang}"),
    };
    input.with_file_name(name)
}

/// Translate the subtitle file at `input` and write the result.
///
/// The output goes to `output`, or to [`output_path`] when `None`. Nothing is
/// written unless every caption translated.
pub async fn process_file<T>(
    input: &Path,
    output: Option<&Path>,
    target_lang: &str,
    translator: &mut T,
    policy: &RetryPolicy,
) -> Result<PathBuf>
where
    T: Translator + ?Sized,
{
    trace!("process_file input={} target_lang={target_lang}", input.display());
    info!("reading subtitles from {}", input.display());
    let bytes = fs::read(input)?;
    let text = encoding::decode(&bytes)?;
    let mut captions = srt::parse(&text)?;
    info!(
        "translating {} captions to {target_lang} with {}",
        captions.len(),
        translator.name()
    );
    translate_captions(translator, &mut captions, target_lang, policy).await?;

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_path(input, target_lang));
    info!("writing output to {}", out_path.display());
    let permissions = fs::metadata(input)?.permissions();
    write_atomic(&out_path, &srt::format(&captions), permissions)?;
    info!("wrote {}", out_path.display());
    Ok(out_path)
}

/// Write `content` through a temporary sibling file renamed into place.
/// The temporary file is private, so `permissions` are applied before the rename.
fn write_atomic(path: &Path, content: &str, permissions: fs::Permissions) -> Result<()> {
    trace!("write_atomic path={}", path.display());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.as_file().set_permissions(permissions)?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Estimate the time left from the average time per caption so far.
fn estimate_remaining(elapsed: Duration, done: usize, remaining: usize) -> Duration {
    trace!(
        "estimate_remaining elapsed={:?} done={} remaining={}",
        elapsed,
        done,
        remaining
    );
    if done == 0 {
        return Duration::ZERO;
    }
    elapsed / done as u32 * remaining as u32
}

/// Format a duration as "X minute Y seconds".
/// This helper is used to log a readable ETA for the translation loop.
fn format_eta(eta: Duration) -> String {
    let total_secs = eta.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let plural = |n: u64| if n == 1 { "" } else { "s" };
    if minutes > 0 {
        format!(
            "{} minute{} {} second{}",
            minutes,
            plural(minutes),
            seconds,
            plural(seconds)
        )
    } else {
        format!("{} second{}", seconds, plural(seconds))
    }
}
