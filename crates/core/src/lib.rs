//! Subtitle translation: decode an SRT file, translate each caption through a
//! pluggable backend and write the result with the original timing.

pub mod encoding;
pub mod error;
pub mod reflow;
pub mod srt;
pub mod translate;

pub use error::{Error, Result};
