//! Error types surfaced by the library.

use thiserror::Error;

/// Everything that can abort the translation of a subtitle file.
#[derive(Error, Debug)]
pub enum Error {
    /// The input bytes are malformed in the encoding we detected for them.
    #[error("could not detect the character encoding (input is not valid {encoding})")]
    EncodingDetection { encoding: &'static str },

    /// The decoded text is not a well-formed sequence of caption blocks.
    #[error("malformed subtitle at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A single translation unit failed on every attempt.
    #[error("translation failed after {attempts} attempts for {text:?}: {reason}")]
    TranslationExhausted {
        text: String,
        attempts: u32,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
