//! Language-specific phonemizer backends.
//!
//! Each engine lives in its own module and implements
//! [`PhonemizerBackend`](crate::PhonemizerBackend):
//! - `korean` - Hangul decomposition + phonological rules
//! - `spanish` - context-sensitive orthography rules with dialect variants
//! - `chinese` - pinyin dictionary lookup + pinyin-to-IPA mapping
//! - `english` - CMU-format lexicon with letter-to-sound fallback

pub mod chinese;
pub mod english;
pub mod korean;
pub mod spanish;

use std::sync::Arc;

use crate::error::{PhonemizerError, Result};

/// Lifecycle of an engine's loaded data.
///
/// Loaded data is immutable; callers take an `Arc` snapshot and drop the
/// lock before doing any work, so phonemization never holds the state lock
/// and disposal can proceed concurrently.
pub(crate) enum EngineState<T> {
    Empty,
    Ready(Arc<T>),
    Disposed,
}

impl<T> EngineState<T> {
    pub fn snapshot(&self) -> Result<Arc<T>> {
        match self {
            EngineState::Ready(data) => Ok(Arc::clone(data)),
            EngineState::Empty | EngineState::Disposed => Err(PhonemizerError::NotInitialized),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready(_))
    }
}
