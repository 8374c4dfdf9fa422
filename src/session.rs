//! Collect-then-calculate session.
//!
//! Edits only touch the request snapshot and bump a revision; the pipeline
//! runs once per explicit [`QuoteSession::calculate`]. Results carry the
//! revision they were computed from so callers can drop stale ones.

use serde::Serialize;
use tracing::debug;

use crate::error::QuoteError;
use crate::quote::{Quote, QuoteRequest, generate_quote};

/// A quote tagged with the request revision it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StampedQuote {
    pub revision: u64,
    pub quote: Quote,
}

/// Editable request plus revision counter.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    request: QuoteRequest,
    revision: u64,
}

impl QuoteSession {
    pub fn new(request: QuoteRequest) -> Self {
        Self {
            request,
            revision: 0,
        }
    }

    pub fn request(&self) -> &QuoteRequest {
        &self.request
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies an edit without computing anything.
    pub fn edit(&mut self, f: impl FnOnce(&mut QuoteRequest)) {
        f(&mut self.request);
        self.revision += 1;
    }

    /// Replaces the whole request.
    pub fn replace(&mut self, request: QuoteRequest) {
        self.edit(|r| *r = request);
    }

    /// Runs the full pipeline on the current snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`generate_quote`] errors.
    pub fn calculate(&self) -> Result<StampedQuote, QuoteError> {
        debug!(revision = self.revision, "calculating quote");
        let quote = generate_quote(&self.request)?;
        Ok(StampedQuote {
            revision: self.revision,
            quote,
        })
    }

    /// Whether `stamped` reflects the current inputs.
    pub fn is_current(&self, stamped: &StampedQuote) -> bool {
        stamped.revision == self.revision
    }
}
