//! Running size account for a single run.
//!
//! The tracker never validates on `commit`: callers check `would_fit` first and
//! commit immediately after, inside the single-threaded assembly loop.

/// Charged on top of each accepted fragment for its heading and fence markup.
pub const FRAGMENT_OVERHEAD: usize = 100;

#[derive(Debug, Clone)]
pub struct BudgetTracker {
    max_fragment_size: u64,
    max_document_size: usize,
    emitted_size: usize,
}

impl BudgetTracker {
    pub fn new(max_fragment_size: u64, max_document_size: usize) -> Self {
        Self {
            max_fragment_size,
            max_document_size,
            emitted_size: 0,
        }
    }

    pub fn max_fragment_size(&self) -> u64 {
        self.max_fragment_size
    }

    pub fn max_document_size(&self) -> usize {
        self.max_document_size
    }

    pub fn emitted_size(&self) -> usize {
        self.emitted_size
    }

    /// Saturates at zero: overhead charges may carry `emitted_size` past the ceiling.
    pub fn remaining(&self) -> usize {
        self.max_document_size.saturating_sub(self.emitted_size)
    }

    pub fn would_fit(&self, fragment_len: usize) -> bool {
        self.emitted_size.saturating_add(fragment_len) < self.max_document_size
    }

    pub fn commit(&mut self, fragment_len: usize) {
        self.emitted_size = self
            .emitted_size
            .saturating_add(fragment_len)
            .saturating_add(FRAGMENT_OVERHEAD);
    }

    /// True once `emitted_size` is strictly above `fraction` of the document ceiling.
    pub fn checkpoint_reached(&self, fraction: f64) -> bool {
        (self.emitted_size as f64) > (self.max_document_size as f64) * fraction
    }
}
