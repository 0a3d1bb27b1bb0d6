//! Lenient parse output shared by the port and target parsers.

/// Items produced by a best-effort parse, plus the tokens that were dropped.
///
/// Dropped tokens are a diagnostic only; a parse never fails because of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    /// Successfully parsed items, deduplicated.
    pub items: Vec<T>,
    /// Tokens that contributed nothing, in input order.
    pub ignored: Vec<String>,
}

impl<T> Parsed<T> {
    /// Check whether any token was dropped.
    pub fn has_ignored(&self) -> bool {
        !self.ignored.is_empty()
    }
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ignored: Vec::new(),
        }
    }
}
