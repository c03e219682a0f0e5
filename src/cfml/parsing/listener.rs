//! Driver-side diagnostic listener

use crate::cfml::grammar::{DiagnosticListener, GrammarError};
use std::cell::{Cell, RefCell};
use std::ops::Range;

/// Records every event a grammar engine reports during one FULL pass
#[derive(Debug, Default)]
pub struct CollectingListener {
    errors: RefCell<Vec<GrammarError>>,
    ambiguities: Cell<usize>,
    full_contexts: Cell<usize>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over the recorded syntax errors, leaving the list empty
    pub fn take_errors(&self) -> Vec<GrammarError> {
        self.errors.take()
    }

    pub fn ambiguities(&self) -> usize {
        self.ambiguities.get()
    }

    pub fn full_contexts(&self) -> usize {
        self.full_contexts.get()
    }

    pub fn clear(&self) {
        self.errors.borrow_mut().clear();
        self.ambiguities.set(0);
        self.full_contexts.set(0);
    }
}

impl DiagnosticListener for CollectingListener {
    fn syntax_error(&self, error: &GrammarError) {
        self.errors.borrow_mut().push(error.clone());
    }

    fn report_ambiguity(&self, _span: Range<usize>, _decision: &str) {
        self.ambiguities.set(self.ambiguities.get() + 1);
    }

    fn report_full_context(&self, _span: Range<usize>, _decision: &str) {
        self.full_contexts.set(self.full_contexts.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str) -> GrammarError {
        GrammarError {
            message: message.to_string(),
            span: 0..1,
            line: 1,
            column: 0,
            offending: ";".to_string(),
        }
    }

    #[test]
    fn test_counts_and_drains() {
        let listener = CollectingListener::new();
        listener.syntax_error(&error("first"));
        listener.syntax_error(&error("second"));
        listener.report_ambiguity(0..1, "block-or-struct");
        listener.report_full_context(0..1, "block-or-struct");
        listener.report_full_context(2..3, "tag-or-expression");

        assert_eq!(listener.ambiguities(), 1);
        assert_eq!(listener.full_contexts(), 2);
        let errors = listener.take_errors();
        assert_eq!(errors.len(), 2);
        assert!(listener.take_errors().is_empty());

        listener.clear();
        assert_eq!(listener.full_contexts(), 0);
    }
}
