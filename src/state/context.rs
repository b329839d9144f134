// Test contexts (nestable groups)

use std::sync::Arc;

/// A named, nestable group of tests.
///
/// Contexts are owned by whatever drives the run and handed to reporters as
/// `Arc<Context>`. Reporters compare them by identity, so two siblings with
/// the same description are still different contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub description: String,
    pub skip_reason: Option<String>,
}

impl Context {
    pub fn new(description: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            description: description.into(),
            skip_reason: None,
        })
    }

    /// Create a context that will be skipped
    pub fn skipped(description: impl Into<String>, reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            description: description.into(),
            skip_reason: Some(reason.into()),
        })
    }

    pub fn should_skip(&self) -> bool {
        self.skip_reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_skip() {
        assert!(!Context::new("math").should_skip());
        assert!(Context::skipped("net", "offline").should_skip());
    }

    #[test]
    fn test_same_description_distinct_identity() {
        let a = Context::new("group");
        let b = Context::new("group");
        assert_eq!(*a, *b);
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
