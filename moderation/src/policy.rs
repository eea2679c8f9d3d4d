//! The denylist content policy.

use factline_core::fact::ModerationStatus;

/// Deterministic content policy: reject any content containing a
/// denylisted substring.
///
/// The denylist is explicit configuration, not a literal buried in the
/// review path. Matching is a case-sensitive substring check: `"orange"`
/// rejects `"I like oranges"` but not `"Orange"`.
///
/// [`DenylistPolicy::review`] is a pure function of the content, so
/// repeated delivery of the same comment always produces the same verdict.
///
/// # Example
///
/// ```
/// use factline_moderation::DenylistPolicy;
/// use factline_core::fact::ModerationStatus;
///
/// let policy = DenylistPolicy::default();
/// assert_eq!(policy.review("nice post"), ModerationStatus::Approved);
/// assert_eq!(policy.review("I like oranges"), ModerationStatus::Rejected);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenylistPolicy {
    denylist: Vec<String>,
}

impl DenylistPolicy {
    /// Create a policy from an explicit denylist.
    #[must_use]
    pub const fn new(denylist: Vec<String>) -> Self {
        Self { denylist }
    }

    /// Compute the verdict for a comment body.
    #[must_use]
    pub fn review(&self, content: &str) -> ModerationStatus {
        if self.denylist.iter().any(|term| content.contains(term)) {
            ModerationStatus::Rejected
        } else {
            ModerationStatus::Approved
        }
    }

    /// The configured denied substrings.
    #[must_use]
    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }
}

impl Default for DenylistPolicy {
    /// The reference denylist: `["orange"]`.
    fn default() -> Self {
        Self::new(vec!["orange".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn denylisted_substring_is_rejected() {
        let policy = DenylistPolicy::default();
        assert_eq!(policy.review("I like oranges"), ModerationStatus::Rejected);
        assert_eq!(policy.review("orange"), ModerationStatus::Rejected);
    }

    #[test]
    fn clean_content_is_approved() {
        let policy = DenylistPolicy::default();
        assert_eq!(policy.review("nice post"), ModerationStatus::Approved);
        assert_eq!(policy.review(""), ModerationStatus::Approved);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let policy = DenylistPolicy::default();
        assert_eq!(policy.review("Orange you glad"), ModerationStatus::Approved);
        assert_eq!(policy.review("ORANGE"), ModerationStatus::Approved);
    }

    #[test]
    fn any_configured_term_rejects() {
        let policy = DenylistPolicy::new(vec!["orange".to_string(), "apple".to_string()]);
        assert_eq!(policy.review("apple pie"), ModerationStatus::Rejected);
        assert_eq!(policy.review("pear tart"), ModerationStatus::Approved);
    }

    proptest! {
        /// The verdict is a pure function of content and exactly mirrors
        /// the substring-containment predicate.
        #[test]
        fn verdict_is_pure_and_matches_containment(content in ".{0,64}") {
            let policy = DenylistPolicy::default();
            let expected = if content.contains("orange") {
                ModerationStatus::Rejected
            } else {
                ModerationStatus::Approved
            };
            prop_assert_eq!(policy.review(&content), expected);
            prop_assert_eq!(policy.review(&content), policy.review(&content));
        }
    }
}
