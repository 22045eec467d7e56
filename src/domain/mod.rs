//! Domain model - tags, name matchers and rules, independent of any registry

pub mod pattern;
pub mod rule;
pub mod tag;

pub use pattern::TagMatcher;
pub use rule::{ExceptionRule, RetentionRule, RuleSet};
pub use tag::{Image, Tag};
