mod compiler;
pub mod expr;
mod rule;
mod variant;

pub use compiler::{compile, EXTRA_RULES_COMMENT, GENERATED_RULES_COMMENT};
pub use rule::{AllowValue, Rule, RuleOperation};
pub use variant::collection_rules;
