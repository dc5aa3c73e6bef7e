//! Declarative validation for conference commands.
//!
//! Command types describe their fields through [`Constrained`]; a [`RuleSet`]
//! per type lists the [`Rule`]s each field must satisfy plus any cross-field
//! [`AnyOf`] rules. The [`ConstraintEngine`] holds one rule set per type and
//! one [`UseCaseSignature`] per use case, and returns every [`Violation`]
//! found rather than stopping at the first.
//!
//! Configuration mistakes surface as [`ConstraintError`] while tables are
//! built. Validation itself never fails: bad input yields violations.

mod engine;
mod error;
pub mod patterns;
mod rule;
mod rule_set;
pub mod rules;
mod value;

pub use engine::{
    Argument, Checkable, ConstraintEngine, ConstraintEngineBuilder, ParamSpec, UseCaseHandle,
    UseCaseSignature,
};
pub use error::{ConstraintError, ValidationFailure, Violation, Violations};
pub use rule::{Bound, PatternRule, Rule, count_words};
pub use rule_set::{AnyOf, RuleSet, RuleSetBuilder};
pub use rules::standard_engine;
pub use rules::use_cases;
pub use value::{Constrained, Field, FieldKind, FieldValue};
