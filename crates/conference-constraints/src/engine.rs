//! The constraint engine: a frozen registry of rule sets and use-case
//! signatures.
//!
//! Provides two entry points:
//! - **Objects** ([`ConstraintEngine::validate`]): run the registered
//!   [`RuleSet`] of a command type and collect every violation.
//! - **Parameters** ([`ConstraintEngine::validate_parameters`]): check the
//!   positional arguments of a use case against its registered
//!   [`UseCaseSignature`], cascading into object arguments.
//!
//! Neither entry point fails on bad data. A null object, a missing rule set
//! or a mismatched argument list each produce a root-level violation
//! instead, so the result is never empty for input that cannot be acted on.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::error::{ConstraintError, Violation, Violations};
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use crate::value::{Constrained, FieldKind, FieldValue};

/// Object-safe view of a [`Constrained`] value, used for object parameters.
pub trait Checkable {
    fn check_with(&self, engine: &ConstraintEngine, path: &str, out: &mut Violations);
}

impl<T: Constrained> Checkable for T {
    fn check_with(&self, engine: &ConstraintEngine, path: &str, out: &mut Violations) {
        engine.check_object(self, path, out);
    }
}

/// Name of a registered use case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UseCaseHandle(&'static str);

impl UseCaseHandle {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for UseCaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One positional argument handed to [`ConstraintEngine::validate_parameters`].
pub enum Argument<'a> {
    Value(FieldValue<'a>),
    /// A command object. `None` stands for a null argument.
    Object(Option<&'a dyn Checkable>),
}

impl<'a> Argument<'a> {
    pub fn object<T: Constrained>(object: &'a T) -> Self {
        Self::Object(Some(object))
    }

    pub fn text(text: &'a str) -> Self {
        Self::Value(FieldValue::Text(text))
    }
}

#[derive(Debug)]
enum ParamKind {
    Value(FieldKind),
    Object,
}

/// Declared parameter of a use case.
#[derive(Debug)]
pub struct ParamSpec {
    name: &'static str,
    kind: ParamKind,
    rules: Vec<Rule>,
}

impl ParamSpec {
    /// A scalar parameter checked with `rules`.
    pub fn value(
        name: &'static str,
        kind: FieldKind,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Value(kind),
            rules: rules.into_iter().collect(),
        }
    }

    /// A non-null command object, validated with its own rule set.
    pub fn object(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Object,
            rules: Vec::new(),
        }
    }
}

/// Ordered parameter list of one use case.
#[derive(Debug)]
pub struct UseCaseSignature {
    handle: UseCaseHandle,
    params: Vec<ParamSpec>,
}

impl UseCaseSignature {
    pub fn new(handle: UseCaseHandle, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        Self {
            handle,
            params: params.into_iter().collect(),
        }
    }

    fn verify(&self) -> Result<(), ConstraintError> {
        for (index, param) in self.params.iter().enumerate() {
            if self.params[..index].iter().any(|p| p.name == param.name) {
                return Err(ConstraintError::DuplicateParameter {
                    use_case: self.handle.name(),
                    param: param.name,
                });
            }
            if let ParamKind::Value(kind) = param.kind {
                if let Some(rule) = param.rules.iter().find(|r| !r.applies_to(kind)) {
                    return Err(ConstraintError::RuleNotApplicable {
                        type_name: self.handle.name(),
                        field: param.name,
                        rule: rule.id(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Frozen registry of rule sets and use-case signatures.
///
/// Immutable after [`ConstraintEngineBuilder::build`]; share it behind an
/// `Arc` across threads without further synchronization.
pub struct ConstraintEngine {
    rule_sets: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    type_names: Vec<&'static str>,
    signatures: HashMap<UseCaseHandle, UseCaseSignature>,
}

impl ConstraintEngine {
    pub fn builder() -> ConstraintEngineBuilder {
        ConstraintEngineBuilder {
            engine: ConstraintEngine {
                rule_sets: HashMap::new(),
                type_names: Vec::new(),
                signatures: HashMap::new(),
            },
            error: None,
        }
    }

    /// Validate one object.
    ///
    /// `None` yields exactly one `not_null` violation at the root path.
    pub fn validate<T: Constrained>(&self, object: Option<&T>) -> Violations {
        let mut out = Violations::new();
        match object {
            Some(object) => self.check_object(object, "", &mut out),
            None => out.push(Violation::not_null("")),
        }
        out
    }

    /// Validate the positional arguments of the use case named by `handle`.
    ///
    /// Value parameters are reported at the parameter name; object parameters
    /// cascade into their rule set with the parameter name as path prefix.
    pub fn validate_parameters(&self, handle: UseCaseHandle, args: &[Argument<'_>]) -> Violations {
        let mut out = Violations::new();
        let Some(signature) = self.signatures.get(&handle) else {
            warn!(target: "conference::constraints", use_case = %handle, "no signature registered");
            out.push(Violation::new(
                "",
                format!("no signature registered for use case `{handle}`"),
                "unregistered",
            ));
            return out;
        };
        if signature.params.len() != args.len() {
            warn!(
                target: "conference::constraints",
                use_case = %handle,
                expected = signature.params.len(),
                actual = args.len(),
                "argument count mismatch"
            );
            out.push(Violation::new(
                "",
                format!(
                    "expected {} argument(s), got {}",
                    signature.params.len(),
                    args.len()
                ),
                "signature_mismatch",
            ));
            return out;
        }
        for (param, arg) in signature.params.iter().zip(args) {
            match (&param.kind, arg) {
                (ParamKind::Value(_), Argument::Value(value)) => {
                    for rule in &param.rules {
                        if let Some(violation) = rule.check(param.name, value) {
                            out.push(violation);
                        }
                    }
                }
                (ParamKind::Object, Argument::Object(Some(object))) => {
                    object.check_with(self, param.name, &mut out);
                }
                (ParamKind::Object, Argument::Object(None)) => {
                    out.push(Violation::not_null(param.name));
                }
                _ => {
                    warn!(
                        target: "conference::constraints",
                        use_case = %handle,
                        param = param.name,
                        "argument kind does not match declared parameter"
                    );
                    out.push(Violation::new(
                        param.name,
                        "argument kind does not match the declared parameter",
                        "signature_mismatch",
                    ));
                }
            }
        }
        out
    }

    /// Registered rule set for `T`, if any.
    pub fn rule_set<T: Constrained>(&self) -> Option<&RuleSet<T>> {
        self.rule_sets
            .get(&TypeId::of::<T>())
            .and_then(|set| set.downcast_ref::<RuleSet<T>>())
    }

    pub fn is_registered<T: Constrained>(&self) -> bool {
        self.rule_sets.contains_key(&TypeId::of::<T>())
    }

    /// Type names of every registered rule set, in registration order.
    pub fn registered_types(&self) -> &[&'static str] {
        &self.type_names
    }

    fn check_object<T: Constrained>(&self, object: &T, path: &str, out: &mut Violations) {
        match self.rule_set::<T>() {
            Some(rules) => rules.check_into(object, path, out),
            None => {
                warn!(
                    target: "conference::constraints",
                    type_name = T::TYPE_NAME,
                    "no rule set registered"
                );
                out.push(Violation::new(
                    path,
                    format!("no rule set registered for {}", T::TYPE_NAME),
                    "unregistered",
                ));
            }
        }
    }
}

impl fmt::Debug for ConstraintEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut use_cases: Vec<_> = self.signatures.keys().map(|h| h.name()).collect();
        use_cases.sort_unstable();
        f.debug_struct("ConstraintEngine")
            .field("types", &self.type_names)
            .field("use_cases", &use_cases)
            .finish()
    }
}

/// Registers rule sets and signatures; the first error wins.
pub struct ConstraintEngineBuilder {
    engine: ConstraintEngine,
    error: Option<ConstraintError>,
}

impl ConstraintEngineBuilder {
    pub fn register<T: Constrained>(mut self, rule_set: RuleSet<T>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let type_id = TypeId::of::<T>();
        if self.engine.rule_sets.contains_key(&type_id) {
            self.error = Some(ConstraintError::DuplicateRuleSet {
                type_name: T::TYPE_NAME,
            });
            return self;
        }
        self.engine.rule_sets.insert(type_id, Box::new(rule_set));
        self.engine.type_names.push(T::TYPE_NAME);
        self
    }

    pub fn signature(mut self, signature: UseCaseSignature) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(error) = signature.verify() {
            self.error = Some(error);
            return self;
        }
        if self.engine.signatures.contains_key(&signature.handle) {
            self.error = Some(ConstraintError::DuplicateUseCase {
                use_case: signature.handle.name(),
            });
            return self;
        }
        self.engine.signatures.insert(signature.handle, signature);
        self
    }

    pub fn build(self) -> Result<ConstraintEngine, ConstraintError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Field;

    #[derive(Default)]
    struct Ping {
        target: Option<String>,
    }

    impl Constrained for Ping {
        const TYPE_NAME: &'static str = "Ping";
        const FIELDS: &'static [Field] = &[Field::new("target", FieldKind::Text)];

        fn field(&self, name: &str) -> FieldValue<'_> {
            match name {
                "target" => (&self.target).into(),
                _ => FieldValue::Absent,
            }
        }
    }

    struct Unregistered;

    impl Constrained for Unregistered {
        const TYPE_NAME: &'static str = "Unregistered";
        const FIELDS: &'static [Field] = &[];

        fn field(&self, _name: &str) -> FieldValue<'_> {
            FieldValue::Absent
        }
    }

    const PING: UseCaseHandle = UseCaseHandle::new("ping");
    const LOOKUP: UseCaseHandle = UseCaseHandle::new("lookup");

    fn engine() -> ConstraintEngine {
        ConstraintEngine::builder()
            .register(
                RuleSet::<Ping>::builder()
                    .field("target", [Rule::required()])
                    .build()
                    .unwrap(),
            )
            .signature(UseCaseSignature::new(PING, [ParamSpec::object("command")]))
            .signature(UseCaseSignature::new(
                LOOKUP,
                [ParamSpec::value(
                    "id",
                    FieldKind::Text,
                    [Rule::required(), Rule::length(2, 4).unwrap()],
                )],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn null_object_yields_exactly_one_root_violation() {
        let violations = engine().validate::<Ping>(None);
        assert_eq!(violations.into_vec(), vec![Violation::not_null("")]);
    }

    #[test]
    fn unregistered_type_never_passes_silently() {
        let violations = engine().validate(Some(&Unregistered));
        assert_eq!(violations.len(), 1);
        assert!(violations.contains("", "unregistered"));
    }

    #[test]
    fn object_parameter_cascades_with_prefixed_paths() {
        let ping = Ping::default();
        let violations = engine().validate_parameters(PING, &[Argument::object(&ping)]);
        assert!(violations.contains("command.target", "required"));
    }

    #[test]
    fn null_object_parameter_is_reported_at_parameter_path() {
        let violations = engine().validate_parameters(PING, &[Argument::Object(None)]);
        assert_eq!(violations.into_vec(), vec![Violation::not_null("command")]);
    }

    #[test]
    fn value_parameter_runs_its_rules() {
        let engine = engine();
        assert!(engine
            .validate_parameters(LOOKUP, &[Argument::text("abc")])
            .is_empty());
        let violations = engine.validate_parameters(LOOKUP, &[Argument::text("abcdef")]);
        assert!(violations.contains("id", "bound"));
    }

    #[test]
    fn arity_or_kind_mismatch_is_reported_not_raised() {
        let engine = engine();
        let violations = engine.validate_parameters(LOOKUP, &[]);
        assert!(violations.contains("", "signature_mismatch"));

        let violations = engine.validate_parameters(LOOKUP, &[Argument::Object(None)]);
        assert!(violations.contains("id", "signature_mismatch"));
    }

    #[test]
    fn unknown_use_case_is_reported() {
        let violations =
            engine().validate_parameters(UseCaseHandle::new("nope"), &[Argument::text("x")]);
        assert!(violations.contains("", "unregistered"));
    }

    #[test]
    fn duplicate_registrations_are_configuration_errors() {
        let err = ConstraintEngine::builder()
            .register(RuleSet::<Ping>::builder().build().unwrap())
            .register(RuleSet::<Ping>::builder().build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstraintError::DuplicateRuleSet { type_name: "Ping" }));

        let err = ConstraintEngine::builder()
            .signature(UseCaseSignature::new(PING, [ParamSpec::object("a")]))
            .signature(UseCaseSignature::new(PING, [ParamSpec::object("b")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstraintError::DuplicateUseCase { use_case: "ping" }));
    }

    #[test]
    fn signature_rules_must_fit_parameter_kind() {
        let err = ConstraintEngine::builder()
            .signature(UseCaseSignature::new(
                LOOKUP,
                [ParamSpec::value(
                    "id",
                    FieldKind::Integer,
                    [Rule::word_count(0, 1).unwrap()],
                )],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstraintError::RuleNotApplicable { field: "id", .. }));
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let err = ConstraintEngine::builder()
            .signature(UseCaseSignature::new(
                PING,
                [ParamSpec::object("command"), ParamSpec::object("command")],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstraintError::DuplicateParameter { param: "command", .. }));
    }
}
