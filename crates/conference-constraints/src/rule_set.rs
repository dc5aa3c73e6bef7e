//! Per-type rule tables.
//!
//! A [`RuleSet`] is built once from a [`RuleSetBuilder`] and is immutable
//! afterwards. Building is where configuration mistakes surface: unknown
//! field names, rules attached to fields they cannot apply to, and empty
//! any-of groups all fail [`RuleSetBuilder::build`].

use std::fmt;
use std::marker::PhantomData;

use crate::error::{ConstraintError, Violation, Violations};
use crate::rule::Rule;
use crate::value::Constrained;

/// Cross-field rule: at least one of the named fields must be populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnyOf {
    fields: Vec<&'static str>,
}

impl AnyOf {
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Evaluate against `object`, reporting at the object's own path.
    pub fn check<T: Constrained>(&self, path: &str, object: &T) -> Option<Violation> {
        if self
            .fields
            .iter()
            .any(|name| object.field(name).is_populated())
        {
            return None;
        }
        Some(Violation::new(
            path,
            format!("at least one of [{}] must be provided", self.fields.join(", ")),
            "any_of",
        ))
    }
}

struct FieldRules {
    name: &'static str,
    rules: Vec<Rule>,
}

/// Ordered rule table for one [`Constrained`] type.
pub struct RuleSet<T> {
    fields: Vec<FieldRules>,
    any_of: Vec<AnyOf>,
    _type: PhantomData<fn(&T)>,
}

impl<T: Constrained> RuleSet<T> {
    pub fn builder() -> RuleSetBuilder<T> {
        RuleSetBuilder {
            fields: Vec::new(),
            any_of: Vec::new(),
            error: None,
            _type: PhantomData,
        }
    }

    /// Append every violation of `object` to `out`.
    ///
    /// Field paths are `prefix.field`, or just `field` when `prefix` is
    /// empty. Any-of rules run after all field rules and report at `prefix`.
    pub fn check_into(&self, object: &T, prefix: &str, out: &mut Violations) {
        for field in &self.fields {
            let path = join_path(prefix, field.name);
            let value = object.field(field.name);
            for rule in &field.rules {
                if let Some(violation) = rule.check(&path, &value) {
                    out.push(violation);
                }
            }
        }
        for any_of in &self.any_of {
            if let Some(violation) = any_of.check(prefix, object) {
                out.push(violation);
            }
        }
    }

    pub fn check(&self, object: &T) -> Violations {
        let mut out = Violations::new();
        self.check_into(object, "", &mut out);
        out
    }

    /// Names of fields carrying at least one rule, in evaluation order.
    pub fn constrained_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn any_of_rules(&self) -> &[AnyOf] {
        &self.any_of
    }
}

impl<T: Constrained> fmt::Debug for RuleSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("type", &T::TYPE_NAME)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|fr| (fr.name, fr.rules.iter().map(Rule::id).collect::<Vec<_>>()))
                    .collect::<Vec<_>>(),
            )
            .field("any_of", &self.any_of)
            .finish()
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Collects rules for a type; the first configuration error wins and is
/// returned from [`Self::build`].
pub struct RuleSetBuilder<T> {
    fields: Vec<FieldRules>,
    any_of: Vec<AnyOf>,
    error: Option<ConstraintError>,
    _type: PhantomData<fn(&T)>,
}

impl<T: Constrained> RuleSetBuilder<T> {
    /// Attach `rules` to `name`, after any rules already attached to it.
    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let Some(kind) = T::field_kind(name) else {
            self.error = Some(ConstraintError::UnknownField {
                type_name: T::TYPE_NAME,
                field: name,
            });
            return self;
        };
        let rules: Vec<Rule> = rules.into_iter().collect();
        if let Some(rule) = rules.iter().find(|rule| !rule.applies_to(kind)) {
            self.error = Some(ConstraintError::RuleNotApplicable {
                type_name: T::TYPE_NAME,
                field: name,
                rule: rule.id(),
            });
            return self;
        }
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.rules.extend(rules),
            None => self.fields.push(FieldRules { name, rules }),
        }
        self
    }

    /// Require at least one of `names` to be populated.
    pub fn any_of(mut self, names: impl IntoIterator<Item = &'static str>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let fields: Vec<&'static str> = names.into_iter().collect();
        if fields.is_empty() {
            self.error = Some(ConstraintError::EmptyAnyOf {
                type_name: T::TYPE_NAME,
            });
            return self;
        }
        if let Some(unknown) = fields.iter().find(|name| T::field_kind(name).is_none()) {
            self.error = Some(ConstraintError::UnknownField {
                type_name: T::TYPE_NAME,
                field: *unknown,
            });
            return self;
        }
        self.any_of.push(AnyOf { fields });
        self
    }

    /// Freeze the table, ordering fields by declaration order.
    pub fn build(self) -> Result<RuleSet<T>, ConstraintError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut fields = self.fields;
        fields.sort_by_key(|f| {
            T::FIELDS
                .iter()
                .position(|declared| declared.name == f.name)
                .unwrap_or(usize::MAX)
        });
        Ok(RuleSet {
            fields,
            any_of: self.any_of,
            _type: PhantomData,
        })
    }
}
