use conference_constraints::use_cases::{GET_EVENT, LOGIN, UPDATE_SESSION};
use conference_constraints::{
    Argument, ConstraintEngine, Constrained, FieldValue, Rule, count_words, standard_engine,
};
use conference_types::{
    CastVote, CreateEvent, CreateSession, CreateUser, EventId, Id, Login, UpdateEvent,
    UpdateSession, UpdateUser,
};
use proptest::prelude::*;
use similar_asserts::assert_eq;

const VALID: &str = "eb3a377c-1d2e-4f3a-8b4c-5d6e7f809a1b";

fn engine() -> ConstraintEngine {
    standard_engine().unwrap()
}

fn null_yields_one<T: Constrained>(engine: &ConstraintEngine) {
    let violations = engine.validate::<T>(None);
    assert_eq!(violations.len(), 1, "{}", T::TYPE_NAME);
    assert!(violations.contains("", "not_null"), "{}", T::TYPE_NAME);
}

#[test]
fn null_command_yields_exactly_one_violation_for_every_type() {
    let engine = engine();
    null_yields_one::<Id>(&engine);
    null_yields_one::<CreateEvent>(&engine);
    null_yields_one::<UpdateEvent>(&engine);
    null_yields_one::<CreateSession>(&engine);
    null_yields_one::<UpdateSession>(&engine);
    null_yields_one::<CastVote>(&engine);
    null_yields_one::<CreateUser>(&engine);
    null_yields_one::<UpdateUser>(&engine);
    null_yields_one::<Login>(&engine);
}

#[test]
fn uppercase_identifier_is_rejected() {
    let violations = engine().validate(Some(&Id::new(VALID.to_uppercase())));
    assert!(violations.contains("id", "uuid"));
}

#[test_log::test]
fn login_parameter_violations_snapshot() {
    let login = Login::default();
    let violations = engine().validate_parameters(LOGIN, &[Argument::object(&login)]);
    insta::assert_json_snapshot!(violations, @r#"
    [
      {
        "path": "command.email",
        "message": "must not be null",
        "rule_id": "required"
      },
      {
        "path": "command.password",
        "message": "must not be null",
        "rule_id": "required"
      }
    ]
    "#);
}

#[test_log::test]
fn update_session_any_of_reports_at_parameter_path() {
    let command = UpdateSession {
        event_id: Some(VALID.into()),
        session_id: Some("2cb4601f-8c3e-4f8a-bd2b-0a1b2c3d4e5f".into()),
        ..Default::default()
    };
    let violations = engine().validate_parameters(UPDATE_SESSION, &[Argument::object(&command)]);
    assert_eq!(violations.len(), 1);
    assert!(violations.contains("command", "any_of"));

    let command = UpdateSession {
        summary: Some(String::new()),
        ..command
    };
    let violations = engine().validate_parameters(UPDATE_SESSION, &[Argument::object(&command)]);
    assert!(violations.contains("command", "any_of"));
}

#[test]
fn identifier_parameter_is_checked_in_place() {
    let engine = engine();
    assert!(engine
        .validate_parameters(GET_EVENT, &[Argument::text(VALID)])
        .is_empty());

    let violations = engine.validate_parameters(GET_EVENT, &[Argument::Value(FieldValue::Absent)]);
    assert!(violations.contains("id", "required"));
}

#[derive(Clone, Debug)]
enum Mutation {
    Replace(usize, char),
    Delete(usize),
    Insert(usize, char),
}

fn mutate(s: &str, mutation: &Mutation) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    match *mutation {
        Mutation::Replace(i, c) => {
            let len = chars.len();
            chars[i % len] = c;
        }
        Mutation::Delete(i) => {
            chars.remove(i % chars.len());
        }
        Mutation::Insert(i, c) => chars.insert(i % (chars.len() + 1), c),
    }
    chars.into_iter().collect()
}

fn mutation() -> impl Strategy<Value = Mutation> {
    // Replacements come from outside the hex-and-hyphen alphabet so that the
    // result can never be another valid identifier.
    let foreign = prop::sample::select(vec!['g', 'z', 'A', 'F', ' ', '_', '{', '\n', 'é']);
    prop_oneof![
        (0..36usize, foreign.clone()).prop_map(|(i, c)| Mutation::Replace(i, c)),
        (0..36usize).prop_map(Mutation::Delete),
        (0..37usize, prop::char::any()).prop_map(|(i, c)| Mutation::Insert(i, c)),
    ]
}

const UUID_V4_REGEX: &str = "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}";

proptest! {
    #[test]
    fn generated_v4_identifiers_validate(s in UUID_V4_REGEX) {
        let engine = engine();
        prop_assert!(engine.validate(Some(&Id::new(s.clone()))).is_empty());
        prop_assert!(EventId::parse(&s).is_ok());
    }

    #[test]
    fn single_mutation_of_valid_identifier_is_rejected(
        s in UUID_V4_REGEX,
        m in mutation(),
    ) {
        let mutated = mutate(&s, &m);
        prop_assert!(!engine().validate(Some(&Id::new(mutated))).is_empty());
    }

    #[test]
    fn pattern_agrees_with_identifier_parser(
        s in "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-fA-F]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
    ) {
        let passes = engine().validate(Some(&Id::new(s.clone()))).is_empty();
        prop_assert_eq!(passes, EventId::parse(&s).is_ok());
    }

    #[test]
    fn word_count_matches_whitespace_tokens(
        words in prop::collection::vec("[a-z]{1,8}", 0..20),
        sep in "[ \t\n]{1,3}",
        pad in "[ \t]{0,2}",
    ) {
        let text = format!("{pad}{}{pad}", words.join(&sep));
        prop_assert_eq!(count_words(&text), words.len());

        let rule = Rule::word_count(5, 10).unwrap();
        let passes = rule.check("d", &FieldValue::Text(&text)).is_none();
        prop_assert_eq!(passes, (5..=10).contains(&words.len()));
    }
}
