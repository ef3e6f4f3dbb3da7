use std::collections::HashMap;
use std::sync::Arc;

use propmodel::validation::{
    is_length_valid, is_required_valid, is_type_valid, validate_length, validate_length_strict,
    validate_required, validate_required_strict, validate_type,
};
use propmodel::{
    BuiltinType, FailureKind, Model, ModelType, PropertyOptions, PropmodelError, Rejection,
    Validator, ValidatorChain, Value,
};

fn values(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn reject(message: &'static str) -> Validator {
    Validator::custom(move |_, _| Some(message.to_owned()))
}

#[test]
fn validators_accumulate_in_registration_order() {
    let mut chain = ValidatorChain::new();
    chain.add_validator("name", reject("first"));
    chain.add_validator("name", reject("second"));
    let failures = chain.validate(&values(&[("name", Value::from("x"))]));
    let messages: Vec<&str> = failures.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second"]);
    assert!(failures.iter().all(|f| f.property == "name" && f.kind == FailureKind::Custom { detail: None }));
}

#[test]
fn validation_is_exhaustive_across_properties() {
    let mut chain = ValidatorChain::new();
    chain.add_validator("name", Validator::Required);
    chain.add_validator("code", Validator::MaxLength(2));
    chain.add_validator("code", reject("never"));
    let failures = chain.validate(&values(&[("code", Value::from("abc"))]));
    let properties: Vec<&str> = failures.iter().map(|f| f.property.as_str()).collect();
    assert_eq!(properties, vec!["name", "code", "code"]);
}

#[test]
fn passing_validators_produce_nothing() {
    let mut chain = ValidatorChain::new();
    chain.add_validator("name", Validator::custom(|_, _| None::<String>));
    chain.add_validator("name", Validator::Required);
    assert!(chain.validate(&values(&[("name", Value::from("Jane"))])).is_empty());
    assert!(chain.validate_strict(&values(&[("name", Value::from("Jane"))])).is_ok());
}

#[test]
fn custom_validators_see_name_and_value() {
    let mut chain = ValidatorChain::new();
    chain.add_validator(
        "age",
        Validator::custom(|name, value| match value.as_integer() {
            Some(age) if age < 18 => Some(format!("{} must be at least 18, got {}", name, age)),
            _ => None,
        }),
    );
    let failures = chain.validate(&values(&[("age", Value::Integer(12))]));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].message, "age must be at least 18, got 12");
}

#[test]
fn custom_validators_can_attach_a_detail() {
    let mut chain = ValidatorChain::new();
    chain.add_validator(
        "age",
        Validator::custom(|name, value| {
            let age = value.as_integer()?;
            (age < 18).then(|| {
                Rejection::new(format!("{} is too young", name)).with_detail(vec![age, 18])
            })
        }),
    );
    chain.add_validator("age", Validator::custom(|_, _| Some("never")));
    let failures = chain.validate(&values(&[("age", Value::Integer(12))]));
    assert_eq!(failures[0].message, "age is too young");
    assert_eq!(
        failures[0].kind,
        FailureKind::Custom { detail: Some(Value::from(vec![12i64, 18])) }
    );
    assert_eq!(failures[1].kind, FailureKind::Custom { detail: None });
    assert_eq!(failures[1].message, "never");
}

#[test]
fn required_rejects_nil_and_blank_text_once() {
    for blank in [Value::Nil, Value::from(""), Value::from("   ")] {
        let failures = validate_required([("name", &blank)]);
        assert_eq!(failures.len(), 1, "{blank:?}");
        assert_eq!(failures[0].kind, FailureKind::Required);
        assert_eq!(failures[0].message, "name must not be nil or blank");
    }
    assert!(validate_required([("name", &Value::from("Jane"))]).is_empty());
}

#[test]
fn required_accepts_empty_lists_and_zero() {
    assert!(is_required_valid([("tags", &Value::List(vec![]))]));
    assert!(is_required_valid([("count", &Value::Integer(0))]));
}

#[test]
fn required_strict_carries_every_failure() {
    let err = validate_required_strict([("a", &Value::Nil), ("b", &Value::from(" ")), ("c", &Value::from("c"))])
        .unwrap_err();
    let properties: Vec<&str> = err.failures().iter().map(|f| f.property.as_str()).collect();
    assert_eq!(properties, vec!["a", "b"]);
}

#[test]
fn max_length_bounds() {
    let too_long = validate_length("code", &Value::from("abcdef"), Some(5)).expect("length 6 fails");
    assert_eq!(too_long.kind, FailureKind::TooLong { max: 5, actual: 6 });
    assert_eq!(too_long.message, "code must be less than 5 characters");
    assert!(is_length_valid("code", &Value::from("abcde"), Some(5)));
    assert!(is_length_valid("code", &Value::Nil, Some(5)));
    assert!(validate_length_strict("code", &Value::from("abcdef"), Some(5)).is_err());
}

#[test]
fn max_length_measures_lists_by_elements() {
    let tags = Value::from(vec!["a", "b", "c"]);
    assert!(is_length_valid("tags", &tags, Some(3)));
    assert!(!is_length_valid("tags", &tags, Some(2)));
}

#[test]
fn type_rule_uses_the_builtin_coercion() {
    assert!(is_type_valid("age", &Value::from("42"), BuiltinType::Integer));
    assert!(is_type_valid("age", &Value::Nil, BuiltinType::Integer));
    let failure = validate_type("age", &Value::from("old"), BuiltinType::Integer).expect("not an integer");
    assert_eq!(failure.kind, FailureKind::WrongType { expected: BuiltinType::Integer });
    assert!(failure.message.starts_with("age must be of type integer"));
}

#[test]
fn strict_validation_matches_the_failure_list() {
    let mut model_type = ModelType::new("Account");
    model_type
        .property("login", PropertyOptions::new().required().max_length(5))
        .property("email", PropertyOptions::new().required());
    let mut account = Model::new(Arc::new(model_type));

    account.set("login", "toolong").unwrap();
    let failures = account.validate();
    assert_eq!(failures.len(), 2);
    match account.validate_strict().unwrap_err() {
        PropmodelError::Validation(raised) => assert_eq!(raised, failures),
        other => panic!("unexpected error {other:?}"),
    }

    account.set("login", "jane").unwrap();
    account.set("email", "jane@example.com").unwrap();
    assert!(account.validate().is_empty());
    assert!(account.validate_strict().is_ok());
    assert!(account.is_valid());
}

#[test]
fn validation_error_displays_every_message() {
    let err = validate_required_strict([("a", &Value::Nil), ("b", &Value::Nil)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: a must not be nil or blank; b must not be nil or blank"
    );
}
