use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use propmodel::{BuiltinType, Model, ModelType, PropertyOptions, Symbol, TypeCoercionRegistry, Value};

fn user_type() -> Arc<ModelType> {
    let mut user = ModelType::new("User");
    user.property("login", PropertyOptions::new().required().max_length(16).from("UserLogin"))
        .property("age", PropertyOptions::new().of_type(BuiltinType::Integer).default(18))
        .property("born", PropertyOptions::new().of_type(BuiltinType::Date))
        .property("role", PropertyOptions::new().of_type(BuiltinType::Symbol))
        .property(
            "score",
            PropertyOptions::new()
                .of_type(BuiltinType::Float)
                .validator(|name, value| match value.as_float() {
                    Some(score) if score < 0.0 => Some(format!("{} must not be negative", name)),
                    _ => None,
                }),
        );
    Arc::new(user)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut registry = TypeCoercionRegistry::new();
    registry.add_property_type("count", BuiltinType::Integer);
    registry.add_property_type("when", BuiltinType::Date);
    let count = Value::from("1_000_000");
    let when = Value::from("March 10, 2011");
    c.bench_function("coerce integer", |b| b.iter(|| registry.coerce(black_box("count"), black_box(&count))));
    c.bench_function("coerce date", |b| b.iter(|| registry.coerce(black_box("when"), black_box(&when))));
    c.bench_function("normalize symbol", |b| {
        b.iter(|| Symbol::normalize(black_box("  SomeHTTPRequest  header-Name ")))
    });

    let user_type = user_type();
    c.bench_function("assign 5 properties", |b| {
        b.iter(|| {
            let mut user = Model::new(Arc::clone(&user_type));
            user.set("UserLogin", "jane").ok();
            user.set("age", "42").ok();
            user.set("born", "1981-02-03").ok();
            user.set("role", "Power User").ok();
            user.set("score", "7.5").ok();
            user
        })
    });

    let mut user = Model::new(Arc::clone(&user_type));
    user.set("login", "a_login_that_is_far_too_long").ok();
    user.set("score", "-1").ok();
    c.bench_function("validate failing model", |b| b.iter(|| black_box(&user).validate()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
