//! Checks a set of `name=value` assignments against a model definition.
//!
//! ```text
//! propmodel user.toml login="Jane Doe" age=42
//! ```
//!
//! Every pair is assigned as text, so typed properties go through their
//! coercion. The coerced values are printed followed by any validation
//! failures. Set `RUST_LOG=debug` to see declarations and coercions.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use propmodel::definition::ModelDefinition;
use propmodel::model::Model;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: propmodel <definition> [name=value ...]");
        return ExitCode::from(2);
    };
    let model_type = match ModelDefinition::load(&path).and_then(|definition| definition.build()) {
        Ok(model_type) => Arc::new(model_type),
        Err(e) => {
            error!(path = %path, error = %e, "could not load model definition");
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut model = Model::new(Arc::clone(&model_type));
    for pair in args {
        let Some((key, value)) = pair.split_once('=') else {
            eprintln!("expected name=value, got '{}'", pair);
            return ExitCode::from(2);
        };
        if let Err(e) = model.set(key, value) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    for (name, value) in model.iter() {
        println!("{} = {}", name, value.inspect());
    }
    match model.validate_strict() {
        Ok(()) => {
            info!(model = model_type.name(), "valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            for failure in e.failures() {
                println!("invalid: {}", failure);
            }
            ExitCode::FAILURE
        }
    }
}
