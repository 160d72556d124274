//! Sable driver library.
//!
//! Loads a syntax tree serialized as JSON, runs it on the explicit-control
//! evaluator and renders evaluator errors as coded diagnostics. The `sable`
//! binary is a thin argument parser over [`commands`].

use std::sync::Once;

use sable_ir::Ast;

pub mod commands;
pub mod problem;

pub use problem::eval_error_to_diagnostic;

/// Failure to turn JSON into a validated tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Malformed JSON, an unknown node shape, or a tree that fails
    /// validation (dangling child, root that is not a program).
    #[error("invalid syntax tree: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deserialize and validate a syntax tree.
pub fn load_ast(json: &str) -> Result<Ast, LoadError> {
    Ok(serde_json::from_str(json)?)
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=sable_eval=debug` or `RUST_LOG=sable_eval=trace`;
/// `tree` switches to indented span output and turns debug output on even
/// without `RUST_LOG`.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) if tree => EnvFilter::new("sable_eval=debug"),
            Err(_) => return,
        };
        if tree {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
