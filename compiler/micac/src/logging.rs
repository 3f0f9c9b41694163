//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

static TRACING_INIT: Once = Once::new();

/// Environment variable that selects the hierarchical layer, like `--trace-tree`.
pub const TRACE_TREE_ENV: &str = "MICA_TRACE_TREE";

/// Install the global subscriber. Safe to call more than once.
///
/// Nothing is installed unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=mica_flow=trace`. With `tree`, or `MICA_TRACE_TREE=1`, spans
/// and events are printed as an indented tree instead of flat lines.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = tree || std::env::var(TRACE_TREE_ENV).is_ok_and(|v| v == "1");
        if tree {
            tracing_subscriber::registry()
                .with(
                    HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
