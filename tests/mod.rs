//! Test suite for the tunequeue music bot
//! Player scenarios run against in-memory resolver, driver and notifier doubles

pub mod common;
pub mod integration;

pub use assert_matches::assert_matches;
pub use pretty_assertions::assert_eq;

/// Common test setup and utilities
pub mod test_utils {
    use std::sync::Once;
    use tracing::Level;

    static INIT: Once = Once::new();

    /// Initialize tracing once for the whole test binary
    pub fn init() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_test_writer()
                .init();
        });
    }
}
