//! Shared test utilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fbc_domain::{Result, Value};

/// Initialize tracing once per test binary; later calls are no-ops
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A provider source that counts its invocations and resolves to `value`
pub fn counted(value: &'static str) -> (Arc<AtomicUsize>, impl Fn(&[Value]) -> Result<Value>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let probe = counter.clone();
    let source = move |_: &[Value]| {
        probe.fetch_add(1, Ordering::SeqCst);
        Ok(Value::from(value))
    };
    (counter, source)
}

/// Read a counter
pub fn count_of(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
