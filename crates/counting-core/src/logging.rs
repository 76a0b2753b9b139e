use tracing_subscriber::{fmt, EnvFilter};

use crate::Result;

/// Initialize tracing for a binary.
///
/// Default: info for the counting crates, warn for everything else. Can be
/// overridden with `RUST_LOG`. Logs go to stderr so stdout stays free for
/// adapters that print there. If a subscriber is already installed it is
/// left in place.
pub fn init(service_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,counting=info,counting_core=info,{service_name}=info"
        ))
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}
