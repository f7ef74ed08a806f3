// ABOUTME: Centralised tracing initialisation for arena binaries.
// ABOUTME: Installs an EnvFilter-driven subscriber with optional JSON output.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Only the first call in a
/// process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
        tracing::info!("still logging");
    }
}
