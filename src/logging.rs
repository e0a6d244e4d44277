use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so rendered screens on stdout stay clean. `RUST_LOG`
/// overrides the default level; `verbose` turns on debug output for this crate.
pub fn init(verbose: bool) {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    if verbose {
        if let Ok(directive) = "payflow=debug".parse::<Directive>() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
