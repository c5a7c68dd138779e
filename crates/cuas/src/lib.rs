pub mod system;

pub use system::{System, SystemConfig};

/// Installs a global `tracing` subscriber writing formatted lines to
/// stderr. An embedder that wants its own subscriber (json, otlp, a Tauri
/// event bridge, ...) skips this and installs one before constructing a
/// [`System`]; the core only ever emits through the `tracing` facade, never
/// by picking a subscriber itself.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
