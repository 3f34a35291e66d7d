static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the `tracing` subscriber once, honouring `RUST_LOG` (default `info`).
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
