use tracing::Level;

// JSON log lines without ANSI colors or timestamps, the log collector adds ingestion time.
// Safe to call more than once, later calls keep the first subscriber.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .json()
        .try_init();
}
