//! Binary entry point that glues the persisted configuration and the backend
//! HTTP client to the TUI: load settings, build the client, hydrate the
//! initial app state, and drive the Ratatui event loop until the user exits.
use libradesk::{run_app, ApiClient, App, Settings};

/// Load configuration, probe the backend, and launch the event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = ApiClient::new(settings.endpoint());

    let mut app = App::new(client, settings);
    app.initialize();
    run_app(&mut app)
}
