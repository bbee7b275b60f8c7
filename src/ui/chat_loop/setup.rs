use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::AppHandle;

use crate::core::app::{App, AppInitConfig, SessionEnv};
use crate::core::config::Config;

/// Build the application state for the chat loop from the saved config, the
/// command line and the process environment.
pub fn bootstrap_app(init: AppInitConfig) -> Result<AppHandle, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let env = SessionEnv::from_process();
    if env.api_key.is_none() {
        eprintln!(
            "Note: {} is not set; requests are sent without credentials.",
            crate::core::app::session::API_KEY_ENV
        );
    }

    let app = App::from_config(init, &config, &env);
    info!(
        model = %app.session.model,
        base_url = %app.session.base_url,
        theme = %app.ui.theme.id,
        "Chat session ready"
    );
    Ok(AppHandle::new(Arc::new(Mutex::new(app))))
}
