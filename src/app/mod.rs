use axum::extract::DefaultBodyLimit;

use crate::contact::relay::Relay;
use crate::prelude::*;
use crate::utils::emailer::Emailer;

mod contact;

pub struct AppState {
    pub config: Config,
    pub relay: Relay,
}

/// Build the app router around an already connected [`Emailer`].
pub fn build(config: Config, emailer: Emailer) -> axum::Router<()> {
    let relay = Relay::new(emailer, config.email.inbox().clone(), config.app.name.clone());
    let state = Arc::new(AppState { config, relay });

    // Register business logic routes
    let r = AppRouter::new(&state);
    let r = contact::add_routes(r);
    let (r, state) = r.finish();

    // Register app-wide routes
    let r = r.route("/", get(|| async { Redirect::to("/contact") }));
    let r = r.fallback(|| async { AppError::NotFound });

    // Register middleware
    let r = crate::utils::tracing::add_middleware(r);
    let r = r.layer(DefaultBodyLimit::max(64 * 1024)); // 64KB limit
    r.with_state(state)
}
