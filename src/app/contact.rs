use axum::extract::rejection::JsonRejection;
use serde_json::Value;

use crate::contact::submission::ContactSubmission;
use crate::prelude::*;
use crate::views::contact::ContactPage;

pub const SEND_MAIL_PATH: &str = "/api/sendMail";

pub fn add_routes(router: AppRouter) -> AppRouter {
    router
        .public_routes(|r| r.route("/contact", get(contact_page)))
        .api_routes(|r| r.route("/sendMail", post(send_mail)))
}

async fn contact_page(State(state): State<SharedAppState>) -> impl IntoResponse {
    ContactPage { site_name: state.config.app.name.clone(), endpoint: SEND_MAIL_PATH }
}

#[derive(serde::Serialize)]
struct Sent {
    message: &'static str,
}

/// Relay a contact form submission to the owner and send the submitter an acknowledgment.
async fn send_mail(
    State(state): State<SharedAppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Sent>> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(AppError::TooLarge),
        Err(e) => {
            tracing::debug!("unreadable contact body: {e}");
            return Err(AppError::MissingFields);
        }
    };
    let submission = ContactSubmission::parse(&body, &state.config.email.owner_addresses())?;

    state.relay.relay(&submission).await?;

    Ok(Json(Sent { message: "Email sent successfully" }))
}
