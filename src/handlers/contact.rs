// POST /api/contact

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::{app::AppState, models::ContactRequest, utils::ApiError};

pub async fn submit_contact(
    State(state): State<AppState>,
    WithRejection(Json(mut request), _): WithRejection<Json<ContactRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    request.sanitize();
    request.validate()?;

    let delivered = state
        .email_service
        .send_contact_emails(&request)
        .await
        .map_err(|e| {
            error!("Contact email delivery failed: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    info!(delivered, "Contact form submitted");
    Ok(Json(json!({
        "message": "Thank you for your message. We will get back to you soon.",
        "delivered": delivered,
    })))
}
