use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{Contact, ContactRequest},
    services::contact,
};

/// get_contact
///
/// [Public Route] The school's contact details. 404 until an administrator sets them.
#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "contact",
    responses(
        (status = 200, description = "Contact details", body = Contact),
        (status = 404, description = "Not configured yet")
    )
)]
pub async fn get_contact(State(state): State<AppState>) -> AppResult<Json<Contact>> {
    Ok(Json(contact::get(&state).await?))
}

/// update_contact
///
/// [Authenticated Route] Creates or replaces the contact record.
#[utoipa::path(
    put,
    path = "/api/contact",
    request_body = ContactRequest,
    tag = "contact",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Saved", body = Contact),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_contact(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<Json<Contact>> {
    user.require("contact.update")?;
    Ok(Json(contact::upsert(&state, payload).await?))
}
