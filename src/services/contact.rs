use chrono::Utc;
use uuid::Uuid;

use super::{is_valid_email, optional, required};
use crate::AppState;
use crate::error::{AppError, AppResult, ValidationErrors};
use crate::models::{Contact, ContactRequest};

pub async fn get(state: &AppState) -> AppResult<Contact> {
    state
        .repo
        .get_contact()
        .await?
        .ok_or(AppError::NotFound("contact"))
}

/// Creates the contact record on first use and overwrites it afterwards. The store keeps
/// the first id, so concurrent first saves still end up as one record.
pub async fn upsert(state: &AppState, req: ContactRequest) -> AppResult<Contact> {
    let mut errors = ValidationErrors::new();
    let address = required(Some(&req.address), "address", &mut errors);
    let phone = required(Some(&req.phone), "phone", &mut errors);
    let email = required(Some(&req.email), "email", &mut errors);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            errors.add("email", "must be a valid email address");
        }
    }
    errors.into_result()?;

    let contact = state
        .repo
        .upsert_contact(&Contact {
            id: Uuid::new_v4(),
            address: address.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            email: email.unwrap_or_default(),
            whatsapp: optional(req.whatsapp),
            website: optional(req.website),
            map_embed_url: optional(req.map_embed_url),
            facebook_url: optional(req.facebook_url),
            instagram_url: optional(req.instagram_url),
            youtube_url: optional(req.youtube_url),
            updated_at: Utc::now(),
        })
        .await?;

    tracing::info!(contact_id = %contact.id, "contact information saved");
    Ok(contact)
}
