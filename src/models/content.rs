use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppResult, ValidationErrors};
use crate::storage::StorageService;
use crate::uploads::{FormMode, MultipartForm, UploadedFile};

// Rows hold object-store keys (`image_key`); responses expose resolved URLs
// (`image_url`). The `into_response` helpers do that mapping.

// --- Announcements ---

#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_key: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AnnouncementResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn into_response(self, storage: &dyn StorageService) -> AnnouncementResponse {
        AnnouncementResponse {
            id: self.id,
            title: self.title,
            content: self.content,
            image_url: self.image_key.as_deref().map(|k| storage.public_url(k)),
            is_published: self.is_published,
            published_at: self.published_at,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// AnnouncementForm
///
/// Multipart body of announcement create/update. `title` and `content` are required on
/// create; on update every absent field keeps its value.
#[derive(Debug, Default, ToSchema)]
pub struct AnnouncementForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
    /// Drops the current image when true and no new one is sent.
    pub remove_image: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub image: Option<UploadedFile>,
}

impl AnnouncementForm {
    pub fn from_form(mut form: MultipartForm, mode: FormMode) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();
        let parsed = Self {
            title: form.text_for("title", mode, &mut errors),
            content: form.text_for("content", mode, &mut errors),
            is_published: form.bool("is_published", &mut errors),
            remove_image: form.bool("remove_image", &mut errors),
            image: form.take_file("image"),
        };
        errors.into_result()?;
        Ok(parsed)
    }
}

// --- Articles ---

#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub thumbnail_key: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn into_response(self, storage: &dyn StorageService) -> ArticleResponse {
        ArticleResponse {
            id: self.id,
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            content: self.content,
            category: self.category,
            thumbnail_url: self.thumbnail_key.as_deref().map(|k| storage.public_url(k)),
            is_published: self.is_published,
            published_at: self.published_at,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Query parameters for article listings; `category` narrows to one category.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleFilter {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
}

/// ArticleForm
///
/// Multipart body of article create/update. Blank optional fields clear the value.
#[derive(Debug, Default, ToSchema)]
pub struct ArticleForm {
    pub title: Option<String>,
    /// Derived from the title when absent on create.
    pub slug: Option<String>,
    #[schema(value_type = Option<String>)]
    pub excerpt: Option<Option<String>>,
    pub content: Option<String>,
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub remove_thumbnail: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub thumbnail: Option<UploadedFile>,
}

impl ArticleForm {
    pub fn from_form(mut form: MultipartForm, mode: FormMode) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();
        let parsed = Self {
            title: form.text_for("title", mode, &mut errors),
            slug: form.text("slug"),
            excerpt: form.nullable_text("excerpt"),
            content: form.text_for("content", mode, &mut errors),
            category: form.nullable_text("category"),
            is_published: form.bool("is_published", &mut errors),
            remove_thumbnail: form.bool("remove_thumbnail", &mut errors),
            thumbnail: form.take_file("thumbnail"),
        };
        errors.into_result()?;
        Ok(parsed)
    }
}

// --- Galleries ---

#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct Gallery {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct GalleryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Gallery {
    pub fn into_response(self, storage: &dyn StorageService) -> GalleryResponse {
        GalleryResponse {
            image_url: storage.public_url(&self.image_key),
            id: self.id,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// GalleryForm
///
/// Multipart body of gallery create/update. `image` is required on create.
#[derive(Debug, Default, ToSchema)]
pub struct GalleryForm {
    pub title: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub image: Option<UploadedFile>,
}

impl GalleryForm {
    pub fn from_form(mut form: MultipartForm, mode: FormMode) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();
        let parsed = Self {
            title: form.text_for("title", mode, &mut errors),
            description: form.nullable_text("description"),
            image: form.take_file("image"),
        };
        if mode == FormMode::Create && parsed.image.is_none() {
            errors.add("image", "is required");
        }
        errors.into_result()?;
        Ok(parsed)
    }
}

// --- Classes ---

/// SchoolClass
///
/// A row in `classes` (named so to avoid the `class` keyword in other tooling).
#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct SchoolClass {
    pub id: Uuid,
    pub name: String,
    pub grade_level: i32,
    pub homeroom_teacher: Option<String>,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SchoolClassResponse {
    pub id: Uuid,
    pub name: String,
    pub grade_level: i32,
    pub homeroom_teacher: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl SchoolClass {
    pub fn into_response(self, storage: &dyn StorageService) -> SchoolClassResponse {
        SchoolClassResponse {
            id: self.id,
            name: self.name,
            grade_level: self.grade_level,
            homeroom_teacher: self.homeroom_teacher,
            description: self.description,
            image_url: self.image_key.as_deref().map(|k| storage.public_url(k)),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub const GRADE_LEVELS: std::ops::RangeInclusive<i32> = 1..=12;

#[derive(Debug, Default, ToSchema)]
pub struct SchoolClassForm {
    pub name: Option<String>,
    /// 1 through 12.
    pub grade_level: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub homeroom_teacher: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub remove_image: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub image: Option<UploadedFile>,
}

impl SchoolClassForm {
    pub fn from_form(mut form: MultipartForm, mode: FormMode) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();
        let parsed = Self {
            name: form.text_for("name", mode, &mut errors),
            grade_level: form.i32("grade_level", &mut errors),
            homeroom_teacher: form.nullable_text("homeroom_teacher"),
            description: form.nullable_text("description"),
            remove_image: form.bool("remove_image", &mut errors),
            image: form.take_file("image"),
        };
        match parsed.grade_level {
            Some(grade) if !GRADE_LEVELS.contains(&grade) => errors.add(
                "grade_level",
                format!(
                    "must be between {} and {}",
                    GRADE_LEVELS.start(),
                    GRADE_LEVELS.end()
                ),
            ),
            // A value that failed to parse has already been reported.
            None if mode == FormMode::Create => errors.add("grade_level", "is required"),
            _ => {}
        }
        errors.into_result()?;
        Ok(parsed)
    }
}

// --- Extracurriculars ---

#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct Extracurricular {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub coach: Option<String>,
    pub schedule: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ExtracurricularResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub coach: Option<String>,
    pub schedule: Option<String>,
    pub image_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Extracurricular {
    pub fn into_response(self, storage: &dyn StorageService) -> ExtracurricularResponse {
        ExtracurricularResponse {
            id: self.id,
            name: self.name,
            description: self.description,
            coach: self.coach,
            schedule: self.schedule,
            image_url: self.image_key.as_deref().map(|k| storage.public_url(k)),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Default, ToSchema)]
pub struct ExtracurricularForm {
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub coach: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub schedule: Option<Option<String>>,
    pub remove_image: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub image: Option<UploadedFile>,
}

impl ExtracurricularForm {
    pub fn from_form(mut form: MultipartForm, mode: FormMode) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();
        let parsed = Self {
            name: form.text_for("name", mode, &mut errors),
            description: form.nullable_text("description"),
            coach: form.nullable_text("coach"),
            schedule: form.nullable_text("schedule"),
            remove_image: form.bool("remove_image", &mut errors),
            image: form.take_file("image"),
        };
        errors.into_result()?;
        Ok(parsed)
    }
}

// --- Contact ---

/// Contact
///
/// The school's single contact record. There is at most one row.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Contact {
    pub id: Uuid,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub website: Option<String>,
    pub map_embed_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactRequest {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub website: Option<String>,
    pub map_embed_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub youtube_url: Option<String>,
}
