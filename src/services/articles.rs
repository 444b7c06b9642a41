use chrono::Utc;
use uuid::Uuid;

use super::{media, optional};
use crate::AppState;
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{Article, ArticleFilter, ArticleForm, ArticleResponse};
use crate::pagination::{ListQuery, Page};
use crate::repository::ContentFilter;

const FOLDER: &str = "articles";

/// slugify
///
/// Lowercase ASCII letters and digits; every other run of characters becomes a single
/// `-`. Leading and trailing dashes are dropped.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// A derived slug that is already taken gets `-2`, `-3`, … appended.
async fn unique_slug(state: &AppState, base: &str) -> AppResult<String> {
    let base = if base.is_empty() { "article" } else { base };
    let mut candidate = base.to_string();
    let mut n = 2;
    while state.repo.find_article_by_slug(&candidate).await?.is_some() {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    Ok(candidate)
}

/// An explicitly chosen slug must be valid and free.
async fn explicit_slug(state: &AppState, raw: &str, except: Option<Uuid>) -> AppResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(AppError::field("slug", "must contain letters or digits"));
    }
    match state.repo.find_article_by_slug(&slug).await? {
        Some(other) if Some(other.id) != except => Err(AppError::Conflict(format!(
            "slug '{}' is already taken",
            slug
        ))),
        _ => Ok(slug),
    }
}

pub async fn list(
    state: &AppState,
    query: &ArticleFilter,
    published_only: bool,
) -> AppResult<Page<ArticleResponse>> {
    let list_query = ListQuery {
        page: query.page,
        per_page: query.per_page,
        search: query.search.clone(),
    };
    let pagination = list_query.pagination();
    let category = optional(query.category.clone());
    let filter = ContentFilter::new(list_query.search_term(), pagination)
        .published(published_only)
        .category(category);

    let (rows, total) = state.repo.list_articles(&filter).await?;
    Ok(Page::new(rows, pagination, total).map(|row| row.into_response(state.storage.as_ref())))
}

pub async fn get(state: &AppState, id: Uuid, published_only: bool) -> AppResult<ArticleResponse> {
    let row = state
        .repo
        .find_article(id)
        .await?
        .filter(|row| row.is_published || !published_only)
        .ok_or(AppError::NotFound("article"))?;
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn get_by_slug(
    state: &AppState,
    slug: &str,
    published_only: bool,
) -> AppResult<ArticleResponse> {
    let row = state
        .repo
        .find_article_by_slug(slug)
        .await?
        .filter(|row| row.is_published || !published_only)
        .ok_or(AppError::NotFound("article"))?;
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn create(
    state: &AppState,
    author: &AuthUser,
    form: ArticleForm,
) -> AppResult<ArticleResponse> {
    let title = form.title.unwrap_or_default();
    let slug = match form.slug.as_deref() {
        Some(raw) => explicit_slug(state, raw, None).await?,
        None => unique_slug(state, &slugify(&title)).await?,
    };

    let thumbnail_key = media::store_optional(state, FOLDER, "thumbnail", form.thumbnail).await?;

    let now = Utc::now();
    let is_published = form.is_published.unwrap_or(false);
    let row = Article {
        id: Uuid::new_v4(),
        title,
        slug,
        excerpt: form.excerpt.flatten(),
        content: form.content.unwrap_or_default(),
        category: form.category.flatten(),
        thumbnail_key: thumbnail_key.clone(),
        is_published,
        published_at: is_published.then_some(now),
        author_id: Some(author.id),
        created_at: now,
        updated_at: now,
    };

    let result = state.repo.insert_article(&row).await;
    let row = media::settle(state.storage.as_ref(), result, thumbnail_key.as_deref()).await?;

    tracing::info!(article_id = %row.id, slug = %row.slug, author_id = %author.id, "article created");
    Ok(row.into_response(state.storage.as_ref()))
}

/// Partial update. A new title does not rename the slug; send `slug` for that.
pub async fn update(state: &AppState, id: Uuid, form: ArticleForm) -> AppResult<ArticleResponse> {
    let mut row = state
        .repo
        .find_article(id)
        .await?
        .ok_or(AppError::NotFound("article"))?;

    if let Some(raw) = form.slug.as_deref() {
        row.slug = explicit_slug(state, raw, Some(id)).await?;
    }

    let fresh = media::store_optional(state, FOLDER, "thumbnail", form.thumbnail).await?;
    let (thumbnail_key, obsolete) = media::next_key(
        row.thumbnail_key.take(),
        fresh.clone(),
        form.remove_thumbnail.unwrap_or(false),
    );

    let now = Utc::now();
    if let Some(title) = form.title {
        row.title = title;
    }
    if let Some(excerpt) = form.excerpt {
        row.excerpt = excerpt;
    }
    if let Some(content) = form.content {
        row.content = content;
    }
    if let Some(category) = form.category {
        row.category = category;
    }
    if let Some(is_published) = form.is_published {
        row.is_published = is_published;
    }
    if row.is_published && row.published_at.is_none() {
        row.published_at = Some(now);
    }
    row.thumbnail_key = thumbnail_key;
    row.updated_at = now;

    let result = state
        .repo
        .update_article(&row)
        .await
        .and_then(|saved| saved.ok_or(AppError::NotFound("article")));
    let row = media::settle(state.storage.as_ref(), result, fresh.as_deref()).await?;

    if let Some(key) = obsolete {
        media::discard(state.storage.as_ref(), &key).await;
    }

    tracing::info!(article_id = %row.id, "article updated");
    Ok(row.into_response(state.storage.as_ref()))
}

pub async fn delete(state: &AppState, id: Uuid) -> AppResult<()> {
    let row = state
        .repo
        .delete_article(id)
        .await?
        .ok_or(AppError::NotFound("article"))?;

    if let Some(key) = &row.thumbnail_key {
        media::discard(state.storage.as_ref(), key).await;
    }

    tracing::info!(article_id = %id, "article deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Exam   Week 2025 "), "exam-week-2025");
        assert_eq!(slugify("--Already-slugged--"), "already-slugged");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Olahraga"), "caf-olahraga");
        assert_eq!(slugify("日本語"), "");
    }
}
