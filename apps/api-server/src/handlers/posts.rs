//! Post handlers.
//!
//! Reads work anonymously; what a caller sees is decided by the
//! authorization rules in `folio_core::policy`.

use actix_web::{HttpResponse, http::header, web};

use folio_core::domain::{NewPost, Post, PostChanges, SeoMetadata};
use folio_shared::MessageResponse;
use folio_shared::dto::{CreatePostRequest, PostDetail, PostSummary, SeoFields, UpdatePostRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const LISTING_CACHE: &str = "public, s-maxage=60, stale-while-revalidate=300";
const POST_CACHE: &str = "public, s-maxage=300, stale-while-revalidate=600";
const PRIVATE_CACHE: &str = "private, no-store";

fn summary(post: &Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        slug: post.slug.clone(),
        tags: post.tags.clone(),
        published: post.published,
        author_id: post.author_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn seo_metadata(fields: SeoFields) -> SeoMetadata {
    SeoMetadata {
        meta_title: fields.meta_title,
        meta_description: fields.meta_description,
        og_image: fields.og_image,
    }
}

async fn detail(state: &AppState, post: Post) -> AppResult<PostDetail> {
    let author_name = state.posts.author_name(&post).await?;
    Ok(PostDetail {
        summary: summary(&post),
        author_name,
        seo: SeoFields {
            meta_title: post.seo.meta_title,
            meta_description: post.seo.meta_description,
            og_image: post.seo.og_image,
        },
        content: post.content,
    })
}

/// GET /api/posts
///
/// Anonymous: published posts. Contributor: own posts. Admin: everything.
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let posts = state.posts.list(viewer.as_ref()).await?;
    let body: Vec<PostSummary> = posts.iter().map(summary).collect();

    let cache = if viewer.is_none() { LISTING_CACHE } else { PRIVATE_CACHE };
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, cache))
        .json(body))
}

/// GET /api/posts/drafts
pub async fn list_drafts(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.drafts(Some(&identity.viewer())).await?;
    let body: Vec<PostSummary> = posts.iter().map(summary).collect();

    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, PRIVATE_CACHE))
        .json(body))
}

/// GET /api/posts/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let viewer = identity.viewer();
    let post = state.posts.get(viewer.as_ref(), &path).await?;

    // Drafts are never cached publicly
    let cache = if viewer.is_none() && post.published {
        POST_CACHE
    } else {
        PRIVATE_CACHE
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, cache))
        .json(detail(&state, post).await?))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(
            Some(&identity.viewer()),
            NewPost {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                tags: req.tags,
                slug: req.slug,
                published: req.published,
                seo: seo_metadata(req.seo),
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(detail(&state, post).await?))
}

/// PUT /api/posts/{slug}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .update(
            Some(&identity.viewer()),
            &path,
            PostChanges {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                tags: req.tags,
                published: req.published,
                seo: seo_metadata(req.seo),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(detail(&state, post).await?))
}

/// DELETE /api/posts/{slug} - admins only.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete(Some(&identity.viewer()), &path).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}
