use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::{derive_excerpt, normalize_tags};

/// Optional search-engine metadata attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_image: Option<String>,
}

/// Post entity - a blog post, published or draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub published: bool,
    pub seo: SeoMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new post. A missing excerpt is derived from the content.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub published: bool,
    pub seo: SeoMetadata,
}

/// Partial update of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
    /// Merged field by field. An empty string clears the stored value.
    pub seo: SeoMetadata,
}

impl SeoMetadata {
    fn merge(&mut self, changes: SeoMetadata) {
        fn merge_field(slot: &mut Option<String>, change: Option<String>) {
            match change {
                Some(v) if v.trim().is_empty() => *slot = None,
                Some(v) => *slot = Some(v),
                None => {}
            }
        }
        merge_field(&mut self.meta_title, changes.meta_title);
        merge_field(&mut self.meta_description, changes.meta_description);
        merge_field(&mut self.og_image, changes.og_image);
    }
}

impl Post {
    /// Create a new post from validated input under an already-resolved slug.
    pub fn new(author_id: Uuid, slug: String, input: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            excerpt: derive_excerpt(input.excerpt.as_deref(), &input.content),
            tags: normalize_tags(input.tags),
            title: input.title,
            content: input.content,
            slug,
            published: input.published,
            seo: input.seo,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_draft(&self) -> bool {
        !self.published
    }

    /// Apply a partial update and bump `updated_at`. The slug never changes.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        self.seo.merge(changes.seo);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        Post::new(
            Uuid::new_v4(),
            "title".to_string(),
            NewPost {
                title: "Title".to_string(),
                content: "Body".to_string(),
                excerpt: None,
                tags: vec![" rust ".to_string()],
                slug: None,
                published: false,
                seo: SeoMetadata::default(),
            },
        )
    }

    #[test]
    fn test_new_derives_excerpt_and_tags() {
        let post = sample();
        assert_eq!(post.excerpt, "Body...");
        assert_eq!(post.tags, vec!["rust"]);
        assert!(post.is_draft());
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_apply_changes_keeps_slug() {
        let mut post = sample();
        let before = post.updated_at;

        post.apply(PostChanges {
            title: Some("Renamed".to_string()),
            published: Some(true),
            ..Default::default()
        });

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.slug, "title");
        assert!(post.published);
        assert_eq!(post.content, "Body");
        assert!(post.updated_at >= before);
    }

    #[test]
    fn test_apply_merges_seo_fields() {
        let mut post = sample();
        post.seo = SeoMetadata {
            meta_title: Some("Old title".to_string()),
            meta_description: Some("Old description".to_string()),
            og_image: Some("https://cdn.example.dev/old.png".to_string()),
        };

        post.apply(PostChanges {
            seo: SeoMetadata {
                meta_title: Some("New title".to_string()),
                og_image: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        });

        assert_eq!(post.seo.meta_title.as_deref(), Some("New title"));
        assert_eq!(post.seo.meta_description.as_deref(), Some("Old description"));
        assert_eq!(post.seo.og_image, None);
    }
}
