//! XML sitemap of the public site.

use actix_web::{HttpResponse, http::header, web};

use folio_core::domain::Post;

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn render(site_url: &str, posts: &[Post]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for path in ["", "/blog"] {
        xml.push_str(&format!(
            "  <url><loc>{}</loc></url>\n",
            escape_xml(&format!("{site_url}{path}"))
        ));
    }

    for post in posts {
        xml.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{}</lastmod></url>\n",
            escape_xml(&format!("{site_url}/blog/{}", post.slug)),
            post.updated_at.format("%Y-%m-%d"),
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

/// GET /sitemap.xml
pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.published().await?;

    Ok(HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .insert_header((header::CACHE_CONTROL, "public, s-maxage=3600"))
        .body(render(&state.config.site_url, &posts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::{NewPost, SeoMetadata};

    #[test]
    fn test_render_lists_static_pages_and_posts() {
        let post = Post::new(
            uuid::Uuid::new_v4(),
            "fish-&-chips".to_string(),
            NewPost {
                title: "Fish & chips".to_string(),
                content: "Body".to_string(),
                excerpt: None,
                tags: vec![],
                slug: None,
                published: true,
                seo: SeoMetadata::default(),
            },
        );

        let day = post.updated_at.format("%Y-%m-%d").to_string();
        let xml = render("https://example.dev", &[post]);

        assert!(xml.contains("<loc>https://example.dev</loc>"));
        assert!(xml.contains("<loc>https://example.dev/blog</loc>"));
        assert!(xml.contains("<loc>https://example.dev/blog/fish-&amp;-chips</loc>"));
        assert!(xml.contains(&format!(
            "<lastmod>{day}</lastmod></url>\n</urlset>"
        )));
        assert_eq!(xml.lines().filter(|l| l.contains("<url>")).count(), 3);
    }
}
