//! Blog route handlers.
//!
//! Articles come from the Shopify blog named by `SHOPIFY_BLOG_HANDLE`.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, Shopper};
use crate::routes::layout::{PageContext, PageMeta};
use crate::routes::products::escape_script;
use crate::shopify::Article;
use crate::state::AppState;

/// Articles listed on the blog index.
const ARTICLES_PER_PAGE: i64 = 20;

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub page: PageContext,
    pub articles: Vec<Article>,
}

/// Article page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub page: PageContext,
    pub article: Article,
    pub json_ld: String,
}

/// Display the newest articles.
#[instrument(skip(state, shopper, nonce))]
pub async fn index(
    State(state): State<AppState>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> BlogIndexTemplate {
    let articles = state
        .storefront()
        .get_blog_articles(&state.config().shopify.blog_handle, ARTICLES_PER_PAGE)
        .await;

    let meta = PageMeta::new("/blog").title("Blog");
    BlogIndexTemplate {
        page: PageContext::load(&state, &shopper, nonce, meta).await,
        articles,
    }
}

/// Display a single article.
///
/// # Errors
///
/// Returns 404 if the article doesn't exist.
#[instrument(skip(state, shopper, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    shopper: Shopper,
    CspNonce(nonce): CspNonce,
) -> Result<BlogShowTemplate> {
    let config = state.config();
    let article = state
        .storefront()
        .get_article(&config.shopify.blog_handle, &handle)
        .await
        .ok_or_else(|| AppError::NotFound(format!("article {handle}")))?;

    let meta = PageMeta::new(format!("/blog/{}", article.handle)).seo(
        &article.seo,
        &article.title,
        article.excerpt.as_deref().unwrap_or_default(),
    );
    let json_ld = article_json_ld(&article, &config.site_name);

    Ok(BlogShowTemplate {
        page: PageContext::load(&state, &shopper, nonce, meta).await,
        article,
        json_ld,
    })
}

/// schema.org `BlogPosting` JSON-LD, safe to embed in a `<script>` element.
fn article_json_ld(article: &Article, site_name: &str) -> String {
    let data = json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": article.title,
        "datePublished": article.published_at,
        "author": article.author.as_ref().map(|name| json!({"@type": "Person", "name": name})),
        "image": article.image.as_ref().map(|image| image.url.as_str()),
        "publisher": {"@type": "Organization", "name": site_name},
    });
    escape_script(&data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::Seo;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_article_json_ld() {
        let article = Article {
            id: "gid://shopify/Article/1".to_string(),
            handle: "spring-drop".to_string(),
            title: "Spring drop".to_string(),
            excerpt: None,
            content_html: "<p>New colours.</p>".to_string(),
            published_at: "2024-03-01T09:00:00Z".to_string(),
            tags: vec![],
            author: Some("Ada".to_string()),
            image: None,
            seo: Seo::default(),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&article_json_ld(&article, "Acme Store")).unwrap();
        assert_eq!(parsed["headline"], "Spring drop");
        assert_eq!(parsed["author"]["name"], "Ada");
        assert_eq!(parsed["publisher"]["name"], "Acme Store");
        assert!(parsed["image"].is_null());
    }
}
