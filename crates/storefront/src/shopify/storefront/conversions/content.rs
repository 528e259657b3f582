//! Menu, page and blog article reshaping.

use crate::shopify::types::{Article, MenuItem, Page};

use super::super::schema::{RawArticle, RawMenu, RawPage};
use super::products::{reshape_image, reshape_seo};

/// Rewrite Shopify menu links into storefront paths.
///
/// A leading store domain is stripped, then the first `/collections` becomes
/// `/search` and the first `/pages` is dropped. Items without a URL are
/// skipped.
pub fn reshape_menu(menu: Option<RawMenu>, store_domain: &str) -> Vec<MenuItem> {
    let Some(menu) = menu else {
        return Vec::new();
    };
    let domain = store_domain.trim_end_matches('/');

    menu.items
        .into_iter()
        .filter_map(|item| {
            let url = item.url?;
            let path = url
                .strip_prefix(domain)
                .unwrap_or(&url)
                .replacen("/collections", "/search", 1)
                .replacen("/pages", "", 1);
            Some(MenuItem {
                title: item.title,
                path: if path.is_empty() { "/".to_string() } else { path },
            })
        })
        .collect()
}

/// Reshape a CMS page.
pub fn reshape_page(page: RawPage) -> Page {
    Page {
        id: page.id,
        title: page.title,
        handle: page.handle,
        body: page.body,
        body_summary: page.body_summary,
        seo: reshape_seo(page.seo),
        created_at: page.created_at,
        updated_at: page.updated_at,
    }
}

/// Reshape a blog article.
pub fn reshape_article(article: RawArticle) -> Article {
    let title = article.title;
    Article {
        image: article.image.map(|image| reshape_image(image, &title)),
        author: article
            .author_v2
            .map(|author| author.name)
            .filter(|name| !name.is_empty()),
        excerpt: article.excerpt.filter(|excerpt| !excerpt.trim().is_empty()),
        seo: reshape_seo(article.seo),
        id: article.id,
        handle: article.handle,
        content_html: article.content_html,
        published_at: article.published_at,
        tags: article.tags,
        title,
    }
}
