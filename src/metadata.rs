//! `<head>` metadata for each page kind

use crate::blog::{BlogCategory, BlogPost};
use crate::content::Profile;
use crate::routing::Route;

pub const THEME_COLOR: &str = "#A855F7";

const HOME_KEYWORDS: &str = "Full Stack Developer, Web Development, Portfolio, Rust, WebAssembly";
const BLOG_DESCRIPTION: &str = "Explore articles about web development, programming, and technology";
const BLOG_KEYWORDS: &str = "blog, web development, programming, javascript, nodejs, python";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Website,
    Article,
}

impl PageKind {
    /// Value of `og:type`
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Website => "website",
            PageKind::Article => "article",
        }
    }
}

/// One `<meta>` element: `<meta {attribute}="{key}" content="{content}">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attribute: &'static str,
    pub key: &'static str,
    pub content: String,
}

impl MetaTag {
    fn name(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attribute: "name",
            key,
            content: content.into(),
        }
    }

    fn property(key: &'static str, content: impl Into<String>) -> Self {
        Self {
            attribute: "property",
            key,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    /// Document title
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub image: Option<String>,
    pub kind: PageKind,
    /// Absolute URL, known only when a site URL is configured
    pub canonical_url: Option<String>,
}

fn canonical(site_url: Option<&str>, route: &Route) -> Option<String> {
    site_url.map(|base| format!("{base}{}", route.path()))
}

impl PageMetadata {
    pub fn home(profile: &Profile, site_url: Option<&str>) -> Self {
        Self {
            title: format!("{} - Full Stack Developer Portfolio", profile.name),
            description: profile.bio.clone(),
            keywords: HOME_KEYWORDS.to_string(),
            author: profile.name.clone(),
            image: profile.image.clone(),
            kind: PageKind::Website,
            canonical_url: canonical(site_url, &Route::Home),
        }
    }

    pub fn blog_list(
        profile: &Profile,
        category: Option<&BlogCategory>,
        site_url: Option<&str>,
    ) -> Self {
        let route = Route::BlogList {
            category: category.map(|c| c.slug.clone()),
        };
        let (heading, description, keywords) = match category {
            Some(category) => (
                format!("{} Blog Posts", category.name),
                format!(
                    "{} - Read articles about {}",
                    category.description,
                    category.name.to_lowercase()
                ),
                format!(
                    "{}, {} tutorials, {} blog",
                    category.name.to_lowercase(),
                    category.name,
                    category.name
                ),
            ),
            None => (
                "Blog".to_string(),
                BLOG_DESCRIPTION.to_string(),
                BLOG_KEYWORDS.to_string(),
            ),
        };

        Self {
            title: format!("{heading} | {}", profile.name),
            description,
            keywords,
            author: profile.name.clone(),
            image: profile.image.clone(),
            kind: PageKind::Website,
            canonical_url: canonical(site_url, &route),
        }
    }

    pub fn post(profile: &Profile, post: &BlogPost, site_url: Option<&str>) -> Self {
        let route = Route::BlogPost {
            category: post.category.clone(),
            slug: post.slug.clone(),
        };
        Self {
            title: format!("{} | {}", post.title, profile.name),
            description: post.description.clone(),
            keywords: post.tags.join(", "),
            author: post.author.clone(),
            image: profile.image.clone(),
            kind: PageKind::Article,
            canonical_url: canonical(site_url, &route),
        }
    }

    /// Every `<meta>` element for the page, in a stable order
    pub fn meta_tags(&self) -> Vec<MetaTag> {
        let mut tags = vec![
            MetaTag::name("description", &self.description),
            MetaTag::name("keywords", &self.keywords),
            MetaTag::name("author", &self.author),
            MetaTag::property("og:title", &self.title),
            MetaTag::property("og:description", &self.description),
            MetaTag::property("og:type", self.kind.as_str()),
        ];
        if let Some(url) = &self.canonical_url {
            tags.push(MetaTag::property("og:url", url));
        }
        if let Some(image) = &self.image {
            tags.push(MetaTag::property("og:image", image));
        }

        let card = if self.image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        };
        tags.push(MetaTag::name("twitter:card", card));
        tags.push(MetaTag::name("twitter:title", &self.title));
        tags.push(MetaTag::name("twitter:description", &self.description));
        if let Some(image) = &self.image {
            tags.push(MetaTag::name("twitter:image", image));
        }
        tags.push(MetaTag::name("theme-color", THEME_COLOR));
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SiteContent;

    fn keys(meta: &PageMetadata) -> Vec<&'static str> {
        meta.meta_tags().iter().map(|tag| tag.key).collect()
    }

    fn content_of(meta: &PageMetadata, key: &str) -> Option<String> {
        meta.meta_tags()
            .into_iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.content)
    }

    #[test]
    fn home_page() {
        let content = SiteContent::builtin().unwrap();
        let meta = PageMetadata::home(&content.profile, None);

        assert_eq!(meta.title, "Alex Doe - Full Stack Developer Portfolio");
        assert_eq!(meta.kind, PageKind::Website);
        assert!(meta.canonical_url.is_none());
        assert_eq!(
            keys(&meta),
            [
                "description",
                "keywords",
                "author",
                "og:title",
                "og:description",
                "og:type",
                "twitter:card",
                "twitter:title",
                "twitter:description",
                "theme-color"
            ]
        );
        assert_eq!(content_of(&meta, "theme-color").as_deref(), Some("#A855F7"));
        assert_eq!(content_of(&meta, "twitter:card").as_deref(), Some("summary"));
    }

    #[test]
    fn category_list_page() {
        let content = SiteContent::builtin().unwrap();
        let python = content.blog.category("python");
        let meta = PageMetadata::blog_list(&content.profile, python, Some("https://alexdoe.dev"));

        assert_eq!(meta.title, "Python Blog Posts | Alex Doe");
        assert_eq!(
            meta.description,
            "Python programming and data science - Read articles about python"
        );
        assert_eq!(meta.keywords, "python, Python tutorials, Python blog");
        assert_eq!(
            content_of(&meta, "og:url").as_deref(),
            Some("https://alexdoe.dev/blog/python")
        );
    }

    #[test]
    fn all_posts_page() {
        let content = SiteContent::builtin().unwrap();
        let meta = PageMetadata::blog_list(&content.profile, None, None);
        assert_eq!(meta.title, "Blog | Alex Doe");
        assert_eq!(meta.keywords, BLOG_KEYWORDS);
    }

    #[test]
    fn post_page_is_an_article() {
        let mut content = SiteContent::builtin().unwrap();
        content.profile.image = Some("https://alexdoe.dev/card.png".into());
        let post = content.blog.post("python", "python-basics").unwrap();
        let meta = PageMetadata::post(&content.profile, post, Some("https://alexdoe.dev"));

        assert_eq!(meta.kind, PageKind::Article);
        assert_eq!(meta.keywords, "python, beginner, programming, tutorial");
        assert_eq!(content_of(&meta, "og:type").as_deref(), Some("article"));
        assert_eq!(
            content_of(&meta, "twitter:card").as_deref(),
            Some("summary_large_image")
        );
        assert_eq!(
            meta.canonical_url.as_deref(),
            Some("https://alexdoe.dev/blog/python/python-basics")
        );
        assert!(keys(&meta).contains(&"og:image"));
        assert!(keys(&meta).contains(&"twitter:image"));
    }
}
