//! Static site writer
//!
//! Renders every route to `<route path>/index.html` under the output
//! directory and copies the compiled browser package into `assets/`.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use thiserror::Error;

use crate::blog::{Blog, BlogPost, RELATED_LIMIT};
use crate::config::SiteConfig;
use crate::content::{Profile, Project, SiteContent};
use crate::markdown;
use crate::metadata::{MetaTag, PageMetadata};
use crate::page_config::PageConfig;
use crate::routing::{Route, SiteRouter};

/// Directory under the output root holding the browser package
pub const ASSETS_DIR: &str = "assets";

const CONTACT_NOT_CONFIGURED: &str = "Telegram is not configured. Please contact via email.";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render page: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to serialize page configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("web package not found at {0}; build folio-web with wasm-pack first")]
    MissingWebPkg(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SiteError + '_ {
    move |source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What a [`SiteWriter::write`] call produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Route paths, in write order
    pub pages: Vec<String>,
    /// Files copied into `assets/`
    pub assets: usize,
}

/// Shared `<head>` and chrome data
struct Layout {
    title: String,
    meta_tags: Vec<MetaTag>,
    canonical_url: String,
    site_name: String,
    config_json: String,
}

impl Layout {
    fn new(meta: &PageMetadata, site_name: &str, config_json: &str) -> Self {
        Self {
            title: meta.title.clone(),
            meta_tags: meta.meta_tags(),
            canonical_url: meta.canonical_url.clone().unwrap_or_default(),
            site_name: site_name.to_string(),
            config_json: config_json.to_string(),
        }
    }
}

struct SocialLink {
    label: &'static str,
    url: String,
}

/// Post summary shown in lists
struct PostCard {
    title: String,
    description: String,
    url: String,
    date: String,
    read_time: u32,
    category_name: String,
    category_color: String,
    category_icon: String,
    tags: Vec<String>,
}

impl PostCard {
    fn new(blog: &Blog, post: &BlogPost) -> Self {
        let category = blog.category(&post.category);
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            url: Route::BlogPost {
                category: post.category.clone(),
                slug: post.slug.clone(),
            }
            .path(),
            date: post.formatted_date(),
            read_time: post.read_time,
            category_name: category.map_or_else(|| post.category.clone(), |c| c.name.clone()),
            category_color: category.map_or_else(String::new, |c| c.color.clone()),
            category_icon: category.map_or_else(String::new, |c| c.icon.clone()),
            tags: post.tags.clone(),
        }
    }
}

struct CategoryLink {
    name: String,
    icon: String,
    url: String,
    count: usize,
    active: bool,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate<'a> {
    layout: Layout,
    profile: &'a Profile,
    skills: &'a [String],
    projects: &'a [Project],
    featured: Vec<PostCard>,
    social: Vec<SocialLink>,
    contact_enabled: bool,
    contact_notice: &'a str,
}

#[derive(Template)]
#[template(path = "blog_list.html")]
struct BlogListTemplate {
    layout: Layout,
    heading: String,
    intro: String,
    all_active: bool,
    categories: Vec<CategoryLink>,
    posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "blog_post.html")]
struct BlogPostTemplate<'a> {
    layout: Layout,
    title: &'a str,
    author: &'a str,
    date: String,
    read_time: u32,
    category_name: String,
    category_url: String,
    body: String,
    tags: &'a [String],
    related: Vec<PostCard>,
}

/// Writes the whole site for one content document
pub struct SiteWriter<'a> {
    content: &'a SiteContent,
    config: &'a SiteConfig,
    web_pkg: Option<PathBuf>,
}

impl<'a> SiteWriter<'a> {
    pub fn new(content: &'a SiteContent, config: &'a SiteConfig) -> Self {
        Self {
            content,
            config,
            web_pkg: None,
        }
    }

    /// Copy the `wasm-pack` output in `pkg` next to the pages
    pub fn with_web_pkg(mut self, pkg: impl Into<PathBuf>) -> Self {
        self.web_pkg = Some(pkg.into());
        self
    }

    pub fn write(&self, output: &Path) -> Result<WriteReport, SiteError> {
        fs::create_dir_all(output).map_err(io_error(output))?;

        let config_json = PageConfig::new(self.config, self.content).to_script_json()?;
        let router = SiteRouter::new(&self.content.blog);
        let mut report = WriteReport::default();

        for route in router.routes() {
            let html = self.render(&route, &config_json)?;
            let path = output.join(route.file());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
            fs::write(&path, html).map_err(io_error(&path))?;
            tracing::debug!(page = %route.path(), "wrote page");
            report.pages.push(route.path());
        }

        if let Some(pkg) = &self.web_pkg {
            report.assets = copy_web_pkg(pkg, &output.join(ASSETS_DIR))?;
        }

        Ok(report)
    }

    /// Render one route to a full HTML document
    pub fn render(&self, route: &Route, config_json: &str) -> Result<String, SiteError> {
        let html = match route {
            Route::Home => self.home(config_json).render()?,
            Route::BlogList { category } => {
                self.blog_list(category.as_deref(), config_json).render()?
            }
            Route::BlogPost { category, slug } => match self.content.blog.post(category, slug) {
                Some(post) => self.blog_post(post, config_json).render()?,
                // Routes come from the same blog, so this only happens with a stale route
                None => self.blog_list(None, config_json).render()?,
            },
        };
        Ok(html)
    }

    fn site_url(&self) -> Option<&str> {
        self.config.site_url.as_deref()
    }

    fn home(&self, config_json: &str) -> HomeTemplate<'_> {
        let profile = &self.content.profile;
        let blog = &self.content.blog;
        let meta = PageMetadata::home(profile, self.site_url());

        let social = [
            ("GitHub", &profile.social.github),
            ("LinkedIn", &profile.social.linkedin),
            ("Instagram", &profile.social.instagram),
        ]
        .into_iter()
        .filter_map(|(label, url)| {
            url.as_ref().map(|url| SocialLink {
                label,
                url: url.clone(),
            })
        })
        .collect();

        HomeTemplate {
            layout: Layout::new(&meta, &profile.name, config_json),
            profile,
            skills: &self.content.skills,
            projects: &self.content.projects,
            featured: blog
                .featured()
                .into_iter()
                .map(|post| PostCard::new(blog, post))
                .collect(),
            social,
            contact_enabled: self.config.contact_enabled(),
            contact_notice: CONTACT_NOT_CONFIGURED,
        }
    }

    fn blog_list(&self, category: Option<&str>, config_json: &str) -> BlogListTemplate {
        let blog = &self.content.blog;
        let profile = &self.content.profile;
        let selected = category.and_then(|slug| blog.category(slug));
        let meta = PageMetadata::blog_list(profile, selected, self.site_url());

        let posts = match selected {
            Some(category) => blog.posts_in_category(&category.slug),
            None => blog.all_by_date(),
        };

        let (heading, intro) = match selected {
            Some(category) => (
                format!("{} {}", category.icon, category.name),
                category.description.clone(),
            ),
            None => (
                "Blog".to_string(),
                "Thoughts, tutorials and notes on web development and programming".to_string(),
            ),
        };

        BlogListTemplate {
            layout: Layout::new(&meta, &profile.name, config_json),
            heading,
            intro,
            all_active: selected.is_none(),
            categories: blog
                .categories
                .iter()
                .map(|c| CategoryLink {
                    name: c.name.clone(),
                    icon: c.icon.clone(),
                    url: Route::BlogList {
                        category: Some(c.slug.clone()),
                    }
                    .path(),
                    count: blog.posts_in_category(&c.slug).len(),
                    active: selected.is_some_and(|s| s.slug == c.slug),
                })
                .collect(),
            posts: posts.into_iter().map(|post| PostCard::new(blog, post)).collect(),
        }
    }

    fn blog_post<'p>(&'p self, post: &'p BlogPost, config_json: &str) -> BlogPostTemplate<'p> {
        let blog = &self.content.blog;
        let meta = PageMetadata::post(&self.content.profile, post, self.site_url());
        let category = blog.category(&post.category);

        BlogPostTemplate {
            layout: Layout::new(&meta, &self.content.profile.name, config_json),
            title: &post.title,
            author: &post.author,
            date: post.formatted_date(),
            read_time: post.read_time,
            category_name: category.map_or_else(|| post.category.clone(), |c| c.name.clone()),
            category_url: Route::BlogList {
                category: Some(post.category.clone()),
            }
            .path(),
            body: markdown::render(&post.content),
            tags: &post.tags,
            related: blog
                .related(post, RELATED_LIMIT)
                .into_iter()
                .map(|other| PostCard::new(blog, other))
                .collect(),
        }
    }
}

/// Copy the top-level files of a `wasm-pack` output directory
fn copy_web_pkg(pkg: &Path, assets: &Path) -> Result<usize, SiteError> {
    if !pkg.is_dir() {
        return Err(SiteError::MissingWebPkg(pkg.to_path_buf()));
    }
    fs::create_dir_all(assets).map_err(io_error(assets))?;

    let mut copied = 0;
    for entry in fs::read_dir(pkg).map_err(io_error(pkg))? {
        let path = entry.map_err(io_error(pkg))?.path();
        let Some(name) = path.file_name() else { continue };
        if !path.is_file() || name == ".gitignore" {
            continue;
        }
        let target = assets.join(name);
        fs::copy(&path, &target).map_err(io_error(&target))?;
        copied += 1;
    }
    tracing::debug!(copied, "copied web package into {}", assets.display());
    Ok(copied)
}
