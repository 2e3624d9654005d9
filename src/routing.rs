//! Site routes
//!
//! Three kinds of page exist: home, the blog list (optionally filtered by a
//! category) and a single post. Any other path resolves to a redirect, never
//! to an error page.

use crate::blog::Blog;

/// Redirect chains longer than this are cut short at home
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    BlogList { category: Option<String> },
    BlogPost { category: String, slug: String },
}

impl Route {
    /// Canonical path, always with a leading slash and no trailing one
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::BlogList { category: None } => "/blog".to_string(),
            Route::BlogList {
                category: Some(category),
            } => format!("/blog/{category}"),
            Route::BlogPost { category, slug } => format!("/blog/{category}/{slug}"),
        }
    }

    /// Location of the generated page relative to the output directory
    pub fn file(&self) -> String {
        match self {
            Route::Home => "index.html".to_string(),
            _ => format!("{}/index.html", self.path().trim_start_matches('/')),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Page(Route),
    Redirect(String),
}

/// Route table built from the blog content
#[derive(Debug, Clone, Default)]
pub struct SiteRouter {
    categories: Vec<String>,
    posts: Vec<(String, String)>,
}

impl SiteRouter {
    pub fn new(blog: &Blog) -> Self {
        Self {
            categories: blog.categories.iter().map(|c| c.slug.clone()).collect(),
            posts: blog
                .posts
                .iter()
                .map(|p| (p.category.clone(), p.slug.clone()))
                .collect(),
        }
    }

    /// Every page the site has, home first
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = vec![Route::Home, Route::BlogList { category: None }];
        routes.extend(self.categories.iter().map(|category| Route::BlogList {
            category: Some(category.clone()),
        }));
        routes.extend(self.posts.iter().map(|(category, slug)| Route::BlogPost {
            category: category.clone(),
            slug: slug.clone(),
        }));
        routes
    }

    /// Map a request path to a page or a redirect target
    ///
    /// Query strings, fragments, trailing slashes and a trailing
    /// `index.html` are ignored.
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.last() == Some(&"index.html") {
            segments.pop();
        }

        match segments.as_slice() {
            [] => Resolution::Page(Route::Home),
            ["blog"] => Resolution::Page(Route::BlogList { category: None }),
            ["blog", category] if self.has_category(category) => {
                Resolution::Page(Route::BlogList {
                    category: Some(category.to_string()),
                })
            }
            ["blog", category, slug] if self.has_post(category, slug) => {
                Resolution::Page(Route::BlogPost {
                    category: category.to_string(),
                    slug: slug.to_string(),
                })
            }
            ["blog", ..] => Resolution::Redirect("/blog".to_string()),
            _ => Resolution::Redirect("/".to_string()),
        }
    }

    /// The page a path ends up on after following redirects
    pub fn final_route(&self, path: &str) -> Route {
        let mut current = path.to_string();
        for _ in 0..MAX_REDIRECTS {
            match self.resolve(&current) {
                Resolution::Page(route) => return route,
                Resolution::Redirect(target) => current = target,
            }
        }
        Route::Home
    }

    /// Canonical path of [`final_route`](Self::final_route)
    pub fn final_path(&self, path: &str) -> String {
        self.final_route(path).path()
    }

    fn has_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c == slug)
    }

    fn has_post(&self, category: &str, slug: &str) -> bool {
        self.posts.iter().any(|(c, s)| c == category && s == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SiteContent;

    fn router() -> SiteRouter {
        SiteRouter::new(&SiteContent::builtin().unwrap().blog)
    }

    fn page(path: &str) -> Route {
        match router().resolve(path) {
            Resolution::Page(route) => route,
            other => panic!("{path} resolved to {other:?}"),
        }
    }

    #[test]
    fn known_pages() {
        assert_eq!(page("/"), Route::Home);
        assert_eq!(page(""), Route::Home);
        assert_eq!(page("/index.html"), Route::Home);
        assert_eq!(page("/blog"), Route::BlogList { category: None });
        assert_eq!(page("/blog/"), Route::BlogList { category: None });
        assert_eq!(
            page("/blog/python?ref=nav"),
            Route::BlogList {
                category: Some("python".into())
            }
        );
        assert_eq!(
            page("/blog/node/simple-nodejs-server/index.html"),
            Route::BlogPost {
                category: "node".into(),
                slug: "simple-nodejs-server".into()
            }
        );
    }

    #[test]
    fn unknown_blog_paths_redirect_to_blog() {
        let router = router();
        for path in [
            "/blog/unknown-category",
            "/blog/unknown-category/unknown-slug",
            "/blog/python/missing-post",
            "/blog/python/python-basics/extra",
            "/blog/nodejs/simple-nodejs-server",
        ] {
            assert_eq!(
                router.resolve(path),
                Resolution::Redirect("/blog".into()),
                "{path}"
            );
        }
    }

    #[test]
    fn index_html_must_be_a_whole_segment() {
        let router = router();
        assert_eq!(
            router.resolve("/blog/pythonindex.html"),
            Resolution::Redirect("/blog".into())
        );
        assert_eq!(router.resolve("/myindex.html"), Resolution::Redirect("/".into()));
        assert_eq!(
            page("/blog/python/index.html"),
            Route::BlogList {
                category: Some("python".into())
            }
        );
    }

    #[test]
    fn unknown_paths_redirect_home() {
        let router = router();
        for path in ["/about", "/blogs", "/assets/missing.js#top"] {
            assert_eq!(router.resolve(path), Resolution::Redirect("/".into()), "{path}");
        }
    }

    #[test]
    fn final_route_follows_redirects() {
        let router = router();
        assert_eq!(
            router.final_route("/blog/unknown-category/unknown-slug"),
            Route::BlogList { category: None }
        );
        assert_eq!(router.final_route("/nowhere"), Route::Home);
        assert_eq!(router.final_path("/blog/python/gone/"), "/blog");
        assert_eq!(router.final_path("/blog/python/"), "/blog/python");
    }

    #[test]
    fn routes_cover_every_page() {
        let routes = router().routes();
        // home, blog list, 4 categories, 4 posts
        assert_eq!(routes.len(), 10);
        assert_eq!(routes[0], Route::Home);
        for route in &routes {
            assert_eq!(router().resolve(&route.path()), Resolution::Page(route.clone()));
        }
    }

    #[test]
    fn paths_and_files() {
        let post = Route::BlogPost {
            category: "python".into(),
            slug: "python-basics".into(),
        };
        assert_eq!(post.path(), "/blog/python/python-basics");
        assert_eq!(post.file(), "blog/python/python-basics/index.html");
        assert_eq!(Route::Home.file(), "index.html");
        assert_eq!(Route::BlogList { category: None }.file(), "blog/index.html");
    }
}
