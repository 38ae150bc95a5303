//! Route table shared by the server, the static generator and the sitemap

/// Kind of page a route renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Blog,
    BlogPost,
    Work,
    Project,
    About,
    Sitemap,
}

/// One route of the site; paths have no leading slash
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub page: Page,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "",
        page: Page::Home,
    },
    Route {
        path: "blog",
        page: Page::Blog,
    },
    Route {
        path: "blog/:slug",
        page: Page::BlogPost,
    },
    Route {
        path: "work",
        page: Page::Work,
    },
    Route {
        path: "work/:slug",
        page: Page::Project,
    },
    Route {
        path: "about",
        page: Page::About,
    },
    Route {
        path: "sitemap.xml",
        page: Page::Sitemap,
    },
];

impl Route {
    /// Whether the path contains a `:param` segment
    pub fn is_parameterized(&self) -> bool {
        self.path.split('/').any(|s| s.starts_with(':'))
    }

    /// Path in the form the router expects
    pub fn router_path(&self) -> String {
        format!("/{}", self.path)
    }
}

/// Routes that render one fixed HTML page
pub fn static_pages() -> impl Iterator<Item = &'static Route> {
    ROUTES
        .iter()
        .filter(|r| !r.is_parameterized() && r.page != Page::Sitemap)
}

/// Public path of an article
pub fn post_path(slug: &str) -> String {
    format!("blog/{}", slug)
}

/// Public path of a project
pub fn project_path(slug: &str) -> String {
    format!("work/{}", slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_pages() {
        let paths: Vec<_> = static_pages().map(|r| r.path).collect();
        assert_eq!(paths, vec!["", "blog", "work", "about"]);
    }

    #[test]
    fn test_router_paths() {
        let post = ROUTES.iter().find(|r| r.page == Page::BlogPost).unwrap();
        assert!(post.is_parameterized());
        assert_eq!(post.router_path(), "/blog/:slug");
        assert_eq!(ROUTES[0].router_path(), "/");
    }
}
