//! Client-side routing between views.
//!
//! The route table is static data. The users view is resolved lazily the
//! first time it is navigated to and cached afterwards.

use std::fmt;

use once_cell::sync::OnceCell;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Users,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Home => write!(f, "home"),
            View::Users => write!(f, "users"),
        }
    }
}

/// How a route obtains its view.
pub enum ViewSource {
    Eager(View),
    Lazy {
        load: fn() -> View,
        loaded: OnceCell<View>,
    },
}

impl ViewSource {
    pub fn lazy(load: fn() -> View) -> Self {
        ViewSource::Lazy {
            load,
            loaded: OnceCell::new(),
        }
    }

    /// The view, loading it on first use.
    pub fn view(&self) -> View {
        match self {
            ViewSource::Eager(view) => *view,
            ViewSource::Lazy { load, loaded } => *loaded.get_or_init(|| {
                let view = load();
                tracing::debug!(%view, "lazy view loaded");
                view
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        match self {
            ViewSource::Eager(_) => true,
            ViewSource::Lazy { loaded, .. } => loaded.get().is_some(),
        }
    }
}

impl fmt::Debug for ViewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSource::Eager(view) => f.debug_tuple("Eager").field(view).finish(),
            ViewSource::Lazy { loaded, .. } => f
                .debug_struct("Lazy")
                .field("loaded", &loaded.get())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct RouteDef {
    pub path: &'static str,
    pub name: &'static str,
    pub view: ViewSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route matches {0}")]
    NotFound(String),
}

#[derive(Debug)]
pub struct RouteTable {
    base: String,
    routes: Vec<RouteDef>,
}

fn load_users_view() -> View {
    View::Users
}

impl RouteTable {
    pub fn new(base: &str, routes: Vec<RouteDef>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            routes,
        }
    }

    /// `/` → home, `/users` → users (lazy), mounted under `base`.
    pub fn default_routes(base: &str) -> Self {
        Self::new(
            base,
            vec![
                RouteDef {
                    path: "/",
                    name: "home",
                    view: ViewSource::Eager(View::Home),
                },
                RouteDef {
                    path: "/users",
                    name: "users",
                    view: ViewSource::lazy(load_users_view),
                },
            ],
        )
    }

    /// Match a full path (including the base) to a route. Query strings,
    /// fragments and a trailing slash are ignored.
    pub fn resolve(&self, path: &str) -> Result<&RouteDef, RouteError> {
        let local = self.strip_base(path).ok_or_else(|| RouteError::NotFound(path.to_string()))?;
        self.routes
            .iter()
            .find(|r| r.path == local)
            .ok_or_else(|| RouteError::NotFound(path.to_string()))
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Full path for a named route.
    pub fn href(&self, name: &str) -> Option<String> {
        self.by_name(name).map(|r| match r.path {
            "/" if !self.base.is_empty() => format!("{}/", self.base),
            path => format!("{}{path}", self.base),
        })
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let rest = path.strip_prefix(self.base.as_str())?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        let trimmed = rest.trim_end_matches('/');
        Some(if trimmed.is_empty() { "/" } else { trimmed })
    }
}

/// Current location plus back history over a `RouteTable`.
#[derive(Debug)]
pub struct Navigator {
    table: RouteTable,
    history: Vec<usize>,
}

impl Navigator {
    /// Start at the route matching `initial`.
    pub fn new(table: RouteTable, initial: &str) -> Result<Self, RouteError> {
        let mut nav = Self {
            table,
            history: Vec::new(),
        };
        nav.push(initial)?;
        Ok(nav)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn current(&self) -> Option<&RouteDef> {
        self.history.last().map(|&i| &self.table.routes[i])
    }

    /// Navigate to `path` and return the view to render. Unknown paths leave
    /// the current location unchanged.
    pub fn push(&mut self, path: &str) -> Result<View, RouteError> {
        let route = self.table.resolve(path)?;
        let index = self
            .table
            .routes
            .iter()
            .position(|r| std::ptr::eq(r, route))
            .ok_or_else(|| RouteError::NotFound(path.to_string()))?;
        let view = route.view.view();
        tracing::debug!(path, route = route.name, "navigated");
        self.history.push(index);
        Ok(view)
    }

    /// Return to the previous location. The first location is never popped.
    pub fn back(&mut self) -> Option<View> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        self.current().map(|r| r.view.view())
    }
}
