//! Client-side routes and a history-aware navigator.

use tracing::debug;

use crate::session::guard::{Guard, GuardDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public home page.
    Home,
    /// Admin login.
    Login,
    /// Gated developer console.
    Console,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/portal-access-secret",
            Route::Console => "/dev",
        }
    }

    /// Matches a path exactly, ignoring a trailing slash and any query or fragment.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        [Route::Home, Route::Login, Route::Console]
            .into_iter()
            .find(|r| r.path() == path)
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Console)
    }
}

/// Outcome of a single navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub landed: Route,
    pub redirected: bool,
}

/// Tracks a history stack the way a browser router does.
///
/// Redirects (guard denials and unknown paths) replace the entry that would
/// have been pushed, so [`Navigator::back`] never lands on a page the caller
/// was bounced away from.
#[derive(Debug)]
pub struct Navigator {
    guard: Guard,
    catch_all: Route,
    history: Vec<Route>,
    return_to: Option<Route>,
}

impl Navigator {
    pub fn new(guard: Guard, catch_all: Route) -> Self {
        Self {
            guard,
            catch_all,
            history: vec![Route::Home],
            return_to: None,
        }
    }

    pub fn current(&self) -> Route {
        self.history.last().copied().unwrap_or(Route::Home)
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// Pending post-login destination captured by the last guard denial.
    pub fn return_to(&self) -> Option<Route> {
        self.return_to
    }

    pub fn navigate(&mut self, path: &str) -> Navigation {
        let Some(route) = Route::parse(path) else {
            debug!("No route for {path}; falling back to {}", self.catch_all.path());
            let landed = self.resolve(self.catch_all);
            self.history.push(landed);
            return Navigation {
                requested: path.to_string(),
                landed,
                redirected: true,
            };
        };

        let landed = self.resolve(route);
        self.history.push(landed);
        Navigation {
            requested: path.to_string(),
            landed,
            redirected: landed != route,
        }
    }

    /// Pops the current entry. Returns `None` at the start of history.
    pub fn back(&mut self) -> Option<Route> {
        if self.history.len() <= 1 {
            return None;
        }
        self.history.pop();
        // An entry that was allowed earlier may be gated now.
        let previous = self.current();
        let landed = self.resolve(previous);
        if landed != previous {
            if let Some(last) = self.history.last_mut() {
                *last = landed;
            }
        }
        Some(landed)
    }

    /// Moves off the login page after the session was established.
    ///
    /// Goes to the captured return target, or the console when none was captured,
    /// replacing the login entry.
    pub fn complete_login(&mut self) -> Navigation {
        let target = self.return_to.take().unwrap_or(Route::Console);
        let landed = self.resolve(target);
        match self.history.last_mut() {
            Some(last) if *last == Route::Login => *last = landed,
            _ => self.history.push(landed),
        }
        Navigation {
            requested: target.path().to_string(),
            landed,
            redirected: landed != target,
        }
    }

    fn resolve(&mut self, route: Route) -> Route {
        if !route.is_protected() {
            return route;
        }
        match self.guard.evaluate_for(route) {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(redirect) => {
                if redirect.return_to.is_some() {
                    self.return_to = redirect.return_to;
                }
                redirect.to
            }
        }
    }
}
