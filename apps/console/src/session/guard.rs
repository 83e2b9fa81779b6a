//! Local gate in front of the developer console route.
//!
//! Purely a heuristic over the stored token: no network call, no expiry check.
//! Absence or corruption of the token blocks access; any sufficiently long
//! string passes. The backend still authenticates every write.

use std::sync::Arc;

use tracing::debug;

use crate::routes::Route;
use crate::session::SessionContext;

/// Tokens at or below this length are rejected under [`GuardPolicy::Strict`].
pub const STRICT_MIN_LEN: usize = 20;

/// Values left behind by broken writes that must never count as a token.
const SENTINELS: &[&str] = &["undefined", "null"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Present, non-empty, not a sentinel.
    Baseline,
    /// Baseline plus longer than [`STRICT_MIN_LEN`] characters.
    Strict,
}

impl GuardPolicy {
    pub fn accepts(self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return false;
        };
        if token.is_empty() || SENTINELS.contains(&token) {
            return false;
        }
        match self {
            GuardPolicy::Baseline => true,
            GuardPolicy::Strict => token.chars().count() > STRICT_MIN_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    /// Replace the current history entry so "back" cannot re-enter the gated view.
    pub replace: bool,
    /// Where the caller was heading; consumed after a successful login.
    pub return_to: Option<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Redirect),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct Guard {
    session: Arc<SessionContext>,
    policy: GuardPolicy,
}

impl Guard {
    pub fn new(session: Arc<SessionContext>, policy: GuardPolicy) -> Self {
        Self { session, policy }
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// Decides whether the console may render. Never fails.
    pub fn evaluate(&self) -> GuardDecision {
        self.evaluate_for(Route::Console)
    }

    /// Same as [`Guard::evaluate`], recording `requested` as the return target.
    pub fn evaluate_for(&self, requested: Route) -> GuardDecision {
        let credential = self.session.credential();
        if self.policy.accepts(credential.as_ref().map(|c| c.as_str())) {
            return GuardDecision::Allow;
        }
        debug!(
            "Guard denied {} (policy {:?}, credential present: {})",
            requested.path(),
            self.policy,
            credential.is_some()
        );
        GuardDecision::Redirect(Redirect {
            to: Route::Login,
            replace: true,
            return_to: Some(requested),
        })
    }
}
