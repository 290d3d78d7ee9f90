//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in evaluation order
//! - Look up the matching route for a method/path pair
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) scan, first match wins; order is part of the contract
//! - Explicit `None` rather than silent default

use axum::http::Method;

use crate::config::ContentConfig;
use crate::routing::matcher::{exact, AndMatcher, AnyMatcher, ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

pub const PREVIEW_PATH: &str = "/preview";
pub const PREVIEW_UPDATE_PATH: &str = "/preview/update";
pub const CHAT_PATH: &str = "/api/chat";
pub const LANDING_PATH: &str = "/landing.html";
pub const APP_PREFIX: &str = "/app";

/// The handler a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Static application document.
    AppDocument,
    /// Static landing document.
    LandingDocument,
    /// Current preview document (or fallback).
    PreviewRead,
    /// Replace the preview document.
    PreviewUpdate,
    /// Relay a chat-completion payload upstream.
    ChatRelay,
}

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: &'static str,
    pub target: RouteTarget,
    matcher: Box<dyn Matcher>,
}

impl Route {
    pub fn new(name: &'static str, target: RouteTarget, matcher: Box<dyn Matcher>) -> Self {
        Self { name, target, matcher }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.matcher.matches(method, path)
    }
}

/// Ordered route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Build a router from routes in evaluation order.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The gateway's route table.
    ///
    /// Order: app document alias, preview read, preview update, chat relay,
    /// landing document, app root/prefix.
    pub fn from_config(content: &ContentConfig) -> Self {
        let mut routes = Vec::with_capacity(6);

        if let Some(name) = content.app_document.file_name().and_then(|n| n.to_str()) {
            routes.push(Route::new(
                "app_alias",
                RouteTarget::AppDocument,
                exact(Method::GET, format!("/{name}")),
            ));
        }

        routes.push(Route::new("preview", RouteTarget::PreviewRead, exact(Method::GET, PREVIEW_PATH)));
        routes.push(Route::new(
            "preview_update",
            RouteTarget::PreviewUpdate,
            exact(Method::POST, PREVIEW_UPDATE_PATH),
        ));
        routes.push(Route::new("chat", RouteTarget::ChatRelay, exact(Method::POST, CHAT_PATH)));
        routes.push(Route::new("landing", RouteTarget::LandingDocument, exact(Method::GET, LANDING_PATH)));
        routes.push(Route::new(
            "app",
            RouteTarget::AppDocument,
            Box::new(AndMatcher::new(vec![
                Box::new(MethodMatcher::new(Method::GET)),
                Box::new(AnyMatcher::new(vec![
                    Box::new(ExactPathMatcher::new("/")),
                    Box::new(PathPrefixMatcher::new(APP_PREFIX)),
                ])),
            ])),
        ));

        Self::new(routes)
    }

    /// Find the first route matching the request.
    pub fn match_request(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(method, path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
