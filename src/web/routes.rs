//! URL layout for the two route sets.

use crate::config::RouteLayout;

/// Paths served for a given [`RouteLayout`], used both for routing and for links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
    layout: RouteLayout,
}

impl Routes {
    pub const CREATE: &'static str = "/create";
    pub const DONE: &'static str = "/already_done";
    pub const DELETE_PATTERN: &'static str = "/already_done/{task_id}";
    pub const HEALTH: &'static str = "/api/health";

    pub fn new(layout: RouteLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> RouteLayout {
        self.layout
    }

    /// Home page listing every task; all redirects land here.
    pub fn list(&self) -> &'static str {
        match self.layout {
            RouteLayout::Root => "/",
            RouteLayout::Main => "/main",
        }
    }

    pub fn not_done(&self) -> &'static str {
        match self.layout {
            RouteLayout::Root => "/not_finished",
            RouteLayout::Main => "/not_done",
        }
    }

    /// Router pattern for the mark-done endpoint.
    pub fn mark_done_pattern(&self) -> &'static str {
        match self.layout {
            RouteLayout::Root => "/{task_id}",
            RouteLayout::Main => "/main/{task_id}/done",
        }
    }

    pub fn mark_done(&self, task_id: i64) -> String {
        self.mark_done_pattern()
            .replace("{task_id}", &task_id.to_string())
    }

    pub fn delete(&self, task_id: i64) -> String {
        Self::DELETE_PATTERN.replace("{task_id}", &task_id.to_string())
    }
}
