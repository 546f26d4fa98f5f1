//! HTML views for the task board.
//!
//! Templates are embedded at compile time using `include_str!` and filled by
//! substituting `{{name}}` placeholders in a single pass, so values inserted
//! into a page are never themselves scanned for placeholders.

use super::routes::Routes;
use crate::types::Task;
use std::collections::HashMap;

/// Page layout with navigation; wraps every view.
pub const BASE_TEMPLATE: &str = include_str!("templates/base.html");

/// Home page listing every task.
pub const MAIN_TEMPLATE: &str = include_str!("templates/main.html");

/// Task creation form.
pub const CREATE_TASK_TEMPLATE: &str = include_str!("templates/create_task.html");

/// Done tasks, with delete buttons.
pub const MARKED_DONE_TEMPLATE: &str = include_str!("templates/marked_done.html");

/// Tasks not done yet.
pub const NOT_FINISHED_TEMPLATE: &str = include_str!("templates/not_finished.html");

/// The pages the application renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    CreateTask,
    MarkedDone,
    NotFinished,
}

impl View {
    pub fn template(self) -> &'static str {
        match self {
            View::Main => MAIN_TEMPLATE,
            View::CreateTask => CREATE_TASK_TEMPLATE,
            View::MarkedDone => MARKED_DONE_TEMPLATE,
            View::NotFinished => NOT_FINISHED_TEMPLATE,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Main => "All tasks",
            View::CreateTask => "New task",
            View::MarkedDone => "Done",
            View::NotFinished => "Not done",
        }
    }
}

/// Values substituted into a template. Values are inserted verbatim;
/// escape user data with [`html_escape`] before inserting.
#[derive(Debug, Default, Clone)]
pub struct Context {
    values: HashMap<&'static str, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Render `view` inside the base layout.
pub fn render(view: View, routes: &Routes, ctx: &Context) -> String {
    let mut page = ctx.clone();
    page.insert("title", view.title())
        .insert("list_href", routes.list())
        .insert("not_done_href", routes.not_done())
        .insert("done_href", Routes::DONE)
        .insert("create_href", Routes::CREATE);

    let content = fill(view.template(), &page);
    page.insert("content", content);
    fill(BASE_TEMPLATE, &page)
}

/// Replace each `{{name}}` with its context value. Unknown names render empty.
pub fn fill(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                out.push_str(ctx.get(key).unwrap_or_default());
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Which row actions a task table offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowActions {
    pub mark_done: bool,
    pub delete: bool,
}

/// Build the task table fragment.
pub fn task_table(tasks: &[Task], routes: &Routes, actions: RowActions) -> String {
    if tasks.is_empty() {
        return r#"<div class="empty-state">No tasks here yet</div>"#.to_string();
    }

    let mut html = String::from(
        "<table><thead><tr><th>#</th><th>Task</th><th>Status</th><th></th></tr></thead><tbody>",
    );

    for task in tasks {
        let (badge_class, label) = if task.is_done() {
            ("badge-success", "done")
        } else {
            ("badge-pending", "not done")
        };

        let text = task
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!(r#"<div class="muted">{}</div>"#, html_escape(t)))
            .unwrap_or_default();

        let mut action_html = String::new();
        if actions.mark_done && !task.status {
            action_html.push_str(&format!(
                r#"<form class="inline" method="post" action="{}"><button type="submit" class="btn">Mark done</button></form>"#,
                routes.mark_done(task.id)
            ));
        }
        if actions.delete && task.status {
            action_html.push_str(&format!(
                r#"<form class="inline" method="post" action="{}"><button type="submit" class="btn btn-secondary">Delete</button></form>"#,
                routes.delete(task.id)
            ));
        }

        html.push_str(&format!(
            r#"<tr><td>{}</td><td><strong>{}</strong>{}</td><td><span class="badge {}">{}</span></td><td>{}</td></tr>"#,
            task.id,
            html_escape(&task.title),
            text,
            badge_class,
            label,
            action_html
        ));
    }

    html.push_str("</tbody></table>");
    html
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteLayout;

    fn task(id: i64, title: &str, status: bool) -> Task {
        Task {
            id,
            title: title.to_string(),
            text: Some("details".to_string()),
            status,
        }
    }

    #[test]
    fn fill_substitutes_once() {
        let mut ctx = Context::new();
        ctx.insert("a", "{{b}}").insert("b", "nope");
        assert_eq!(fill("[{{a}}] [{{ b }}] [{{missing}}]", &ctx), "[{{b}}] [nope] []");
    }

    #[test]
    fn fill_keeps_unterminated_placeholder() {
        assert_eq!(fill("x {{open", &Context::new()), "x {{open");
    }

    #[test]
    fn html_escape_covers_markup() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn task_table_escapes_titles() {
        let routes = Routes::new(RouteLayout::Root);
        let html = task_table(&[task(1, "<script>", false)], &routes, RowActions::default());
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn task_table_actions_follow_status() {
        let routes = Routes::new(RouteLayout::Main);
        let tasks = [task(1, "open", false), task(2, "finished", true)];
        let html = task_table(
            &tasks,
            &routes,
            RowActions {
                mark_done: true,
                delete: true,
            },
        );
        assert!(html.contains(r#"action="/main/1/done""#));
        assert!(!html.contains(r#"action="/main/2/done""#));
        assert!(html.contains(r#"action="/already_done/2""#));
        assert!(!html.contains(r#"action="/already_done/1""#));
    }

    #[test]
    fn render_wraps_view_in_layout() {
        let routes = Routes::new(RouteLayout::Root);
        let html = render(View::CreateTask, &routes, &Context::new());
        assert!(html.contains("<title>New task - Taskboard</title>"));
        assert!(html.contains(r#"action="/create""#));
        assert!(html.contains(r#"href="/not_finished""#));
    }
}
