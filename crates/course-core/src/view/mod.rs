//! The exercise panel: markdown turned into a styled, sanitized HTML page
//! plus the actions the page offers.

use crate::exercise::{rewrite_resource_links_with, LoadedExercise, ResourceLocator, RESOURCES_DIR};
use pulldown_cmark::{html, Event, Options, Parser};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const PANEL_CSS: &str = include_str!("panel.css");

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").expect("script pattern is valid"));
static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\son\w+\s*=\s*["'].*?["']"#).expect("handler pattern is valid")
});
static JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("scheme pattern is valid"));

/// Something the student can do from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    RunTests,
    ShowSolution,
}

impl PanelAction {
    pub fn label(&self) -> &'static str {
        match self {
            PanelAction::RunTests => "▶ Run Tests",
            PanelAction::ShowSolution => "💡 Show Solution",
        }
    }
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rendered panel page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseView {
    html: String,
    actions: Vec<PanelAction>,
}

impl Default for ExerciseView {
    fn default() -> Self {
        Self {
            html: full_document(
                "<p>No exercise loaded. Enter an exercise code such as \
                 <code>001</code> or <code>bucket/001</code> and pull it.</p>",
            ),
            actions: Vec::new(),
        }
    }
}

impl ExerciseView {
    /// Render a loaded exercise.
    ///
    /// For local exercises `res/` links become `file://` URLs, resolved
    /// against the exercise's own `res/` first and the shared resource
    /// directory second. Remote exercises arrive with their links already
    /// rewritten and offer no actions.
    pub fn render(exercise: &LoadedExercise) -> Self {
        let markdown = match &exercise.directory {
            Some(dir) if exercise.resource_base_url.is_none() => {
                let local = exercise
                    .has_local_resources
                    .then(|| dir.join(RESOURCES_DIR));
                let locator = ResourceLocator::new(local, exercise.global_resources.clone());
                rewrite_resource_links_with(&exercise.markdown, |name| {
                    let path = locator.locate(name)?;
                    url::Url::from_file_path(path).ok().map(String::from)
                })
            }
            _ => exercise.markdown.clone(),
        };

        let body = sanitize_html(&markdown_to_html(&markdown));

        let mut actions = Vec::new();
        if exercise.tests_path().is_some() {
            actions.push(PanelAction::RunTests);
        }
        if exercise.solution_path().is_some() {
            actions.push(PanelAction::ShowSolution);
        }

        Self {
            html: full_document(&body),
            actions,
        }
    }

    /// A page explaining that something went wrong, with the unrendered
    /// text shown below the message.
    pub fn error(message: &str, raw: &str) -> Self {
        let body = format!(
            "<h1>Error</h1><p>{}</p><pre>{}</pre>",
            html_escape::encode_text(message),
            html_escape::encode_text(raw)
        );
        Self {
            html: full_document(&body),
            actions: Vec::new(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn actions(&self) -> &[PanelAction] {
        &self.actions
    }

    pub fn offers(&self, action: PanelAction) -> bool {
        self.actions.contains(&action)
    }
}

/// CommonMark plus tables, strikethrough, task lists and footnotes. Single
/// newlines inside a paragraph are kept as line breaks.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip script blocks, inline event handlers and `javascript:` URLs.
pub fn sanitize_html(html: &str) -> String {
    let cleaned = SCRIPT_BLOCK.replace_all(html, "");
    let cleaned = EVENT_HANDLER.replace_all(&cleaned, "");
    JS_SCHEME.replace_all(&cleaned, "").into_owned()
}

/// Wrap an HTML fragment into a complete styled page.
pub fn full_document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <style>\n{}</style>\n</head>\n<body>\n<div class=\"container\">\n{}\n</div>\n</body>\n</html>\n",
        PANEL_CSS, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseAddress;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn loaded(markdown: &str, directory: Option<PathBuf>) -> LoadedExercise {
        LoadedExercise {
            address: ExerciseAddress::parse("001").unwrap(),
            markdown: markdown.to_string(),
            directory,
            has_tests: true,
            has_solution: true,
            has_local_resources: false,
            resource_base_url: None,
            global_resources: None,
        }
    }

    #[test]
    fn test_markdown_features() {
        let html = markdown_to_html(
            "# Title\n\nline one\nline two\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n\n- [x] done\n",
        );
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("line one<br />"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_sanitize() {
        let dirty = r#"<p onclick="steal()">hi</p><SCRIPT>alert(1)</script><a href="javascript:alert(2)">x</a>"#;
        let clean = sanitize_html(dirty);
        assert_eq!(clean, r#"<p>hi</p><a href="alert(2)">x</a>"#);
    }

    #[test]
    fn test_inline_script_in_markdown_is_removed() {
        let view = ExerciseView::render(&loaded("Hello\n\n<script>\nalert('x')\n</script>\n", None));
        assert!(!view.html().contains("alert"));
        assert!(view.html().contains("Hello"));
    }

    #[test]
    fn test_full_document_shape() {
        let view = ExerciseView::render(&loaded("# Hi", None));
        assert!(view.html().starts_with("<!DOCTYPE html>"));
        assert!(view.html().contains("<div class=\"container\">"));
        assert!(view.html().contains("max-width: 900px"));
    }

    #[test]
    fn test_actions_depend_on_local_files() {
        let dir = tempdir().unwrap();
        let local = ExerciseView::render(&loaded("# Hi", Some(dir.path().to_path_buf())));
        assert_eq!(
            local.actions(),
            &[PanelAction::RunTests, PanelAction::ShowSolution]
        );

        let mut tests_only = loaded("# Hi", Some(dir.path().to_path_buf()));
        tests_only.has_solution = false;
        let view = ExerciseView::render(&tests_only);
        assert!(view.offers(PanelAction::RunTests));
        assert!(!view.offers(PanelAction::ShowSolution));

        // Remote exercises have no directory and therefore no actions.
        let remote = ExerciseView::render(&loaded("# Hi", None));
        assert!(remote.actions().is_empty());
    }

    #[test]
    fn test_local_resources_become_file_urls() {
        let dir = tempdir().unwrap();
        let shared = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("res")).unwrap();
        fs::write(dir.path().join("res/plot.png"), b"png").unwrap();
        fs::write(shared.path().join("logo.png"), b"png").unwrap();

        let mut exercise = loaded(
            "![plot](res/plot.png) ![logo](res/logo.png) ![gone](res/gone.png)",
            Some(dir.path().to_path_buf()),
        );
        exercise.has_local_resources = true;
        exercise.global_resources = Some(shared.path().to_path_buf());

        let view = ExerciseView::render(&exercise);
        let plot = url::Url::from_file_path(dir.path().join("res/plot.png")).unwrap();
        let logo = url::Url::from_file_path(shared.path().join("logo.png")).unwrap();

        assert!(view.html().contains(plot.as_str()));
        assert!(view.html().contains(logo.as_str()));
        assert!(view.html().contains("src=\"res/gone.png\""));
    }

    #[test]
    fn test_error_page_escapes() {
        let view = ExerciseView::error("bad <thing>", "# raw & <b>text</b>");
        assert!(view.html().contains("<h1>Error</h1>"));
        assert!(view.html().contains("bad &lt;thing&gt;"));
        assert!(view.html().contains("<pre># raw &amp; &lt;b&gt;text&lt;/b&gt;</pre>"));
        assert!(view.actions().is_empty());
    }

    #[test]
    fn test_default_view_is_placeholder() {
        let view = ExerciseView::default();
        assert!(view.html().contains("No exercise loaded"));
        assert!(view.actions().is_empty());
    }
}
