//! `res/` link rewriting and resource lookup.
//!
//! Exercise markdown refers to its images and data files as `res/<name>`.
//! Before the markdown leaves the machine the links are rewritten to point
//! at wherever the files are actually served from.

use super::paths::safe_join;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

// Markdown images, then markdown links, then `<img src=...>` tags, then any
// other `res/` reference not glued to a word or path. One combined pattern
// means a single pass, so a rewritten URL (which may itself contain `/res/`)
// is never visited again.
static RESOURCE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"!\[(?P<alt>[^\]]*)\]\(res/(?P<image>[^)]+)\)",
        r"|\[(?P<text>[^\]]*)\]\(res/(?P<link>[^)]+)\)",
        r#"|<img\s+(?P<attrs>[^>]*\s+)?src=["']res/(?P<src>[^"']+)["']"#,
        r"|(?P<lead>^|[^\w/])res/(?P<bare>\S+)",
    ))
    .expect("resource link pattern is valid")
});

/// Rewrite every `res/<name>` reference to `{base_url}/<name>`.
pub fn rewrite_resource_links(markdown: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    rewrite_resource_links_with(markdown, |name| Some(format!("{base}/{name}")))
}

/// Rewrite `res/<name>` references with a custom target.
///
/// `target` receives the resource name; returning `None` leaves that
/// reference exactly as written.
pub fn rewrite_resource_links_with<F>(markdown: &str, target: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    RESOURCE_LINK
        .replace_all(markdown, |caps: &Captures| {
            if let Some(name) = caps.name("image") {
                return match target(name.as_str()) {
                    Some(url) => format!("![{}]({})", &caps["alt"], url),
                    None => caps[0].to_string(),
                };
            }

            if let Some(name) = caps.name("link") {
                return match target(name.as_str()) {
                    Some(url) => format!("[{}]({})", &caps["text"], url),
                    None => caps[0].to_string(),
                };
            }

            if let Some(name) = caps.name("src") {
                let attrs = caps.name("attrs").map_or("", |m| m.as_str());
                return match target(name.as_str()) {
                    Some(url) => format!("<img {}src=\"{}\"", attrs, url),
                    None => caps[0].to_string(),
                };
            }

            let lead = caps.name("lead").map_or("", |m| m.as_str());
            let name = caps.name("bare").map_or("", |m| m.as_str());
            match target(name) {
                Some(url) => format!("{lead}{url}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Finds resource files, preferring an exercise's own `res/` directory over
/// the shared one.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocator {
    local: Option<PathBuf>,
    global: Option<PathBuf>,
}

impl ResourceLocator {
    pub fn new(local: Option<PathBuf>, global: Option<PathBuf>) -> Self {
        Self { local, global }
    }

    /// Path of the first regular file named `name`, or `None` when neither
    /// directory has it or `name` would leave its directory.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        [self.local.as_deref(), self.global.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|dir| locate_in(dir, name))
    }
}

fn locate_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = safe_join(dir, &[name]).ok()?;
    path.is_file().then_some(path)
}

/// Content type for a served file, based on its extension.
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",
        Some("py") => "text/x-python; charset=utf-8",
        Some("toml") => "application/toml",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        _ => "application/octet-stream",
    }
}
