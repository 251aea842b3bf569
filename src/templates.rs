//! Server-side template rendering for route groups.
//!
//! A group associates one template directory via
//! [`Blueprint::templates`](crate::Blueprint::templates) and gets back a
//! [`Templates`] handle. The handle is cheap to clone — handlers capture a
//! clone and call [`render`](Templates::render) to produce a response body.
//!
//! Templates are [liquid](https://crates.io/crates/liquid) files, read
//! through `tokio::fs` and parsed on every render; no caching layer, so an
//! edited template shows up on the next request.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::TemplateError;
use crate::paths;

/// Rendering handle for one group's template directory.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), plinth::TemplateError> {
/// use plinth::{Templates, liquid};
///
/// let templates = Templates::new("client/templates")?;
/// let html = templates
///     .render("index.html", &liquid::object!({ "title": "plinth" }))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Templates {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    parser: liquid::Parser,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("dir", &self.inner.dir)
            .finish_non_exhaustive()
    }
}

impl Templates {
    /// Opens a template directory. The directory must exist — a missing one
    /// is a configuration error, caught before the server starts.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, TemplateError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(TemplateError::DirNotFound { dir });
        }
        let parser = liquid::ParserBuilder::with_stdlib().build()?;
        Ok(Self {
            inner: Arc::new(Inner { dir, parser }),
        })
    }

    /// Renders the template file `name` with `globals`.
    ///
    /// `name` goes through the same traversal guard as static asset paths:
    /// a name that would escape the template directory is rejected, not
    /// resolved. The read is async, like static serving; only parsing and
    /// rendering run on the calling task.
    pub async fn render(
        &self,
        name: &str,
        globals: &liquid::Object,
    ) -> Result<String, TemplateError> {
        let file = paths::resolve_under(&self.inner.dir, name)
            .ok_or_else(|| TemplateError::Forbidden { name: name.to_owned() })?;
        let source = tokio::fs::read_to_string(&file).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateError::NotFound { name: name.to_owned() },
            _ => TemplateError::Io(e),
        })?;
        let template = self.inner.parser.parse(&source)?;
        Ok(template.render(globals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(contents: &str) -> (tempfile::TempDir, Templates) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), contents).unwrap();
        let templates = Templates::new(dir.path()).unwrap();
        (dir, templates)
    }

    #[tokio::test]
    async fn renders_with_globals() {
        let (_dir, templates) = fixture("<h1>{{ title }}</h1>");
        let html = templates
            .render("index.html", &liquid::object!({ "title": "hello" }))
            .await
            .unwrap();
        assert_eq!(html, "<h1>hello</h1>");
    }

    #[test]
    fn missing_directory_fails_fast() {
        let err = Templates::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, TemplateError::DirNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_template_is_reported_by_name() {
        let (_dir, templates) = fixture("x");
        let err = templates
            .render("absent.html", &liquid::Object::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { name } if name == "absent.html"));
    }

    #[tokio::test]
    async fn template_names_cannot_escape_the_directory() {
        let (_dir, templates) = fixture("x");
        let err = templates
            .render("../outside.html", &liquid::Object::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Forbidden { .. }));

        let err = templates
            .render("C:/outside.html", &liquid::Object::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Forbidden { .. }));
    }
}
