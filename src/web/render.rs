//! HTML views rendered from embedded Tera templates

use miette::Diagnostic;
use rust_embed::Embed;
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("Template {0} is not valid UTF-8")]
    #[diagnostic(code(epm::render::encoding))]
    Encoding(String),

    #[error("Template error: {0}")]
    #[diagnostic(code(epm::render::template))]
    Template(#[from] tera::Error),
}

/// All page templates, parsed once at startup
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Load every embedded template
    ///
    /// Templates are registered together so `{% extends %}` resolves.
    pub fn new() -> Result<Self, RenderError> {
        let mut sources = Vec::new();
        for file in EmbeddedTemplates::iter() {
            let name = file.as_ref().to_string();
            if let Some(content) = EmbeddedTemplates::get(&name) {
                let source = String::from_utf8(content.data.into_owned())
                    .map_err(|_| RenderError::Encoding(name.clone()))?;
                sources.push((name, source));
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, RenderError> {
        Ok(self.tera.render(template, context)?)
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

/// Base context every page expects
pub fn page(title: &str) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("message", &None::<String>);
    context.insert("error", &None::<String>);
    context
}

/// Flash text for a `?msg=` redirect code
pub fn flash_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "created" => Some("Saved."),
        "updated" => Some("Changes saved."),
        "deleted" => Some("Deleted."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_pages_are_embedded() {
        let views = Views::new().unwrap();
        let names = views.template_names();
        for expected in [
            "activities.html",
            "activity_edit.html",
            "base.html",
            "daily_meeting.html",
            "member_edit.html",
            "members.html",
            "not_found.html",
            "project_control.html",
            "project_edit.html",
            "projects.html",
            "release_edit.html",
            "releases.html",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_not_found_page_escapes_detail() {
        let views = Views::new().unwrap();
        let mut context = page("Not found");
        context.insert("detail", "<b>member 9</b>");
        let html = views.render("not_found.html", &context).unwrap();
        assert!(html.contains("&lt;b&gt;member 9&lt;&#x2F;b&gt;"));
    }

    #[test]
    fn test_flash_messages() {
        assert_eq!(flash_message(Some("deleted")), Some("Deleted."));
        assert_eq!(flash_message(Some("<script>")), None);
        assert_eq!(flash_message(None), None);
    }
}
