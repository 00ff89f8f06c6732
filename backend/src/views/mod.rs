//! # Presentation Layer
//!
//! HTML pages are plain files under `assets/templates`, embedded into the
//! binary with `include_dir` in the same way static assets are embedded.
//!
//! [`TemplateSet`] is built once in `main.rs`, checked for every page the
//! routes need, and then shared read-only through `web::Data`. Rendering is a
//! pure function of (template name, [`ViewData`]): each `{{ key }}` placeholder
//! is replaced by the HTML-escaped value stored under `key`, or by nothing if
//! the key is absent.

use include_dir::{include_dir, Dir};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

static TEMPLATE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/templates");

/// Pages the routes render; a set missing any of them is refused at startup.
pub const REQUIRED_TEMPLATES: [&str; 7] = [
    "landing",
    "import",
    "export",
    "help",
    "success",
    "error",
    "not_found",
];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template {0:?} not found")]
    UnknownTemplate(String),

    #[error("required template {0:?} is missing from the template set")]
    MissingTemplate(&'static str),

    #[error("template {0:?} is not valid UTF-8")]
    InvalidUtf8(String),

    #[error("placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Values substituted into a template.
#[derive(Debug, Default, Clone)]
pub struct ViewData(BTreeMap<&'static str, String>);

impl ViewData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::new().with("message", text)
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, value.into());
        self
    }
}

pub struct TemplateSet {
    templates: HashMap<String, String>,
    placeholder: Regex,
}

impl TemplateSet {
    /// The set compiled into the binary.
    pub fn embedded() -> Result<Self, RenderError> {
        Self::load(&TEMPLATE_DIR)
    }

    /// Every `*.html` file of `dir`, keyed by file stem.
    pub fn load(dir: &Dir<'_>) -> Result<Self, RenderError> {
        let mut sources = Vec::new();
        for file in dir.files() {
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = file
                .contents_utf8()
                .ok_or_else(|| RenderError::InvalidUtf8(name.to_string()))?;
            sources.push((name.to_string(), source.to_string()));
        }
        Self::from_sources(sources)
    }

    pub fn from_sources(
        sources: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, RenderError> {
        let templates: HashMap<String, String> = sources.into_iter().collect();
        if let Some(missing) = REQUIRED_TEMPLATES
            .iter()
            .find(|name| !templates.contains_key(**name))
        {
            return Err(RenderError::MissingTemplate(*missing));
        }
        Ok(Self {
            templates,
            placeholder: Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}")?,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn render(&self, name: &str, data: &ViewData) -> Result<String, RenderError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))?;
        let rendered = self.placeholder.replace_all(source, |caps: &Captures| {
            data.0
                .get(&caps[1])
                .map(|value| escape_html(value))
                .unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
