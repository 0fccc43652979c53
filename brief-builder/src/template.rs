//! Minimal slot templates.
//!
//! A template is an HTML skeleton containing placeholders of the form
//! `{{ name }}` where `name` is a lowercase identifier, optionally dotted
//! (`meta.title`). Everything else is static and emitted byte-for-byte.
//! Values come from an explicit [`Slots`] map; a placeholder without a value
//! is an error rather than an empty string.

use crate::types::{BuildError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

const SLOT_PATTERN: &str = r"\{\{\s*([a-z][a-z0-9_]*(?:\.[a-z][a-z0-9_]*)*)\s*\}\}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Slot(String),
}

/// A value bound to a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain text; escaped on insertion.
    Text(String),
    /// Markup produced by the renderer itself; inserted verbatim.
    Html(String),
}

#[derive(Debug, Clone, Default)]
pub struct Slots {
    values: BTreeMap<String, Fragment>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), Fragment::Text(value.into()));
        self
    }

    pub fn html(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), Fragment::Html(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.values.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let pattern =
            Regex::new(SLOT_PATTERN).map_err(|e| BuildError::render(name, e.to_string()))?;
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in pattern.captures_iter(source) {
            let (Some(whole), Some(slot)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Static(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Slot(slot.as_str().to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Static(source[last..].to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    /// Read and parse `path`; a missing or unreadable template is a config error.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| BuildError::config(path, format!("cannot read template: {}", e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot names in order of first appearance.
    pub fn slot_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Fail unless every slot in `required` appears in the template.
    pub fn require(&self, required: &[&str]) -> Result<()> {
        let present = self.slot_names();
        match required.iter().find(|slot| !present.contains(slot)) {
            Some(missing) => Err(BuildError::render(
                &self.name,
                format!("template has no '{{{{ {} }}}}' placeholder", missing),
            )),
            None => Ok(()),
        }
    }

    pub fn render(&self, slots: &Slots) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(text) => out.push_str(text),
                Segment::Slot(name) => match slots.get(name) {
                    Some(Fragment::Text(value)) => {
                        out.push_str(&html_escape::encode_quoted_attribute(value))
                    }
                    Some(Fragment::Html(value)) => out.push_str(value),
                    None => {
                        return Err(BuildError::render(
                            &self.name,
                            format!("no value for placeholder '{}'", name),
                        ))
                    }
                },
            }
        }
        Ok(out)
    }
}
