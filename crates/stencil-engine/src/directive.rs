//! Composition directives embedded in template source.
//!
//! Three directives are recognised ahead of the executor:
//!
//! * `{{ extends "layout.tmpl" }}` as the first action of a file,
//! * `{{ template "nav.tmpl" }}` anywhere, optionally followed by a context
//!   argument,
//! * `{{ var "title" }}Default{{ end }}` anywhere, declaring a default.
//!
//! `var` blocks and the `extends` action are removed from the text handed to
//! the executor. `extends` is replaced by a trailing `{{template "…"}}` call so
//! the parent renders after the child. `template` actions are left in place
//! and served by the `template` helper.
//!
//! Layouts expose slots as partials. The child defines them inline and the
//! parent, rendered afterwards, picks them up:
//!
//! ```text
//! page.tmpl:    {{extends "layout.tmpl"}}{{#*inline "content"}}Body{{/inline}}
//! layout.tmpl:  <html>{{> content}}</html>
//! ```
//!
//! Rendering `page.tmpl` produces `<html>Body</html>`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EngineError, Result};

static EXTENDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*\{\{-?\s*extends\s+"([^"]+)"\s*-?\}\}[ \t]*\r?\n?"#).expect("valid regex")
});
static ANY_EXTENDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{-?\s*extends\b").expect("valid regex"));

static TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\{\{-?\s*template\s+"([^"]+)"[^}]*\}\}$"#).expect("valid regex")
});
static ANY_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{-?\s*template\b[^}]*\}\}").expect("valid regex"));

static VAR_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{\{-?\s*var\s+"([^"]+)"\s*-?\}\}(.*?)\{\{-?\s*end\s*-?\}\}\r?\n?"#)
        .expect("valid regex")
});
static ANY_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{-?\s*var\b").expect("valid regex"));

/// A variable default declared in a `var` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub name: String,
    /// Literal text between the opening action and `end`, trimmed.
    pub literal: String,
}

/// Directives found in one template file, plus its executable text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTemplate {
    /// Parent named by a leading `extends`.
    pub extends: Option<String>,
    /// Targets of `template` actions in order of appearance.
    pub includes: Vec<String>,
    pub vars: Vec<VarDecl>,
    /// Source with directives rewritten for the executor.
    pub body: String,
}

impl ParsedTemplate {
    /// Direct dependencies: the parent first, then every included template.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.extends
            .iter()
            .chain(self.includes.iter())
            .map(String::as_str)
    }
}

/// Scan `source` (the text of `file`) for directives.
pub fn parse(file: &str, source: &str) -> Result<ParsedTemplate> {
    let mut vars = Vec::new();
    for caps in VAR_BLOCK.captures_iter(source) {
        vars.push(VarDecl {
            name: caps[1].to_string(),
            literal: caps[2].trim().to_string(),
        });
    }
    if ANY_VAR.find_iter(source).count() != vars.len() {
        return Err(EngineError::directive(
            file,
            "var block needs a quoted name and a closing end",
        ));
    }
    let text = VAR_BLOCK.replace_all(source, "");

    let (extends, rest) = match EXTENDS.captures(&text) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            (Some(caps[1].to_string()), &text[whole..])
        }
        None => (None, &text[..]),
    };
    if ANY_EXTENDS.is_match(rest) {
        let message = if extends.is_some() {
            "only one extends is allowed"
        } else {
            "extends must be the first action and name a quoted template"
        };
        return Err(EngineError::directive(file, message));
    }

    let mut includes = Vec::new();
    for action in ANY_TEMPLATE.find_iter(rest) {
        let caps = TEMPLATE.captures(action.as_str()).ok_or_else(|| {
            EngineError::directive(
                file,
                format!("template needs a quoted name: {}", action.as_str()),
            )
        })?;
        includes.push(caps[1].to_string());
    }

    let mut body = rest.to_string();
    if let Some(parent) = &extends {
        body.push_str(&format!("{{{{template \"{parent}\"}}}}"));
    }

    Ok(ParsedTemplate {
        extends,
        includes,
        vars,
        body,
    })
}
