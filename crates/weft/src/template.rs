// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template abstraction over the expression engine.
//!
//! Every string a component references resolves to one of three
//! [`Template`] variants sharing a single execute contract:
//!
//! - **parsed**: evaluated against a context by the embedded engine
//!   ([`minijinja`]),
//! - **text**: literal content returned verbatim, never parsed,
//! - **external**: a URL returned verbatim, never executed or fetched.
//!
//! Parsed templates auto-escape HTML; values a caller knows to be markup
//! (rendered sub-component bodies, the inheritance body) are injected as
//! safe values so they pass through unescaped.

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::{AutoEscape, Environment, ErrorKind, Value};

use crate::context::{coerce_bool, Context};
use crate::error::{Result, WeftError};

/// Name under which each inline source is registered in its environment.
const TEMPLATE_NAME: &str = "main";

/// A uniform executable template unit.
#[derive(Debug, Clone)]
pub enum Template {
    /// Parsed template, evaluated against a context.
    Parsed(Arc<ParsedTemplate>),
    /// Literal text, returned unchanged.
    Text(Arc<str>),
    /// External URL, returned unchanged.
    External(Arc<str>),
}

impl Template {
    /// Parses inline template source.
    pub fn parse(source: &str) -> Result<Template> {
        Ok(Template::Parsed(Arc::new(ParsedTemplate::new(source)?)))
    }

    /// Wraps literal text that is never parsed.
    pub fn text(text: impl Into<Arc<str>>) -> Template {
        Template::Text(text.into())
    }

    /// Wraps an external URL that is never executed.
    pub fn external(url: impl Into<Arc<str>>) -> Template {
        Template::External(url.into())
    }

    /// Executes the template against `ctx` and returns the produced
    /// string. Text and external variants ignore the context.
    pub fn execute(&self, ctx: &Context) -> Result<String> {
        match self {
            Template::Parsed(parsed) => parsed.execute(ctx),
            Template::Text(text) => Ok(text.to_string()),
            Template::External(url) => Ok(url.to_string()),
        }
    }
}

/// Template source parsed by the embedded expression engine.
///
/// Each parsed template owns its environment so compiled templates can
/// move freely between threads and outlive the storage that produced
/// them. Filters are registered per environment; there is no process
/// global registry.
#[derive(Debug)]
pub struct ParsedTemplate {
    env: Environment<'static>,
}

impl ParsedTemplate {
    fn new(source: &str) -> Result<ParsedTemplate> {
        let mut env = environment();
        env.add_template_owned(TEMPLATE_NAME.to_string(), source.to_string())
            .map_err(WeftError::TemplateParse)?;
        Ok(ParsedTemplate { env })
    }

    fn execute(&self, ctx: &Context) -> Result<String> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(WeftError::TemplateExecute)?;
        template
            .render(ctx.to_value())
            .map_err(WeftError::TemplateExecute)
    }
}

/// Map of parsed templates keyed by the context key they compute.
pub type TemplateMap = BTreeMap<String, Template>;

/// Parses a component `with` map into templates.
///
/// Values are inline template source, not scheme references. Execution
/// order at render time is key order; entries must not depend on each
/// other.
pub fn parse_map(input: &BTreeMap<String, String>) -> Result<TemplateMap> {
    input
        .iter()
        .map(|(key, source)| Ok((key.clone(), Template::parse(source)?)))
        .collect()
}

/// Executes a list of templates in order against one context.
pub fn execute_list(templates: &[Template], ctx: &Context) -> Result<Vec<String>> {
    templates.iter().map(|template| template.execute(ctx)).collect()
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_filter("json", json_filter);
    env.add_filter("json_pretty", json_pretty_filter);
    env.add_filter("bool", bool_filter);
    env
}

fn json_filter(value: Value) -> std::result::Result<String, minijinja::Error> {
    serde_json::to_string(&value)
        .map_err(|err| minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string()))
}

fn json_pretty_filter(value: Value) -> std::result::Result<String, minijinja::Error> {
    serde_json::to_string_pretty(&value)
        .map_err(|err| minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string()))
}

fn bool_filter(value: Value) -> std::result::Result<bool, minijinja::Error> {
    coerce_bool(&value).ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot coerce {:?} to bool", value.kind()),
        )
    })
}
