// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component data model.
//!
//! A [`Component`] is the declarative, serializable definition of a
//! renderable unit. Compilation resolves it into a [`Compiled`] tree;
//! rendering produces a [`Rendered`] result owned by the caller.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::Result;
use crate::template::{Template, TemplateMap};

/// Component definition.
///
/// All fields are optional in the serialized form; definitions are
/// accepted as JSON or YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    /// Name of the component as registered under the component root.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Main entrypoint reference for rendering the component.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub main: String,

    /// Parent component name. The parent is rendered with this
    /// component's body as `children` in its context.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub extends: String,

    /// References to CSS sources, relative paths or URLs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,

    /// References to JS sources, relative paths or URLs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,

    /// Components required by this component. They are rendered before
    /// it and set in its context under the map keys.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub require: BTreeMap<String, Component>,

    /// Base context values for the component.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,

    /// Like `context` but values are template sources, evaluated lazily
    /// at render time for keys the caller did not provide.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub with: BTreeMap<String, String>,
}

impl Component {
    /// Directory of this component relative to the component root; dots
    /// in the name map to path separators.
    pub fn base_dir(&self) -> PathBuf {
        name_to_path(&self.name)
    }
}

/// Maps a component name to its directory under the component root.
pub(crate) fn name_to_path(name: &str) -> PathBuf {
    name.split('.').collect()
}

/// Compiled component ready to render.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// Source of the compiled component.
    pub component: Arc<Component>,

    /// Layered base context.
    pub context: Context,

    /// Compiled main template, if any.
    pub main: Option<Template>,

    /// Compiled `with` templates.
    pub with: TemplateMap,

    /// Compiled parent, when `extends` was set.
    pub extends: Option<Box<Compiled>>,

    /// Compiled style templates.
    pub styles: Vec<Template>,

    /// Compiled script templates.
    pub scripts: Vec<Template>,

    /// Compiled required components.
    pub require: BTreeMap<String, Compiled>,
}

impl Compiled {
    pub(crate) fn new(component: Arc<Component>) -> Compiled {
        Compiled {
            component,
            context: Context::new(),
            main: None,
            with: TemplateMap::new(),
            extends: None,
            styles: Vec::new(),
            scripts: Vec::new(),
            require: BTreeMap::new(),
        }
    }

    /// Renders the compiled tree with an initial context.
    ///
    /// Shorthand for [`render`](crate::render::render).
    pub fn render(&self, ctx: Context) -> Result<Rendered> {
        crate::render::render(self, ctx)
    }
}

/// Rendered component output.
///
/// Serializes to the `{body, styles, scripts}` shape consumed by
/// serving layers; empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rendered {
    /// Main body of the rendered component.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// Styles collected across the render tree: URLs or CSS text, first
    /// occurrence of each value kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,

    /// Scripts collected across the render tree: URLs or JS text, first
    /// occurrence of each value kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_parses_from_json() {
        let component: Component = serde_json::from_str(
            r#"{
                "name": "pages.home",
                "main": "file://main.html",
                "extends": "layouts.base",
                "styles": ["file://home.css"],
                "require": {"nav": {"name": "widgets.nav"}},
                "context": {"title": "Home"},
                "with": {"greeting": "Hello {{ user }}"}
            }"#,
        )
        .unwrap();
        assert_eq!(component.name, "pages.home");
        assert_eq!(component.extends, "layouts.base");
        assert_eq!(component.require["nav"].name, "widgets.nav");
        assert_eq!(component.context["title"], serde_json::json!("Home"));
    }

    #[test]
    fn test_definition_parses_from_yaml() {
        let component: Component = serde_yaml::from_str(
            "name: widgets.nav\nmain: template://<nav></nav>\nscripts:\n  - https://cdn.example.com/nav.js\n",
        )
        .unwrap();
        assert_eq!(component.name, "widgets.nav");
        assert_eq!(component.scripts, ["https://cdn.example.com/nav.js"]);
    }

    #[test]
    fn test_base_dir_maps_dots() {
        let component = Component {
            name: "a.b.c".to_string(),
            ..Component::default()
        };
        assert_eq!(component.base_dir(), PathBuf::from("a/b/c"));
    }

    #[test]
    fn test_rendered_omits_empty_fields() {
        let rendered = Rendered {
            body: "<p>ok</p>".to_string(),
            ..Rendered::default()
        };
        let json = serde_json::to_string(&rendered).unwrap();
        assert_eq!(json, r#"{"body":"<p>ok</p>"}"#);
    }
}
