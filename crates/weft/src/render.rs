// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Recursive rendering of compiled component trees.
//!
//! Rendering one node proceeds in a fixed order:
//!
//! 1. the node's base context fills keys the caller left unset;
//! 2. `with` templates compute values for keys still absent;
//! 3. required components render, each against a copy of the context,
//!    and land in the context as safe values under their keys;
//! 4. the main template executes;
//! 5. with `extends` set, the body so far becomes `children` and the
//!    parent renders into the same result;
//! 6. the node's styles and scripts execute and merge into the shared
//!    page accumulator, keeping the first occurrence of each value.
//!
//! Because step 6 runs only after the extends recursion returns, the
//! aggregate asset order across a full render is: required subtrees
//! first (depth first), then each level of the extends chain as it
//! unwinds, each node's own assets last.

use minijinja::Value;

use crate::compiler::CHILDREN_KEY;
use crate::component::{Compiled, Rendered};
use crate::context::Context;
use crate::error::Result;
use crate::template;

/// Context key under which the source component definition is exposed
/// to templates.
pub const SOURCE_COMPONENT_KEY: &str = "source_component";

/// Renders a compiled component with an initial context.
///
/// The source component is exposed under
/// [`SOURCE_COMPONENT_KEY`] for templates that want metadata about
/// themselves. The context may be empty.
pub fn render(compiled: &Compiled, ctx: Context) -> Result<Rendered> {
    let mut ctx = ctx;
    ctx.insert(
        SOURCE_COMPONENT_KEY,
        Value::from_serialize(&*compiled.component),
    );
    let mut page = Rendered::default();
    let body = render_component(compiled, &mut ctx, &mut page)?;
    page.body = body;
    Ok(page)
}

fn render_component(c: &Compiled, ctx: &mut Context, page: &mut Rendered) -> Result<String> {
    render_node(c, ctx, page).map_err(|err| err.for_component(&c.component.name))
}

fn render_node(c: &Compiled, ctx: &mut Context, page: &mut Rendered) -> Result<String> {
    tracing::debug!(name = %c.component.name, "render");

    ctx.apply_defaults(&c.context);

    // `with` values compute only for keys the caller did not provide.
    // Evaluation order is key order; entries must not depend on each
    // other.
    for (key, template) in &c.with {
        if ctx.contains_key(key) {
            continue;
        }
        let value = template.execute(ctx)?;
        ctx.insert(key.clone(), value);
    }

    // Required components render before the main template so their
    // bodies are available as context values. Each child gets its own
    // copy of the context; siblings do not observe each other.
    for (key, required) in &c.require {
        let mut child_ctx = ctx.clone();
        let body = render_component(required, &mut child_ctx, page)?;
        ctx.insert(key.clone(), Value::from_safe_string(body));
    }

    let mut body = match &c.main {
        Some(main) => main.execute(ctx)?,
        None => String::new(),
    };

    // Template inheritance: the body rendered so far becomes the
    // `children` value for the parent, which renders with the same
    // context and replaces the body.
    if let Some(parent) = &c.extends {
        ctx.insert(CHILDREN_KEY, Value::from_safe_string(body));
        body = render_component(parent, ctx, page)?;
    }

    for style in template::execute_list(&c.styles, ctx)? {
        merge_unique(&mut page.styles, style);
    }
    for script in template::execute_list(&c.scripts, ctx)? {
        merge_unique(&mut page.scripts, script);
    }

    Ok(body)
}

/// Appends `value` unless an equal string is already present.
fn merge_unique(dest: &mut Vec<String>, value: String) {
    if !dest.iter().any(|existing| *existing == value) {
        dest.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unique_keeps_first_occurrence() {
        let mut dest = vec!["a".to_string(), "b".to_string()];
        merge_unique(&mut dest, "a".to_string());
        merge_unique(&mut dest, "c".to_string());
        assert_eq!(dest, ["a", "b", "c"]);
    }
}
