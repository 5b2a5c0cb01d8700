// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component compilation.
//!
//! The compiler turns a [`Component`] definition into a [`Compiled`]
//! tree, recursively resolving its `main`, `styles`, `scripts` and
//! `with` references and compiling the `extends` parent and `require`
//! children through storage lookups.
//!
//! Compilation can be layered: [`Compiler::compile_from_storage`] first
//! compiles the stored definition for a component's name, then compiles
//! the caller-supplied definition into the same tree. Context values
//! merge fill-missing (the stored layer wins), asset lists append, and
//! `with` entries from the later layer overwrite.
//!
//! A visited set of component names travels through the recursion;
//! cyclic `extends`/`require` chains fail with a [`WeftError::Cycle`]
//! naming the chain instead of recursing forever. Any other failure
//! aborts the whole compile, wrapped with the offending component name.
//! A partial tree is never returned.

use std::sync::Arc;

use crate::component::{Compiled, Component};
use crate::context::Context;
use crate::error::{Result, WeftError};
use crate::resolver;
use crate::storage::Storage;
use crate::template;

/// Context key reserved for the extends-chain body.
pub const CHILDREN_KEY: &str = "children";

/// Compiles components against a backing [`Storage`].
#[derive(Debug, Clone)]
pub struct Compiler {
    storage: Arc<Storage>,
}

impl Compiler {
    /// Creates a compiler over the given storage.
    pub fn new(storage: Arc<Storage>) -> Compiler {
        Compiler { storage }
    }

    /// The backing storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Compiles a component.
    ///
    /// Expects the component to carry all required data inline or have
    /// it resolvable through storage.
    pub fn compile(&self, component: &Component) -> Result<Compiled> {
        self.compile_component(component, &mut Vec::new())
    }

    /// Compiles a component by storage name.
    pub fn compile_by_name(&self, name: &str) -> Result<Compiled> {
        self.by_name(name, &mut Vec::new())
    }

    /// Looks up the stored definition for `component.name`, compiles
    /// it, then compiles `component` on top of it: stored context
    /// values win, while `main`, assets and `with` entries from the
    /// caller extend or override the stored layer.
    pub fn compile_from_storage(&self, component: &Component) -> Result<Compiled> {
        self.from_storage(component, &mut Vec::new())
    }

    fn compile_component(&self, c: &Component, visiting: &mut Vec<String>) -> Result<Compiled> {
        tracing::debug!(name = %c.name, "compile");
        let pushed = enter(&c.name, visiting)?;
        let mut compiled = Compiled::new(Arc::new(c.clone()));
        let result = self.compile_to(&mut compiled, c, visiting);
        if pushed {
            visiting.pop();
        }
        result.map_err(|err| err.for_component(&c.name))?;
        Ok(compiled)
    }

    fn by_name(&self, name: &str, visiting: &mut Vec<String>) -> Result<Compiled> {
        let component = match self.storage.component(name) {
            Ok(component) => component,
            Err(err) => return Err(err.for_component(name)),
        };
        self.compile_component(&component, visiting)
    }

    fn from_storage(&self, c: &Component, visiting: &mut Vec<String>) -> Result<Compiled> {
        let mut compiled = self.by_name(&c.name, visiting)?;
        compiled.component = Arc::new(c.clone());
        let pushed = enter(&c.name, visiting)?;
        let result = self.compile_to(&mut compiled, c, visiting);
        if pushed {
            visiting.pop();
        }
        result.map_err(|err| err.for_component(&c.name))?;
        Ok(compiled)
    }

    fn compile_to(
        &self,
        compiled: &mut Compiled,
        c: &Component,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        compiled
            .context
            .apply_defaults(&Context::from_json_map(&c.context));

        let base = c.base_dir();
        if !c.main.is_empty() {
            compiled.main = Some(resolver::resolve_reference(&self.storage, &c.main, &base)?);
        }
        resolver::resolve_references(&self.storage, &c.styles, &base, &mut compiled.styles)?;
        resolver::resolve_references(&self.storage, &c.scripts, &base, &mut compiled.scripts)?;
        if !c.with.is_empty() {
            compiled.with.extend(template::parse_map(&c.with)?);
        }

        if !c.extends.is_empty() {
            compiled.extends = Some(Box::new(self.by_name(&c.extends, visiting)?));
        }

        for (key, required) in &c.require {
            if key == CHILDREN_KEY {
                return Err(WeftError::ReservedKey(key.clone()));
            }
            let child = self.from_storage(required, visiting)?;
            compiled.require.insert(key.clone(), child);
        }

        Ok(())
    }
}

/// Pushes a component name onto the visited stack, failing on a repeat.
/// Anonymous components are not tracked.
fn enter(name: &str, visiting: &mut Vec<String>) -> Result<bool> {
    if name.is_empty() {
        return Ok(false);
    }
    if visiting.iter().any(|seen| seen == name) {
        let chain = visiting
            .iter()
            .map(String::as_str)
            .chain([name])
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(WeftError::Cycle(chain));
    }
    visiting.push(name.to_string());
    Ok(true)
}
