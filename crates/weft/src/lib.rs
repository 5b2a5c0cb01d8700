// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # Weft
//!
//! Composable server-side HTML component rendering.
//!
//! A component is a declarative definition naming a main template, an
//! optional parent (`extends`), nested sub-components (`require`) and
//! style/script assets. Compiling resolves every reference into an
//! executable tree; rendering walks that tree into an HTML body plus
//! deduplicated style and script lists, ready for page assembly.
//!
//! ## Features
//!
//! - Template inheritance: a child's body becomes the parent's
//!   `children` value
//! - Required sub-components rendered into context variables
//! - Reference schemes (`template://`, `file://`, `text://`,
//!   `http(s)://`) selecting how each string field resolves
//! - TTL-cached storage with filesystem-watch invalidation
//! - Expression evaluation delegated to [`minijinja`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use weft::{Compiler, Context, StorageOptions};
//!
//! let storage = StorageOptions::new("./components").watch(true).open()?;
//! let compiler = Compiler::new(Arc::new(storage));
//!
//! let compiled = compiler.compile_by_name("pages.home")?;
//! let mut ctx = Context::new();
//! ctx.insert("title", "Home");
//! let rendered = compiled.render(ctx)?;
//! println!("{}", weft::render_html(&rendered));
//! ```

/// Concurrent TTL cache primitive.
mod cache;
/// Component compilation.
pub mod compiler;
/// Component, compiled and rendered data model.
pub mod component;
/// Template contexts and merge rules.
pub mod context;
/// Error types.
pub mod error;
/// Full-page assembly of rendered output.
pub mod html;
/// Recursive rendering.
pub mod render;
/// Template reference resolution.
pub mod resolver;
/// Component and template storage.
pub mod storage;
/// Template abstraction over the expression engine.
pub mod template;
/// Filesystem watching for cache invalidation.
mod watcher;
/// Whitespace normalization for raw sources.
pub mod whitespace;

pub use compiler::{Compiler, CHILDREN_KEY};
pub use component::{Compiled, Component, Rendered};
pub use context::{coerce_bool, Context};
pub use error::{Result, WeftError};
pub use html::render_html;
pub use render::{render, SOURCE_COMPONENT_KEY};
pub use resolver::parse_scheme;
pub use storage::{Storage, StorageOptions};
pub use template::{execute_list, parse_map, ParsedTemplate, Template, TemplateMap};

// Re-export the engine value type used in contexts.
pub use minijinja::Value;

#[cfg(test)]
mod tests;
