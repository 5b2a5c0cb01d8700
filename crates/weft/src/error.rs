// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the weft rendering engine.
//!
//! All fallible operations return [`Result`], an alias over [`WeftError`].
//! Errors propagate synchronously up the compile/render call chain; a
//! single failure anywhere in a component tree aborts the whole call,
//! wrapped with the name of the component that caused it.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for weft operations.
#[derive(Error, Debug)]
pub enum WeftError {
    /// A component name or file path did not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// A file reference resolved outside the configured root directory.
    #[error("path not allowed: {}", .0.display())]
    DisallowedPath(PathBuf),

    /// A template reference is missing its scheme or carries an
    /// unrecognized one.
    #[error("missing or unknown scheme in template reference {0:?}")]
    Scheme(String),

    /// A component definition file failed to parse.
    #[error("component definition {}: {message}", .path.display())]
    Definition {
        /// Path of the malformed definition file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Template source failed to parse.
    #[error("template parse error: {0}")]
    TemplateParse(#[source] minijinja::Error),

    /// Template evaluation failed at render time.
    #[error("template execution error: {0}")]
    TemplateExecute(#[source] minijinja::Error),

    /// Underlying file read failed for a reason other than not-found.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `require` entry used a key reserved by the renderer.
    #[error("required component key {0:?} is reserved")]
    ReservedKey(String),

    /// Component references form a cycle through `extends` or `require`.
    #[error("cyclic component reference: {0}")]
    Cycle(String),

    /// The filesystem watch could not be established.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// An error raised while processing a named component.
    #[error("component {name:?}: {source}")]
    Component {
        /// Name of the component being compiled or rendered.
        name: String,
        /// The underlying error.
        #[source]
        source: Box<WeftError>,
    },
}

impl WeftError {
    /// Wraps the error with the name of the component being processed.
    ///
    /// Anonymous components are skipped, as is re-wrapping with a name
    /// the error already carries.
    pub(crate) fn for_component(self, name: &str) -> Self {
        if name.is_empty() {
            return self;
        }
        if let WeftError::Component { name: existing, .. } = &self {
            if existing == name {
                return self;
            }
        }
        WeftError::Component {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Whether the error was caused by the component definition or its
    /// inputs rather than by the engine or the host system.
    ///
    /// Serving layers map definition errors to client-error statuses and
    /// everything else to server errors.
    pub fn is_definition_error(&self) -> bool {
        match self {
            WeftError::NotFound(_)
            | WeftError::DisallowedPath(_)
            | WeftError::Scheme(_)
            | WeftError::Definition { .. }
            | WeftError::TemplateParse(_)
            | WeftError::ReservedKey(_)
            | WeftError::Cycle(_) => true,
            WeftError::Component { source, .. } => source.is_definition_error(),
            _ => false,
        }
    }
}

/// Convenience type alias for Results with [`WeftError`].
pub type Result<T> = std::result::Result<T, WeftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_component_wraps_once() {
        let err = WeftError::NotFound("x".to_string())
            .for_component("page")
            .for_component("page");
        match &err {
            WeftError::Component { name, source } => {
                assert_eq!(name, "page");
                assert!(matches!(**source, WeftError::NotFound(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_for_component_skips_anonymous() {
        let err = WeftError::NotFound("x".to_string()).for_component("");
        assert!(matches!(err, WeftError::NotFound(_)));
    }

    #[test]
    fn test_definition_error_classification() {
        assert!(WeftError::Scheme("nope".to_string()).is_definition_error());
        assert!(WeftError::NotFound("x".to_string())
            .for_component("page")
            .is_definition_error());
        let io = WeftError::Io(std::io::Error::other("disk"));
        assert!(!io.is_definition_error());
    }
}
