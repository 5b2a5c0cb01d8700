// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template reference resolution.
//!
//! Component string fields carry `scheme://rest` references selecting
//! how each resolves into an executable [`Template`]:
//!
//! | scheme | resolution |
//! |---|---|
//! | `template://` | rest is inline template source, parsed immediately |
//! | `file://` | rest is a path relative to the component's directory, parsed through storage |
//! | `file+text://` | like `file://` but kept as literal text, never parsed |
//! | `text://` | rest is literal text, never parsed |
//! | `http://`, `https://` | the whole string is kept as an external URL |
//!
//! A reference without a recognized scheme is a compile error.

use std::path::Path;

use crate::error::{Result, WeftError};
use crate::storage::Storage;
use crate::template::Template;

/// Splits a reference into `(scheme, rest)` around `://`.
pub fn parse_scheme(text: &str) -> Option<(&str, &str)> {
    let idx = text.find("://")?;
    Some((&text[..idx], &text[idx + 3..]))
}

/// Resolves one reference string against storage.
///
/// `base` is the referencing component's directory relative to the
/// storage root; file-backed schemes resolve under it.
pub(crate) fn resolve_reference(storage: &Storage, text: &str, base: &Path) -> Result<Template> {
    let Some((scheme, rest)) = parse_scheme(text) else {
        return Err(WeftError::Scheme(text.to_string()));
    };
    match scheme {
        "template" => Template::parse(rest),
        "file" => storage.template(&base.join(rest)),
        "file+text" => storage.text(&base.join(rest)),
        "text" => Ok(Template::text(rest)),
        "http" | "https" => Ok(Template::external(text)),
        _ => Err(WeftError::Scheme(text.to_string())),
    }
}

/// Resolves a list of references in order, appending to `into` so
/// layered compilation keeps earlier layers first.
pub(crate) fn resolve_references(
    storage: &Storage,
    texts: &[String],
    base: &Path,
    into: &mut Vec<Template>,
) -> Result<()> {
    for text in texts {
        into.push(resolve_reference(storage, text, base)?);
    }
    Ok(())
}
