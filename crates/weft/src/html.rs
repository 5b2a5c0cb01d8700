// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Full-page assembly of rendered output.
//!
//! Merges a [`Rendered`]'s style entries into the document head and its
//! script entries before the closing body tag, synthesizing the
//! wrapping tags when the body has none. Entries that look like URLs
//! become `<link>`/`<script src>` references; everything else is
//! inlined.

use crate::component::Rendered;

/// Longest asset string still considered a root-relative URL.
const MAX_URL_LEN: usize = 2048;

/// Merges styles and scripts into the rendered body.
pub fn render_html(rendered: &Rendered) -> String {
    if rendered.styles.is_empty() && rendered.scripts.is_empty() {
        return rendered.body.clone();
    }
    let mut body = rendered.body.clone();
    if !rendered.styles.is_empty() {
        let block: String = rendered.styles.iter().map(|src| render_style(src)).collect();
        body = insert_in_head(body, &block);
    }
    if !rendered.scripts.is_empty() {
        let block: String = rendered
            .scripts
            .iter()
            .map(|src| render_script(src))
            .collect();
        body = insert_before_body_end(body, &block);
    }
    body
}

fn render_style(src: &str) -> String {
    if is_url(src) {
        format!(r#"<link rel="stylesheet" href="{src}" />"#)
    } else {
        format!(r#"<style type="text/css">{src}</style>"#)
    }
}

fn render_script(src: &str) -> String {
    if is_url(src) {
        format!(r#"<script src="{src}"></script>"#)
    } else {
        format!(r#"<script type="text/javascript">{src}</script>"#)
    }
}

/// URL detection for asset entries: absolute http(s), scheme-relative,
/// or a root-relative single-token path.
fn is_url(src: &str) -> bool {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("://") {
        return true;
    }
    src.starts_with('/') && src.len() <= MAX_URL_LEN && !src.contains(char::is_whitespace)
}

fn insert_in_head(body: String, block: &str) -> String {
    if let Some(idx) = find_tag(&body, "</head>") {
        splice(body, idx, block)
    } else if let Some(idx) = after_open_tag(&body, "<head") {
        splice(body, idx, block)
    } else if let Some(idx) = after_open_tag(&body, "<html") {
        splice(body, idx, &format!("<head>{block}</head>"))
    } else {
        format!("<head>{block}</head>{body}")
    }
}

fn insert_before_body_end(body: String, block: &str) -> String {
    if let Some(idx) = find_tag(&body, "</body>") {
        splice(body, idx, block)
    } else if let Some(idx) = find_tag(&body, "</html>") {
        splice(body, idx, block)
    } else {
        body + block
    }
}

/// Byte offset of `tag` matched case-insensitively.
fn find_tag(haystack: &str, tag: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(tag)
}

/// Byte offset just past the `>` closing the first opening `tag`.
/// `tag` must end at a name boundary, so `<head` does not match
/// `<header`.
fn after_open_tag(haystack: &str, tag: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find(tag) {
        let start = from + pos;
        let rest = &lower[start + tag.len()..];
        if rest.starts_with('>') || rest.starts_with(char::is_whitespace) {
            let close = rest.find('>')?;
            return Some(start + tag.len() + close + 1);
        }
        from = start + tag.len();
    }
    None
}

fn splice(mut body: String, idx: usize, insert: &str) -> String {
    body.insert_str(idx, insert);
    body
}
