// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use crate::*;

fn compiler(dir: &TempDir) -> Compiler {
    init_tracing();
    let storage = StorageOptions::new(dir.path()).open().unwrap();
    Compiler::new(Arc::new(storage))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_component(dir: &TempDir, name: &str, body: &str) {
    let path = dir.path().join(name.replace('.', "/"));
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("component.json"), body).unwrap();
}

fn page_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", "Test #1");
    ctx.insert("color", "#fff");
    ctx.insert("message", "test message");
    ctx
}

#[test]
fn test_render_example_root() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "name": "example.root",
            "main": "template://<h1>{{title}}</h1>",
            "styles": [
                "template://h1 { color: {{ color }}; }",
                "text://some text here"
            ],
            "scripts": [
                "template://console.log('{{ message }}');",
                "text://console.log('{{ it_shouldnt_compile }}');"
            ]
        }"#,
    )
    .unwrap();

    let compiled = compiler(&dir).compile(&component).unwrap();
    let rendered = compiled.render(page_context()).unwrap();

    assert_eq!(rendered.body, "<h1>Test #1</h1>");
    assert_eq!(
        rendered.styles,
        ["h1 { color: #fff; }", "some text here"]
    );
    assert_eq!(
        rendered.scripts,
        [
            "console.log('test message');",
            "console.log('{{ it_shouldnt_compile }}');"
        ]
    );
}

#[test]
fn test_render_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "name": "example.root",
            "main": "template://<h1>{{title}}</h1>",
            "styles": ["template://h1 { color: {{ color }}; }"],
            "scripts": ["template://console.log('{{ message }}');"]
        }"#,
    )
    .unwrap();
    let compiler = compiler(&dir);

    let first = compiler
        .compile(&component)
        .unwrap()
        .render(page_context())
        .unwrap();
    let second = compiler
        .compile(&component)
        .unwrap()
        .render(page_context())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_extends_wraps_child_body() {
    let dir = TempDir::new().unwrap();
    write_component(
        &dir,
        "parent",
        r#"{"main": "template://<div>{{children}}</div>"}"#,
    );
    write_component(
        &dir,
        "child",
        r#"{"main": "template://<p>{{children}}</p>", "extends": "parent"}"#,
    );

    let rendered = compiler(&dir)
        .compile_by_name("child")
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "<div><p></p></div>");
}

#[test]
fn test_require_inserts_rendered_body() {
    let dir = TempDir::new().unwrap();
    write_component(&dir, "hello", "{}");
    let root: Component = serde_json::from_str(
        r#"{
            "main": "template://<b>{{greet}}</b>",
            "require": {"greet": {"name": "hello", "main": "template://Hi"}}
        }"#,
    )
    .unwrap();

    let rendered = compiler(&dir)
        .compile(&root)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "<b>Hi</b>");
}

#[test]
fn test_require_body_is_not_escaped() {
    let dir = TempDir::new().unwrap();
    write_component(&dir, "hello", r#"{"main": "template://<em>Hi</em>"}"#);
    let root: Component = serde_json::from_str(
        r#"{
            "main": "template://<b>{{greet}}</b>",
            "require": {"greet": {"name": "hello"}}
        }"#,
    )
    .unwrap();

    let rendered = compiler(&dir)
        .compile(&root)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "<b><em>Hi</em></b>");
}

#[test]
fn test_styles_deduplicate_first_seen() {
    let dir = TempDir::new().unwrap();
    write_component(
        &dir,
        "shared",
        r#"{"styles": ["text://.shared { }", "text://.extra { }"]}"#,
    );
    let root: Component = serde_json::from_str(
        r#"{
            "main": "template://<b>{{one}}{{two}}</b>",
            "styles": ["text://.shared { }"],
            "require": {
                "one": {"name": "shared", "main": "template://1"},
                "two": {"name": "shared", "main": "template://2"}
            }
        }"#,
    )
    .unwrap();

    let rendered = compiler(&dir)
        .compile(&root)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "<b>12</b>");
    assert_eq!(rendered.styles, [".shared { }", ".extra { }"]);
}

#[test]
fn test_asset_order_requires_then_ancestors_then_own() {
    let dir = TempDir::new().unwrap();
    write_component(&dir, "layout", r#"{"main": "template://[{{children}}]", "styles": ["text://layout.css"]}"#);
    write_component(&dir, "widget", r#"{"main": "template://w", "styles": ["text://widget.css"]}"#);
    let root: Component = serde_json::from_str(
        r#"{
            "main": "template://{{w}}",
            "extends": "layout",
            "styles": ["text://root.css"],
            "require": {"w": {"name": "widget"}}
        }"#,
    )
    .unwrap();

    let rendered = compiler(&dir)
        .compile(&root)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "[w]");
    assert_eq!(
        rendered.styles,
        ["widget.css", "layout.css", "root.css"]
    );
}

#[test]
fn test_component_context_fills_missing_keys_only() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "main": "template://{{ a }}-{{ b }}",
            "context": {"a": "default", "b": "default"}
        }"#,
    )
    .unwrap();

    let mut ctx = Context::new();
    ctx.insert("a", "caller");
    let rendered = compiler(&dir)
        .compile(&component)
        .unwrap()
        .render(ctx)
        .unwrap();
    assert_eq!(rendered.body, "caller-default");
}

#[test]
fn test_with_computes_missing_keys_only() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "main": "template://{{ greeting }}",
            "context": {"name": "World"},
            "with": {"greeting": "Hello {{ name }}"}
        }"#,
    )
    .unwrap();
    let compiler = compiler(&dir);

    let rendered = compiler
        .compile(&component)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "Hello World");

    let mut ctx = Context::new();
    ctx.insert("greeting", "custom");
    let rendered = compiler
        .compile(&component)
        .unwrap()
        .render(ctx)
        .unwrap();
    assert_eq!(rendered.body, "custom");
}

#[test]
fn test_sibling_contexts_are_isolated() {
    let dir = TempDir::new().unwrap();
    write_component(
        &dir,
        "leak",
        r#"{"main": "template://x", "with": {"secret": "from-sibling"}}"#,
    );
    write_component(&dir, "probe", r#"{"main": "template://[{{ secret }}]"}"#);
    let root: Component = serde_json::from_str(
        r#"{
            "main": "template://{{ a }}{{ b }}",
            "require": {
                "a": {"name": "leak"},
                "b": {"name": "probe"}
            }
        }"#,
    )
    .unwrap();

    let rendered = compiler(&dir)
        .compile(&root)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "x[]");
}

#[test]
fn test_source_component_is_exposed() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "name": "pages.about",
            "main": "template://{{ source_component.name }}"
        }"#,
    )
    .unwrap();

    let rendered = compiler(&dir)
        .compile(&component)
        .unwrap()
        .render(Context::new())
        .unwrap();
    assert_eq!(rendered.body, "pages.about");
}

#[test]
fn test_execution_error_names_component() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "name": "pages.broken",
            "main": "template://{% if 'sometimes' | bool %}x{% endif %}"
        }"#,
    )
    .unwrap();

    let err = compiler(&dir)
        .compile(&component)
        .unwrap()
        .render(Context::new())
        .unwrap_err();
    match err {
        WeftError::Component { name, source } => {
            assert_eq!(name, "pages.broken");
            assert!(matches!(*source, WeftError::TemplateExecute(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_rendered_serializes_to_body_styles_scripts() {
    let dir = TempDir::new().unwrap();
    let component: Component = serde_json::from_str(
        r#"{
            "main": "template://<h1>{{title}}</h1>",
            "styles": ["https://cdn.example.com/app.css"]
        }"#,
    )
    .unwrap();

    let mut ctx = Context::new();
    ctx.insert("title", "Hi");
    let rendered = compiler(&dir)
        .compile(&component)
        .unwrap()
        .render(ctx)
        .unwrap();
    let json: serde_json::Value = serde_json::to_value(&rendered).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "body": "<h1>Hi</h1>",
            "styles": ["https://cdn.example.com/app.css"]
        })
    );
}

#[test]
fn test_render_html_assembles_page() {
    let dir = TempDir::new().unwrap();
    write_component(
        &dir,
        "page",
        r#"{
            "main": "template://<html><head></head><body><h1>hi</h1></body></html>",
            "styles": ["https://cdn.example.com/app.css", "text://h1 { }"],
            "scripts": ["text://console.log(1);"]
        }"#,
    );

    let rendered = compiler(&dir)
        .compile_by_name("page")
        .unwrap()
        .render(Context::new())
        .unwrap();
    let page = render_html(&rendered);
    assert_eq!(
        page,
        "<html><head><link rel=\"stylesheet\" href=\"https://cdn.example.com/app.css\" /><style type=\"text/css\">h1 { }</style></head><body><h1>hi</h1><script type=\"text/javascript\">console.log(1);</script></body></html>"
    );
}
