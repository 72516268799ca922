//! Integration tests for named templates and the template loader

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use stencil::{load_templates, Environment, FillError, Provider, Template, TemplateError, TemplateRegistry};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/templates")
}

#[test]
fn test_load_directory() {
    let templates = load_templates(fixtures()).expect("Should load");
    assert_eq!(templates.names(), vec!["a", "b"]);

    let registry = TemplateRegistry::new();
    let a = templates.get("a").expect("a is loaded");
    assert_eq!(a.fill("", &registry).expect("Should fill"), "a.template contents");
    let b = templates.get("b").expect("b is loaded");
    assert_eq!(b.fill("", &registry).expect("Should fill"), "b.template contents");
}

#[test]
fn test_load_single_file() {
    let templates = load_templates(fixtures().join("a.template")).expect("Should load");
    assert_eq!(templates.len(), 1);
    assert!(templates.contains("a"));
    assert!(!templates.contains("b"));
}

#[test]
fn test_load_missing_path() {
    let result = load_templates(fixtures().join("missing"));
    assert!(matches!(result, Err(TemplateError::FileNotFound { .. })));
}

#[test]
fn test_template_reference() {
    let templates = load_templates(fixtures()).expect("Should load");
    let text = Template::new("{{!a}} {{!b}}")
        .fill("", &templates)
        .expect("Should fill");
    assert_eq!(text, "a.template contents b.template contents");

    let missing = Template::new("{{!a}} {{!c}}").fill("", &templates);
    assert!(matches!(missing, Err(FillError::MissingTemplate { ref name, .. }) if name == "c"));
}

#[test]
fn test_reference_without_templates() {
    let result = Template::new("{{!a}}").fill("", &TemplateRegistry::new());
    assert!(matches!(result, Err(FillError::NoTemplates { .. })));
}

#[test]
fn test_reference_uses_current_provider() {
    let templates: TemplateRegistry = [("row", "<{{name}}>")].into_iter().collect();
    let data = Provider::map([(
        "rows",
        Provider::container([
            Provider::map([("name", "one")]),
            Provider::map([("name", "two")]),
        ]),
    )]);
    let text = Template::new("{{rows%|!{{!row}}}}")
        .fill(&data, &templates)
        .expect("Should fill");
    assert_eq!(text, "<one><two>");
}

#[test]
fn test_referenced_templates_nest() {
    let mut env = Environment::new();
    env.templates_mut().insert("page", "{{!header}}\n{{body}}");
    env.templates_mut().insert("header", "# {{title}}");
    let data = Provider::map([("title", "Notes"), ("body", "text")]);
    assert_eq!(env.fill_named("page", &data).expect("Should fill"), "# Notes\ntext");
}

#[test]
fn test_circular_reference() {
    let templates: TemplateRegistry = [("a", "A{{!b}}"), ("b", "B{{!a}}")].into_iter().collect();
    let err = Template::new("{{!a}}")
        .fill("", &templates)
        .expect_err("Should detect the cycle");
    match err.root_cause() {
        FillError::CircularReference { chain } => assert_eq!(chain, &["a", "b", "a"]),
        other => panic!("Expected CircularReference, got {:?}", other),
    }
}

#[test]
fn test_same_template_for_different_providers_is_not_circular() {
    let templates: TemplateRegistry = [("tree", "{{label}}{{<children%|!({{!tree}})}}")]
        .into_iter()
        .collect();
    let data = Provider::map([
        ("label", Provider::literal("root")),
        (
            "children",
            Provider::container([Provider::map([
                ("label", Provider::literal("leaf")),
                ("children", Provider::container(Vec::<&str>::new())),
            ])]),
        ),
    ]);
    let env = Environment::new().with_templates(templates);
    assert_eq!(env.fill_named("tree", &data).expect("Should fill"), "root(leaf)");
}

#[test]
fn test_compile_errors_in_referenced_template() {
    let templates: TemplateRegistry = [("broken", "{{a}{{b}}")].into_iter().collect();
    let err = Template::new("{{!broken}}")
        .fill("", &templates)
        .expect_err("Should fail");
    assert!(matches!(err, FillError::Compile(_)));
}
