//! Integration tests for compiling and filling templates

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use stencil::{fill, EngineConfig, FillError, ParseError, Provider, Template, TemplateRegistry};

fn pairs<'a>(entries: &[(&'a str, &'a str)]) -> Provider<'a> {
    Provider::map(entries.iter().copied())
}

#[test]
fn test_empty_template() {
    assert_eq!(fill("", "").expect("Should fill"), "");
}

#[test]
fn test_no_substitutions() {
    let text = "There are no substitutions in this template";
    assert_eq!(fill(text, "").expect("Should fill"), text);
}

#[test]
fn test_simple_substitution() {
    let data = || pairs(&[("TEST", "REPLACEMENT")]);
    for template in [
        "replace: {{TEST}}",
        "replace: {{ TEST}}",
        "replace: {{TEST }}",
        "replace: {{ TEST }}",
    ] {
        assert_eq!(fill(template, data()).expect("Should fill"), "replace: REPLACEMENT");
    }
}

#[test]
fn test_names_with_spaces() {
    let data = pairs(&[("NAME WITH SPACE", "REPLACEMENT")]);
    assert_eq!(
        fill("replace: {{ NAME WITH SPACE }}", &data).expect("Should fill"),
        "replace: REPLACEMENT"
    );
}

#[test]
fn test_escaped_braces() {
    let data = pairs(&[("TEST", "REPLACEMENT")]);
    assert_eq!(
        fill(r"replace: \{{{TEST}}", &data).expect("Should fill"),
        "replace: {REPLACEMENT"
    );
    assert_eq!(
        fill(r"replace: {{TEST}}\}", &data).expect("Should fill"),
        "replace: REPLACEMENT}"
    );
}

#[test]
fn test_multiple_substitutions() {
    let data = pairs(&[("TEST1", "REPLACEMENT1"), ("TEST2", "REPLACEMENT2")]);
    assert_eq!(
        fill("replace: {{TEST1}} and: {{TEST2}} and: {{TEST1}}", &data).expect("Should fill"),
        "replace: REPLACEMENT1 and: REPLACEMENT2 and: REPLACEMENT1"
    );
}

#[test]
fn test_missing_name() {
    let result = fill("replace: {{TEST}}", pairs(&[("XXX", "REPLACEMENT")]));
    match result {
        Err(FillError::MissingName { name, provider, template }) => {
            assert_eq!(name, "TEST");
            assert_eq!(provider, "map with keys: XXX");
            assert_eq!(template, "replace: {{TEST}}");
        }
        other => panic!("Expected MissingName, got {:?}", other),
    }
}

#[test]
fn test_unmatched_delimiters() {
    assert!(Template::new("replace: {{TEST").compile().is_err());
    assert!(Template::new("replace: TEST}}").compile().is_err());
    assert!(Template::new("{{a}{{b}}").compile().is_err());
}

#[test]
fn test_deep_nesting_is_a_compile_error() {
    let source = "{{a|!".repeat(600) + &"}}".repeat(600);
    let err = Template::new(source).compile().expect_err("Should reject");
    assert!(matches!(
        err.errors.first(),
        Some(ParseError::NestingTooDeep { limit, .. }) if *limit == stencil::parser::MAX_NESTING
    ));
}

#[test]
fn test_fill_is_repeatable() {
    let template = Template::new("{{a}}-{{b}}");
    let data = pairs(&[("a", "1"), ("b", "2")]);
    let templates = TemplateRegistry::new();
    let first = template.fill(&data, &templates).expect("Should fill");
    let second = template.fill(&data, &templates).expect("Should fill");
    assert_eq!(first, "1-2");
    assert_eq!(first, second);
}

#[test]
fn test_comments_are_empty() {
    let data = pairs(&[("a", "A")]);
    assert_eq!(
        fill("x{{# a comment with {{nested}} braces }}y {{a}}", &data).expect("Should fill"),
        "xy A"
    );
}

#[test]
fn test_group_passes_through() {
    let data = pairs(&[("a", "A"), ("b", "B")]);
    assert_eq!(fill("<{{@{{a}}-{{b}}}}>", &data).expect("Should fill"), "<A-B>");
}

mod contingent {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line() {
        let cases = [
            ("BEFORE {{name|!{{name}}}}", "", "BEFORE "),
            ("BEFORE {{<name|!{{name}}}}", "", ""),
            ("BEFORE {{<name}} AFTER", "", " AFTER"),
            ("BEFORE {{name>}} AFTER", "", "BEFORE "),
            ("BEFORE {{<name>}} AFTER", "", ""),
            ("BEFORE {{<name}} AFTER", "X", "BEFORE X AFTER"),
            ("BEFORE {{name>}} AFTER", "X", "BEFORE X AFTER"),
            ("BEFORE {{<name>}} AFTER", "X", "BEFORE X AFTER"),
            ("BEFORE {{<name}}", "content", "BEFORE content"),
        ];
        for (template, value, expected) in cases {
            let text = fill(template, pairs(&[("name", value)])).expect("Should fill");
            assert_eq!(text, expected, "template: {:?} value: {:?}", template, value);
        }
    }

    #[test]
    fn test_only_last_line_is_contingent() {
        let data = pairs(&[("name", "")]);
        assert_eq!(
            fill("first line\nBEFORE {{<name}}\nAFTER", &data).expect("Should fill"),
            "first line\nAFTER"
        );
    }

    #[test]
    fn test_precedence() {
        let data = || pairs(&[("empty", ""), ("not_empty", "NOT_EMPTY")]);
        let cases = [
            (
                "FIRST {{empty>}} SECOND {{<not_empty}} THIRD",
                "FIRST NOT_EMPTY THIRD",
            ),
            (
                "FIRST\n{{empty>>}} SECOND\n\n\n\n{{<not_empty}}\nTHIRD",
                "FIRST\nNOT_EMPTY\nTHIRD",
            ),
            (
                "FIRST {{not_empty>}} SECOND {{<empty}} THIRD",
                "FIRST NOT_EMPTY SECOND  THIRD",
            ),
            (
                "FIRST {{not_empty>>}} SECOND\n\n\n\n{{<empty}} THIRD",
                "FIRST NOT_EMPTY SECOND\n\n\n\n THIRD",
            ),
        ];
        for (template, expected) in cases {
            assert_eq!(fill(template, data()).expect("Should fill"), expected);
        }
    }

    #[test]
    fn test_empty_container_drops_blank_lines() {
        let data = Provider::map([("VECTOR", Vec::<&str>::new())]);
        assert_eq!(
            fill("BEFORE\n\nX{{<<VECTOR|!!\n{{<DUMMY>}}>>}}Y\n\nAFTER", &data).expect("Should fill"),
            "BEFORE\nAFTER"
        );
    }
}

mod containers {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_join() {
        let data = Provider::map([("name", vec!["a", "", "c"])]);
        assert_eq!(
            fill("{{name|!{{dummyname}}}}", &data).expect("Should fill"),
            "a\n\nc"
        );
    }

    #[test]
    fn test_ignore_empty_elements() {
        let data = Provider::map([("name", vec!["a", "", "c"])]);
        assert_eq!(
            fill("{{<name|!{{dummyname}}}}", &data).expect("Should fill"),
            "a\nc"
        );

        let empty = Provider::map([("name", vec!["", ""])]);
        assert_eq!(fill("{{<name|!{{dummyname}}}}", &empty).expect("Should fill"), "");
        assert_eq!(
            fill("before\n{{<name|!{{dummyname}}}}\nafter", &empty).expect("Should fill"),
            "before\nafter"
        );
        assert_eq!(
            fill("before\n{{<name|!!\n{{dummyname}}}}\nafter", &empty).expect("Should fill"),
            "before\nafter"
        );
    }

    #[test]
    fn test_join_strings() {
        let data = Provider::map([("list", vec!["one", "two", "three"])]);
        assert_eq!(
            fill("{{list%, |!{{}}}}", &data).expect("Should fill"),
            "one, two, three"
        );
        assert_eq!(
            fill("[{{list%%, |!{{}}}}]", &data).expect("Should fill"),
            "[, one, two, three]"
        );
        assert_eq!(
            fill(r"{{list% \| |!{{}}}}", &data).expect("Should fill"),
            "one | two | three"
        );
    }

    #[test]
    fn test_without_member_template_elements_are_empty() {
        let data = Provider::map([("list", vec!["one", "two"])]);
        assert_eq!(fill("[{{list%,}}]", &data).expect("Should fill"), "[,]");
    }

    #[test]
    fn test_inline_subtemplate() {
        let template = r#"
This is a normal template {{SUBSTITUTE}}
{{VECTOR|!!
 * This is \{{{SUPERLATIVE}}\} inline template{{EXCLAMATION}}}}
This is more normal template
"#;
        let elements: Vec<BTreeMap<&str, &str>> = vec![
            BTreeMap::from([("SUPERLATIVE", "an awesome"), ("EXCLAMATION", "!")]),
            BTreeMap::from([("SUPERLATIVE", "a cool"), ("EXCLAMATION", "!!")]),
            BTreeMap::from([("SUPERLATIVE", "a super"), ("EXCLAMATION", "!!!")]),
        ];
        let data = Provider::map([
            ("SUBSTITUTE", Provider::literal("REPLACEMENT")),
            ("VECTOR", Provider::from(elements)),
        ]);

        let expected = r#"
This is a normal template REPLACEMENT
 * This is {an awesome} inline template!
 * This is {a cool} inline template!!
 * This is {a super} inline template!!!
This is more normal template
"#;
        assert_eq!(fill(template, &data).expect("Should fill"), expected);
    }

    #[test]
    fn test_skip_line_needs_newline() {
        assert_eq!(fill("{{empty_substitution|!!}}", "").expect("Should fill"), "");
    }

    #[test]
    fn test_same_container_twice() {
        let data = Provider::map([("container", vec!["one", "two", "three"])]);
        assert_eq!(
            fill("{{container|!{{}}}} {{container|!{{}}}}", &data).expect("Should fill"),
            "one\ntwo\nthree one\ntwo\nthree"
        );
    }

    #[test]
    fn test_default_join_from_config() {
        let data = Provider::map([("list", vec!["a", "b"])]);
        let config = EngineConfig::new().with_default_join("; ");
        let text = Template::new("{{list|!{{}}}}")
            .fill_with(&data, &TemplateRegistry::new(), &Default::default(), &config)
            .expect("Should fill");
        assert_eq!(text, "a; b");
    }
}

mod names {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nested() -> Provider<'static> {
        Provider::map([(
            "a",
            Provider::map([("b", Provider::map([("c", "deep")]))]),
        )])
    }

    #[test]
    fn test_dotted_name_matches_nested_inline() {
        let dotted = fill("{{a.b.c}}", nested()).expect("Should fill");
        let spelled_out = fill("{{a|!{{b|!{{c}}}}}}", nested()).expect("Should fill");
        assert_eq!(dotted, "deep");
        assert_eq!(dotted, spelled_out);
    }

    #[test]
    fn test_dotted_name_through_container() {
        let data = Provider::map([(
            "people",
            Provider::container([
                Provider::map([("name", "Ada")]),
                Provider::map([("name", "Lin")]),
            ]),
        )]);
        assert_eq!(fill("{{people.name%, }}", &data).expect("Should fill"), "Ada, Lin");
    }

    #[test]
    fn test_lookup_falls_back_to_enclosing_provider() {
        let data = Provider::map([
            ("team", Provider::literal("core")),
            (
                "people",
                Provider::container([
                    Provider::map([("name", "Ada")]),
                    Provider::map([("name", "Lin"), ("team", "docs")]),
                ]),
            ),
        ]);
        assert_eq!(
            fill("{{people%, |!{{name}} ({{team}})}}", &data).expect("Should fill"),
            "Ada (core), Lin (docs)"
        );
    }

    #[test]
    fn test_rewind_reaches_outer_provider() {
        let data = Provider::map([
            ("title", Provider::literal("root")),
            (
                "items",
                Provider::container([Provider::map([("title", "inner")])]),
            ),
        ]);
        assert_eq!(
            fill("{{items|!{{title}}/{{.title}}}}", &data).expect("Should fill"),
            "inner/root"
        );
    }

    #[test]
    fn test_rewind_out_of_range() {
        let result = fill("{{..title}}", pairs(&[("title", "x")]));
        assert!(matches!(
            result,
            Err(FillError::RewindOutOfRange {
                ref name,
                requested: 2,
                available: 0,
                ..
            }) if name == "title"
        ));
    }

    #[test]
    fn test_nested_errors_carry_context() {
        let data = Provider::map([("items", Provider::container([Provider::map([("x", "1")])]))]);
        let err = fill("{{items|!{{missing}}}}", &data).expect_err("Should fail");
        assert!(matches!(err, FillError::Nested { .. }));
        assert!(matches!(err.root_cause(), FillError::MissingName { name, .. } if name == "missing"));
        assert_eq!(
            err.pretty(),
            "while filling template '{{missing}}'\n  provider map with keys: x does not provide name 'missing' - in template '{{missing}}'\n"
        );
    }
}

#[test]
fn test_recursion_limit() {
    let data = Provider::map([("a", Provider::map([("b", Provider::map([("c", "x")]))]))]);
    let template = Template::new("{{a|!{{b|!{{c|!{{}}}}}}}}");
    let templates = TemplateRegistry::new();
    let providers = Default::default();

    let text = template
        .fill_with(&data, &templates, &providers, &EngineConfig::default())
        .expect("Should fill");
    assert_eq!(text, "x");

    let err = template
        .fill_with(&data, &templates, &providers, &EngineConfig::new().with_max_depth(1))
        .expect_err("Should hit the limit");
    assert!(matches!(err.root_cause(), FillError::RecursionLimit { limit: 1, .. }));
}
