//! Normalizer tests (HTML `<details>` → `Details` components)

use insta::assert_snapshot;
use richtext_babel::{preprocess, NormalizeOptions, Normalizer};

#[test]
fn test_simple_block() {
    assert_snapshot!(preprocess("<details><summary>Hello</summary>World</details>"), @r#"
    <Details summary="Hello">

    World

    </Details>
    "#);
}

#[test]
fn test_nested_blocks() {
    let source = "<details><summary>Outer</summary>Outer content<details><summary>Inner</summary>Inner content</details></details>";
    assert_snapshot!(preprocess(source), @r#"
    <Details summary="Outer">

    Outer content

    <Details summary="Inner">

    Inner content

    </Details>

    </Details>
    "#);
}

#[test]
fn test_siblings_with_text_between() {
    let source = "<details><summary>A</summary>1</details>\nmiddle\n<details><summary>B</summary>2</details>";
    assert_eq!(
        preprocess(source),
        "<Details summary=\"A\">\n\n1\n\n</Details>\n\nmiddle\n\n<Details summary=\"B\">\n\n2\n\n</Details>"
    );
}

#[test]
fn test_summary_markup_is_flattened() {
    assert_eq!(
        preprocess("<details><summary><b>Bold</b> <i>title</i></summary>x</details>"),
        "<Details summary=\"Bold title\">\n\nx\n\n</Details>"
    );
}

#[test]
fn test_multiline_summary_is_one_line() {
    assert_eq!(
        preprocess("<details><summary>two\nlines</summary>x</details>"),
        "<Details summary=\"two lines\">\n\nx\n\n</Details>"
    );
}

#[test]
fn test_unclosed_block() {
    assert_eq!(
        preprocess("<details><summary>Test</summary>Content"),
        "Test\n\nContent"
    );
}

#[test]
fn test_stray_tags_are_removed() {
    let out = preprocess("a</details> b</summary> c");
    assert!(!out.contains("details"), "{out}");
    assert!(!out.contains("summary"), "{out}");
    assert!(out.contains('a') && out.contains('b') && out.contains('c'));
}

#[test]
fn test_components_are_left_alone() {
    let source = "<Details summary=\"Hello\">\n\nWorld\n\n</Details>";
    assert_eq!(preprocess(source), source);
}

#[test]
fn test_depth_limit() {
    let normalizer = Normalizer::new(NormalizeOptions {
        max_nesting_depth: 1,
    });
    let source = "<details><summary>A</summary><details><summary>B</summary>x</details></details>";
    let out = normalizer.normalize(source);
    assert!(!out.contains("<details"), "{out}");
    assert!(!out.contains("<Details"), "{out}");
}

#[test]
fn test_idempotent() {
    let source = "Intro\n<details><summary>S &amp; T</summary><p>Body</p><details>inner</details></details>\n\n\n\nEnd</summary>";
    let once = preprocess(source);
    assert_eq!(preprocess(&once), once);
}
