//! Post-processor tests (`Details` components → HTML `<details>`)

use insta::assert_snapshot;
use richtext_babel::{postprocess, preprocess, Postprocessor};

#[test]
fn test_simple_component() {
    assert_snapshot!(postprocess("<Details summary=\"Hello\">\n\nWorld\n\n</Details>"), @r#"
    <details><summary>Hello</summary>

    World

    </details>
    "#);
}

#[test]
fn test_surrounding_text_is_kept() {
    assert_eq!(
        postprocess("Before\n\n<Details summary=\"S\">\n\nC\n\n</Details>\n\nAfter\n"),
        "Before\n\n<details><summary>S</summary>\n\nC\n\n</details>\n\nAfter\n"
    );
}

#[test]
fn test_self_closing_component() {
    assert_eq!(
        postprocess("<Details summary=\"Empty\" />"),
        "<details><summary>Empty</summary>\n\n\n\n</details>"
    );
}

#[test]
fn test_nested_round_trip_through_preprocess() {
    let html = "<details><summary>Outer</summary>Outer content<details><summary>Inner</summary>Inner content</details></details>";
    let back = postprocess(&preprocess(html));
    assert_eq!(
        back,
        "<details><summary>Outer</summary>\n\nOuter content\n\n<details><summary>Inner</summary>\n\nInner content\n\n</details>\n\n</details>"
    );
    assert_eq!(preprocess(&back), preprocess(html));
}

#[test]
fn test_depth_limit_leaves_text() {
    let processor = Postprocessor::new(1);
    let source = "<Details summary=\"A\">\n\n<Details summary=\"B\">\n\nx\n\n</Details>\n\n</Details>";
    let out = processor.process(source);
    assert!(!out.contains("<details>"), "{out}");
}
