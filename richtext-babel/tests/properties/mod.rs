//! Property tests
//!
//! Inputs are stitched together from a small vocabulary of disclosure tags, component tags and
//! text, so the generator spends its time on broken nesting rather than on random bytes.

use proptest::prelude::*;
use richtext_babel::{export_markdown, import_markdown, postprocess, preprocess, Node};

const HTML_VOCABULARY: &[&str] = &[
    "<details>",
    "</details>",
    "<DETAILS>",
    "<summary>",
    "</summary>",
    "<Summary>",
    "<b>",
    "</b>",
    "<p>",
    "</p>",
    "text",
    "héllo",
    "日本",
    " ",
    "\n",
    "\n\n",
    "&amp;",
    "\"",
    "*",
];

/// Plain words of [`HTML_VOCABULARY`]; tags may go, these may not
const WORDS: &[&str] = &["text", "héllo", "日本"];

const COMPONENT_VOCABULARY: &[&str] = &[
    "<Details summary=\"S\">",
    "<Details>",
    "<Details summary=\"**b**\" />",
    "</Details>",
    "<DetailsSummary>",
    "</DetailsSummary>",
    "```",
    "    ",
    "- ",
    "word",
    "ü",
    "\n",
    "\n\n",
];

fn stitched(vocabulary: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vocabulary), 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn preprocess_is_idempotent(source in stitched(HTML_VOCABULARY)) {
        let once = preprocess(&source);
        prop_assert_eq!(preprocess(&once), once);
    }

    #[test]
    fn preprocess_leaves_no_disclosure_html(source in stitched(HTML_VOCABULARY)) {
        let out = preprocess(&source);
        for tag in ["<details", "</details", "<DETAILS", "</DETAILS"] {
            prop_assert!(!out.contains(tag), "{} in {:?}", tag, out);
        }
    }

    #[test]
    fn words_survive_conversion(source in stitched(HTML_VOCABULARY)) {
        let normalized = preprocess(&source);
        let imported: String = import_markdown(&source).iter().map(Node::text_content).collect();
        for word in WORDS {
            let count = source.matches(word).count();
            prop_assert!(
                normalized.matches(word).count() >= count,
                "{} lost from {:?}: {:?}", word, source, normalized
            );
            prop_assert!(
                imported.matches(word).count() >= count,
                "{} lost from {:?}: {:?}", word, source, imported
            );
        }
    }

    #[test]
    fn import_accepts_anything(source in stitched(HTML_VOCABULARY)) {
        import_markdown(&source);
    }

    #[test]
    fn component_text_never_panics(source in stitched(COMPONENT_VOCABULARY)) {
        postprocess(&source);
        let nodes = import_markdown(&source);
        prop_assert!(export_markdown(&nodes).is_ok());
    }
}
