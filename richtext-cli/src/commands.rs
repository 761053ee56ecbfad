//! Subcommand implementations
//!
//! Every command is a pure text-to-text function over the loaded configuration, so the binary
//! only deals with arguments, files and exit codes.

use richtext_babel::doc::{from_json, to_json};
use richtext_babel::{BabelError, MarkdownEngine, Normalizer, Postprocessor};
use richtext_config::RichTextConfig;
use tracing::debug;

/// Everything the commands need, built once from the configuration.
pub struct Toolchain {
    normalizer: Normalizer,
    engine: MarkdownEngine,
    postprocessor: Postprocessor,
    export_html: bool,
}

impl Toolchain {
    pub fn from_config(config: &RichTextConfig) -> Self {
        Self {
            normalizer: Normalizer::new((&config.normalize).into()),
            engine: MarkdownEngine::with_defaults((&config.markdown).into()),
            postprocessor: (&config.markdown).into(),
            export_html: config.export.html,
        }
    }

    /// Raw text → Markdown with `Details` components.
    pub fn preprocess(&self, source: &str) -> String {
        self.normalizer.normalize(source)
    }

    /// Markdown with `Details` components → Markdown with literal `<details>` HTML.
    pub fn postprocess(&self, source: &str) -> String {
        self.postprocessor.process(source)
    }

    /// Raw text → document tree JSON.
    pub fn import(&self, source: &str) -> Result<String, BabelError> {
        let nodes = self.engine.deserialize(&self.normalizer.normalize(source));
        debug!(blocks = nodes.len(), "imported document");
        to_json(&nodes)
    }

    /// Document tree JSON → Markdown. `html` forces literal `<details>` output.
    pub fn export(&self, source: &str, html: bool) -> Result<String, BabelError> {
        let nodes = from_json(source)?;
        let markdown = self.engine.serialize(&nodes)?;
        if html || self.export_html {
            Ok(self.postprocessor.process(&markdown))
        } else {
            Ok(markdown)
        }
    }
}
