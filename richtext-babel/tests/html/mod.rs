//! Literal HTML tests
//!
//! Tests for the normalizer (HTML `<details>` → components) and the post-processor
//! (components → HTML `<details>`).

mod postprocess;
mod preprocess;
