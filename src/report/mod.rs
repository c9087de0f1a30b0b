//! Dashboard rendering.

pub mod generator;

pub use generator::{
    generate_failure_report, generate_json_failure, generate_json_report,
    generate_markdown_report, RenderOptions,
};
