//! YAML error types with source spans for miette

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors from reading or parsing a YAML file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error("IO error: {0}")]
    #[diagnostic(code(jobflow::yaml::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),
}

/// A YAML syntax or shape error pointing at the offending location
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(code(jobflow::yaml::syntax))]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error, locating it in `content`
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = err.location().map(|loc| {
            let offset = offset_of(content, loc.line(), loc.column());
            SourceSpan::new(offset.into(), 1)
        });

        // serde_yml appends " at line X column Y"; the label already shows it
        let message = err.to_string();
        let message = match message.find(" at line ") {
            Some(idx) => message[..idx].to_string(),
            None => message,
        };

        Self {
            filename: filename.to_string(),
            message,
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}

/// Byte offset of a 1-based line/column, clamped to the content
fn offset_of(content: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, text) in content.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let col = column.saturating_sub(1).min(text.trim_end_matches('\n').len());
            return offset + col;
        }
        offset += text.len();
    }
    content.len().saturating_sub(1)
}
