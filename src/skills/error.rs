use std::path::PathBuf;

use super::expr::ExprError;
use super::stat_set::StatSetError;

/// Errors raised while reading skill documents or compiling a definition.
///
/// Anything returned from the definition compiler aborts that single
/// definition; the loader logs it and moves on to the next one.
#[derive(Debug, thiserror::Error)]
pub enum SkillDataError {
    #[error("text and list in same node are not allowed: <{node}>")]
    MixedListAndText { node: String },

    #[error("<{node}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        node: String,
        attribute: &'static str,
    },

    #[error("<{node}> attribute '{attribute}' has invalid value '{value}'")]
    InvalidAttribute {
        node: String,
        attribute: &'static str,
        value: String,
    },

    #[error("undefined variable {0}")]
    UndefinedVariable(String),

    #[error("expression '{{{expr}}}' failed: {source}")]
    Expression {
        expr: String,
        #[source]
        source: ExprError,
    },

    #[error(transparent)]
    Stats(#[from] StatSetError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
}
