use thiserror::Error;

/// Which tabular input a schema problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Source,
    Concept,
    Relationship,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputKind::Source => "source code list",
            InputKind::Concept => "concept dictionary",
            InputKind::Relationship => "concept relationship table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrosswalkError {
    /// A column the joins consume is absent from an input header.
    #[error("{input} is missing required column `{column}`")]
    Schema { input: InputKind, column: String },
}

pub type Result<T> = std::result::Result<T, CrosswalkError>;
