use serde::{Deserialize, Serialize};

/// Text split into left context, hidden core and right context.
///
/// A cloze with no surrounding context is represented by the bare core
/// string, which is also how it serializes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextCloze {
    Bare(String),
    Split {
        left: String,
        cloze: String,
        right: String,
    },
}

impl ContextCloze {
    pub fn new(left: impl Into<String>, cloze: impl Into<String>, right: impl Into<String>) -> Self {
        let (left, cloze, right) = (left.into(), cloze.into(), right.into());
        if left.is_empty() && right.is_empty() {
            return Self::Bare(cloze);
        }
        Self::Split { left, cloze, right }
    }

    /// Joins `pieces[start..end]` as the core and the pieces on either side as context.
    pub fn from_pieces<S: AsRef<str>>(pieces: &[S], start: usize, end: usize) -> Self {
        let join = |range: &[S]| range.iter().map(|piece| piece.as_ref()).collect::<String>();
        Self::new(
            join(&pieces[..start]),
            join(&pieces[start..end]),
            join(&pieces[end..]),
        )
    }

    pub fn cloze(&self) -> &str {
        match self {
            Self::Bare(cloze) | Self::Split { cloze, .. } => cloze,
        }
    }

    pub fn left(&self) -> &str {
        match self {
            Self::Bare(_) => "",
            Self::Split { left, .. } => left,
        }
    }

    pub fn right(&self) -> &str {
        match self {
            Self::Bare(_) => "",
            Self::Split { right, .. } => right,
        }
    }
}
