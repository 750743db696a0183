use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered sequence of full option strings resolved so far in one
/// dispatch cycle. Empty at the start of every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandPath(Vec<String>);

impl CommandPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// The path extended by one resolved token.
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.0.clone();
        tokens.push(token.into());
        Self(tokens)
    }

    /// The path with its last token removed; `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every prefix of this path, root first, ending with the path itself.
    pub fn prefixes(&self) -> impl Iterator<Item = CommandPath> + '_ {
        (0..=self.0.len()).map(|n| Self(self.0[..n].to_vec()))
    }
}

impl<S: Into<String>> FromIterator<S> for CommandPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join(" "))
        }
    }
}
