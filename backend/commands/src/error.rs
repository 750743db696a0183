use std::time::Duration;

use thiserror::Error;

use crate::path::CommandPath;

/// Failures of a single dispatch cycle. None of these affect other messages.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Zero providers alive at a non-empty final path. The walk only extends a
    /// path with a token some alive provider offered, so this is an engine bug.
    #[error("no provider owns resolved path `{path}`")]
    OrphanedPath { path: CommandPath },

    /// Several providers declared the same full path.
    #[error("path `{path}` is claimed by several providers: {}", providers.join(", "))]
    AmbiguousOwner { path: CommandPath, providers: Vec<String> },

    #[error("provider {provider} failed to execute `{path}`: {cause:#}")]
    Execution { provider: String, path: CommandPath, cause: anyhow::Error },

    #[error("provider {provider} timed out after {after:?} executing `{path}`")]
    Timeout { provider: String, path: CommandPath, after: Duration },
}

impl DispatchError {
    /// True for engine or registration defects, false for provider failures.
    pub fn is_defect(&self) -> bool {
        matches!(self, DispatchError::OrphanedPath { .. } | DispatchError::AmbiguousOwner { .. })
    }

    pub fn path(&self) -> &CommandPath {
        match self {
            DispatchError::OrphanedPath { path }
            | DispatchError::AmbiguousOwner { path, .. }
            | DispatchError::Execution { path, .. }
            | DispatchError::Timeout { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_owner_names_every_claimant() {
        let err = DispatchError::AmbiguousOwner {
            path: CommandPath::root().child("quit"),
            providers: vec!["admin".into(), "games".into()],
        };
        assert!(err.is_defect());
        assert_eq!(err.to_string(), "path `quit` is claimed by several providers: admin, games");
    }

    #[test]
    fn execution_failures_are_not_defects() {
        let err = DispatchError::Execution {
            provider: "filter".into(),
            path: CommandPath::root().child("filter"),
            cause: anyhow::anyhow!("store unavailable"),
        };
        assert!(!err.is_defect());
        assert_eq!(err.path().to_string(), "filter");
    }
}
