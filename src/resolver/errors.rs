//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::dependency_info::ProviderError;
use crate::util::diagnostic::Diagnostic;

/// Error during requirement or variable resolution.
///
/// Every variant is fatal to the current resolution: nothing partial is
/// returned alongside it.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ResolveError {
    /// Two matching rules disagree on one package.
    #[error("conflicting requirements for `{package}`: {first} vs {second}")]
    #[diagnostic(
        code(recipe::resolve::conflicting_requirement),
        help("make the rule predicates for `{package}` mutually exclusive, or force the same options")
    )]
    ConflictingRequirement {
        package: String,
        first: String,
        second: String,
    },

    /// A required package has no dependency facts.
    #[error("no dependency info supplied for required package `{package}`")]
    #[diagnostic(
        code(recipe::resolve::missing_dependency_info),
        help("resolve every requirement in the package index before deriving variables")
    )]
    MissingDependencyInfo { package: String },

    /// Error reported by the dependency info provider, unmodified.
    #[error(transparent)]
    #[diagnostic(code(recipe::provider))]
    Provider(#[from] ProviderError),

    #[error("invalid value for option `{name}`: {message}")]
    #[diagnostic(code(recipe::options::invalid))]
    InvalidOption { name: String, message: String },

    #[error("invalid platform {field} `{value}`")]
    #[diagnostic(code(recipe::platform::invalid))]
    InvalidPlatform { field: &'static str, value: String },

    /// Two variable rules produced different values for one key.
    #[error("variable `{key}` derived twice: `{first}` vs `{second}`")]
    #[diagnostic(code(recipe::variables::duplicate))]
    DuplicateVariable {
        key: String,
        first: String,
        second: String,
    },

    /// A dependency directory that cannot be rewritten without loss.
    #[error("cannot normalize directory `{path}`: not valid Unicode")]
    #[diagnostic(code(recipe::variables::invalid_path))]
    InvalidPath { path: String },

    #[error("invalid package reference `{reference}`: {reason}")]
    #[diagnostic(code(recipe::reference::invalid))]
    InvalidReference { reference: String, reason: String },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::ConflictingRequirement {
                package,
                first,
                second,
            } => Diagnostic::error(format!("conflicting requirements for `{}`", package))
                .with_context(format!("first matching rule requires {}", first))
                .with_context(format!("a later matching rule requires {}", second))
                .with_suggestion(format!(
                    "Make the rule predicates for `{}` mutually exclusive",
                    package
                ))
                .with_suggestion("Force identical options in both rules".to_string()),

            ResolveError::MissingDependencyInfo { package } => Diagnostic::error(format!(
                "no dependency info for `{}`",
                package
            ))
            .with_context(
                "variables cannot be derived until every requirement is resolved".to_string(),
            )
            .with_suggestion(format!(
                "Resolve `{}` in the package index and pass its info",
                package
            )),

            ResolveError::Provider(ProviderError::UnknownPackage { package_id }) => {
                Diagnostic::error(format!("package index does not know `{}`", package_id))
                    .with_suggestion(
                        "Check that the package name is spelled correctly".to_string(),
                    )
                    .with_suggestion("Ensure the package index snapshot is complete".to_string())
            }

            ResolveError::Provider(ProviderError::Index {
                package_id,
                message,
            }) => Diagnostic::error(format!("package index error for `{}`", package_id))
                .with_context(message.clone()),

            ResolveError::InvalidOption { name, message } => {
                Diagnostic::error(format!("invalid value for option `{}`", name))
                    .with_context(message.clone())
                    .with_suggestion("Check the recipe's option declarations".to_string())
            }

            ResolveError::InvalidPlatform { field, value } => {
                Diagnostic::error(format!("invalid platform {} `{}`", field, value))
            }

            ResolveError::DuplicateVariable { key, first, second } => {
                Diagnostic::error(format!("variable `{}` derived twice", key))
                    .with_context(format!("first value: {}", first))
                    .with_context(format!("second value: {}", second))
                    .with_suggestion(
                        "Give one of the path rules a distinct stem or fixed key".to_string(),
                    )
            }

            ResolveError::InvalidPath { path } => {
                Diagnostic::error(format!("cannot normalize directory `{}`", path))
                    .with_context("the path is not valid Unicode".to_string())
                    .with_suggestion(
                        "Report the directory from the package index verbatim".to_string(),
                    )
            }

            ResolveError::InvalidReference { reference, reason } => {
                Diagnostic::error(format!("invalid package reference `{}`", reference))
                    .with_context(reason.clone())
                    .with_suggestion("Write references as `name/version`".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_requirement_diagnostic() {
        let err = ResolveError::ConflictingRequirement {
            package: "sdl".to_string(),
            first: "sdl/2.28.5 [shared=true]".to_string(),
            second: "sdl/2.28.5 [shared=false]".to_string(),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("conflicting requirements for `sdl`"));
        assert!(output.contains("shared=true"));
        assert!(output.contains("shared=false"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_provider_error_passes_through() {
        let err: ResolveError = ProviderError::unknown("glfw").into();
        assert_eq!(err.to_string(), "unknown package `glfw`");
        assert!(err
            .to_diagnostic()
            .format(false)
            .contains("package index does not know `glfw`"));
    }

    #[test]
    fn test_miette_codes() {
        use miette::Diagnostic as _;

        let err = ResolveError::MissingDependencyInfo {
            package: "popl".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("recipe::resolve::missing_dependency_info".to_string())
        );
        assert!(err.help().is_some());
    }
}
