//! Recipes: the rule set for one consuming project.
//!
//! A recipe bundles the option schema, the requirement rules and any
//! path variable rules. Recipes are plain data; evaluation happens in the
//! resolver.

use std::path::{Path, PathBuf};

use crate::core::options::{OptionDecl, OptionSchema};
use crate::rules::{PathVariableRule, RequirementRule};
use crate::util::diagnostic::Diagnostic;

/// Rule set for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    name: String,
    schema: OptionSchema,
    requirement_rules: Vec<RequirementRule>,
    variable_rules: Vec<PathVariableRule>,
    source_path: Option<PathBuf>,
}

impl Recipe {
    /// Create an empty recipe.
    pub fn new(name: impl Into<String>) -> Self {
        Recipe {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declare an option.
    pub fn option(mut self, decl: OptionDecl) -> Self {
        self.schema.insert(decl);
        self
    }

    /// Append a requirement rule.
    pub fn requires(mut self, rule: RequirementRule) -> Self {
        self.requirement_rules.push(rule);
        self
    }

    /// Append a path variable rule.
    pub fn variable(mut self, rule: PathVariableRule) -> Self {
        self.variable_rules.push(rule);
        self
    }

    /// Remember the file this recipe was loaded from.
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    pub fn requirement_rules(&self) -> &[RequirementRule] {
        &self.requirement_rules
    }

    pub fn variable_rules(&self) -> &[PathVariableRule] {
        &self.variable_rules
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Find authoring mistakes that evaluation tolerates silently.
    ///
    /// Rules may legally reference undeclared options (they read as not
    /// applicable), but that is almost always a typo.
    pub fn lint(&self) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();

        for rule in &self.requirement_rules {
            for name in rule.condition().referenced_options() {
                if !self.schema.contains(name) {
                    warnings.push(self.warning(format!(
                        "rule for `{}` references undeclared option `{}`",
                        rule.requirement().package_id(),
                        name
                    )));
                }
            }
        }

        for rule in &self.variable_rules {
            match rule.gate() {
                Some(gate) => {
                    let parent_required = self
                        .requirement_rules
                        .iter()
                        .any(|r| r.requirement().package_id() == gate.parent);
                    if !parent_required {
                        warnings.push(self.warning(format!(
                            "variable rule for `{}` is gated on `{}`, which no rule requires",
                            rule.package_id(),
                            gate.parent
                        )));
                    }
                }
                None => {
                    let required = self
                        .requirement_rules
                        .iter()
                        .any(|r| r.requirement().package_id() == rule.package_id());
                    if !required {
                        warnings.push(self.warning(format!(
                            "variable rule for `{}` never applies: no rule requires it",
                            rule.package_id()
                        )));
                    }
                }
            }
        }

        warnings
    }

    fn warning(&self, message: String) -> Diagnostic {
        let diag = Diagnostic::warning(message)
            .with_suggestion("Declare the option or fix the package name".to_string());
        match &self.source_path {
            Some(path) => diag.with_location(path.clone()),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::condition::OptionCondition;
    use crate::core::requirement::Requirement;

    fn req(reference: &str) -> Requirement {
        Requirement::parse(reference).unwrap()
    }

    #[test]
    fn test_builder() {
        let recipe = Recipe::new("demo")
            .option(OptionDecl::boolean("with_audio", true))
            .requires(RequirementRule::new(req("sdl/2.28.5")))
            .variable(PathVariableRule::new("sdl").with_fixed_key("sdlBinDir"));

        assert_eq!(recipe.name(), "demo");
        assert_eq!(recipe.schema().len(), 1);
        assert_eq!(recipe.requirement_rules().len(), 1);
        assert_eq!(recipe.variable_rules().len(), 1);
        assert!(recipe.lint().is_empty());
    }

    #[test]
    fn test_lint_flags_undeclared_option() {
        let recipe = Recipe::new("demo")
            .requires(
                RequirementRule::new(req("sdl_mixer/2.8.0"))
                    .when(OptionCondition::is_true("with_audoi")),
            )
            .with_source_path("recipe.toml");

        let warnings = recipe.lint();
        assert_eq!(warnings.len(), 1);
        let text = warnings[0].format(false);
        assert!(text.contains("undeclared option `with_audoi`"));
        assert!(text.contains("--> recipe.toml"));
    }

    #[test]
    fn test_lint_flags_orphan_variable_rules() {
        let recipe = Recipe::new("demo")
            .requires(RequirementRule::new(req("popl/1.3.0")))
            .variable(PathVariableRule::new("zlib").through("mach_emu", "with_zlib"))
            .variable(PathVariableRule::new("glfw"));

        assert_eq!(recipe.lint().len(), 2);
    }
}
