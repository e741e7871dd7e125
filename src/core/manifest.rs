//! `recipe.toml` parsing.
//!
//! ```toml
//! [recipe]
//! name = "i8080-arcade"
//!
//! [options.with_audio]
//! default = true
//! available = { class = "interactive" }
//!
//! [[requires]]
//! ref = "sdl_mixer/2.8.0"
//! platform = { class = "interactive" }
//! option = "with_audio"
//! forced = { flac = false }
//!
//! [[variables]]
//! package = "zlib"
//! through = { parent = "mach_emu", option = "with_zlib" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::condition::{OptionCondition, PlatformCondition};
use crate::core::options::{OptionDecl, OptionValue};
use crate::core::recipe::Recipe;
use crate::core::requirement::Requirement;
use crate::rules::{PathVariableRule, RequirementRule};

/// Conventional recipe file name.
pub const RECIPE_FILE_NAME: &str = "recipe.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    recipe: RawRecipeMeta,

    #[serde(default)]
    options: BTreeMap<String, RawOption>,

    #[serde(default)]
    requires: Vec<RawRequire>,

    #[serde(default)]
    variables: Vec<RawVariable>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipeMeta {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOption {
    default: OptionValue,

    /// Present for enum options
    #[serde(default)]
    values: Option<Vec<String>>,

    #[serde(default)]
    available: PlatformCondition,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequire {
    #[serde(rename = "ref")]
    reference: String,

    #[serde(default)]
    platform: PlatformCondition,

    /// Shorthand for `when = { is_true = "<option>" }`
    #[serde(default)]
    option: Option<String>,

    #[serde(default)]
    when: Option<OptionCondition>,

    #[serde(default)]
    forced: BTreeMap<String, OptionValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVariable {
    package: String,

    #[serde(default)]
    stem: Option<String>,

    #[serde(default)]
    key: Option<String>,

    #[serde(default)]
    platform: PlatformCondition,

    #[serde(default)]
    through: Option<RawGate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGate {
    parent: String,
    option: String,
}

impl Recipe {
    /// Load a recipe from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;

        let recipe = Self::from_toml(&contents)
            .with_context(|| format!("failed to parse recipe: {}", path.display()))?
            .with_source_path(path);

        for warning in recipe.lint() {
            tracing::warn!("{}", warning.message);
        }

        Ok(recipe)
    }

    /// Parse a recipe from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let raw: RawRecipe = toml::from_str(contents)?;
        let mut recipe = Recipe::new(raw.recipe.name);

        for (name, opt) in raw.options {
            recipe = recipe.option(option_decl(&name, opt)?);
        }

        for raw_req in raw.requires {
            recipe = recipe.requires(requirement_rule(raw_req)?);
        }

        for raw_var in raw.variables {
            recipe = recipe.variable(variable_rule(raw_var)?);
        }

        Ok(recipe)
    }
}

fn option_decl(name: &str, raw: RawOption) -> Result<OptionDecl> {
    let decl = match (raw.values, raw.default) {
        (None, OptionValue::Bool(default)) => OptionDecl::boolean(name, default),
        (None, OptionValue::Enum(default)) => {
            bail!(
                "option `{}` has default `{}` but declares no `values`",
                name,
                default
            )
        }
        (Some(values), OptionValue::Enum(default)) => {
            if !values.contains(&default) {
                bail!(
                    "default `{}` of option `{}` is not one of: {}",
                    default,
                    name,
                    values.join(", ")
                );
            }
            OptionDecl::enumeration(name, values, default)
        }
        (Some(_), OptionValue::Bool(_)) => {
            bail!("option `{}` declares `values` but has a boolean default", name)
        }
    };

    Ok(decl.available_on(raw.available))
}

fn requirement_rule(raw: RawRequire) -> Result<RequirementRule> {
    let mut requirement = Requirement::parse(&raw.reference)?;
    for (name, value) in raw.forced {
        requirement = requirement.with_forced(name, value);
    }

    let condition = match (raw.option, raw.when) {
        (None, None) => OptionCondition::Always,
        (Some(option), None) => OptionCondition::IsTrue(option),
        (None, Some(when)) => when,
        (Some(option), Some(when)) => {
            OptionCondition::All(vec![OptionCondition::IsTrue(option), when])
        }
    };

    Ok(RequirementRule::new(requirement)
        .on(raw.platform)
        .when(condition))
}

fn variable_rule(raw: RawVariable) -> Result<PathVariableRule> {
    let mut rule = PathVariableRule::new(&raw.package).on(raw.platform);

    match (raw.stem, raw.key) {
        (Some(_), Some(_)) => bail!(
            "variable rule for `{}` sets both `stem` and `key`",
            raw.package
        ),
        (Some(stem), None) => rule = rule.with_stem(stem),
        (None, Some(key)) => rule = rule.with_fixed_key(key),
        (None, None) => {}
    }

    if let Some(gate) = raw.through {
        rule = rule.through(gate.parent, gate.option);
    }

    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::condition::OsClass;
    use crate::core::options::OptionKind;
    use crate::rules::VariableKey;

    const RECIPE: &str = r#"
[recipe]
name = "arcade"

[options.with_audio]
default = true
available = { class = "interactive" }

[options.renderer]
default = "opengl"
values = ["opengl", "software"]

[[requires]]
ref = "popl/1.3.0"

[[requires]]
ref = "sdl_mixer/2.8.0"
platform = { class = "interactive" }
option = "with_audio"
forced = { flac = false, wav = true }

[[requires]]
ref = "glew/2.2.0"
when = { equals = { option = "renderer", value = "opengl" } }

[[variables]]
package = "zlib"
through = { parent = "mach_emu", option = "with_zlib" }

[[variables]]
package = "sdl_mixer"
key = "sdlMixerBinDir"
"#;

    #[test]
    fn test_parse_recipe() {
        let recipe = Recipe::from_toml(RECIPE).unwrap();
        assert_eq!(recipe.name(), "arcade");

        let audio = recipe.schema().get("with_audio").unwrap();
        assert_eq!(audio.kind(), &OptionKind::Bool);
        assert_eq!(
            audio.availability(),
            &PlatformCondition::class(OsClass::Interactive)
        );

        let renderer = recipe.schema().get("renderer").unwrap();
        assert!(matches!(renderer.kind(), OptionKind::Enum { values } if values.len() == 2));

        let rules = recipe.requirement_rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].condition(), &OptionCondition::is_true("with_audio"));
        assert_eq!(
            rules[1].requirement().forced_options().get("wav"),
            Some(&OptionValue::Bool(true))
        );
        assert_eq!(
            rules[2].condition(),
            &OptionCondition::equals("renderer", "opengl")
        );

        let vars = recipe.variable_rules();
        assert_eq!(vars[0].gate().unwrap().parent, "mach_emu");
        assert_eq!(vars[1].key(), &VariableKey::Fixed("sdlMixerBinDir".to_string()));
    }

    #[test]
    fn test_platform_names_are_case_insensitive() {
        use crate::core::platform::{BuildType, OsFamily, PlatformDescriptor};

        let recipe = Recipe::from_toml(
            r#"
[recipe]
name = "x"
[[requires]]
ref = "sdl/2.28.5"
platform = { os = ["Windows", "Macos"], build_type = ["release"] }
"#,
        )
        .unwrap();

        let condition = recipe.requirement_rules()[0].platform();
        let windows =
            PlatformDescriptor::new(OsFamily::Windows, "x86_64", "msvc", BuildType::Release);
        let debug =
            PlatformDescriptor::new(OsFamily::Macos, "armv8", "apple-clang", BuildType::Debug);
        let linux = PlatformDescriptor::new(OsFamily::Linux, "x86_64", "gcc", BuildType::Release);
        assert!(condition.matches(&windows));
        assert!(!condition.matches(&debug));
        assert!(!condition.matches(&linux));

        let bad_os = r#"
[recipe]
name = "x"
[[requires]]
ref = "sdl/2.28.5"
platform = { os = ["Plan9"] }
"#;
        assert!(Recipe::from_toml(bad_os).is_err());
    }

    #[test]
    fn test_rejects_bad_option_declarations() {
        let enum_without_values = r#"
[recipe]
name = "x"
[options.renderer]
default = "opengl"
"#;
        assert!(Recipe::from_toml(enum_without_values).is_err());

        let default_not_listed = r#"
[recipe]
name = "x"
[options.renderer]
default = "vulkan"
values = ["opengl"]
"#;
        assert!(Recipe::from_toml(default_not_listed).is_err());
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_refs() {
        let typo = r#"
[recipe]
name = "x"
[[requires]]
ref = "sdl/2.28.5"
platfrom = { class = "interactive" }
"#;
        assert!(Recipe::from_toml(typo).is_err());

        let bad_ref = r#"
[recipe]
name = "x"
[[requires]]
ref = "sdl"
"#;
        assert!(Recipe::from_toml(bad_ref).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(RECIPE_FILE_NAME);
        std::fs::write(&path, RECIPE).unwrap();

        let recipe = Recipe::load(&path).unwrap();
        assert_eq!(recipe.source_path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = Recipe::load(Path::new("/nonexistent/recipe.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/recipe.toml"));
    }
}
