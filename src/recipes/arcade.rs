//! Recipe for the i8080 arcade front-end.
//!
//! The emulator core (`mach_emu`), the machine hardware model (`meen_hw`),
//! JSON config and command-line parsing are needed everywhere. The SDL
//! display/input layer only exists on interactive platforms, and
//! `sdl_mixer` additionally needs the `with_audio` option.
//!
//! `with_gpio` exists only on bare metal. It pulls in no package; it is
//! surfaced as a feature flag so the build can compile in the GPIO
//! cabinet driver.
//!
//! `mach_emu` optionally pulls in `zlib`; its directory is surfaced
//! whenever `mach_emu` reports being built `with_zlib`.

use crate::core::condition::{OptionCondition, OsClass, PlatformCondition};
use crate::core::options::OptionDecl;
use crate::core::recipe::Recipe;
use crate::core::requirement::Requirement;
use crate::resolver::ResolveError;
use crate::rules::{PathVariableRule, RequirementRule};

pub const NAME: &str = "i8080-arcade";

/// Build the arcade recipe.
pub fn recipe() -> Result<Recipe, ResolveError> {
    let interactive = PlatformCondition::class(OsClass::Interactive);

    let recipe = Recipe::new(NAME)
        .option(OptionDecl::boolean("with_zlib", true))
        .option(OptionDecl::boolean("with_audio", true).available_on(interactive.clone()))
        .option(
            OptionDecl::boolean("with_gpio", true)
                .available_on(PlatformCondition::class(OsClass::BareMetal)),
        )
        .requires(
            RequirementRule::new(
                Requirement::parse("mach_emu/1.6.2")?.with_forced("with_zlib", true),
            )
            .when(OptionCondition::is_true("with_zlib")),
        )
        .requires(
            RequirementRule::new(
                Requirement::parse("mach_emu/1.6.2")?.with_forced("with_zlib", false),
            )
            .when(OptionCondition::is_false("with_zlib")),
        )
        .requires(RequirementRule::new(Requirement::parse("meen_hw/0.2.1")?))
        .requires(RequirementRule::new(Requirement::parse("nlohmann_json/3.11.3")?))
        .requires(RequirementRule::new(Requirement::parse("popl/1.3.0")?))
        .requires(RequirementRule::new(Requirement::parse("sdl/2.28.5")?).on(interactive.clone()))
        .requires(
            RequirementRule::new(
                Requirement::parse("sdl_mixer/2.8.0")?
                    .with_forced("wav", true)
                    .with_forced("flac", false)
                    .with_forced("mpg123", false),
            )
            .on(interactive)
            .when(OptionCondition::is_true("with_audio")),
        )
        .variable(PathVariableRule::new("zlib").through("mach_emu", "with_zlib"));

    Ok(recipe)
}
