//! Build script for turnshot-firmware
//!
//! - Puts memory.x on the linker search path and adds the cortex-m-rt and
//!   defmt linker scripts
//! - Parses and validates rig.toml, then emits it as a `RigConfig` constant

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use turnshot_core::config::{LightLimits, RigConfig};
use turnshot_core::traits::LightId;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    generate_config(&out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate rig.toml and write `rig_config.rs`
fn generate_config(out_dir: &Path) {
    println!("cargo:rerun-if-changed=rig.toml");

    let content = match fs::read_to_string("rig.toml") {
        Ok(content) => content,
        Err(e) => panic!("\nrig.toml could not be read: {}\n", e),
    };

    let config: RigConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => panic!("\nrig.toml is invalid:\n{}\n", e),
    };

    if let Err(e) = config.validate() {
        panic!("\nrig.toml is inconsistent: {:?}\n", e);
    }

    fs::write(out_dir.join("rig_config.rs"), render(&config)).unwrap();
}

/// Render the configuration as a Rust constant
fn render(config: &RigConfig) -> String {
    let arm = &config.arm;
    let table = &config.turntable;
    let lights = &config.lights;
    let capture_light = match lights.capture_light {
        LightId::Back => "LightId::Back",
        LightId::Dome => "LightId::Dome",
    };

    format!(
        "pub const RIG_CONFIG: RigConfig = RigConfig {{
    arm: ArmConfig {{
        min_angle: {},
        max_angle: {},
        home_angle: {},
        capture_angle: {},
    }},
    turntable: TurntableConfig {{
        min_rpm: {},
        max_rpm: {},
        default_rpm: {},
        increment_degrees: {},
        revolution_degrees: {},
        max_manual_degrees: {},
        max_manual_iterations: {},
        repeat_delay_ms: {},
    }},
    lights: LightConfig {{
        back: {},
        dome: {},
        capture_light: {},
    }},
    console: ConsoleConfig {{
        echo: {},
        prompt: {},
    }},
}};
",
        arm.min_angle,
        arm.max_angle,
        arm.home_angle,
        arm.capture_angle,
        table.min_rpm,
        table.max_rpm,
        table.default_rpm,
        table.increment_degrees,
        table.revolution_degrees,
        table.max_manual_degrees,
        table.max_manual_iterations,
        table.repeat_delay_ms,
        render_limits(&lights.back),
        render_limits(&lights.dome),
        capture_light,
        config.console.echo,
        config.console.prompt,
    )
}

fn render_limits(limits: &LightLimits) -> String {
    format!(
        "LightLimits {{ min_duty: {}, max_duty: {}, on_duty: {}, off_duty: {} }}",
        limits.min_duty, limits.max_duty, limits.on_duty, limits.off_duty
    )
}
