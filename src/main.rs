//! `spherical-easel <file>`: replays a construction and prints its objects.

use anyhow::{bail, Context};
use spherical_easel::{
    construction_from_config, describe_nodule, init_logging_with, AngleUnits, Config,
    Construction, BUILD_DATE, VERSION,
};
use std::path::{Path, PathBuf};

const USAGE: &str =
    "Usage: spherical-easel [--config <path>] [--units deg|rad] <construction.json | script.txt>";

fn main() -> anyhow::Result<()> {
    let mut config_path: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;
    let mut units: Option<AngleUnits> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("spherical-easel {} (built {})", VERSION, BUILD_DATE);
                return Ok(());
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                return Ok(());
            }
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--units" => {
                let value = args.next().context("--units needs deg or rad")?;
                units = Some(value.parse().map_err(anyhow::Error::msg)?);
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument '{}'\n{}", arg, USAGE),
        }
    }
    let Some(input) = input else {
        bail!("{}", USAGE);
    };

    let config = match config_path {
        Some(path) => Config::load_from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(_) => Config::default(),
        },
    };
    init_logging_with(&config.logging)?;

    let mut construction = construction_from_config(&config);
    load(&mut construction, &input)?;
    print_table(&construction, units.unwrap_or(config.construction.angle_units));
    Ok(())
}

/// Loads a `.json` construction file, or anything else as a plain script.
fn load(construction: &mut Construction, path: &Path) -> anyhow::Result<()> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        construction.load_from_file(path)?;
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        construction
            .load_script(&text)
            .with_context(|| format!("Failed to replay script {}", path.display()))?;
        construction.current_file_path = Some(path.to_path_buf());
        construction.is_modified = false;
    }
    Ok(())
}

fn print_table(construction: &Construction, units: AngleUnits) {
    let store = construction.store();
    println!(
        "{} ({} objects{})",
        construction.display_name(),
        store.len(),
        if store.earth_mode() { ", earth mode" } else { "" }
    );
    println!("{:<8} {:<15} {:<7} {:<7} {}", "NAME", "TYPE", "EXISTS", "SHOWN", "VALUE");
    for nodule in store.iter() {
        println!(
            "{:<8} {:<15} {:<7} {:<7} {}",
            nodule.name,
            nodule.nodule_type().as_str(),
            nodule.exists,
            nodule.showing,
            describe_nodule(nodule, units)
        );
    }
}
