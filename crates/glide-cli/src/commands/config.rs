use std::path::Path;

use anyhow::{bail, Context, Result};

use glide_core::AppConfig;

pub fn path(custom: Option<&Path>) -> Result<()> {
    match custom {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", AppConfig::config_path().display()),
    }
    Ok(())
}

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn init(custom: Option<&Path>, force: bool) -> Result<()> {
    let path = custom
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    if path.exists() && !force {
        bail!(
            "{} already exists.\nUse --force to overwrite it with the defaults.",
            path.display()
        );
    }

    AppConfig::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub fn check(custom: Option<&Path>) -> Result<()> {
    let path = custom
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    if !path.exists() {
        println!("{} does not exist; defaults will be used.", path.display());
        return Ok(());
    }

    let config = AppConfig::load_from(&path)
        .with_context(|| format!("{} is not a valid configuration", path.display()))?;
    println!("{} is valid.", path.display());
    println!(
        "  items: {}  loop: {}  autoplay: {:?}  spring damping ratio: {:.2}",
        config.engine.item_count,
        config.engine.loop_mode,
        config.engine.autoplay.direction,
        config.engine.spring.damping_ratio()
    );
    Ok(())
}
