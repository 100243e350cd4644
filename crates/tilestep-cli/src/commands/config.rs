//! Config command implementation.
//!
//! Manages stored configuration.

use anyhow::Result;
use tilestep_ops::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Tilestep Configuration");
    println!("{:-<40}", "");

    println!("Observation Delay:   {} ms", config.observation_delay_ms);
    println!("Run Budget:          {} x cells", config.run_budget_multiplier);
    println!("Channel Capacity:    {}", config.channel_capacity);
    println!("Default Port:        {}", config.default_port);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    if config.get(key).is_none() {
        anyhow::bail!(
            "Unknown config key: {}. Valid keys: {}",
            key,
            Config::keys().join(", ")
        );
    }
    config.set(key, value)?;
    config.save()?;
    println!("Set {} to: {}", key, value);
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let Some(value) = config.get(key) else {
        anyhow::bail!("Unknown config key: {}", key);
    };
    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
