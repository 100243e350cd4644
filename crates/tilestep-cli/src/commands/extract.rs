//! Extract command implementation.
//!
//! Runs the rule extraction pipeline on a sample image and prints the
//! resulting custom rule bundle, ready to be sent in `customRules`.

use std::path::Path;

use anyhow::{Context, Result};
use tilestep_core::ExtractionOptions;
use tilestep_wfc::WfcEngine;
use tracing::info;

/// Extract rules from `image` and write the bundle to `output` or stdout.
pub fn execute(
    image: &Path,
    output: Option<&Path>,
    name: Option<String>,
    options: ExtractionOptions,
) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let name = name.unwrap_or_else(|| {
        image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string())
    });

    let bundle = tilestep_ops::extract(&WfcEngine::new(), &name, &bytes, options)?;
    let json = serde_json::to_string_pretty(&bundle)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "rules_written");
            eprintln!("Wrote rules '{}' to {}", name, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
