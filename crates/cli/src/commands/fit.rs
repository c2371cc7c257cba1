use anyhow::Result;
use std::path::PathBuf;

use crate::printing::print_model_summary;
use crate::utils::{load_model, save_model, JsonLines};

pub fn fit_model(model_path: &PathBuf, input: &PathBuf, output: Option<&PathBuf>) -> Result<()> {
    let mut model = load_model(model_path)?;
    println!("📂 Loaded {} model from {}", model.kind(), model_path.display());

    let samples = JsonLines::read(Some(input))?;
    println!("Fitting on {} samples...", samples.len());

    model
        .fit_values(&samples.values)
        .map_err(|e| samples.locate(0, e))?;

    if !model.is_fitted() {
        println!("⚠️  Warning: no usable samples, the model is still unfitted.");
    }
    print_model_summary(&model);

    let destination = output.unwrap_or(model_path);
    save_model(&model, destination)?;
    println!("✓ Fitted model saved to: {}", destination.display());

    Ok(())
}
