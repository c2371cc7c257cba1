use anyhow::Result;
use std::path::PathBuf;

use crate::printing::print_model_summary;
use crate::utils::load_model;

pub fn show_info(model_path: &PathBuf) -> Result<()> {
    let model = load_model(model_path)?;

    println!("\n📊 Model Information");
    println!("{}", "=".repeat(50));
    println!("File: {}", model_path.display());
    print_model_summary(&model);

    Ok(())
}
