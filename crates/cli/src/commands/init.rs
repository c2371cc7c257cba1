use anyhow::{Context, Result};
use zeichenformer_codec::{CodecConfig, CodecKind};

use crate::args::InitArgs;
use crate::printing::print_model_summary;
use crate::utils::save_model;

pub fn init_model(args: &InitArgs) -> Result<()> {
    let output = &args.output;
    if output.exists() && !args.force {
        anyhow::bail!(
            "Model {} already exists. Use --force to overwrite it.",
            output.display()
        );
    }

    println!("🔤 Zeichen - Feature Tokenization");
    println!("============================================\n");
    println!("Initializing {} model", args.kind);

    let config = build_config(args)?;
    let model = config.build().context("Invalid codec configuration")?;
    print_model_summary(&model);

    save_model(&model, output)?;
    println!("✓ Model initialized successfully!");
    println!("  Saved to: {}", output.display());
    if !model.is_fitted() {
        println!("\nNext: zeichen fit -m {} -i <samples.jsonl>", output.display());
    }

    Ok(())
}

/// Starts from the kind's defaults and applies the options given on the
/// command line, rejecting options that belong to another kind.
pub fn build_config(args: &InitArgs) -> Result<CodecConfig> {
    let kind = args.kind;
    let reject = |flag: &str, applies_to: CodecKind| -> Result<()> {
        anyhow::bail!("{flag} only applies to {applies_to} models, not {kind}")
    };

    if kind != CodecKind::Range && args.num_bits.is_some() {
        reject("--num-bits", CodecKind::Range)?;
    }
    if kind != CodecKind::Calendar && (args.min_year.is_some() || args.max_year.is_some()) {
        reject("--min-year/--max-year", CodecKind::Calendar)?;
    }
    if kind != CodecKind::Vocabulary && args.categories.is_some() {
        reject("--categories", CodecKind::Vocabulary)?;
    }

    let mut config = CodecConfig::defaults(kind);
    match &mut config {
        CodecConfig::Range { num_bits, offset } => {
            *num_bits = args.num_bits.unwrap_or(*num_bits);
            *offset = args.offset;
        }
        CodecConfig::Vocabulary { offset, categories } => {
            *offset = args.offset;
            categories.clone_from(&args.categories);
        }
        CodecConfig::Calendar {
            min_year,
            max_year,
            offset,
        } => {
            *min_year = args.min_year.unwrap_or(*min_year);
            *max_year = args.max_year.unwrap_or(*max_year);
            *offset = args.offset;
        }
    }
    Ok(config)
}
