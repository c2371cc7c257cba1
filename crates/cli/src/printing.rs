use zeichenformer_codec::{AnyCodec, Codec};

pub fn print_model_summary(model: &AnyCodec) {
    let tokens = model.token_range();

    println!("\n📋 Codec Model");
    println!("  • Kind: {} [--kind]", model.kind());
    println!("  • Offset: {} [--offset]", model.offset());

    match model {
        AnyCodec::Range(codec) => {
            let codec = codec.inner();
            println!("  • Bisection Levels: {} [--num-bits]", codec.num_bits());
            match codec.bounds() {
                Some((min, max)) => println!("  • Fitted Range: [{min}, {max}]"),
                None => println!("  • Fitted Range: not fitted"),
            }
        }
        AnyCodec::Vocabulary(codec) => {
            let codec = codec.inner();
            match codec.vocabulary() {
                Some(vocabulary) => {
                    println!("  • Categories: {}", vocabulary.len());
                    let preview: Vec<&str> = vocabulary
                        .as_slice()
                        .iter()
                        .take(10)
                        .map(String::as_str)
                        .collect();
                    let more = if vocabulary.len() > preview.len() {
                        ", ..."
                    } else {
                        ""
                    };
                    if !preview.is_empty() {
                        println!("    - {}{more}", preview.join(", "));
                    }
                }
                None => println!("  • Categories: not fitted"),
            }
        }
        AnyCodec::Calendar(codec) => {
            let codec = codec.inner();
            let bounds = codec.bounds();
            println!(
                "  • Years: {} to {} [--min-year, --max-year]",
                bounds.min_year, bounds.max_year
            );
            println!("  • Field Layout:");
            for field in codec.field_layout() {
                println!(
                    "    - {}: tokens {}..{}",
                    field.field(),
                    tokens.start + field.base(),
                    tokens.start + field.base() + field.capacity()
                );
            }
        }
    }

    println!("\n🔢 Token Space");
    println!("  • Token Ids: {}..{}", tokens.start, tokens.end);
    println!("  • Size (num_bits): {}", model.num_bits());
    println!("  • Max Active Tokens: {}", model.max_active_features());
    if !model.is_fitted() {
        println!("  • Status: not fitted, every value encodes to a sentinel");
    }
    println!();
}
