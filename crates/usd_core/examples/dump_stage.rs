//! Debug tool to dump a reconstructed Stage's Prim hierarchy.
//!
//! Run with: cargo run --example dump_stage -- <path_to.usda>

use std::env;
use std::fs;

use usd_core::{LoadState, Prim, Reader, ReaderConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <path_to.usda>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    println!("Loading USDA: {path}");
    let content = fs::read_to_string(path)?;

    let mut reader = Reader::new(ReaderConfig::default());
    reader.read(LoadState::Toplevel, &content)?;
    let stage = reader.reconstruct_stage()?;

    println!("\n{} root prim(s)", stage.root_prims.len());
    for prim in &stage.root_prims {
        dump_prim(prim, 0);
    }

    if !reader.warnings().is_empty() {
        println!("\n{} warning(s):", reader.warnings().len());
        for w in reader.warnings() {
            println!("  {w}");
        }
    }

    Ok(())
}

fn dump_prim(prim: &Prim, depth: usize) {
    let indent = "  ".repeat(depth);
    let type_tag = match (&prim.payload, &prim.prim_type_name) {
        (usd_core::PrimPayload::Model, Some(declared)) => format!("Model ({declared})"),
        _ => prim.payload.type_name().to_string(),
    };
    println!("{indent}{} {} [{type_tag}]", prim.specifier, prim.name);

    for (vs_name, result) in &prim.variant_sets {
        println!(
            "{indent}  variantSet \"{vs_name}\" (selected: {:?})",
            result.selected_variant
        );
        for (variant_name, children) in &result.variants {
            println!("{indent}    \"{variant_name}\"");
            for child in children {
                dump_prim(child, depth + 3);
            }
        }
    }

    for child in &prim.children {
        dump_prim(child, depth + 1);
    }
}
