//! Example: Load a USDA file and reconstruct its Stage.
//!
//! Run with: cargo run --example load_usda -- assets/test_cube.usda

use std::env;
use std::fs;

use usd_core::{LoadState, Reader, ReaderConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: load_usda <path-to-usda-file>");
        return Ok(());
    }

    let path = &args[1];
    println!("Loading USDA file: {path}");
    let content = fs::read_to_string(path)?;

    let mut reader = Reader::new(ReaderConfig::default());
    if let Some(dir) = std::path::Path::new(path).parent().and_then(|p| p.to_str()) {
        reader.set_base_dir(dir);
    }
    reader.read(LoadState::Toplevel, &content)?;
    let stage = reader.reconstruct_stage()?;

    println!("\n=== Stage ===");
    if let Some(doc) = &stage.meta.doc {
        println!("doc: {doc}");
    }
    println!("root prims: {}", stage.root_prims.len());
    for prim in &stage.root_prims {
        println!("  {} ({})", prim.path, prim.payload.type_name());
    }

    if !reader.warnings().is_empty() {
        println!("\n--- Warnings ---");
        for w in reader.warnings() {
            println!("  {w}");
        }
    }

    Ok(())
}
