//! Standalone driver generation tool
//!
//! Resolves a DBC database into a driver specification and writes the
//! generated C++ pair into an output directory.
//!
//! Usage:
//!   generate_driver <database.dbc> --node <NAME> [--out <dir>]
//!   generate_driver <database.dbc> --attribute-direction [--out <dir>]
//!
//! Example:
//!   generate_driver ebtm.dbc --node FVT_ECU --out generated

use can_driver_gen::emit::{render_header, render_source};
use can_driver_gen::{Direction, Generator, GeneratorConfig};
use std::env;
use std::path::PathBuf;
use std::process;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  generate_driver <database.dbc> --node <NAME> [--out <dir>]");
    eprintln!("  generate_driver <database.dbc> --attribute-direction [--out <dir>]");
}

fn main() -> can_driver_gen::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let dbc_path = PathBuf::from(&args[0]);
    let mut node: Option<String> = None;
    let mut attribute_direction = false;
    let mut out_dir = PathBuf::from(".");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--node" => {
                i += 1;
                node = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--node requires a value");
                    process::exit(1);
                }));
            }
            "--attribute-direction" => attribute_direction = true,
            "--out" => {
                i += 1;
                out_dir = PathBuf::from(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--out requires a value");
                    process::exit(1);
                }));
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match (node, attribute_direction) {
        (Some(node), false) => GeneratorConfig::membership_directions(node),
        (None, true) => GeneratorConfig::attribute_directions(),
        _ => {
            eprintln!("Choose exactly one of --node and --attribute-direction");
            process::exit(1);
        }
    };

    let generator = Generator::from_dbc_file(&dbc_path)?;
    let spec = generator.generate(&config)?;

    println!("=== DRIVER {} ===", spec.driver_name);
    println!(
        "{} TX messages, {} RX messages",
        spec.tx_messages.len(),
        spec.rx_messages.len()
    );
    for message in spec.all_messages() {
        let role = match message.direction {
            Direction::Tx => "TX",
            Direction::Rx => "RX",
        };
        println!(
            "  [{}] {} (0x{:X}, {} signals)",
            role,
            message.name,
            message.frame_id,
            message.fields.len()
        );
    }

    let driver_file = spec.driver_name.to_lowercase();
    let header_path = out_dir.join("inc").join(format!("{}.h", driver_file));
    let source_path = out_dir.join("src").join(format!("{}.cpp", driver_file));

    std::fs::create_dir_all(out_dir.join("inc"))?;
    std::fs::create_dir_all(out_dir.join("src"))?;
    std::fs::write(&header_path, render_header(&spec))?;
    std::fs::write(&source_path, render_source(&spec))?;

    println!("Wrote {:?}", header_path);
    println!("Wrote {:?}", source_path);
    Ok(())
}
