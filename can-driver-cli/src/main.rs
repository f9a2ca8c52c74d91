//! CAN Driver Generator CLI Application
//!
//! This is the command-line interface for the driver generator.
//! It uses the can-driver-gen library and adds:
//! - Batch generation over several DBC files
//! - TOML-driven configuration
//! - JSON dumps of the resolved driver interface
//! - Optional generation banners with timestamps

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

mod config;

/// CAN Driver Generator - Emit C++ driver classes from DBC databases
#[derive(Parser, Debug)]
#[command(name = "can-driver-cli")]
#[command(about = "Generate C++ CAN driver classes from DBC files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to DBC file(s) (can be repeated)
    #[arg(long, value_name = "FILE")]
    dbc: Vec<PathBuf>,

    /// Output directory for the generated inc/ and src/ trees
    #[arg(short, long, value_name = "DIR", default_value = "generated")]
    out_dir: PathBuf,

    /// Classify message direction by membership of this node
    #[arg(long, value_name = "NODE", conflicts_with = "attribute_direction")]
    node: Option<String>,

    /// Classify message direction by the CG_MsgDirection attribute
    #[arg(long)]
    attribute_direction: bool,

    /// Also write the resolved driver interface as JSON
    #[arg(long)]
    dump_spec: bool,

    /// Prepend a generation banner with a timestamp to emitted files
    #[arg(long)]
    stamp: bool,

    /// Path to configuration file (config.toml) - for batch runs
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Driver Generator CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using generator library v{}", can_driver_gen::VERSION);

    // Check if flag mode or config mode
    if !args.dbc.is_empty() {
        // Flag mode - everything comes from the command line
        flag_mode(&args)?;
    } else if let Some(config_path) = &args.config {
        // Config mode - batch runs driven by a TOML file
        config_mode(config_path)?;
    } else {
        // No arguments - show help
        println!("CAN Driver Generator - No input specified");
        println!("\nQuick Start:");
        println!("  can-driver-cli --dbc network.dbc --node FVT_ECU");
        println!("  can-driver-cli --dbc network.dbc --attribute-direction");
        println!("\nFor batch runs:");
        println!("  can-driver-cli --config config.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Flag mode - build a generation job from command-line flags alone
fn flag_mode(args: &Args) -> Result<()> {
    use can_driver_gen::GeneratorConfig;

    println!("═══════════════════════════════════════════════");
    println!("  CAN Driver Generator - Flag Mode");
    println!("═══════════════════════════════════════════════\n");

    let generator_config = if let Some(node) = &args.node {
        GeneratorConfig::membership_directions(node.clone())
    } else if args.attribute_direction {
        GeneratorConfig::attribute_directions()
    } else {
        bail!("Choose a direction policy: --node <NAME> or --attribute-direction");
    };

    let job = GenerationJob {
        dbc_files: args.dbc.clone(),
        generator_config,
        out_dir: args.out_dir.clone(),
        dump_spec: args.dump_spec,
        stamp: stamp_line(args.stamp),
    };

    job.run()
}

/// Config mode - build a generation job from a TOML file
fn config_mode(config_path: &Path) -> Result<()> {
    use can_driver_gen::GeneratorConfig;

    println!("═══════════════════════════════════════════════");
    println!("  CAN Driver Generator - Config Mode");
    println!("═══════════════════════════════════════════════\n");

    log::info!("Loading configuration from: {:?}", config_path);
    let config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    println!("✓ Configuration loaded: {:?}", config_path);

    let policy = config.direction.to_policy()?;
    let job = GenerationJob {
        dbc_files: config.input.dbc_files,
        generator_config: GeneratorConfig::new(policy),
        out_dir: config.output.directory,
        dump_spec: config.output.dump_spec,
        stamp: stamp_line(config.output.stamp),
    };

    job.run()
}

/// One batch of DBC files generated into a shared output directory.
struct GenerationJob {
    dbc_files: Vec<PathBuf>,
    generator_config: can_driver_gen::GeneratorConfig,
    out_dir: PathBuf,
    dump_spec: bool,
    stamp: Option<String>,
}

/// What one DBC file produced, for the summary print.
struct GeneratedDriver {
    driver_name: String,
    header_path: PathBuf,
    source_path: PathBuf,
    spec_path: Option<PathBuf>,
    tx_count: usize,
    rx_count: usize,
}

impl GenerationJob {
    fn run(&self) -> Result<()> {
        fs::create_dir_all(self.out_dir.join("inc"))
            .with_context(|| format!("Failed to create output directory: {:?}", self.out_dir))?;
        fs::create_dir_all(self.out_dir.join("src"))
            .with_context(|| format!("Failed to create output directory: {:?}", self.out_dir))?;

        let results: Vec<(&PathBuf, Result<GeneratedDriver>)> = self
            .dbc_files
            .par_iter()
            .map(|path| (path, self.generate_one(path)))
            .collect();

        let mut failures = 0;
        for (path, result) in &results {
            match result {
                Ok(driver) => {
                    println!("✓ {} ({} TX, {} RX)", driver.driver_name, driver.tx_count, driver.rx_count);
                    println!("    header: {:?}", driver.header_path);
                    println!("    source: {:?}", driver.source_path);
                    if let Some(spec_path) = &driver.spec_path {
                        println!("    spec:   {:?}", spec_path);
                    }
                }
                Err(e) => {
                    failures += 1;
                    println!("✗ {:?}", path);
                    eprintln!("Error generating driver: {:#}", e);
                }
            }
        }

        println!("\n📊 Generation summary:");
        println!("  DBC files: {}", self.dbc_files.len());
        println!("  Succeeded: {}", results.len() - failures);
        println!("  Failed:    {}", failures);

        if failures > 0 {
            bail!("{} of {} DBC files failed", failures, self.dbc_files.len());
        }
        Ok(())
    }

    /// Generate the header/source pair for a single DBC file.
    fn generate_one(&self, dbc_path: &Path) -> Result<GeneratedDriver> {
        use can_driver_gen::emit::{render_header, render_source};
        use can_driver_gen::Generator;

        log::info!("Generating driver from {:?}", dbc_path);

        let generator = Generator::from_dbc_file(dbc_path)
            .with_context(|| format!("Failed to load DBC file: {:?}", dbc_path))?;
        let spec = generator
            .generate(&self.generator_config)
            .with_context(|| format!("Failed to resolve driver interface for: {:?}", dbc_path))?;

        let file_stem = spec.driver_name.to_lowercase();
        let header_path = self.out_dir.join("inc").join(format!("{}.h", file_stem));
        let source_path = self.out_dir.join("src").join(format!("{}.cpp", file_stem));

        let mut header = render_header(&spec);
        let mut source = render_source(&spec);
        if let Some(stamp) = &self.stamp {
            header.insert_str(0, stamp);
            source.insert_str(0, stamp);
        }

        fs::write(&header_path, header)
            .with_context(|| format!("Failed to write header: {:?}", header_path))?;
        fs::write(&source_path, source)
            .with_context(|| format!("Failed to write source: {:?}", source_path))?;

        let spec_path = if self.dump_spec {
            let json = serde_json::to_string_pretty(&spec)
                .with_context(|| format!("Failed to serialize driver interface for: {:?}", dbc_path))?;
            let path = self.out_dir.join(format!("{}.json", file_stem));
            fs::write(&path, json)
                .with_context(|| format!("Failed to write spec dump: {:?}", path))?;
            Some(path)
        } else {
            None
        };

        Ok(GeneratedDriver {
            driver_name: spec.driver_name.clone(),
            header_path,
            source_path,
            spec_path,
            tx_count: spec.tx_messages.len(),
            rx_count: spec.rx_messages.len(),
        })
    }
}

/// Banner comment for stamped output files, None when stamping is off.
///
/// Stamping is opt-in because it makes repeated runs differ byte for byte.
fn stamp_line(enabled: bool) -> Option<String> {
    if !enabled {
        return None;
    }
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    Some(format!(
        "// Generated by can-driver-cli v{} on {}\n",
        env!("CARGO_PKG_VERSION"),
        now
    ))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
