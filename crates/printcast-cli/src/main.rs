//! printcast CLI - print-time and filament estimates from the terminal.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use printcast::{
    format_duration, ingest, Analyzer, AnalyzerConfig, EstimatorModel, FileKind, IngestOptions,
    PrintSettings, PrinterProfile, Report, SpeedProfile,
};
use printcast_mesh::{decode_stl, mesh_volume, mm3_to_cm3};

#[derive(Parser)]
#[command(name = "printcast")]
#[command(about = "Estimate print time and filament for STL and G-code files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate time, layers and material for an STL or G-code file
    Estimate {
        /// Input file (.stl, .gcode, .gco, .g)
        file: PathBuf,
        /// JSON print settings; missing fields take defaults
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Speed preset applied on top of the settings (silent, standard, sport, turbo)
        #[arg(long)]
        speed_profile: Option<SpeedProfile>,
        /// Built-in printer profile (see `printcast profiles`)
        #[arg(short, long)]
        printer: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the enclosed volume of an STL file
    Volume {
        /// Input STL file
        file: PathBuf,
    },
    /// Replay a G-code file line by line
    Trace {
        /// Input G-code file
        file: PathBuf,
    },
    /// List built-in printer and speed profiles
    Profiles,
}

fn main() -> Result<()> {
    env_logger::builder().init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate {
            file,
            settings,
            speed_profile,
            printer,
            json,
        } => {
            let options = ingest_options(settings.as_deref(), speed_profile, printer.as_deref())?;
            estimate_file(&file, &options, json)?;
        }
        Commands::Volume { file } => {
            show_volume(&file)?;
        }
        Commands::Trace { file } => {
            trace_gcode(&file)?;
        }
        Commands::Profiles => {
            list_profiles();
        }
    }

    Ok(())
}

fn ingest_options(
    settings: Option<&Path>,
    speed_profile: Option<SpeedProfile>,
    printer: Option<&str>,
) -> Result<IngestOptions> {
    let printer = printer
        .map(PrinterProfile::by_id)
        .transpose()
        .context("Unknown printer, run `printcast profiles` for the list")?;

    let mut settings = match (settings, &printer) {
        (Some(path), _) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings {}", path.display()))?;
            serde_json::from_str::<PrintSettings>(&json)
                .with_context(|| format!("Invalid settings file {}", path.display()))?
        }
        (None, Some(p)) => p.default_settings(),
        (None, None) => PrintSettings::default(),
    };
    if let Some(profile) = speed_profile {
        settings = settings.with_speed_profile(profile);
    }

    let filament = printer.as_ref().map(|p| p.filament()).unwrap_or_default();
    debug!("using {settings:?} with filament {filament:?}");

    Ok(IngestOptions {
        settings,
        model: EstimatorModel {
            filament,
            ..Default::default()
        },
        analyzer: AnalyzerConfig {
            filament,
            ..Default::default()
        },
        printer,
    })
}

fn detect_kind(file: &Path) -> Result<FileKind> {
    match FileKind::from_path(file) {
        Some(kind) => Ok(kind),
        None => bail!(
            "Unsupported file type: {} (expected .stl, .gcode, .gco or .g)",
            file.display()
        ),
    }
}

fn estimate_file(file: &Path, options: &IngestOptions, json: bool) -> Result<()> {
    let kind = detect_kind(file)?;
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let report = ingest(kind, &bytes, options)
        .with_context(|| format!("Failed to estimate {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", file.display());
    match &report {
        Report::Solid(solid) => {
            println!("  Triangles: {}", solid.triangles);
            println!("  Volume: {:.2} cm³ ({:.1} g solid)", solid.volume, solid.weight);
            if let Some(bounds) = &solid.bounds {
                let [x, y, z] = bounds.size();
                println!("  Size: {x:.1} x {y:.1} x {z:.1} mm");
            }
            match &solid.estimate {
                Some(estimate) => {
                    let b = &estimate.breakdown;
                    println!("  Layers: {}", estimate.layers);
                    println!("  Print time: {}", format_duration(estimate.total_time));
                    println!("    Outer walls: {}", format_duration(b.outer_walls));
                    println!("    Infill: {}", format_duration(b.infill));
                    println!("    Travel: {}", format_duration(b.travel));
                    println!("    Overhead: {}", format_duration(b.overhead));
                }
                None => println!("  Empty mesh, nothing to print"),
            }
            if let (Some(fits), Some(printer)) = (solid.fits_printer, &options.printer) {
                let verdict = if fits { "fits" } else { "does NOT fit" };
                println!("  Build volume: {verdict} {}", printer.name);
            }
        }
        Report::Toolpath(analysis) => {
            println!("  Layers: {}", analysis.layers);
            println!("  Print time: {}", format_duration(analysis.total_time));
        }
    }
    if let Some(m) = report.material_used() {
        println!(
            "  Filament: {:.2} m, {:.1} g, {:.2} cm³",
            m.length, m.weight, m.volume
        );
    }

    Ok(())
}

fn show_volume(file: &Path) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mesh = decode_stl(&bytes).with_context(|| format!("Failed to decode {}", file.display()))?;
    println!("{}", file.display());
    println!("  Triangles: {}", mesh.num_triangles());
    println!("  Volume: {:.3} cm³", mm3_to_cm3(mesh_volume(&mesh)));
    Ok(())
}

fn trace_gcode(file: &Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    println!("{:>7}  {:>10}  {:>5}  {:>9}  line", "#", "time", "layer", "E (mm)");
    for snap in Analyzer::default().replay(&text) {
        let s = &snap.state;
        println!(
            "{:>7}  {:>10.2}  {:>5}  {:>9.3}  {}",
            snap.line_number,
            s.time,
            s.layers,
            s.extruded,
            snap.line.trim()
        );
    }
    Ok(())
}

fn list_profiles() {
    println!("Printers:");
    for p in PrinterProfile::all_profiles() {
        println!(
            "  {:<18} {} ({} x {} x {} mm, {} mm/s)",
            p.id(),
            p.name,
            p.bed_x,
            p.bed_y,
            p.bed_z,
            p.max_speed
        );
    }
    println!("\nSpeed profiles (outer / inner / infill / travel, mm/s):");
    for profile in SpeedProfile::ALL {
        let s = profile.speeds();
        println!(
            "  {:<10} {} / {} / {} / {}",
            profile.name(),
            s.outer,
            s.inner,
            s.infill,
            s.travel
        );
    }
}
