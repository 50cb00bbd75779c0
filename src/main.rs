use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pallet_layout::config::LayoutConfig;
use pallet_layout::types::{Dimensions, Layout, LayoutKind, StackPolicy};
use pallet_layout::{LayoutError, plan_stack_layout, plan_unit_layout, render};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "pallet_layout",
    about = "Pallet and storage location layout planner"
)]
struct Cli {
    /// JSON file with pallet, item and location defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log layout computations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stack items on a single pallet
    Pallet {
        /// Pallet dimensions in meters (LxWxH, e.g. 2.0x1.0x0.8)
        #[arg(long, value_parser = parse_dimensions)]
        pallet: Option<Dimensions>,

        /// Item dimensions in meters (LxWxH)
        #[arg(long, value_parser = parse_dimensions)]
        item: Option<Dimensions>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Stack pallets inside a storage location
    Location {
        /// Pallet dimensions in meters (LxWxH)
        #[arg(long, value_parser = parse_dimensions)]
        pallet: Option<Dimensions>,

        /// Location dimensions in meters (LxWxH, e.g. 8x1.2x2.0)
        #[arg(long, value_parser = parse_dimensions)]
        location: Option<Dimensions>,

        /// Maximum number of pallets per stack
        #[arg(long)]
        max_stack: Option<u32>,

        /// Aisle gap between pallet positions in meters
        #[arg(long)]
        gap: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Show ASCII side elevation of the layout
    #[arg(long)]
    layout: bool,

    /// Print the styled layout as JSON
    #[arg(long, conflicts_with = "layout")]
    json: bool,
}

fn parse_dimensions(s: &str) -> Result<Dimensions, LayoutError> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(LayoutError::Parse(format!(
            "invalid dimensions '{}', expected LxWxH",
            s
        )));
    }
    let mut values = [0.0; 3];
    for (value, (part, axis)) in values
        .iter_mut()
        .zip(parts.iter().zip(["length", "width", "height"]))
    {
        *value = part
            .trim()
            .parse::<f64>()
            .map_err(|_| LayoutError::Parse(format!("invalid {} in '{}'", axis, s)))?;
    }
    Dimensions::try_from(values)
}

fn run(cli: Cli) -> Result<(), LayoutError> {
    let config = match &cli.config {
        Some(path) => LayoutConfig::from_path(path)?,
        None => LayoutConfig::default(),
    };

    let (layout, output) = match cli.command {
        Command::Pallet {
            pallet,
            item,
            output,
        } => {
            let layout = plan_unit_layout(
                pallet.unwrap_or(config.pallet),
                item.unwrap_or(config.item),
            )?;
            (layout, output)
        }
        Command::Location {
            pallet,
            location,
            max_stack,
            gap,
            output,
        } => {
            let policy = StackPolicy::new(
                max_stack.unwrap_or(config.max_stack),
                gap.unwrap_or(config.aisle_gap),
            )?;
            let layout = plan_stack_layout(
                pallet.unwrap_or(config.pallet),
                policy,
                location.unwrap_or(config.location),
            )?;
            (layout, output)
        }
    };

    if output.json {
        let styled = render::style(&layout);
        let json = serde_json::to_string_pretty(&styled).map_err(LayoutError::Encode)?;
        println!("{}", json);
        return Ok(());
    }

    print_layout(&layout);
    if output.layout {
        println!();
        print!("{}", render::render_elevation(&layout));
    }
    println!();
    print_summary(&layout, config.height_margin);
    Ok(())
}

fn print_layout(layout: &Layout) {
    for layer in 0..layout.counts.z {
        println!(
            "Layer {} ({} of {} columns):",
            layer + 1,
            layout.columns_in_layer(layer),
            layout.counts.x
        );
        for p in layout.placements.iter().filter(|p| p.slot.z == layer) {
            let marker = if p.boundary { " [boundary]" } else { "" };
            println!(
                "  {} @ ({:.2}, {:.2}, {:.2}){}",
                p.size, p.origin.x, p.origin.y, p.origin.z, marker
            );
        }
    }
}

fn print_summary(layout: &Layout, height_margin: f64) {
    let labels = render::axis_labels(layout);
    let (vx, vy, vz) = render::view_bounds(layout, height_margin);
    let noun = match layout.kind {
        LayoutKind::Unit => "item",
        LayoutKind::Stack => "pallet",
    };
    println!("{}", labels.x);
    println!("{}", labels.y);
    println!("{}", labels.z);
    println!("View: {:.2} x {:.2} x {:.2} m", vx, vy, vz);
    println!(
        "Summary: {} {}{} on {} layer{}, {:.1}% fill",
        layout.len(),
        noun,
        if layout.len() == 1 { "" } else { "s" },
        layout.layers_used,
        if layout.layers_used == 1 { "" } else { "s" },
        layout.fill_ratio() * 100.0,
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        let d = parse_dimensions("2.0x1.0x0.8").unwrap();
        assert_eq!(d, Dimensions::new(2.0, 1.0, 0.8).unwrap());
        assert!(parse_dimensions("8x1.2x2").is_ok());
    }

    #[test]
    fn test_parse_dimensions_rejects() {
        assert!(parse_dimensions("2x1").is_err());
        assert!(parse_dimensions("2xax1").is_err());
        assert!(matches!(
            parse_dimensions("2x0x1"),
            Err(LayoutError::InvalidDimension { axis: "width", .. })
        ));
    }

    #[test]
    fn test_run_rejects_oversized_item() {
        let cli = Cli::parse_from(["pallet_layout", "pallet", "--item", "1e-4x1e-4x1e-4"]);
        assert!(matches!(
            run(cli),
            Err(LayoutError::TooManyPlacements { .. })
        ));
    }

    #[test]
    fn test_run_rejects_oversized_location() {
        let cli = Cli::parse_from([
            "pallet_layout",
            "location",
            "--pallet",
            "1e-7x1e-7x1e-7",
            "--max-stack",
            "4294967295",
            "--json",
        ]);
        assert!(matches!(
            run(cli),
            Err(LayoutError::TooManyPlacements { .. })
        ));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
