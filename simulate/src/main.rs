use clap::Parser;
use compute::session::Session;
use compute_naive::Simulation;
use data::Precision;
use eyre::{eyre, Result, WrapErr};
use image::RgbaImage;
use log::info;
use std::{num::NonZeroUsize, path::PathBuf, sync::mpsc};
use ui::{
    render::{self, Palette, ToneMapping},
    SharedArgs,
};

/// Run a Gray-Scott reaction-diffusion simulation and save snapshots as PNG
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CLI arguments shared with other simulation drivers
    #[command(flatten)]
    shared: SharedArgs,

    /// Number of images to be created
    #[arg(short, long, default_value_t = 100)]
    nbimage: usize,

    /// Directory where output images will be saved
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Width of the output images (defaults to the grid resolution)
    #[arg(long)]
    width: Option<u32>,

    /// Height of the output images (defaults to the grid resolution)
    #[arg(long)]
    height: Option<u32>,

    /// Contrast applied around mid-gray
    #[arg(long, default_value_t = 1.0)]
    contrast: Precision,

    /// Brightness offset
    #[arg(long, default_value_t = 0.0)]
    brightness: Precision,

    /// Invert the output images
    #[arg(long)]
    invert: bool,

    /// Color palette of the output images
    #[arg(long, value_enum, default_value_t = Palette::Grayscale)]
    palette: Palette,

    /// Grid position "x,y" where V is injected before the first image
    ///
    /// Can be specified multiple times.
    #[arg(long, value_parser = parse_position)]
    inject: Vec<[i64; 2]>,

    /// Apply a random perturbation before the first image
    #[arg(long)]
    perturb: bool,

    /// Size of the image buffer between the compute and I/O thread
    ///
    /// A larger buffer enables better performance, at the cost of higher RAM
    /// utilization. 2 is the minimum to fully decouple compute and I/O.
    #[arg(long, default_value_t = NonZeroUsize::new(2).unwrap())]
    output_buffer: NonZeroUsize,
}

/// Parse a grid position of the form "x,y"
fn parse_position(s: &str) -> Result<[i64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
    let coord = |c: &str| {
        c.trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid coordinate {c:?}: {e}"))
    };
    Ok([coord(x)?, coord(y)?])
}

fn main() -> Result<()> {
    // Enable logging to syslog
    ui::init_syslog();

    // Parse CLI arguments and handle clap-incompatible defaults
    let args = Args::parse();
    let config = ui::session_config(&args.shared);
    let output_dir = args.output_dir.unwrap_or_else(|| "./".into());
    let resolution =
        u32::try_from(config.resolution).wrap_err("Grid resolution is too large for an image")?;
    let image_shape = [
        args.width.unwrap_or(resolution),
        args.height.unwrap_or(resolution),
    ];
    let tone = ToneMapping {
        contrast: args.contrast,
        brightness: args.brightness,
        invert: args.invert,
    };

    // Set up the simulation and apply the requested perturbations
    let mut session = Session::<Simulation>::new(config)?;
    for [x, y] in args.inject {
        session.inject_at(x, y);
    }
    if args.perturb {
        session.random_perturb();
    }
    info!("Simulating {} images into {}", args.nbimage, output_dir.display());

    // Set up progress reporting
    let progress = ui::init_progress_reporting("Running simulation step", args.nbimage);

    std::thread::scope(|s| {
        // Start the writer thread
        let (sender, receiver) = mpsc::sync_channel::<(usize, RgbaImage)>(args.output_buffer.into());
        let output_dir = &output_dir;
        let progress = &progress;
        let writer = s.spawn(move || -> Result<()> {
            for (idx, image) in receiver {
                let path = output_dir.join(format!("{idx}.png"));
                image
                    .save(&path)
                    .wrap_err_with(|| format!("Failed to save {}", path.display()))?;
                progress.inc(1);
            }
            Ok(())
        });

        // Run the simulation on the main thread
        for idx in 0..args.nbimage {
            session.frame();
            let image = render::render(
                session.species().v.input().view(),
                image_shape,
                &tone,
                args.palette,
            );
            if sender.send((idx, image)).is_err() {
                // The writer thread failed, its error is reported below
                break;
            }
        }
        drop(sender);
        writer
            .join()
            .map_err(|_| eyre!("Image writer thread panicked"))?
    })?;
    progress.finish();
    Ok(())
}
