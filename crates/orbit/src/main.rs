use clap::{Parser, Subcommand};
use orbit::geom::Point;
use orbit::layout::{self, DEFAULT_SPREAD_DEGREES};
use orbit::touch::{SOCKET_PATH, TouchPhase, TouchSample};
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "orbit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Put a finger down at X Y
    Down { x: f64, y: f64 },
    /// Move the finger to X Y
    Move { x: f64, y: f64 },
    /// Lift the finger at X Y
    Up { x: f64, y: f64 },
    /// Print the item points the menu would use
    Layout {
        /// Number of items
        #[arg(short = 'n', long)]
        count: usize,

        /// Distance of every item from the center
        #[arg(short = 'r', long, default_value_t = 80.0)]
        radius: f64,

        /// Angular spread in whole degrees
        #[arg(short = 's', long, default_value_t = DEFAULT_SPREAD_DEGREES)]
        spread: u32,

        /// Center x coordinate
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        cx: f64,

        /// Center y coordinate
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        cy: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Down { x, y } => send_touch(TouchPhase::Down, x, y),
        Commands::Move { x, y } => send_touch(TouchPhase::Move, x, y),
        Commands::Up { x, y } => send_touch(TouchPhase::Up, x, y),
        Commands::Layout {
            count,
            radius,
            spread,
            cx,
            cy,
        } => print_layout(Point::new(cx, cy), radius, count, spread),
    }
}

fn print_layout(center: Point, radius: f64, count: usize, spread: u32) -> anyhow::Result<()> {
    let points = layout::compute_item_points_with_spread(center, radius, count, spread)?;
    for (i, p) in points.iter().enumerate() {
        println!("{i}\t{:.3}\t{:.3}", p.x, p.y);
    }
    Ok(())
}

fn send_touch(phase: TouchPhase, x: f64, y: f64) -> anyhow::Result<()> {
    send_sample(TouchSample::new(phase, Point::new(x, y)))
}

fn send_sample(sample: TouchSample) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to the menu host at {}: {}. Is explosion running?",
            SOCKET_PATH,
            e
        )
    })?;

    log::debug!("sending '{}'", sample);
    writeln!(stream, "{}", sample)?;
    Ok(())
}
