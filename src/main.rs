use clap::Parser;
use gnuplot::{AxesCommon, Caption, Figure};
use lmb_cycle_simulator as lmb;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Closed-cycle pressure simulation of a single engine cylinder
#[derive(Parser, Debug)]
#[command(name = "lmb-cycle")]
#[command(about = "Closed-cycle in-cylinder pressure simulator", long_about = None)]
struct Args {
    /// JSON configuration file (the built-in reference engine when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file for the pressure trace
    #[arg(short, long, default_value = "cylinder_pressure.txt")]
    output: String,

    /// Engine speed override in RPM
    #[arg(short, long)]
    speed: Option<f64>,

    /// Spark advance override in CA deg
    #[arg(long)]
    spark_advance: Option<f64>,

    /// Run without combustion (motored cycle)
    #[arg(short, long)]
    motored: bool,

    /// Plot the pressure trace with gnuplot
    #[arg(short, long)]
    plot: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> lmb::SimResult<()> {
    let mut config = match &args.config {
        Some(file_name) => lmb::SimulationConfig::from_file(file_name)?,
        None => lmb::SimulationConfig::reference(),
    };
    if let Some(speed) = args.speed {
        config.operating_point.speed = speed;
    }
    if let Some(advance) = args.spark_advance {
        config.operating_point.spark_advance = advance;
    }

    let mut builder = lmb::SimulationBuilder::from_config(&config)?;
    if args.motored {
        builder.set_combustion_model(Box::new(lmb::NoCombustion::new()));
    }
    let simulation = builder.build_system()?;
    println!("{}", simulation);

    let traces = simulation.run()?;
    for (cycle, trace) in traces.iter().enumerate() {
        let file_name = if traces.len() > 1 {
            format!("{}_{}", cycle + 1, args.output)
        } else {
            args.output.clone()
        };
        trace.write_to_file(&file_name)?;
        info!("trace written to `{}`", file_name);
    }

    if args.plot {
        if let Some(trace) = traces.last() {
            plot(simulation.cylinder().name(), trace);
        }
    }
    Ok(())
}

fn plot(name: &str, trace: &lmb::Trace) {
    let angles = trace.angles();
    let pressures: Vec<f64> = trace.pressures().iter().map(|p| p / 1e5).collect();
    let mut fg = Figure::new();
    fg.axes2d()
        .set_x_label("crank angle [deg]", &[])
        .set_y_label("pressure [bar]", &[])
        .lines(&angles, &pressures, &[Caption(name)]);
    if let Err(err) = fg.show() {
        warn!("could not plot the pressure trace: {}", err);
    }
}
