use clap::Parser;
use star_props::cli::{Cli, Commands};
use star_props::commands::{analyze_frames, detect_frame, FramePaths};
use star_props::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            blue,
            visual,
            luminosity,
            index,
            format,
            detection,
            alignment,
        } => {
            let params = detection.to_params();
            let translator = alignment.to_translator(&params);
            let paths = FramePaths {
                blue: &blue,
                visual: &visual,
                luminosity: &luminosity,
            };
            analyze_frames(&paths, index, &format, &params, &translator)?;
        }
        Commands::Detect {
            path,
            format,
            detection,
        } => {
            detect_frame(&path, &format, &detection.to_params())?;
        }
    }

    Ok(())
}
