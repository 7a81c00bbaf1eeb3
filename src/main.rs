use pixel_artist::codec::{convert_file, image_info};
use pixel_artist::config::init;
use pixel_artist::constants::ORIGINAL_PALETTE;
use pixel_artist::logger::setup_logging;
use pixel_artist::types::AppConfig;
use pixel_artist::AppError;

use std::path::Path;

use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config = match init() {
        Ok(config) => config,
        Err(AppError::Cli(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };
    setup_logging(&config.log_level, config.log_format)?;

    if config.list_palettes {
        print_palettes(&config);
        return Ok(());
    }

    if config.info {
        for (input, _) in &config.input_output_pairs {
            print_info(input)?;
        }
        return Ok(());
    }

    let multi_progress = MultiProgress::new();

    let results: Vec<anyhow::Result<()>> = config
        .input_output_pairs
        .par_iter()
        .map(|(input_path, output_path)| {
            let pb = multi_progress.add(ProgressBar::new(0));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")?
                    .progress_chars("#>-"),
            );
            pb.set_message(format!("Processing: {}", input_path.display()));

            let result = process_image(input_path, output_path, &config, &pb);

            match &result {
                Ok(()) => pb.finish_with_message(format!(
                    "Finished: {} (Saved to: {})",
                    input_path.display(),
                    output_path.display()
                )),
                Err(e) => {
                    error!(input = %input_path.display(), "{:#}", e);
                    pb.abandon_with_message(format!("Failed: {}", input_path.display()));
                }
            }

            result
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(converted = results.len() - failed, failed, "done");

    // Check for any errors
    results.into_iter().collect::<anyhow::Result<Vec<_>>>()?;

    Ok(())
}

fn process_image(
    input_path: &Path,
    output_path: &Path,
    config: &AppConfig,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    convert_file(
        input_path,
        output_path,
        config.pixel_size,
        &config.palette,
        &config.palettes,
        config.output_size,
        pb,
    )
    .with_context(|| format!("failed to pixelate {}", input_path.display()))?;
    Ok(())
}

fn print_palettes(config: &AppConfig) {
    for palette in config.palettes.iter() {
        println!("{:<12} {} colors", palette.name, palette.colors.len());
    }
    println!("{:<12} averaged colors, no quantization", ORIGINAL_PALETTE);
}

fn print_info(path: &Path) -> anyhow::Result<()> {
    let info = image_info(path).with_context(|| format!("failed to read {}", path.display()))?;
    println!(
        "{}: {}x{} {:?} {} ({} bytes)",
        path.display(),
        info.width,
        info.height,
        info.color_type,
        info.format
            .map(|f| format!("{:?}", f))
            .unwrap_or_else(|| "unknown".to_string()),
        info.file_size
    );
    Ok(())
}
