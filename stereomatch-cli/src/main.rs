use clap::Parser;
use serde::{Deserialize, Serialize};
use stereomatch::io::{encode_png_gray, encode_png_rgba, load_stereo_pair, write_files};
use stereomatch::{normalize_rgba, PipelineConfig, StageTiming, StereoOutput, StereoPipeline};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const DEPTH_FILE: &str = "depthmap.png";

#[derive(Parser, Debug)]
#[command(author, version, about = "Stereo disparity CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for per-stage timing.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PipelineConfigJson {
    max_disparity: u32,
    window_width: usize,
    window_height: usize,
    cross_check_threshold: u32,
    occlusion_neighborhood: usize,
    scale_factor: usize,
    parallel: bool,
}

impl Default for PipelineConfigJson {
    fn default() -> Self {
        let cfg = PipelineConfig::default();
        Self {
            max_disparity: cfg.max_disparity,
            window_width: cfg.window_width,
            window_height: cfg.window_height,
            cross_check_threshold: cfg.cross_check_threshold,
            occlusion_neighborhood: cfg.occlusion_neighborhood,
            scale_factor: cfg.scale_factor,
            parallel: cfg.parallel,
        }
    }
}

impl From<PipelineConfigJson> for PipelineConfig {
    fn from(value: PipelineConfigJson) -> Self {
        Self {
            max_disparity: value.max_disparity,
            window_width: value.window_width,
            window_height: value.window_height,
            cross_check_threshold: value.cross_check_threshold,
            occlusion_neighborhood: value.occlusion_neighborhood,
            scale_factor: value.scale_factor,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    left_path: String,
    right_path: String,
    output_dir: PathBuf,
    save_intermediates: bool,
    report_path: Option<String>,
    pipeline: PipelineConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_path: String::new(),
            right_path: String::new(),
            output_dir: PathBuf::from("."),
            save_intermediates: false,
            report_path: None,
            pipeline: PipelineConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StageRecord {
    stage: &'static str,
    elapsed_ms: f64,
}

impl From<&StageTiming> for StageRecord {
    fn from(value: &StageTiming) -> Self {
        Self {
            stage: value.stage,
            elapsed_ms: value.millis(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    width: usize,
    height: usize,
    holes_before_fill: usize,
    holes_after_fill: usize,
    total_ms: f64,
    stages: Vec<StageRecord>,
    written: Vec<String>,
}

impl Report {
    fn new(output: &StereoOutput, written: Vec<String>) -> Self {
        let (width, height) = output.dims();
        Self {
            width,
            height,
            holes_before_fill: output.disparity_cc.hole_count(),
            holes_after_fill: output.disparity.hole_count(),
            total_ms: output.total_millis(),
            stages: output.timings.iter().map(StageRecord::from).collect(),
            written,
        }
    }
}

fn write_outputs(
    output: &StereoOutput,
    dir: &Path,
    save_intermediates: bool,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;

    // Encode everything before touching the output directory.
    let depth_path = dir.join(DEPTH_FILE);
    let depth = normalize_rgba(&output.disparity)?;
    let mut files = vec![(depth_path.clone(), encode_png_rgba(&depth, &depth_path)?)];
    if save_intermediates {
        for (stem, img) in output.intermediates()? {
            let path = dir.join(format!("{stem}.png"));
            let bytes = encode_png_gray(&img, &path)?;
            files.push((path, bytes));
        }
    }

    write_files(&files)?;
    let written = files
        .iter()
        .map(|(path, _)| {
            tracing::info!(path = %path.display(), "wrote image");
            path.display().to_string()
        })
        .collect();
    Ok(written)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stereomatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() || config.right_path.is_empty() {
        return Err("left_path and right_path must be set in the config".into());
    }

    let pipeline = StereoPipeline::new(config.pipeline.into())?;
    let (left, right) = load_stereo_pair(&config.left_path, &config.right_path)?;
    let output = pipeline.run(&left, &right)?;

    let written = write_outputs(&output, &config.output_dir, config.save_intermediates)?;
    let report = Report::new(&output, written);
    let json = serde_json::to_string_pretty(&report)?;

    match config.report_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
