use anyhow::{bail, Context};
use chromaprompt_core::{AnalysisResult, AnalyzerConfig, ImageAnalyzer};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chromaprompt",
    about = "Derive palette, tone and composition descriptors from images"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single image
    Analyze {
        /// Input image path
        input: PathBuf,

        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,

        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },

    /// Analyze all images in a directory, one JSON line per file
    Batch {
        /// Input directory
        input_dir: PathBuf,

        /// Write JSON lines here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Number of parallel jobs (default: num_cpus)
        #[arg(long, short)]
        jobs: Option<usize>,

        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct AnalyzerArgs {
    /// Longest side of the working buffer in pixels
    #[arg(
        long,
        env = "CHROMAPROMPT_MAX_DIMENSION",
        default_value_t = 400,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_dimension: u32,

    /// Pixels sampled for the dominant palette
    #[arg(
        long,
        env = "CHROMAPROMPT_PALETTE_SAMPLE_TARGET",
        default_value_t = 10_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    palette_sample_target: u64,

    /// Pixels sampled for brightness, saturation and contrast
    #[arg(
        long,
        env = "CHROMAPROMPT_TONE_SAMPLE_TARGET",
        default_value_t = 40_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tone_sample_target: u64,

    /// Number of dominant colors to report
    #[arg(long, env = "CHROMAPROMPT_PALETTE_SIZE", default_value_t = 5)]
    palette_size: usize,

    /// Ignore EXIF orientation tags
    #[arg(long)]
    no_exif: bool,
}

impl AnalyzerArgs {
    fn to_config(&self) -> AnalyzerConfig {
        AnalyzerConfig::default()
            .with_max_dimension(self.max_dimension)
            .with_palette_sample_target(self.palette_sample_target as usize)
            .with_tone_sample_target(self.tone_sample_target as usize)
            .with_palette_size(self.palette_size)
            .with_exif_orientation(!self.no_exif)
    }
}

/// One line of batch output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRecord<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<&'a AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> BatchRecord<'a> {
    /// Non-UTF-8 paths are written lossily rather than failing the batch.
    fn new(path: &Path, result: &'a anyhow::Result<AnalysisResult>) -> Self {
        let file = path.to_string_lossy().into_owned();
        match result {
            Ok(analysis) => Self {
                file,
                analysis: Some(analysis),
                error: None,
            },
            Err(e) => Self {
                file,
                analysis: None,
                error: Some(format!("{:#}", e)),
            },
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("CHROMAPROMPT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn render_summary(input: &Path, result: &AnalysisResult) -> String {
    let swatches: Vec<String> = result
        .colors
        .dominant_colors
        .iter()
        .map(|c| c.to_string())
        .collect();
    format!(
        "File: {}\n\
         Resolution: {}x{} (aspect {}:1)\n\
         Composition: {}\n\
         Palette: {} [{}]\n\
         Brightness: {}  Saturation: {}  Contrast: {}",
        input.display(),
        result.stats.width,
        result.stats.height,
        result.stats.aspect_ratio,
        result.composition,
        result.colors.palette_type,
        swatches.join(", "),
        result.brightness,
        result.saturation,
        result.contrast,
    )
}

fn analyze_file(analyzer: &ImageAnalyzer, path: &Path) -> anyhow::Result<AnalysisResult> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let result = analyzer
        .analyze(&bytes)
        .with_context(|| format!("failed to analyze {}", path.display()))?;
    Ok(result)
}

fn cmd_analyze(
    input: &Path,
    json: bool,
    pretty: bool,
    config: AnalyzerConfig,
) -> anyhow::Result<()> {
    let analyzer = ImageAnalyzer::new(config);
    let result = analyze_file(&analyzer, input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json && pretty {
        serde_json::to_writer_pretty(&mut out, &result)?;
        writeln!(out)?;
    } else if json {
        serde_json::to_writer(&mut out, &result)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", render_summary(input, &result))?;
    }
    Ok(())
}

fn cmd_batch(
    input_dir: &Path,
    output: Option<&Path>,
    jobs: Option<usize>,
    config: AnalyzerConfig,
) -> anyhow::Result<()> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .with_context(|| format!("failed to read directory {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();

    if images.is_empty() {
        tracing::warn!("no images found in {}", input_dir.display());
        return Ok(());
    }
    tracing::info!(count = images.len(), "analyzing images");

    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }

    let analyzer = ImageAnalyzer::new(config);
    let results: Vec<(PathBuf, anyhow::Result<AnalysisResult>)> = images
        .into_par_iter()
        .map(|path| {
            let result = analyze_file(&analyzer, &path);
            if let Err(e) = &result {
                tracing::error!("{:#}", e);
            }
            (path, result)
        })
        .collect();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut failed = 0usize;
    for (path, result) in &results {
        if result.is_err() {
            failed += 1;
        }
        serde_json::to_writer(&mut writer, &BatchRecord::new(path, result))?;
        writeln!(writer)?;
    }
    writer.flush()?;

    tracing::info!(
        analyzed = results.len() - failed,
        failed,
        "batch complete"
    );
    if failed == results.len() {
        bail!("all {} images failed to analyze", failed);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            input,
            json,
            pretty,
            analyzer,
        } => cmd_analyze(&input, json, pretty, analyzer.to_config()),
        Commands::Batch {
            input_dir,
            output,
            jobs,
            analyzer,
        } => cmd_batch(&input_dir, output.as_deref(), jobs, analyzer.to_config()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromaprompt_core::PixelBuffer;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.JPG")));
        assert!(is_image_file(Path::new("dir/scan.webp")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_analyzer_args_defaults() {
        let cli = Cli::try_parse_from(["chromaprompt", "analyze", "a.png"]).unwrap();
        let Commands::Analyze { analyzer, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(analyzer.to_config(), AnalyzerConfig::default());
    }

    #[test]
    fn test_analyzer_args_map_to_config() {
        let cli = Cli::try_parse_from([
            "chromaprompt",
            "batch",
            "photos",
            "--max-dimension",
            "200",
            "--palette-sample-target",
            "500",
            "--tone-sample-target",
            "2000",
            "--palette-size",
            "3",
            "--no-exif",
        ])
        .unwrap();
        let Commands::Batch { analyzer, .. } = cli.command else {
            panic!("expected batch");
        };
        let config = analyzer.to_config();
        assert_eq!(config.max_dimension, 200);
        assert_eq!(config.palette_sample_target, 500);
        assert_eq!(config.tone_sample_target, 2000);
        assert_eq!(config.palette_size, 3);
        assert!(!config.apply_exif_orientation);

        let args = ["chromaprompt", "analyze", "a.png", "--tone-sample-target", "0"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_max_dimension_must_be_positive() {
        let args = ["chromaprompt", "analyze", "a.png", "--max-dimension", "0"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_render_summary() {
        let pixels = PixelBuffer::new(1, 1, vec![255, 0, 0, 255]).unwrap();
        let result = ImageAnalyzer::default()
            .analyze_pixels(&pixels, 800, 400)
            .unwrap();
        let summary = render_summary(Path::new("red.png"), &result);
        assert_eq!(
            summary,
            "File: red.png\n\
             Resolution: 800x400 (aspect 2.00:1)\n\
             Composition: landscape\n\
             Palette: balanced [#E00000]\n\
             Brightness: low  Saturation: high  Contrast: low"
        );
    }

    #[test]
    fn test_batch_record_omits_missing_fields() {
        let result = Err(anyhow::anyhow!("failed to analyze broken.png"));
        let record = BatchRecord::new(Path::new("broken.png"), &result);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "file": "broken.png", "error": "failed to analyze broken.png" })
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_record_tolerates_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"scan-\xff.png"));
        let result = Err(anyhow::anyhow!("failed to read"));
        let record = BatchRecord::new(path, &result);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("scan-\u{FFFD}.png"));
    }
}
