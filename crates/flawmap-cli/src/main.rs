//! flawmap CLI — command-line front-end for intensity-band defect analysis.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use flawmap::{
    apply_lut, build_lookup_table, grayscale_table, AnalysisConfig, AnalysisInput, Analyzer,
    BandColor, DefectRecord, DomainSet, IntensityDomain, ProgressEvent, Resolution, RoiRect,
    SourceImage,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "flawmap")]
#[command(about = "Flag suspect intensity bands in grayscale NDT images and extract defect candidates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write a defect report.
    Analyze(AnalyzeArgs),

    /// Render the false-color band preview only.
    Preview(PreviewArgs),

    /// Print the binned intensity histogram (JSON).
    Histogram(HistogramArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorArg {
    Black,
    Red,
    Green,
    Gray,
}

impl From<ColorArg> for BandColor {
    fn from(c: ColorArg) -> Self {
        match c {
            ColorArg::Black => BandColor::Black,
            ColorArg::Red => BandColor::Red,
            ColorArg::Green => BandColor::Green,
            ColorArg::Gray => BandColor::Gray,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct BandArgs {
    /// Interior band boundary on the 0-255 intensity axis (repeatable).
    #[arg(long = "boundary")]
    boundaries: Vec<f64>,

    /// 0-based index of a band to flag as suspect (repeatable).
    #[arg(long = "flag")]
    flags: Vec<usize>,

    /// Display color per band, in band order (repeatable). Bands without an
    /// explicit color render red when flagged, gray otherwise.
    #[arg(long = "color", value_enum)]
    colors: Vec<ColorArg>,
}

impl BandArgs {
    fn to_domain_set(&self) -> CliResult<DomainSet> {
        let mut set = DomainSet::full_byte_range();
        let mut sorted = self.boundaries.clone();
        sorted.sort_by(f64::total_cmp);
        for &b in &sorted {
            set.insert_boundary(b)?;
        }
        for &idx in &self.flags {
            set.set_flag(idx, true)?;
        }
        Ok(set)
    }

    fn color_of(&self, domain: &IntensityDomain) -> BandColor {
        match self.colors.get(domain.index - 1) {
            Some(&c) => c.into(),
            None if domain.flagged => BandColor::Red,
            None => BandColor::Gray,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct AnalyzeArgs {
    /// Path to the input image (decoded as 8-bit grayscale).
    #[arg(long)]
    image: PathBuf,

    /// Path to write the defect report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Optional path to write the annotated preview (PNG).
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Annotate over the plain grayscale image instead of the false-color
    /// band preview.
    #[arg(long)]
    gray_base: bool,

    #[command(flatten)]
    bands: BandArgs,

    /// Region of interest as "x,y,width,height" (repeatable).
    #[arg(long = "roi")]
    rois: Vec<String>,

    /// Median smoothing window (positive odd integer).
    #[arg(long, default_value = "5")]
    smooth_kernel: u32,

    /// Morphological closing element size.
    #[arg(long, default_value = "11")]
    close_kernel: u32,

    /// Minimum region area in pixels.
    #[arg(long, default_value = "10")]
    min_area: u64,

    /// Pixel area strictly above which a defect is critical.
    #[arg(long, default_value = "500")]
    severity_threshold: u64,

    /// Physical units per pixel along x.
    #[arg(long, default_value = "1.0")]
    res_x: f64,

    /// Physical units per pixel along y.
    #[arg(long, default_value = "1.0")]
    res_y: f64,
}

#[derive(Debug, Clone, Args)]
struct PreviewArgs {
    /// Path to the input image (decoded as 8-bit grayscale).
    #[arg(long)]
    image: PathBuf,

    /// Path to write the false-color preview (PNG).
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    bands: BandArgs,
}

#[derive(Debug, Clone, Args)]
struct HistogramArgs {
    /// Path to the input image (decoded as 8-bit grayscale).
    #[arg(long)]
    image: PathBuf,

    /// Number of histogram bins.
    #[arg(long, default_value = "100")]
    bins: usize,

    /// Path to write the histogram (JSON); stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Defect report written by `analyze`.
#[derive(serde::Serialize)]
struct Report<'a> {
    image: String,
    image_size: [u32; 2],
    defects: &'a [DefectRecord],
    total_area: u64,
    total_area_physical: f64,
}

fn parse_roi(spec: &str, frame_w: u32, frame_h: u32) -> CliResult<RoiRect> {
    let parts: Vec<i64> = spec
        .split(',')
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid ROI '{spec}': {e}"))?;
    let [x, y, w, h] = parts[..] else {
        return Err(format!("invalid ROI '{spec}': expected x,y,width,height").into());
    };
    RoiRect::clamped(x, y, w, h, frame_w, frame_h)
        .ok_or_else(|| format!("ROI '{spec}' is empty after clamping to the frame").into())
}

fn load_gray(path: &PathBuf) -> CliResult<image::GrayImage> {
    tracing::info!("Loading image: {}", path.display());
    let gray = image::open(path)?.to_luma8();
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}", w, h);
    Ok(gray)
}

fn cmd_analyze(args: &AnalyzeArgs) -> CliResult<()> {
    let gray = load_gray(&args.image)?;
    let (w, h) = gray.dimensions();

    let domains = args.bands.to_domain_set()?;
    if domains.flagged().next().is_none() {
        tracing::warn!("no band flagged; the defect list will be empty");
    }
    let rois = args
        .rois
        .iter()
        .map(|spec| parse_roi(spec, w, h))
        .collect::<CliResult<Vec<_>>>()?;

    let table = if args.gray_base {
        grayscale_table()
    } else {
        build_lookup_table(&domains, |d| args.bands.color_of(d))
    };
    let base = apply_lut(&gray, &table);

    let analyzer = Analyzer::new(AnalysisConfig {
        smooth_kernel: args.smooth_kernel,
        close_kernel: args.close_kernel,
        min_area: args.min_area,
        severity_threshold: args.severity_threshold,
    });
    let input = AnalysisInput {
        gray,
        base,
        domains,
        rois,
        resolution: Resolution {
            x: args.res_x,
            y: args.res_y,
        },
    };

    let sink = |event: ProgressEvent| tracing::info!("[{:3}%] {}", event.percent, event.status);
    let result = analyzer.analyze(&input, &sink)?;

    let report = Report {
        image: args.image.display().to_string(),
        image_size: [w, h],
        defects: &result.defects,
        total_area: result.total_area,
        total_area_physical: result.total_area_physical,
    };
    let file = std::fs::File::create(&args.out)?;
    serde_json::to_writer_pretty(file, &report)?;
    tracing::info!(
        "Found {} defects (total area {} px); report written to {}",
        result.defects.len(),
        result.total_area,
        args.out.display()
    );

    if let Some(path) = &args.annotated {
        result.annotated.save(path)?;
        tracing::info!("Annotated image written to {}", path.display());
    }
    Ok(())
}

fn cmd_preview(args: &PreviewArgs) -> CliResult<()> {
    let gray = load_gray(&args.image)?;
    let domains = args.bands.to_domain_set()?;
    let table = build_lookup_table(&domains, |d| args.bands.color_of(d));
    let preview = apply_lut(&gray, &table);
    preview.save(&args.out)?;
    tracing::info!("Preview written to {}", args.out.display());
    Ok(())
}

fn cmd_histogram(args: &HistogramArgs) -> CliResult<()> {
    let gray = load_gray(&args.image)?;
    let source = SourceImage::from_gray(&gray, Resolution::default());
    let bins = source.histogram_bins(args.bins);
    let json = serde_json::to_string_pretty(&bins)?;
    match &args.out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Analyze(args) => cmd_analyze(args),
        Commands::Preview(args) => cmd_preview(args),
        Commands::Histogram(args) => cmd_histogram(args),
    }
}
