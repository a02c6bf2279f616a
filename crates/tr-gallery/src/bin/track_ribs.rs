use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{DynamicImage, GrayImage, Rgb};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use track_ribs::{
    Connectivity, ContourMethod, HsvBounds, Image, MaskMethod, MorphStep, PipelineConfig,
    RayMaskSource, RibSegment, SamplingMode, SkeletonChains, SquareKernel, ZhangSuen,
    build_masks, extract_centerline, load_image, run_pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "track_ribs")]
#[command(about = "Extract track cross-sections (ribs) from a top-down track image")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Threshold the image and clean the mask.
    #[command(name = "mask")]
    Mask(CommonArgs),
    /// Mask, clean and skeletonize.
    #[command(name = "skeleton")]
    Skeleton(CommonArgs),
    /// Full pipeline: skeleton, centerline, ribs and overlay.
    #[command(name = "ribs")]
    Ribs(RibArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// JSON pipeline configuration; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Gray threshold for the inverted binary mask.
    #[arg(long)]
    threshold: Option<u8>,
}

#[derive(Args, Debug, Clone)]
struct RibArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    interval: Option<usize>,
    #[arg(long)]
    max_length: Option<f64>,
    #[arg(long)]
    tangent_window: Option<usize>,
    #[arg(long, value_enum)]
    sampling: Option<SamplingArg>,
    #[arg(long, value_enum)]
    contour: Option<ContourArg>,
    #[arg(long, value_enum)]
    ray_mask: Option<RayMaskArg>,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum SamplingArg {
    Index,
    ArcLength,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ContourArg {
    Border,
    Chains,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum RayMaskArg {
    Raw,
    Cleaned,
}

impl From<SamplingArg> for SamplingMode {
    fn from(arg: SamplingArg) -> Self {
        match arg {
            SamplingArg::Index => Self::Index,
            SamplingArg::ArcLength => Self::ArcLength,
        }
    }
}

impl From<RayMaskArg> for RayMaskSource {
    fn from(arg: RayMaskArg) -> Self {
        match arg {
            RayMaskArg::Raw => Self::Raw,
            RayMaskArg::Cleaned => Self::Cleaned,
        }
    }
}

/// On-disk configuration. Every field is optional; missing fields keep the
/// library defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    mask: Option<MaskDto>,
    cleanup: Option<CleanupDto>,
    skeleton: Option<SkeletonDto>,
    contour: Option<ContourDto>,
    ribs: Option<RibsDto>,
    ray_mask: Option<RayMaskArg>,
    color: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case", deny_unknown_fields)]
enum MaskDto {
    GrayThresholdInv {
        #[serde(default)]
        threshold: Option<u8>,
    },
    HsvRange {
        #[serde(default)]
        lower: Option<[u8; 3]>,
        #[serde(default)]
        upper: Option<[u8; 3]>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct MorphStepDto {
    kernel: usize,
    iterations: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CleanupDto {
    close: Option<MorphStepDto>,
    open: Option<MorphStepDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SkeletonDto {
    smooth_sigma: Option<f32>,
    min_object_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case", deny_unknown_fields)]
enum ContourDto {
    Border,
    Chains {
        #[serde(default)]
        connectivity: Option<ConnectivityDto>,
        #[serde(default)]
        min_component_size: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ConnectivityDto {
    C4,
    C8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RibsDto {
    interval: Option<usize>,
    max_length: Option<f64>,
    tangent_window: Option<usize>,
    sampling: Option<SamplingArg>,
}

#[derive(Debug, Clone, Serialize)]
struct RibDto {
    index: usize,
    origin: [i32; 2],
    angle: f64,
    neg: [i32; 2],
    pos: [i32; 2],
    length: f64,
    neg_stop: &'static str,
    pos_stop: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct RibsFile {
    width: usize,
    height: usize,
    centerline_points: usize,
    ribs: Vec<RibDto>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaMask {
    mask_method: String,
    cleanup: String,
    raw_pixels: usize,
    cleaned_pixels: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSkeleton {
    skeletonizer: &'static str,
    smooth_sigma: Option<f32>,
    min_object_size: usize,
    skeleton_pixels: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaRibs {
    mask_method: String,
    contour_method: String,
    ray_mask: &'static str,
    interval: usize,
    max_length: f64,
    tangent_window: usize,
    sampling: &'static str,
    contour_count: usize,
    centerline_points: usize,
    rib_count: usize,
    truncated: usize,
    min_length: Option<f64>,
    mean_length: Option<f64>,
    max_length_observed: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Mask(args) => run_mask(args),
        Command::Skeleton(args) => run_skeleton(args),
        Command::Ribs(args) => run_ribs(args),
    }
}

fn run_mask(args: CommonArgs) -> Result<()> {
    let cfg = resolve_config(&args, None)?;
    let (out_dir, img) = prepare_run(&args)?;

    let masks = build_masks(&img, &cfg).context("building mask")?;
    info!(
        "mask: {} track pixels, {} after cleanup",
        masks.raw.count_set(),
        masks.cleaned.count_set()
    );

    save_u8_image(out_dir.join("mask.png"), &masks.raw)?;
    save_u8_image(out_dir.join("cleaned.png"), &masks.cleaned)?;
    write_json(
        out_dir.join("meta.json"),
        &MetaMask {
            mask_method: format!("{:?}", cfg.mask),
            cleanup: format!("{:?}", cfg.cleanup),
            raw_pixels: masks.raw.count_set(),
            cleaned_pixels: masks.cleaned.count_set(),
        },
    )
}

fn run_skeleton(args: CommonArgs) -> Result<()> {
    let cfg = resolve_config(&args, None)?;
    let (out_dir, img) = prepare_run(&args)?;

    let masks = build_masks(&img, &cfg).context("building mask")?;
    let skeleton = extract_centerline(&masks.cleaned.as_view(), &ZhangSuen, &cfg.skeleton);
    info!("skeleton: {} pixels", skeleton.count_set());

    save_u8_image(out_dir.join("skeleton.png"), &skeleton)?;
    write_json(
        out_dir.join("meta.json"),
        &MetaSkeleton {
            skeletonizer: "zhang-suen",
            smooth_sigma: cfg.skeleton.smooth_sigma,
            min_object_size: cfg.skeleton.min_object_size,
            skeleton_pixels: skeleton.count_set(),
        },
    )
}

fn run_ribs(args: RibArgs) -> Result<()> {
    let cfg = resolve_config(&args.common, Some(&args))?;
    let (out_dir, img) = prepare_run(&args.common)?;

    let out = run_pipeline(&img, &cfg).context("running rib pipeline")?;
    info!(
        "ribs: {} contours, centerline {} points, {} ribs",
        out.contour_count,
        out.centerline_len,
        out.ribs.len()
    );
    if out.ribs.is_empty() {
        warn!("no ribs extracted; overlay equals the input image");
    }

    save_u8_image(out_dir.join("skeleton.png"), &out.skeleton)?;
    out.overlay
        .save(out_dir.join("ribs.png"))
        .context("writing ribs.png overlay")?;

    write_json(
        out_dir.join("ribs.json"),
        &RibsFile {
            width: out.mask.width(),
            height: out.mask.height(),
            centerline_points: out.centerline_len,
            ribs: out.ribs.iter().map(rib_dto).collect(),
        },
    )?;

    write_json(
        out_dir.join("meta.json"),
        &MetaRibs {
            mask_method: format!("{:?}", cfg.mask),
            contour_method: format!("{:?}", cfg.contour),
            ray_mask: match cfg.ray_mask {
                RayMaskSource::Raw => "raw",
                RayMaskSource::Cleaned => "cleaned",
            },
            interval: cfg.ribs.interval,
            max_length: cfg.ribs.max_length,
            tangent_window: cfg.ribs.tangent_window,
            sampling: match cfg.ribs.sampling {
                SamplingMode::Index => "index",
                SamplingMode::ArcLength => "arc-length",
            },
            contour_count: out.contour_count,
            centerline_points: out.centerline_len,
            rib_count: out.stats.count,
            truncated: out.stats.truncated,
            min_length: out.stats.min_length,
            mean_length: out.stats.mean_length,
            max_length_observed: out.stats.max_length,
        },
    )?;

    info!("wrote artifacts to {}", out_dir.display());
    Ok(())
}

fn rib_dto(rib: &RibSegment) -> RibDto {
    RibDto {
        index: rib.sample_index,
        origin: [rib.origin.x, rib.origin.y],
        angle: rib.angle,
        neg: [rib.neg.x, rib.neg.y],
        pos: [rib.pos.x, rib.pos.y],
        length: rib.length(),
        neg_stop: rib.neg_stop.as_str(),
        pos_stop: rib.pos_stop.as_str(),
    }
}

fn resolve_config(common: &CommonArgs, ribs: Option<&RibArgs>) -> Result<PipelineConfig> {
    let file = match &common.config {
        Some(path) => {
            ensure_file_exists(path, "config")?;
            Some(read_json::<ConfigFile>(path)?)
        }
        None => None,
    };
    merge_config(file, common, ribs)
}

/// Defaults, then the config file, then command-line flags.
fn merge_config(
    file: Option<ConfigFile>,
    common: &CommonArgs,
    ribs: Option<&RibArgs>,
) -> Result<PipelineConfig> {
    let mut cfg = PipelineConfig::default();
    if let Some(file) = file {
        apply_config_file(&mut cfg, file)?;
    }

    if let Some(threshold) = common.threshold {
        cfg.mask = MaskMethod::GrayThresholdInv { threshold };
    }

    if let Some(args) = ribs {
        if let Some(v) = args.interval {
            cfg.ribs.interval = v;
        }
        if let Some(v) = args.max_length {
            cfg.ribs.max_length = v;
        }
        if let Some(v) = args.tangent_window {
            cfg.ribs.tangent_window = v;
        }
        if let Some(v) = args.sampling {
            cfg.ribs.sampling = v.into();
        }
        if let Some(v) = args.ray_mask {
            cfg.ray_mask = v.into();
        }
        if let Some(v) = args.contour {
            cfg.contour = match v {
                ContourArg::Border => ContourMethod::BorderFollowing,
                ContourArg::Chains => ContourMethod::SkeletonChains(SkeletonChains::default()),
            };
        }
    }

    if cfg.ribs.max_length.is_nan() || cfg.ribs.max_length < 0.0 {
        bail!("max_length must be a non-negative number, got {}", cfg.ribs.max_length);
    }
    Ok(cfg)
}

fn apply_config_file(cfg: &mut PipelineConfig, file: ConfigFile) -> Result<()> {
    if let Some(mask) = file.mask {
        cfg.mask = match mask {
            MaskDto::GrayThresholdInv { threshold } => MaskMethod::GrayThresholdInv {
                threshold: threshold.unwrap_or(127),
            },
            MaskDto::HsvRange { lower, upper } => {
                let defaults = HsvBounds::default();
                let bounds = HsvBounds {
                    lower: lower.unwrap_or(defaults.lower),
                    upper: upper.unwrap_or(defaults.upper),
                };
                if bounds.lower[0] > 180 || bounds.upper[0] > 180 {
                    bail!("hsv hue bounds must be in [0, 180]");
                }
                MaskMethod::HsvRange(bounds)
            }
        };
    }

    if let Some(cleanup) = file.cleanup {
        let step = |s: MorphStepDto| MorphStep {
            kernel: SquareKernel::new(s.kernel),
            iterations: s.iterations,
        };
        if let Some(close) = cleanup.close {
            cfg.cleanup.close = Some(step(close));
        }
        if let Some(open) = cleanup.open {
            cfg.cleanup.open = Some(step(open));
        }
    }

    if let Some(skeleton) = file.skeleton {
        if skeleton.smooth_sigma.is_some() {
            cfg.skeleton.smooth_sigma = skeleton.smooth_sigma;
        }
        if let Some(v) = skeleton.min_object_size {
            cfg.skeleton.min_object_size = v;
        }
    }

    if let Some(contour) = file.contour {
        cfg.contour = match contour {
            ContourDto::Border => ContourMethod::BorderFollowing,
            ContourDto::Chains {
                connectivity,
                min_component_size,
            } => {
                let defaults = SkeletonChains::default();
                ContourMethod::SkeletonChains(SkeletonChains {
                    connectivity: match connectivity {
                        Some(ConnectivityDto::C4) => Connectivity::C4,
                        Some(ConnectivityDto::C8) => Connectivity::C8,
                        None => defaults.connectivity,
                    },
                    min_component_size: min_component_size
                        .unwrap_or(defaults.min_component_size),
                })
            }
        };
    }

    if let Some(ribs) = file.ribs {
        if let Some(v) = ribs.interval {
            cfg.ribs.interval = v;
        }
        if let Some(v) = ribs.max_length {
            cfg.ribs.max_length = v;
        }
        if let Some(v) = ribs.tangent_window {
            cfg.ribs.tangent_window = v;
        }
        if let Some(v) = ribs.sampling {
            cfg.ribs.sampling = v.into();
        }
    }

    if let Some(v) = file.ray_mask {
        cfg.ray_mask = v.into();
    }
    if let Some(c) = file.color {
        cfg.color = Rgb(c);
    }
    Ok(())
}

fn prepare_run(common: &CommonArgs) -> Result<(PathBuf, DynamicImage)> {
    ensure_file_exists(&common.input, "input")?;
    let img = load_image(&common.input)
        .with_context(|| format!("loading input image {}", common.input.display()))?;
    info!(
        "loaded {} ({}x{})",
        common.input.display(),
        img.width(),
        img.height()
    );

    fs::create_dir_all(&common.out)
        .with_context(|| format!("creating output directory {}", common.out.display()))?;
    Ok((common.out.clone(), img))
}

fn save_u8_image(path: PathBuf, img: &Image<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
