use clap::{Args, Parser, Subcommand};
use image_studio::animation::{self, AnimationFrameSet, FrameDelay};
use image_studio::codec::{self, CollisionPolicy, FailurePolicy};
use image_studio::config::{self, StudioConfig};
use image_studio::imaging::{
    self, OutputFormat, Quality, ResampleFilter, Resize, ResizeMode, Rotation, Tint,
    TransformConfig,
};
use image_studio::{output, samples};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "image-studio")]
#[command(about = "Transform images, embed folders as Rust modules, assemble GIFs")]
#[command(long_about = "\
Transform images, embed folders as Rust modules, assemble GIFs

Transformations always run in a fixed order, whatever order the flags are
given in:

  resize → rotate → grayscale → contrast → saturation → brightness
         → tint → transparency → blur

Out-of-range values are rejected, never clamped.

Embedding turns a folder of images into a Rust source file:

  assets/icons/
  ├── Logo.png        → \"logo\"
  ├── logo-dark.png   → \"logo_dark\"
  └── 2x/arrow.png    → \"arrow\"   (with --recursive)

  image-studio embed --folder assets/icons --output src/icons.rs
  # then: mod icons;  icons::get_image(\"logo\")

Defaults come from ./image-studio.toml when present (or --config PATH).
Run 'image-studio gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./image-studio.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply transformations to one image and save the result
    Process(ProcessArgs),
    /// Embed a folder of images into a generated Rust module
    Embed(EmbedArgs),
    /// List the images in a generated module
    List {
        /// Generated module file
        module: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write one embedded image from a generated module to a file
    Extract {
        /// Generated module file
        module: PathBuf,
        /// Embedded image name
        #[arg(long)]
        name: String,
        /// Output file; the format follows the extension
        #[arg(long)]
        output: PathBuf,
    },
    /// Assemble frames into an animated GIF
    Animate(AnimateArgs),
    /// Write synthetic sample images
    Sample {
        /// Directory to write into (created if missing)
        #[arg(long, default_value = "samples")]
        output_dir: PathBuf,
        /// Edge length in pixels
        #[arg(long, default_value_t = 256)]
        size: u32,
    },
    /// Print a stock image-studio.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct ProcessArgs {
    /// Source image
    #[arg(long)]
    input: PathBuf,
    /// Destination; the format follows the extension unless --format is given
    #[arg(long)]
    output: PathBuf,
    /// Output format (png, jpeg, gif, bmp, tiff, webp)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// TOML preset with transform settings; flags override it
    #[arg(long)]
    preset: Option<PathBuf>,
    /// Target box in pixels
    #[arg(long, num_args = 2, value_names = ["W", "H"], allow_negative_numbers = true)]
    resize: Option<Vec<i64>>,
    /// exact, fit, fill or pad
    #[arg(long, value_enum)]
    resize_mode: Option<ResizeMode>,
    /// nearest, bilinear, bicubic or lanczos
    #[arg(long, value_enum)]
    filter: Option<ResampleFilter>,
    /// Degrees, counter-clockwise
    #[arg(long, allow_negative_numbers = true)]
    rotate: Option<f32>,
    /// Grow the canvas to fit the rotated image
    #[arg(long)]
    expand: bool,
    #[arg(long)]
    grayscale: bool,
    /// Factor; 1.0 leaves the image unchanged
    #[arg(long, allow_negative_numbers = true)]
    contrast: Option<f32>,
    /// Factor; 0.0 is grayscale, 1.0 unchanged
    #[arg(long, allow_negative_numbers = true)]
    saturation: Option<f32>,
    /// Factor; 1.0 leaves the image unchanged
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<f32>,
    /// Tint color components, 0-255 each
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"], allow_negative_numbers = true)]
    tint_color: Option<Vec<i64>>,
    /// Tint blend, 0.0-1.0 (default 0.5 when --tint-color is given)
    #[arg(long, allow_negative_numbers = true)]
    tint_intensity: Option<f32>,
    /// Alpha multiplier, 0.0-1.0
    #[arg(long, allow_negative_numbers = true)]
    transparency: Option<f32>,
    /// Gaussian blur radius in pixels
    #[arg(long, allow_negative_numbers = true)]
    blur: Option<f32>,
    /// JPEG quality, 1-100
    #[arg(long)]
    quality: Option<u8>,
}

#[derive(Args)]
struct EmbedArgs {
    /// Folder of images to embed
    #[arg(long)]
    folder: PathBuf,
    /// Generated .rs file
    #[arg(long)]
    output: PathBuf,
    /// Module name used in the generated header (default: output file stem)
    #[arg(long)]
    module_name: Option<String>,
    /// Store opaque images as JPEG at this quality (default: lossless PNG)
    #[arg(long)]
    quality: Option<u8>,
    /// Downscale so the longer edge is at most this many pixels
    #[arg(long)]
    max_size: Option<u32>,
    /// Fail on the first unreadable file instead of skipping it
    #[arg(long)]
    strict: bool,
    /// Fail when two files derive the same name
    #[arg(long)]
    reject_collisions: bool,
    /// Include subdirectories
    #[arg(long)]
    recursive: bool,
    /// Rewrite the module even when its content hash is unchanged
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct AnimateArgs {
    /// Frame images, in order
    #[arg(required = true)]
    frames: Vec<PathBuf>,
    /// Output GIF
    #[arg(long)]
    output: PathBuf,
    /// Delay for every frame in milliseconds
    #[arg(long, conflicts_with = "delays")]
    delay: Option<u32>,
    /// Comma-separated per-frame delays in milliseconds
    #[arg(long, value_delimiter = ',')]
    delays: Option<Vec<u32>>,
    /// Total plays; 0 loops forever
    #[arg(long)]
    loops: Option<u16>,
    /// TOML preset applied to every frame
    #[arg(long)]
    preset: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let studio = load_studio_config(cli.config.as_deref())?;
    init_thread_pool(&studio.processing);

    match cli.command {
        Command::Process(args) => run_process(&studio, args)?,
        Command::Embed(args) => run_embed(&studio, args)?,
        Command::List { module, json } => {
            let table = codec::parse_module(&std::fs::read_to_string(&module)?)?;
            if json {
                println!("{}", output::format_image_list_json(&table)?);
            } else {
                output::print_image_list(&table);
            }
        }
        Command::Extract {
            module,
            name,
            output: target,
        } => {
            let table = codec::parse_module(&std::fs::read_to_string(&module)?)?;
            let image = codec::get_image(&table, &name)?;
            let stored = table.entry(&name).map(|e| e.format);
            if stored.is_some() && OutputFormat::from_path(&target) == stored {
                std::fs::write(&target, codec::get_image_bytes(&table, &name)?)?;
            } else {
                imaging::save_image(&image, &target, None, studio.output_quality())?;
            }
            output::print_lines(&output::format_extract_output(&name, &image, &target));
        }
        Command::Animate(args) => run_animate(&studio, args)?,
        Command::Sample { output_dir, size } => {
            let paths = samples::write_samples(&output_dir, size)?;
            output::print_lines(&output::format_sample_output(&output_dir, &paths));
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Explicit `--config` must exist; the implicit file is optional.
fn load_studio_config(path: Option<&Path>) -> Result<StudioConfig, config::ConfigError> {
    match path {
        Some(p) => config::load_config_file(p),
        None => config::load_config(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn run_process(studio: &StudioConfig, args: ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let transform = build_transform(studio, &args)?;
    let quality = match args.quality {
        Some(q) => Quality::new(q)?,
        None => studio.output_quality(),
    };

    let source = imaging::load_image(&args.input)?;
    let result = imaging::apply_transformations(&source, &transform)?;
    let format = imaging::save_image(&result, &args.output, args.format, quality)?;
    output::print_process_output(
        &args.input,
        &source,
        &transform.steps(),
        &args.output,
        &result,
        format,
    );
    Ok(())
}

/// Preset (if any) first, then every flag that was given on top.
fn build_transform(
    studio: &StudioConfig,
    args: &ProcessArgs,
) -> Result<TransformConfig, Box<dyn std::error::Error>> {
    let mut transform = match &args.preset {
        Some(path) => TransformConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => TransformConfig::default(),
    };

    if let Some(dims) = &args.resize {
        transform.resize = Some(
            Resize::from_components(dims[0], dims[1])?
                .with_mode(studio.resize.mode)
                .with_filter(studio.resize.filter),
        );
    }
    if let Some(resize) = transform.resize.as_mut() {
        if let Some(mode) = args.resize_mode {
            resize.mode = mode;
        }
        if let Some(filter) = args.filter {
            resize.filter = filter;
        }
    }
    if let Some(degrees) = args.rotate {
        transform.rotate = Some(Rotation::new(degrees, args.expand));
    } else if let Some(rotation) = transform.rotate.as_mut() {
        rotation.expand |= args.expand;
    }
    transform.grayscale |= args.grayscale;
    transform.contrast = args.contrast.or(transform.contrast);
    transform.saturation = args.saturation.or(transform.saturation);
    transform.brightness = args.brightness.or(transform.brightness);
    if let Some(components) = &args.tint_color {
        let intensity = args.tint_intensity.unwrap_or(0.5);
        transform.tint = Some(Tint::from_components(components, intensity)?);
    } else if let Some(intensity) = args.tint_intensity {
        match transform.tint.as_mut() {
            Some(tint) => tint.intensity = intensity,
            None => return Err("--tint-intensity needs --tint-color".into()),
        }
    }
    transform.transparency = args.transparency.or(transform.transparency);
    transform.blur = args.blur.or(transform.blur);

    transform.validate()?;
    Ok(transform)
}

fn run_embed(studio: &StudioConfig, args: EmbedArgs) -> Result<(), Box<dyn std::error::Error>> {
    let module_name = match &args.module_name {
        Some(name) => name.clone(),
        None => args
            .output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    if !codec::is_valid_identifier(&module_name) {
        return Err(format!(
            "'{module_name}' is not a valid module name; pass --module-name"
        )
        .into());
    }

    let mut options = studio.encode_options();
    if let Some(q) = args.quality {
        options.quality = Some(Quality::new(q)?);
    }
    if args.max_size.is_some() {
        options.max_size = args.max_size;
    }
    if args.strict {
        options.on_error = FailurePolicy::Strict;
    }
    if args.reject_collisions {
        options.collisions = CollisionPolicy::Reject;
    }
    options.recursive |= args.recursive;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_encode_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = codec::encode_folder(&args.folder, &options, None, Some(tx));
    printer.join().unwrap();
    let report = result?;

    let unchanged = !args.force && existing_hash(&args.output) == Some(report.table.content_hash());
    if !unchanged {
        let text = codec::generate_module(&report.table, &module_name)?;
        if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&args.output, text)?;
    }
    output::print_embed_summary(&report, &args.output, !unchanged);
    Ok(())
}

/// Content hash of a previously generated module, if there is a readable one.
fn existing_hash(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    match codec::parse_module(&text) {
        Ok(table) => Some(table.content_hash()),
        Err(e) => {
            log::debug!("not reusing {}: {e}", path.display());
            None
        }
    }
}

fn run_animate(studio: &StudioConfig, args: AnimateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let images = args
        .frames
        .par_iter()
        .map(|path| imaging::load_image(path))
        .collect::<Result<Vec<_>, _>>()?;

    let delay = match (args.delays, args.delay) {
        (Some(delays), _) => FrameDelay::PerFrame(delays),
        (None, Some(ms)) => FrameDelay::Uniform(ms),
        (None, None) => studio.frame_delay(),
    };
    let mut set = AnimationFrameSet::new(images, delay)?;
    if let Some(path) = &args.preset {
        let preset = TransformConfig::from_toml_str(&std::fs::read_to_string(path)?)?;
        set = set.transform(&preset)?;
    }

    let repeat = match args.loops {
        Some(n) => animation::Repeat::from_loops(n),
        None => studio.repeat(),
    };
    let bytes = animation::encode_gif(&set, repeat)?;
    std::fs::write(&args.output, &bytes)?;
    output::print_lines(&output::format_animation_output(
        &set,
        repeat,
        &args.output,
        bytes.len(),
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use image_studio::{ColorMode, Error, RasterImage};
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("image-studio").chain(args.iter().copied())).unwrap()
    }

    fn process_args(args: &[&str]) -> ProcessArgs {
        let mut full = vec!["process", "--input", "in.png", "--output", "out.png"];
        full.extend_from_slice(args);
        match parse(&full).command {
            Command::Process(a) => a,
            _ => panic!("expected process"),
        }
    }

    fn embed_args(folder: &Path, output: &Path, extra: &[&str]) -> EmbedArgs {
        let (folder, output) = (folder.to_str().unwrap(), output.to_str().unwrap());
        let mut full = vec!["embed", "--folder", folder, "--output", output];
        full.extend_from_slice(extra);
        match parse(&full).command {
            Command::Embed(a) => a,
            _ => panic!("expected embed"),
        }
    }

    fn write_png(path: &Path, pixel: &[u8]) {
        let img = RasterImage::filled(4, 3, ColorMode::Rgb, pixel).unwrap();
        imaging::save_image(&img, path, None, Quality::default()).unwrap();
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    // =========================================================================
    // Flag parsing
    // =========================================================================

    #[test]
    fn enum_flags_use_lowercase_names() {
        let args = process_args(&[
            "--resize", "8", "8", "--resize-mode", "pad", "--filter", "nearest", "--format", "webp",
        ]);
        assert_eq!(args.resize_mode, Some(ResizeMode::Pad));
        assert_eq!(args.filter, Some(ResampleFilter::Nearest));
        assert_eq!(args.format, Some(OutputFormat::WebP));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        for bad in [["--format", "avif"], ["--resize-mode", "stretch"], ["--filter", "cubic"]] {
            let mut full = vec!["process", "--input", "a.png", "--output", "b.png"];
            full.extend_from_slice(&bad);
            assert!(Cli::try_parse_from(std::iter::once("image-studio").chain(full)).is_err());
        }
    }

    #[test]
    fn negative_resize_is_a_validation_error() {
        let args = process_args(&["--resize", "10", "-5"]);
        let err = build_transform(&StudioConfig::default(), &args).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
    }

    #[test]
    fn resize_uses_config_defaults_and_flag_overrides() {
        let mut studio = StudioConfig::default();
        studio.resize.mode = ResizeMode::Fit;
        studio.resize.filter = ResampleFilter::Bilinear;

        let plain = build_transform(&studio, &process_args(&["--resize", "8", "6"])).unwrap();
        let resize = plain.resize.unwrap();
        assert_eq!((resize.mode, resize.filter), (ResizeMode::Fit, ResampleFilter::Bilinear));

        let args = process_args(&["--resize", "8", "6", "--resize-mode", "fill"]);
        let resize = build_transform(&studio, &args).unwrap().resize.unwrap();
        assert_eq!((resize.mode, resize.filter), (ResizeMode::Fill, ResampleFilter::Bilinear));
    }

    #[test]
    fn flags_override_preset_values() {
        let tmp = TempDir::new().unwrap();
        let preset = tmp.path().join("soft.toml");
        std::fs::write(&preset, "grayscale = true\nblur = 2.0\n\n[tint]\ncolor = [10, 20, 30]\nintensity = 0.3\n").unwrap();

        let args = process_args(&[
            "--preset",
            preset.to_str().unwrap(),
            "--blur",
            "1.0",
            "--tint-intensity",
            "0.9",
        ]);
        let transform = build_transform(&StudioConfig::default(), &args).unwrap();
        assert!(transform.grayscale);
        assert_eq!(transform.blur, Some(1.0));
        assert_eq!(transform.tint, Some(Tint::new([10, 20, 30], 0.9)));
    }

    #[test]
    fn tint_color_defaults_to_half_intensity() {
        let args = process_args(&["--tint-color", "255", "0", "0"]);
        let transform = build_transform(&StudioConfig::default(), &args).unwrap();
        assert_eq!(transform.tint, Some(Tint::new([255, 0, 0], 0.5)));
    }

    #[test]
    fn tint_intensity_alone_is_rejected() {
        let args = process_args(&["--tint-intensity", "0.4"]);
        assert!(build_transform(&StudioConfig::default(), &args).is_err());
    }

    #[test]
    fn out_of_range_tint_component_is_rejected() {
        let args = process_args(&["--tint-color", "0", "256", "0"]);
        assert!(build_transform(&StudioConfig::default(), &args).is_err());
    }

    #[test]
    fn animate_delay_flags_conflict() {
        let result = Cli::try_parse_from([
            "image-studio", "animate", "a.png", "--output", "a.gif", "--delay", "10", "--delays", "10,20",
        ]);
        assert!(result.is_err());
    }

    // =========================================================================
    // Commands
    // =========================================================================

    #[test]
    fn process_writes_transformed_image() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.png");
        let output = tmp.path().join("out.bmp");
        write_png(&input, &[200, 30, 60]);

        let args = process_args(&["--grayscale"]);
        let args = ProcessArgs { input: input.clone(), output: output.clone(), ..args };
        run_process(&StudioConfig::default(), args).unwrap();

        let result = imaging::load_image(&output).unwrap();
        assert_eq!(result.dimensions(), (4, 3));
        let px = result.pixel(0, 0);
        assert!(px[0] == px[1] && px[1] == px[2]);
    }

    #[test]
    fn embed_skips_unchanged_module_unless_forced() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("icons");
        std::fs::create_dir(&folder).unwrap();
        write_png(&folder.join("dot.png"), &[1, 2, 3]);
        let module = tmp.path().join("src").join("icons.rs");

        run_embed(&StudioConfig::default(), embed_args(&folder, &module, &[])).unwrap();
        let first = std::fs::read_to_string(&module).unwrap();
        let table = codec::parse_module(&first).unwrap();
        assert_eq!(codec::list_images(&table), vec!["dot"]);

        // Rewrite only the timestamp; the content hash still matches.
        let marked = first.replace(&table.generated_at, "2000-01-01T00:00:00Z");
        std::fs::write(&module, &marked).unwrap();
        run_embed(&StudioConfig::default(), embed_args(&folder, &module, &[])).unwrap();
        assert_eq!(std::fs::read_to_string(&module).unwrap(), marked);

        run_embed(&StudioConfig::default(), embed_args(&folder, &module, &["--force"])).unwrap();
        assert!(!std::fs::read_to_string(&module).unwrap().contains("2000-01-01"));
    }

    #[test]
    fn embed_rejects_invalid_module_name() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("my-icons.rs");
        let result = run_embed(&StudioConfig::default(), embed_args(tmp.path(), &module, &[]));
        assert!(result.is_err());
        assert!(!module.exists());
    }
}
