use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "garment-studio", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document to a PNG at an explicit size.
    Render(RenderArgs),
    /// Export a document at a fixed upscale of its container size.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// Directory that library asset paths are relative to.
    #[arg(long)]
    assets: PathBuf,

    /// Output width in pixels.
    #[arg(long)]
    width: u32,

    /// Output height in pixels.
    #[arg(long)]
    height: u32,

    /// Output pixels per CSS pixel.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Register a font as FAMILY=path. The first one is also the fallback family.
    #[arg(long = "font", value_parser = parse_font_arg)]
    fonts: Vec<(String, PathBuf)>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// Directory that library asset paths are relative to.
    #[arg(long)]
    assets: PathBuf,

    /// On-screen container size as WxH, in CSS pixels.
    #[arg(long, value_parser = parse_container)]
    container: (f64, f64),

    /// Export upscale factor (2..=4).
    #[arg(long, default_value_t = garment_studio::export::adapter::DEFAULT_EXPORT_SCALE)]
    scale: u32,

    /// Directory receiving `custom-<ms>.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Also write the upload payload as `upload-<ms>.png`.
    #[arg(long)]
    upload_copy: bool,

    /// Register a font as FAMILY=path. The first one is also the fallback family.
    #[arg(long = "font", value_parser = parse_font_arg)]
    fonts: Vec<(String, PathBuf)>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_font_arg(s: &str) -> Result<(String, PathBuf), String> {
    let (family, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FAMILY=path, got '{s}'"))?;
    if family.trim().is_empty() || path.is_empty() {
        return Err(format!("expected FAMILY=path, got '{s}'"));
    }
    Ok((family.trim().to_string(), PathBuf::from(path)))
}

fn parse_container(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width in '{s}'"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height in '{s}'"))?;
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("container must be positive, got '{s}'"));
    }
    Ok((w, h))
}

fn read_doc_json(path: &Path) -> anyhow::Result<garment_studio::Document> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    garment_studio::Document::from_json_str(&s).context("parse document JSON")
}

fn make_source(
    assets: &Path,
    fonts: &[(String, PathBuf)],
) -> anyhow::Result<garment_studio::FsAssetSource> {
    let mut book = garment_studio::FontBook::new();
    for (family, path) in fonts {
        book.register_file(family, path)?;
    }
    if let Some((first, _)) = fonts.first() {
        book = book.with_fallback_family(first);
    }
    Ok(garment_studio::FsAssetSource::new(assets).with_fonts(book))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_doc_json(&args.doc)?;
    let source = make_source(&args.assets, &args.fonts)?;

    let raster = garment_studio::render(&doc, args.width, args.height, args.scale, &source)?;

    ensure_parent(&args.out)?;
    let img = raster.to_rgba_image()?;
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let doc = read_doc_json(&args.doc)?;
    let source = make_source(&args.assets, &args.fonts)?;
    let opts = garment_studio::ExportOpts::default().with_scale(args.scale);
    let container = garment_studio::Size::new(args.container.0, args.container.1);

    let raster = garment_studio::export_image(&doc, container, &opts, &source)?;

    let filename = garment_studio::download_filename(SystemTime::now());
    let mut saver = garment_studio::DirectorySaver::new(&args.out_dir);
    garment_studio::download_local(&raster, &filename, &mut saver)?;
    eprintln!("wrote {}", args.out_dir.join(&filename).display());

    if args.upload_copy {
        let upload = garment_studio::prepare_for_upload(&raster, &filename)?;
        let path = args
            .out_dir
            .join(filename.replacen("custom-", "upload-", 1));
        std::fs::write(&path, &upload.bytes)
            .with_context(|| format!("write upload payload '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
