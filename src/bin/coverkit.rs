use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "coverkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a design document and export it as PNG.
    Export(ExportArgs),
    /// Write a starter design document.
    Init(InitArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input design JSON. Image paths inside it are resolved relative to this file.
    #[arg(long = "in", visible_alias = "design")]
    in_path: PathBuf,

    /// Output PNG path, or a directory to receive `cover-design.png`.
    /// Defaults to the design's directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Override the export pixel ratio.
    #[arg(long)]
    pixel_ratio: Option<f64>,

    /// Print a `data:image/png;base64,...` URI to stdout instead of writing a file.
    #[arg(long)]
    data_uri: bool,
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Where to write the design JSON.
    #[arg(long)]
    out: PathBuf,

    /// Replace an existing file.
    #[arg(long)]
    force: bool,

    /// Start from the 300x600 phone-case preset with camera-lens guides.
    #[arg(long)]
    phone_camera: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Init(args) => cmd_init(args),
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut doc = coverkit::DesignDocument::load(&args.in_path)
        .with_context(|| format!("load design '{}'", args.in_path.display()))?;
    if let Some(ratio) = args.pixel_ratio {
        doc.config.pixel_ratio = ratio;
    }

    let assets_root = match args.in_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let session = doc
        .build_session(assets_root)
        .with_context(|| "build editor session")?;

    let export = coverkit::export(&session).with_context(|| "export design")?;

    if args.data_uri {
        println!("{}", export.to_data_uri());
        return Ok(());
    }

    let dest = args.out.unwrap_or_else(|| assets_root.to_path_buf());
    let written = export.write_to(&dest)?;
    eprintln!(
        "wrote {} ({}x{})",
        written.display(),
        export.width,
        export.height
    );
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "'{}' already exists (pass --force to overwrite)",
            args.out.display()
        );
    }
    coverkit::ensure_parent_dir(&args.out)?;
    let config = if args.phone_camera {
        coverkit::EditorConfig::phone_camera()
    } else {
        coverkit::EditorConfig::default()
    };
    let json = coverkit::DesignDocument::starter_with(config).to_json_pretty()?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write design '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
