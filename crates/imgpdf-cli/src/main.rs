use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use imgpdf_assembly::{
    AssemblyOptions, AssemblyOutcome, CancelFlag, OrientationPolicy, PageSize, default_filename,
    generate, sanitize_filename,
};
use imgpdf_collection::{FileInput, ImageCollection};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "imgpdf", about = "Image to PDF assembly tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble images into a single PDF, one page per image
    Assemble {
        /// Input image files, in page order
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output filename (.pdf appended if missing); date-stamped default
        #[arg(short, long)]
        output: Option<String>,

        /// Directory the PDF is written into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Page size preset
        #[arg(long, default_value = "f4", value_enum)]
        paper: PaperArg,

        /// Page orientation policy
        #[arg(long, default_value = "adaptive", value_enum)]
        orientation: OrientationArg,

        /// Sort images by name before assembling
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Rotate the image at INDEX by 90 degrees (repeatable)
        #[arg(long = "rotate", value_name = "INDEX")]
        rotate: Vec<usize>,

        /// JPEG re-encode quality (1-100)
        #[arg(long, default_value = "80")]
        jpeg_quality: u8,

        /// Show the resolved collection only, don't generate a PDF
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    F4,
    A4,
    A3,
    Legal,
    Letter,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
    Adaptive,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<PaperArg> for PageSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::F4 => Self::F4,
            PaperArg::A4 => Self::A4,
            PaperArg::A3 => Self::A3,
            PaperArg::Legal => Self::Legal,
            PaperArg::Letter => Self::Letter,
        }
    }
}

impl From<OrientationArg> for OrientationPolicy {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Adaptive => Self::Adaptive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble {
            files,
            output,
            out_dir,
            paper,
            orientation,
            sort,
            rotate,
            jpeg_quality,
            stats_only,
        } => {
            let mut inputs = Vec::with_capacity(files.len());
            for path in &files {
                let bytes = tokio::fs::read(path).await?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                inputs.push(FileInput {
                    content_type: content_type_for(path),
                    name,
                    bytes,
                });
            }

            let mut collection = ImageCollection::new();
            let report = collection.add_batch(inputs).await?;
            if report.rejected > 0 {
                println!("Skipped {} non-image file(s)", report.rejected);
            }
            if report.failed > 0 {
                println!("Skipped {} file(s) that failed to decode", report.failed);
            }

            if let Some(sort) = sort {
                collection.sort(matches!(sort, SortArg::Asc));
            }
            for index in rotate {
                collection.rotate(index)?;
            }

            if stats_only {
                println!("Collection ({} images):", collection.len());
                for (i, record) in collection.records().iter().enumerate() {
                    let (width, height) = dimensions(record);
                    println!(
                        "  {:3}  {}  {}x{}px  rotated {}°",
                        i,
                        record.name,
                        width,
                        height,
                        record.rotation.degrees()
                    );
                }
                return Ok(());
            }

            let options = AssemblyOptions {
                page_size: paper.into(),
                orientation: orientation.into(),
                filename: sanitize_filename(&output.unwrap_or_else(default_filename)),
                jpeg_quality,
                ..Default::default()
            };

            let cancel = CancelFlag::new();
            let outcome = generate(
                collection.snapshot(),
                &options,
                &out_dir,
                &cancel,
                |percent, message| {
                    println!("[{percent:3.0}%] {message}");
                },
            )
            .await?;

            match outcome {
                AssemblyOutcome::Completed {
                    filename,
                    page_count,
                } => {
                    println!(
                        "Assembled {} page(s) → {}",
                        page_count,
                        out_dir.join(filename).display()
                    );
                }
                AssemblyOutcome::Canceled { pages_composed } => {
                    println!("Canceled after {pages_composed} page(s); nothing was written");
                }
            }
        }
    }

    Ok(())
}

fn content_type_for(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

fn dimensions(record: &imgpdf_collection::ImageRecord) -> (u32, u32) {
    use image::GenericImageView;
    record.pixels.dimensions()
}
