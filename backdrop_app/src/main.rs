//! Headless host for the Moebius backdrop
//!
//! Renders PNG frames of the backdrop scene, exports the GLSL programs and
//! writes a default configuration file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use moebius_engine::assets::ObjLoader;
use moebius_engine::core::{BackdropConfig, Config};
use moebius_engine::foundation::logging;
use moebius_engine::foundation::time::Timer;
use moebius_engine::render::primitives::{neuron, Mesh};
use moebius_engine::render::raster::Framebuffer;
use moebius_engine::render::shader_export;
use moebius_engine::render::viewport::{ResizeEvent, Viewport};
use moebius_engine::scene::Backdrop;

#[derive(Parser)]
#[command(name = "backdrop", version, about = "Moebius-style backdrop renderer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render frames to PNG
    Render {
        /// Scene configuration (.toml or .ron)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// OBJ mesh; the procedural neuron is used when omitted
        #[arg(short, long)]
        mesh: Option<PathBuf>,
        /// Number of frames
        #[arg(short, long, default_value_t = 1)]
        frames: u32,
        /// Frames per second of scene time
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Output directory
        #[arg(short, long, default_value = "frames")]
        out_dir: PathBuf,
        /// Output size as WIDTHxHEIGHT, overriding the configuration
        #[arg(long, value_parser = parse_size)]
        size: Option<(u32, u32)>,
        /// Report a resize to WIDTHxHEIGHT before the first frame
        #[arg(long, value_parser = parse_size)]
        resize: Option<(u32, u32)>,
    },
    /// Write the GLSL programs for a configuration
    ExportShaders {
        /// Scene configuration (.toml or .ron)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "shaders")]
        out_dir: PathBuf,
    },
    /// Write the default configuration
    InitConfig {
        /// Destination (.toml or .ron)
        #[arg(default_value = "backdrop.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_size(text: &str) -> Result<(u32, u32), String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok((width, height))
}

fn load_config(path: Option<&Path>) -> Result<BackdropConfig> {
    match path {
        Some(path) => BackdropConfig::load_from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(BackdropConfig::default()),
    }
}

fn load_mesh(path: Option<&Path>, config: &BackdropConfig) -> Result<Mesh> {
    match path {
        Some(path) => ObjLoader::load_obj(path).with_context(|| format!("failed to load mesh {}", path.display())),
        None => Ok(neuron::generate(&config.neuron)),
    }
}

fn render(
    config: &BackdropConfig,
    mesh: Mesh,
    frames: u32,
    fps: u32,
    out_dir: &Path,
    resize: Option<(u32, u32)>,
) -> Result<()> {
    if fps == 0 {
        bail!("fps must be at least 1");
    }
    std::fs::create_dir_all(out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut scene = Backdrop::new(config, Arc::new(mesh));
    if let Some((width, height)) = resize {
        let sender = scene.resize_sender();
        std::thread::spawn(move || {
            sender.send(ResizeEvent {
                viewport: Viewport::new(width, height),
            })
        })
        .join()
        .map_err(|_| anyhow::anyhow!("resize reporter panicked"))?
        .context("resize channel closed")?;
    }

    let viewport = scene.viewport();
    let mut target = Framebuffer::new(viewport.width, viewport.height)?;
    let step = Duration::from_secs(1) / fps;
    let mut timer = Timer::new();

    for frame in 0..frames {
        let now = step * frame;
        let update = scene.update(timer.total_time(), now);
        if let Some(resized) = update.resized {
            target.resize(resized.width, resized.height)?;
            log::info!("Frame {frame}: viewport now {}x{}", resized.width, resized.height);
        }

        let stats = scene.render(&mut target)?;
        let path = out_dir.join(format!("frame_{frame:04}.png"));
        target
            .save_png(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!(
            "Frame {frame}: {} shaded, {} outline fragments",
            stats.mesh.main.fragments_written,
            stats.mesh.silhouette.fragments_written
        );
        timer.advance(step);
    }

    log::info!("Wrote {} frame(s) to {}", frames, out_dir.display());
    Ok(())
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            config,
            mesh,
            frames,
            fps,
            out_dir,
            size,
            resize,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some((width, height)) = size {
                config.output.width = width;
                config.output.height = height;
            }
            let mesh = load_mesh(mesh.as_deref(), &config)?;
            render(&config, mesh, frames, fps, &out_dir, resize)
        }
        Command::ExportShaders { config, out_dir } => {
            let config = load_config(config.as_deref())?;
            let written = shader_export::export(&config.material)
                .write_to(&out_dir)
                .with_context(|| format!("failed to write shaders to {}", out_dir.display()))?;
            for path in written {
                log::info!("Wrote {}", path.display());
            }
            Ok(())
        }
        Command::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            BackdropConfig::default()
                .save_to_file(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}
