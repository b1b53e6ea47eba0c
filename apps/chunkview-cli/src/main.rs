use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chunkview_common::block;
use chunkview_kernel::{BlockMap, Colour, EnvVariable};
use chunkview_render::{
    FaceMeshBuilder, FrameContext, Frustum, MapRenderer, NoEnvironment, RecordingDevice,
    RendererConfig, TerrainAtlas,
};
use chunkview_tools::{FpsCounter, FrameTimer, RendererInspector};
use clap::{Parser, Subcommand};
use glam::{IVec3, Mat4, Vec3};
use tracing_subscriber::EnvFilter;

/// Simulated frame time, so reports come out once every 60 frames.
const FRAME_DELTA: f64 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "chunkview-cli", about = "Chunked voxel map renderer demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Fly a camera across a generated map, editing it along the way
    Fly {
        /// Number of frames to render
        #[arg(short, long, default_value = "600")]
        frames: u32,
        #[arg(long, default_value = "256")]
        width: u32,
        #[arg(long, default_value = "64")]
        height: u32,
        #[arg(long, default_value = "256")]
        length: u32,
        /// Override the configured view distance
        #[arg(long)]
        view_distance: Option<f32>,
        /// YAML renderer config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("chunkview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", chunkview_render::crate_info());
            println!("tools: {}", chunkview_tools::crate_info());
            println!("defaults: {:?}", RendererConfig::default());
        }
        Commands::Fly {
            frames,
            width,
            height,
            length,
            view_distance,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(view_distance) = view_distance {
                config.view_distance = view_distance;
            }
            fly(frames, (width, height, length), config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RendererConfig> {
    let Some(path) = path else {
        return Ok(RendererConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Flat grass with a glass wall, a pond and a row of flowers.
fn demo_map(width: u32, height: u32, length: u32) -> anyhow::Result<BlockMap> {
    let ground = (height / 2).max(4);
    let mut map = BlockMap::flatgrass(width, height, length, ground)?;
    let g = ground as i32;
    let (w, l) = (width as i32, length as i32);
    map.fill(IVec3::new(w / 4, g + 1, 0), IVec3::new(w / 4, g + 6, l - 1), block::GLASS);
    map.fill(
        IVec3::new(w / 2, g - 2, l / 4),
        IVec3::new(w / 2 + 12, g, l / 4 + 12),
        block::WATER,
    );
    for x in (0..w).step_by(5) {
        map.fill(IVec3::new(x, g + 1, l / 2), IVec3::new(x, g + 1, l / 2), block::ROSE);
    }
    Ok(map)
}

fn fly(frames: u32, (width, height, length): (u32, u32, u32), config: RendererConfig) -> anyhow::Result<()> {
    let _span = tracing::info_span!("fly", frames, width, height, length).entered();
    let mut map = demo_map(width, height, length)?;
    let mut device = RecordingDevice::without_log();
    let view_distance = config.view_distance;
    let mut renderer = MapRenderer::new(FaceMeshBuilder::new(), TerrainAtlas::default(), config);
    renderer.on_new_map(&mut device);
    renderer
        .on_new_map_loaded(width, height, length, &mut device)
        .context("loading map into renderer")?;

    let projection = Mat4::perspective_rh(70.0_f32.to_radians(), 16.0 / 9.0, 0.1, view_distance.max(1.0) + 64.0);
    let eye_height = height as f32 * 0.5 + 12.0;
    let mut fps = FpsCounter::new();
    let mut timer = FrameTimer::default();

    for frame in 0..frames {
        let started = Instant::now();
        let t = frame as f32 / frames.max(1) as f32;
        let eye = Vec3::new(t * width as f32, eye_height, length as f32 * 0.5);
        let target = eye + Vec3::new(1.0, -0.4, 0.3);
        let frustum = Frustum::from_view_projection(projection * Mat4::look_at_rh(eye, target, Vec3::Y));

        edit(&mut map, frame);
        for event in map.drain_events() {
            renderer.apply_event(&event, &mut device);
        }

        let ctx = FrameContext {
            camera_position: eye,
            view_distance,
            culling: &frustum,
            delta: FRAME_DELTA,
        };
        renderer.render(&ctx, &map, &mut device, &mut NoEnvironment)?;
        timer.record(started.elapsed());

        if let Some(report) = fps.tick_renderer(FRAME_DELTA, &mut renderer) {
            println!("{report}");
        }
    }

    println!("{}", RendererInspector::summary(&renderer));
    println!(
        "frame time: avg {:?}, min {:?}, max {:?}, live buffers {}",
        timer.average(),
        timer.min(),
        timer.max(),
        device.live_buffers()
    );
    renderer.dispose(&mut device);
    Ok(())
}

/// Scripted world edits: a sunlight change at frame 300, and a block placed
/// above the ground every 30 frames then removed 15 frames later.
fn edit(map: &mut BlockMap, frame: u32) {
    if frame == 300 {
        map.set_env(EnvVariable::SunlightColour, Colour::new(255, 220, 180));
    }
    let x = (frame / 30 * 7 % map.width()) as i32;
    let spot = IVec3::new(x, map.height() as i32 / 2 + 3, map.length() as i32 / 2);
    let placed = match frame % 30 {
        0 => block::COBBLESTONE,
        15 => block::AIR,
        _ => return,
    };
    if let Err(err) = map.set_block(spot.x, spot.y, spot.z, placed) {
        tracing::debug!(%err, "edit skipped");
    }
}
