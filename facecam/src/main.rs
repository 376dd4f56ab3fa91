use anyhow::{Context, Result};
use clap::Parser;
use facecam::{
    Config, DetectionCadence, FixedDetector, FramePipeline, FrameSource, Layout, NoDetector,
    ProcessingContext, RegionDetector, StillFrameSource, TestPatternSource,
    source::parse_face_rect,
};
use log::info;
use pixel_effect::{FaceRect, RegionEffect};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "facecam", version, about = "Per-frame pixel effects on a face camera feed")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Still image served as every frame. A moving test pattern is used when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(short = 'n', long, default_value_t = 21)]
    frames: u32,

    /// Region effect: none, grayscale, blurred, ycbcr, pixelate
    #[arg(short, long)]
    effect: Option<RegionEffect>,

    /// Face rect `x,y,width,height,confidence` in frame pixels, repeatable
    #[arg(short, long, value_parser = parse_face_rect)]
    face: Vec<FaceRect>,

    /// Keys fed to the effect selector, one per frame
    #[arg(short, long, default_value = "")]
    keys: String,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    if cli.dump_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut context = ProcessingContext::from_config(&config)?;
    if let Some(effect) = cli.effect {
        context.set_effect(effect);
    }

    let mut source: Box<dyn FrameSource> = match &cli.input {
        Some(path) => Box::new(StillFrameSource::open(path)?),
        None => Box::new(TestPatternSource::new(640, 480)),
    };

    let mut detector: Box<dyn RegionDetector> = if cli.face.is_empty() {
        Box::new(NoDetector)
    } else {
        Box::new(FixedDetector::new(cli.face.clone()))
    };

    let pipeline = FramePipeline::from_config(&config);
    let layout = Layout::from_config(&config);
    let mut cadence = DetectionCadence::new(config.detection.frequency);
    let mut keys = cli.keys.chars();

    info!(
        "running {} frame(s), region effect {}, detection every {} frame(s)",
        cli.frames,
        context.effect(),
        cadence.frequency()
    );

    for index in 0..cli.frames {
        if let Some(key) = keys.next() {
            context.handle_key(key);
        }

        let frame = source
            .next_frame()
            .with_context(|| format!("frame {index}: no input"))?;
        let faces = cadence.faces(&frame, detector.as_mut()).to_vec();

        let output = pipeline
            .process(&frame, &faces, &context.snapshot())
            .with_context(|| format!("frame {index}: processing failed"))?;
        let canvas = layout.render(&output)?;

        for derived in &output.views {
            if let Ok(image) = &derived.result {
                log::debug!(
                    "frame {index}: {:<16} mean {:>6.1}",
                    derived.view.name(),
                    image.mean_intensity()
                );
            }
        }

        info!(
            "frame {index}: effect {}, {} face outline(s), {} failed view(s), canvas mean {:.1}",
            context.effect(),
            output.drawn.len(),
            output.failed().count(),
            canvas.mean_intensity()
        );
    }

    Ok(())
}
