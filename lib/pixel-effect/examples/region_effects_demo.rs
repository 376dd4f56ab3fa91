use pixel_effect::{FaceRect, PixelBuffer, RegionCompositor, RegionEffect};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Creating simulated camera frame...");
    let frame = PixelBuffer::from_fn(640, 480, |x, y| {
        let r = (x as f32 / 640.0 * 255.0) as u8;
        let b = (y as f32 / 480.0 * 255.0) as u8;
        [r, 100, b, 255]
    });

    let faces = [
        FaceRect::new(120.0, 80.0, 160.0, 160.0, 9.5),
        FaceRect::new(380.0, 200.0, 140.0, 150.0, 6.0),
        FaceRect::new(10.0, 10.0, 80.0, 80.0, 2.0),
    ];
    let compositor = RegionCompositor::new();

    for &effect in RegionEffect::all() {
        let start = Instant::now();
        let composite = compositor.composite(&frame, &faces, effect)?;

        log::info!(
            "{:<10} {:>8.3} ms  {} outline(s)  mean {:.1}",
            effect.name(),
            start.elapsed().as_secs_f64() * 1000.0,
            composite.drawn.len(),
            composite.frame.mean_intensity()
        );
    }

    Ok(())
}
