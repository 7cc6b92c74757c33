use std::time::Duration;

use glam::Vec2;
use paint3d::prelude::*;
use paint3d_examples::{init_tracing, render_scene_to_png, RenderConfig, RonOptionStore, SourceStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A 100 x 100 ground plane and three source objects to scatter.
    let mut scene = MemoryScene::new()
        .with_plane(
            "ground",
            "groundShape",
            PlaneSurface::new(0.0).with_bounds(Vec2::splat(-50.0), Vec2::splat(50.0)),
        )
        .with_source_mesh("rock", "rockShape")
        .with_source_mesh("bush", "bushShape")
        .with_source_mesh("tree", "treeShape");

    // Options persist between runs; a missing or stale file resets to defaults.
    let mut store = RonOptionStore::open("paint3d-options.ron")?;
    let mut events = FnSink::new(|event| {
        if let StrokeEvent::Status { message } = event {
            println!("status: {message}");
        }
    });
    let mut session = ToolSession::open(&mut store, 2025, &mut events)?;
    session.update_option(OptionIntent::Set(FloatOption::PaintDistance, 4.0), &mut store);
    session.update_option(OptionIntent::Flux(FluxMode::Distance), &mut store);
    store.save()?;

    session.set_sampler(
        TransformSampler::new()
            .with_rotate(
                ValueRange::fixed(0.0),
                ValueRange::new(0.0, 360.0),
                ValueRange::fixed(0.0),
            )
            .with_scale(
                ValueRange::new(0.6, 1.4),
                ValueRange::new(0.6, 1.4),
                ValueRange::new(0.6, 1.4),
            ),
    );

    session.add_source(&scene, "rock")?;
    session.add_source(&scene, "bush")?;
    session.add_source(&scene, "tree")?;
    session.sources_mut().set_probability("treeShape", 0.2)?;
    session.add_target(&scene, "ground")?;

    session.activate(ToolMode::Paint, &scene, &mut events)?;

    // A wobbly S-curve sampled at 120 Hz, like a hand-drawn stroke.
    let mut rng = StdRng::seed_from_u64(7);
    let samples = 600;
    for i in 0..samples {
        let t = i as f32 / (samples - 1) as f32;
        let wobble = (rng.next_u32() as f32 / u32::MAX as f32 - 0.5) * 0.8;
        let screen = Vec2::new(-45.0 + 90.0 * t, 30.0 * (t * std::f32::consts::TAU).sin() + wobble);
        let event = PointerEvent::new(screen, Duration::from_micros(8_333 * i as u64));
        if i == 0 {
            session.press(&mut scene, event, &mut events);
        } else {
            session.drag(&mut scene, event, &mut events);
        }
    }
    let placements = session.release(&mut scene, &mut events);
    println!("painted {} object(s)", placements.len());

    let mut rc = RenderConfig::new((800, 800), Vec2::splat(-50.0), Vec2::splat(50.0));
    rc.set_source_style("rockShape", SourceStyle { color: [160, 150, 140], radius: 5 });
    rc.set_source_style("bushShape", SourceStyle { color: [90, 170, 80], radius: 6 });
    rc.set_source_style("treeShape", SourceStyle { color: [40, 120, 50], radius: 9 });

    let out = "paint-stroke-basic.png";
    render_scene_to_png(&scene, &rc, out)?;
    println!("wrote {out}");

    Ok(())
}
