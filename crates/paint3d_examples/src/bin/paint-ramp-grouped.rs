use std::time::Duration;

use glam::Vec2;
use paint3d::prelude::*;
use paint3d_examples::{init_tracing, render_scene_to_png, RenderConfig, SourceStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut scene = MemoryScene::new()
        .with_plane("ground", "groundShape", PlaneSurface::new(0.0))
        .with_source_mesh("fern", "fernShape")
        .with_source_mesh("stone", "stoneShape");

    let mut store = MemoryOptionStore::new();
    let mut sink = VecSink::new();
    let mut session = ToolSession::open(&mut store, 99, &mut sink)?;

    // Ramp scale and rotation along the stroke, one output group per source.
    for intent in [
        OptionIntent::Ramp(RampFx::Both),
        OptionIntent::Toggle(BoolOption::Hierarchy, true),
        OptionIntent::GroupBy(GroupBy::Source),
        OptionIntent::Toggle(BoolOption::Random, false),
        OptionIntent::Toggle(BoolOption::Jitter, true),
        OptionIntent::Set(FloatOption::PaintDistance, 3.0),
    ] {
        session.update_option(intent, &mut store);
    }

    session.set_sampler(
        TransformSampler::new()
            .with_rotate(
                ValueRange::fixed(0.0),
                ValueRange::fixed(180.0),
                ValueRange::fixed(0.0),
            )
            .with_scale(
                ValueRange::fixed(2.5),
                ValueRange::fixed(2.5),
                ValueRange::fixed(2.5),
            )
            .with_jitter(ValueRange::new(-1.0, 1.0), ValueRange::new(-1.0, 1.0)),
    );
    session.add_source(&scene, "fern")?;
    session.add_source(&scene, "stone")?;
    session.add_target(&scene, "ground")?;
    session.activate(ToolMode::Paint, &scene, &mut sink)?;

    // An outward spiral.
    let samples = 400;
    for i in 0..samples {
        let a = i as f32 * 0.05;
        let r = 2.0 + a * 1.8;
        let event = PointerEvent::new(
            Vec2::new(r * a.cos(), r * a.sin()),
            Duration::from_millis(10 * i as u64),
        );
        if i == 0 {
            session.press(&mut scene, event, &mut sink);
        } else {
            session.drag(&mut scene, event, &mut sink);
        }
    }
    let placements = session.release(&mut scene, &mut sink);

    for event in sink.as_slice() {
        if let StrokeEvent::GroupCreated { scope, group } = event {
            println!("group {group} for {scope:?}");
        }
    }
    if let (Some(first), Some(last)) = (placements.first(), placements.last()) {
        println!(
            "{} objects, scale ramps from {} to {}",
            placements.len(),
            first.transform.scale.x,
            last.transform.scale.x
        );
    }

    let mut rc = RenderConfig::new((800, 800), Vec2::splat(-40.0), Vec2::splat(40.0));
    rc.set_source_style("fernShape", SourceStyle { color: [110, 200, 120], radius: 3 });
    rc.set_source_style("stoneShape", SourceStyle { color: [170, 170, 185], radius: 3 });
    let out = "paint-ramp-grouped.png";
    render_scene_to_png(&scene, &rc, out)?;
    println!("wrote {out}");

    Ok(())
}
