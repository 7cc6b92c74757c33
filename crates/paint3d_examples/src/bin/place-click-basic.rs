use std::time::Duration;

use glam::Vec2;
use paint3d::prelude::*;
use paint3d_examples::{init_tracing, render_scene_to_png, RenderConfig, SourceStyle};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut scene = MemoryScene::new()
        .with_plane("ground", "groundShape", PlaneSurface::new(0.0))
        .with_plane(
            "table",
            "tableShape",
            PlaneSurface::new(1.0).with_bounds(Vec2::new(10.0, -10.0), Vec2::new(30.0, 10.0)),
        )
        .with_source_mesh("lamp", "lampShape");

    let mut store = MemoryOptionStore::new();
    let mut sink = VecSink::new();
    let mut session = ToolSession::open(&mut store, 11, &mut sink)?;
    session.update_option(OptionIntent::Set(FloatOption::PlaceRotate, 30.0), &mut store);
    session.update_option(OptionIntent::Set(FloatOption::UpOffset, 0.25), &mut store);
    session.add_source(&scene, "lamp")?;
    session.add_target(&scene, "ground")?;
    session.add_target(&scene, "table")?;
    session.activate(ToolMode::Place, &scene, &mut sink)?;

    let mut clock = Duration::ZERO;
    let mut tick = |ms: u64| {
        clock += Duration::from_millis(ms);
        clock
    };

    // Click on the ground, drag onto the table, then spin it with the modifier held.
    session.press(&mut scene, PointerEvent::new(Vec2::new(-20.0, 0.0), tick(0)), &mut sink);
    for x in [-10.0, 0.0, 12.0, 20.0] {
        session.drag(&mut scene, PointerEvent::new(Vec2::new(x, 0.0), tick(16)), &mut sink);
    }
    for dx in [10.0, 40.0, 70.0] {
        let event = PointerEvent::new(Vec2::new(20.0 + dx, 0.0), tick(16)).with_spin(true);
        session.drag(&mut scene, event, &mut sink);
    }
    session.release(&mut scene, &mut sink);

    // A few more single clicks.
    for p in [Vec2::new(-30.0, 25.0), Vec2::new(-5.0, -30.0), Vec2::new(35.0, 35.0)] {
        session.press(&mut scene, PointerEvent::new(p, tick(300)), &mut sink);
        session.release(&mut scene, &mut sink);
    }
    session.deactivate(&mut sink);

    for placement in sink.placements() {
        println!("placed {} from {}", placement.node, placement.source);
    }
    for (name, node) in scene.duplicates() {
        let t = node.transform;
        println!(
            "{name}: translation {} rotation {} scale {}",
            t.translation, t.rotation, t.scale
        );
    }

    let mut rc = RenderConfig::new((600, 600), Vec2::splat(-50.0), Vec2::splat(50.0));
    rc.set_source_style("lampShape", SourceStyle { color: [240, 200, 90], radius: 7 });
    let out = "place-click-basic.png";
    render_scene_to_png(&scene, &rc, out)?;
    println!("wrote {out}");

    Ok(())
}
