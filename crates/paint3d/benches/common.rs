#![allow(dead_code)]
use std::time::Duration;

use criterion::{Criterion, Throughput};
use paint3d::prelude::{MemoryScene, ObjectRegistry, PlaneSurface};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Scene with one ground plane and `sources` source meshes named `src{i}`.
pub fn scene_with_sources(sources: usize) -> MemoryScene {
    (0..sources).fold(
        MemoryScene::new().with_plane("ground", "groundShape", PlaneSurface::new(0.0)),
        |scene, i| scene.with_source_mesh(&format!("src{i}"), &format!("src{i}Shape")),
    )
}

/// Source registry holding every `src{i}` of `scene`, with varied probabilities.
pub fn source_registry(scene: &MemoryScene, sources: usize) -> ObjectRegistry {
    let mut registry = ObjectRegistry::source();
    for i in 0..sources {
        let key = registry
            .add(scene, &format!("src{i}"))
            .expect("source mesh is addable");
        registry
            .set_probability(&key, 0.1 + ((i % 9) as f32) / 10.0)
            .expect("entry exists");
    }
    registry
}
