use std::collections::HashMap;
use std::path::Path;

use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use paint3d::prelude::{MemoryScene, PlaneSurface};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Marker drawn for objects created from one source.
#[derive(Debug, Clone, Copy)]
pub struct SourceStyle {
    pub color: [u8; 3],
    /// Radius in pixels at scale 1.
    pub radius: i32,
}

/// Top-down view of the XZ plane.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// World XZ corner mapped to the top-left pixel.
    pub world_min: Vec2,
    /// World XZ corner mapped to the bottom-right pixel.
    pub world_max: Vec2,
    pub background: [u8; 3],
    pub surface_color: [u8; 3],
    styles: HashMap<String, SourceStyle>,
    default_style: SourceStyle,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), world_min: Vec2, world_max: Vec2) -> Self {
        Self {
            image_size,
            world_min,
            world_max,
            background: [20, 20, 24],
            surface_color: [48, 52, 58],
            styles: HashMap::new(),
            default_style: SourceStyle {
                color: [235, 235, 235],
                radius: 4,
            },
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    /// Style for objects created from the source shape `source`.
    pub fn set_source_style(&mut self, source: &str, style: SourceStyle) {
        self.styles.insert(source.to_string(), style);
    }

    fn style(&self, source: &str) -> SourceStyle {
        self.styles
            .get(source)
            .copied()
            .unwrap_or(self.default_style)
    }

    fn to_pixel(&self, xz: Vec2) -> (i32, i32) {
        let (w, h) = self.image_size;
        let t = (xz - self.world_min) / (self.world_max - self.world_min);
        ((t.x * w as f32) as i32, (t.y * h as f32) as i32)
    }
}

/// Render target planes and every painted object of `scene` to a PNG.
///
/// Objects are drawn as discs scaled by their X scale, with a tick showing
/// their heading (rotation about Y).
pub fn render_scene_to_png(
    scene: &MemoryScene,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    for (_, node) in scene.nodes() {
        if let Some(surface) = node.surface {
            draw_surface(&mut img, config, &surface);
        }
    }

    for (_, node) in scene.duplicates() {
        let Some(origin) = node.origin.as_deref() else {
            continue;
        };
        let style = config.style(origin);
        let t = node.transform;
        let center = config.to_pixel(Vec2::new(t.translation.x, t.translation.z));
        let radius = ((style.radius as f32) * t.scale.x.abs()).round().max(1.0) as i32;
        draw_disc(&mut img, center, radius, style.color);

        let heading = t.rotation.y.to_radians();
        let tip = Vec3::new(heading.sin(), 0.0, heading.cos()) * (radius as f32 * 1.8);
        draw_line(
            &mut img,
            center,
            (center.0 + tip.x as i32, center.1 + tip.z as i32),
            style.color,
        );
    }

    img.save(path.as_ref())?;
    Ok(())
}

fn draw_surface(img: &mut RgbImage, config: &RenderConfig, surface: &PlaneSurface) {
    let (min, max) = surface
        .bounds
        .unwrap_or((config.world_min, config.world_max));
    let (x0, y0) = config.to_pixel(min);
    let (x1, y1) = config.to_pixel(max);
    for y in y0.min(y1)..y0.max(y1) {
        for x in x0.min(x1)..x0.max(x1) {
            put(img, x, y, config.surface_color);
        }
    }
}

fn draw_disc(img: &mut RgbImage, (cx, cy): (i32, i32), radius: i32, color: [u8; 3]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: [u8; 3]) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).max(1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 as f32 + (to.0 - from.0) as f32 * t;
        let y = from.1 as f32 + (to.1 - from.1) as f32 * t;
        let shade = color.map(|c| c / 2);
        put(img, x.round() as i32, y.round() as i32, shade);
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}
