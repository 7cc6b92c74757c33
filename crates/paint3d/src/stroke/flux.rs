//! Commit throttling along a paint stroke.
use std::time::Duration;

use glam::Vec3;

use crate::options::{FluxMode, ToolOptions};

/// Remembers the last commit of a stroke and decides whether the next hit may commit.
///
/// The first hit of a stroke always passes. Later hits pass once the cursor
/// travelled at least [`ToolOptions::paint_distance`] world units from the
/// last commit, or at least [`ToolOptions::paint_timer`] seconds elapsed,
/// depending on [`ToolOptions::flux`].
#[derive(Debug, Clone, Default)]
pub struct FluxGate {
    last: Option<(Vec3, Duration)>,
}

impl FluxGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passes(&self, options: &ToolOptions, position: Vec3, time: Duration) -> bool {
        let Some((last_position, last_time)) = self.last else {
            return true;
        };
        match options.flux {
            FluxMode::Distance => position.distance(last_position) >= options.paint_distance,
            FluxMode::Time => {
                time.saturating_sub(last_time).as_secs_f32() >= options.paint_timer
            }
        }
    }

    pub fn record(&mut self, position: Vec3, time: Duration) {
        self.last = Some((position, time));
    }
}
