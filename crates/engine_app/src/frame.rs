//! Fixed-rate frame loop.
//!
//! Each iteration hands the step closure the frame number and a fixed delta
//! time of `1 / target_fps`, then sleeps away whatever is left of the frame
//! budget.

use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Configuration for the frame loop.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Target frames per second.
    pub target_fps: u32,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frames: 0,
        }
    }
}

#[derive(Debug)]
pub struct FrameLoop {
    frame: u64,
    config: FrameConfig,
}

impl FrameLoop {
    #[must_use]
    pub fn new(config: FrameConfig) -> Self {
        Self { frame: 0, config }
    }

    /// Number of frames run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Time budget of one frame.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.config.target_fps.max(1)))
    }

    /// Run frames until `max_frames` is reached, or forever.
    pub fn run(&mut self, mut step: impl FnMut(u64, f32)) {
        let budget = self.frame_duration();
        let dt = budget.as_secs_f32();

        info!(
            target_fps = self.config.target_fps,
            max_frames = self.config.max_frames,
            "starting frame loop"
        );

        loop {
            if self.config.max_frames > 0 && self.frame >= self.config.max_frames {
                info!(frames = self.frame, "frame loop complete");
                break;
            }

            let start = Instant::now();
            step(self.frame, dt);
            self.frame += 1;

            let elapsed = start.elapsed();
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            } else {
                warn!(
                    frame = self.frame,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = budget.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_limited_frames() {
        let mut frame_loop = FrameLoop::new(FrameConfig {
            target_fps: 1000,
            max_frames: 5,
        });
        let mut seen = Vec::new();
        frame_loop.run(|frame, _dt| seen.push(frame));
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(frame_loop.frame(), 5);
    }

    #[test]
    fn test_fixed_delta_time() {
        let mut frame_loop = FrameLoop::new(FrameConfig {
            target_fps: 500,
            max_frames: 2,
        });
        let mut deltas = Vec::new();
        frame_loop.run(|_frame, dt| deltas.push(dt));
        assert_eq!(deltas, vec![0.002, 0.002]);
    }

    #[test]
    fn test_default_config() {
        let config = FrameConfig::default();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.max_frames, 0);
        assert_eq!(
            FrameLoop::new(config).frame_duration(),
            Duration::from_secs_f64(1.0 / 60.0)
        );
    }
}
