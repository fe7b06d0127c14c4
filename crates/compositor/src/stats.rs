use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Displayed-frame counter. Accumulation sub-passes are not frames.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    window_start: Option<Instant>,
    frames_in_window: u32,
    fps: u32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one frame. Returns the refreshed FPS once per second.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        self.total_frames = self.total_frames.saturating_add(1);
        self.frames_in_window = self.frames_in_window.saturating_add(1);

        let start = *self.window_start.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);
        if elapsed <= FPS_WINDOW {
            return None;
        }

        let fps = (f64::from(self.frames_in_window) / elapsed.as_secs_f64()).ceil();
        self.fps = fps as u32;
        self.window_start = Some(now);
        self.frames_in_window = 0;
        Some(self.fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let start = Instant::now();
        let mut stats = FrameStats::new();
        let mut reports = Vec::new();
        for frame in 0..=60u64 {
            let now = start + Duration::from_millis(frame * 20);
            if let Some(fps) = stats.record(now) {
                reports.push(fps);
            }
        }
        assert_eq!(reports.len(), 1);
        assert!((50..=52).contains(&reports[0]), "{reports:?}");
        assert_eq!(stats.total_frames(), 61);
    }

    #[test]
    fn fps_starts_at_zero() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.record(Instant::now()), None);
        assert_eq!(stats.fps(), 0);
    }
}
