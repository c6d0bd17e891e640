use std::time::{Duration, Instant};
use winit::window::Window;

const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Frame pacing tied to the monitor refresh rate, plus a fps readout in the
/// window title.
pub struct FramePacer {
    target_frame: Duration,
    next_frame: Instant,
    last_fps_time: Instant,
    frame_count: u32,
    base_title: String,
}

impl FramePacer {
    pub fn new(base_title: String, now: Instant) -> Self {
        Self {
            target_frame: DEFAULT_FRAME,
            next_frame: now,
            last_fps_time: now,
            frame_count: 0,
            base_title,
        }
    }

    pub fn set_refresh_millihertz(&mut self, millihertz: Option<u32>, now: Instant) {
        self.target_frame = millihertz
            .map(|value| value as f32 / 1000.0)
            .filter(|hz| *hz > 1.0)
            .map(|hz| Duration::from_secs_f32(1.0 / hz))
            .unwrap_or(DEFAULT_FRAME);
        self.next_frame = now + self.target_frame;
    }

    pub fn sync_to_window(&mut self, window: &Window) {
        let millihertz = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz());
        self.set_refresh_millihertz(millihertz, Instant::now());
    }

    pub fn target_frame(&self) -> Duration {
        self.target_frame
    }

    /// True when a redraw is due; schedules the next deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now >= self.next_frame {
            self.next_frame = now + self.target_frame;
            true
        } else {
            false
        }
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    /// Counts a presented frame. Returns the fps once every half second.
    pub fn frame_presented(&mut self, now: Instant) -> Option<f32> {
        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() < 0.5 {
            return None;
        }
        let fps = self.frame_count as f32 / elapsed.as_secs_f32();
        self.frame_count = 0;
        self.last_fps_time = now;
        Some(fps)
    }

    pub fn title_with_fps(&self, fps: f32) -> String {
        format!("{} - {:.1} fps", self.base_title, fps)
    }
}
