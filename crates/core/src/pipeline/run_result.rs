use std::time::Duration;

/// Throughput figures for one finished job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunResult {
    pub frame_count: usize,
    pub detection_count: usize,
    pub elapsed_seconds: f64,
    /// Frames per second over the streaming phase; 0 when nothing was
    /// streamed.
    pub average_fps: f64,
}

impl RunResult {
    pub fn new(frame_count: usize, detection_count: usize, elapsed: Duration) -> Self {
        let elapsed_seconds = elapsed.as_secs_f64();
        let average_fps = if frame_count == 0 || elapsed_seconds <= 0.0 {
            0.0
        } else {
            frame_count as f64 / elapsed_seconds
        };
        Self {
            frame_count,
            detection_count,
            elapsed_seconds,
            average_fps,
        }
    }
}
