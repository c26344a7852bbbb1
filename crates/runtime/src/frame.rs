use foundation::time::Time;

/// Render-clock frame metadata.
///
/// Frames are produced by the [`Ticker`](crate::ticker::Ticker) from host
/// timestamps, one per display refresh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Milliseconds since the previous frame (0 for the first one).
    pub dt_ms: f64,
    /// Host timestamp at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn first(time: Time) -> Self {
        Self {
            index: 0,
            dt_ms: 0.0,
            time,
        }
    }

    pub fn next(self, time: Time) -> Self {
        Self {
            index: self.index + 1,
            dt_ms: time.since(self.time),
            time,
        }
    }
}
