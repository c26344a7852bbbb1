/// Point on the engine clock, in milliseconds.
///
/// The clock is virtual: hosts feed it from `performance.now()` or a replay
/// script, so nothing here reads wall-clock time.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_ms(ms: f64) -> Self {
        Time(ms)
    }

    pub fn as_ms(self) -> f64 {
        self.0
    }

    /// Milliseconds since `earlier`, clamped at zero.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn after(self, ms: f64) -> Time {
        Time(self.0 + ms)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn since_never_goes_negative() {
        assert_eq!(Time(150.0).since(Time(100.0)), 50.0);
        assert_eq!(Time(100.0).since(Time(150.0)), 0.0);
    }

    #[test]
    fn after_offsets_forward() {
        assert_eq!(Time(10.0).after(90.0), Time(100.0));
    }
}
