use crate::feed::FeedEvent;

/// Common error type for configuration and collaborator failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("analysis failed: {0}")]
    Analysis(String),
}

pub type TargetResult<T> = Result<T, TargetError>;

/// Receives every event a feed session produces.
///
/// Observers are handed to the session explicitly by whoever owns the feed,
/// so sound cues, LED hardware or loggers never hang off shared globals.
pub trait FeedObserver {
    fn on_event(&mut self, event: &FeedEvent);
}

impl<F> FeedObserver for F
where
    F: FnMut(&FeedEvent),
{
    fn on_event(&mut self, event: &FeedEvent) {
        self(event)
    }
}
