pub mod leds;
pub mod state;

pub use leds::IndicatorLeds;
pub use state::{ConnectionStatus, DisplaySnapshot, DisplayState};
