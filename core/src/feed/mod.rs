pub mod driver;
pub mod message;
pub mod session;

pub use driver::{drive, FeedFrame};
pub use message::{decode, FeedMessage, LaserPosition};
pub use session::{FeedEvent, FeedSession};
