pub mod messages;
pub mod types;

pub use messages::{Ack, BackgroundRequest, CheckData, CheckReply, PageRequest};
pub use types::{Badge, Severity};
