mod brief;
mod counters;
mod types;

pub use brief::parse_interface_brief;
pub use counters::parse_counter_output;
pub use types::{InterfaceCounterRecord, InterfaceRecord, ParseError};
