//! Record extraction from captured `arp -a` output.

mod parser;
mod record;

pub use parser::{Extraction, SkipReason, SkippedLine, parse, parse_at, parse_line};
pub use record::{AddressRecord, order_key};
