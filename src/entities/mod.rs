mod quote;

pub use quote::{EtaQuantiles, EtaSummary, Quote, QuoteInput};
