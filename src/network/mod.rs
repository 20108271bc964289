pub mod network;
pub mod record;
pub mod spec;

pub use network::{Network, FORMAT_VERSION};
pub use record::ActivationRecord;
pub use spec::NetworkSpec;
