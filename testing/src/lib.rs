pub mod error;
mod framework;
mod negotiation_record;
mod test_directory;

pub use framework::{Framework, FrameworkError, Party, SessionConfig};
pub use negotiation_record::{NegotiationRecord, NegotiationStage};
pub use test_directory::{load_domain, load_preferences, test_assets_dir};
