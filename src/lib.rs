pub use env_logger::Env;
pub use log::{debug, info};

pub mod client_to_relay_communication;
pub mod error;
pub mod event;
pub mod filter;
pub mod keys;
pub mod nip04;
pub mod nip19;
pub mod pool;
pub mod relay;
pub mod relay_manager;
pub mod relay_to_client_communication;
pub mod report;
pub mod schnorr;
pub mod subscription;
pub mod util;

pub use error::Error;
pub use relay::{Relay, RelayConfig, RelayPolicy};
pub use relay_manager::RelayManager;
