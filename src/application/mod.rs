// Application layer: the session service, its state and the wallet provider seam.

pub mod error;
pub mod provider;
pub mod service;
pub mod simulated;
pub mod state;

pub use error::*;
pub use provider::*;
pub use service::*;
pub use simulated::*;
pub use state::*;
