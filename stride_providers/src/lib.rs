//! Location providers behind `stride_traits::LocationProvider`.
//!
//! - [`SimulatedProvider`]: deterministic synthetic run for demos and tests
//! - [`ReplayProvider`]: recorded fixes, optionally paced by a clock
//! - [`ChannelProvider`]: fixes pushed by a host callback through [`FixSender`]
pub mod channel;
pub mod error;
pub mod replay;
pub mod simulated;
pub mod util;

pub use channel::{ChannelProvider, FixSender, channel};
pub use error::ProviderError;
pub use replay::ReplayProvider;
pub use simulated::{SimulatedProvider, SimulatedRun};
