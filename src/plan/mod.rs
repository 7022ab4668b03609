//! Per-DoF planning passes and cross-DoF duration selection.

pub mod block;
pub mod position_min;
pub mod position_sync;
pub mod sync;
pub mod velocity;

pub use block::{Block, Interval};
pub use position_min::PositionMinTime;
pub use position_sync::PositionSyncTime;
pub use sync::{synchronize, SyncResult};
pub use velocity::{VelocityMinTime, VelocitySyncTime};
