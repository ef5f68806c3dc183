//! In-memory stores shared between planning and runtime.
//!
//! Write paths belong to the horizon manager and the planner; read paths
//! are consumed by the channel manager and the guide API. The read/write
//! capability split is expressed as separate traits so consumers can only
//! name the half they are allowed to use.

mod asrun;
mod compiled;
mod overrides;
mod sequence;
mod traffic_log;
mod window;

pub use asrun::AsRunStore;
pub use compiled::{ArtifactExistsError, CompiledLogStore};
pub use overrides::{InMemoryOverrideStore, OverridePersistError, OverrideStore};
pub use sequence::{SequenceKey, SequenceState, SequenceStore};
pub use traffic_log::{PlayRecord, TrafficPlayLog};
pub use window::{ExecutionWindowStore, ReadExecutionWindow, WriteExecutionWindow};
