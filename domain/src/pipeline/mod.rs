//! Pipeline orchestration domain
//!
//! Stages of a run, the per-model result lifecycle, and the [`RunState`]
//! aggregate with its pure transition function.

pub mod model_result;
pub mod round;
pub mod run_state;
pub mod stage;

pub use model_result::{ModelResult, ModelResults};
pub use round::{RoundStrategy, RoundSummary};
pub use run_state::{PipelineEvent, RoundId, RunState};
pub use stage::Stage;
