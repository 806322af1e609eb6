pub mod config;
pub mod error;
pub mod index;
pub mod labeler;
pub mod metrics;
pub mod storage;

pub use config::LabelerConfig;
pub use error::{CoreError, CoreResult};
pub use index::RangeIndex;
pub use labeler::{LabelerBuilder, RegionLabeler};
pub use metrics::{
    LabelerMetrics, MetricsHandle, MutationOp, MutationOutcome, NoOpMetrics, noop_metrics,
};
pub use storage::{KvOp, KvStore, MemoryKv, StorageError, StorageResult};

pub mod prelude {
    pub use crate::config::LabelerConfig;
    pub use crate::error::CoreError;
    pub use crate::labeler::RegionLabeler;
    pub use crate::storage::{KvStore, MemoryKv};
    pub use labeler_model::{
        KeyRangeRegion, LabelRule, LabelRuleInput, LabelRulePatch, Region, RegionLabel,
    };
}
