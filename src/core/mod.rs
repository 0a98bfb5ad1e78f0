pub mod constraints;
pub mod engine;
pub mod exclusion;
pub mod idleness;
pub mod policy;
pub mod report;
pub mod resolver;

pub use crate::domain::model::{Action, Disposition, ResourceKind, ResourceSnapshot, Sample, Topology};
pub use crate::domain::ports::{
    Actuator, ConfigProvider, InventoryProvider, LookbackWindow, MetricQuery, MetricsProvider,
    NotificationSink,
};
pub use crate::utils::error::Result;
