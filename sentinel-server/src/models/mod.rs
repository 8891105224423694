//! Database models

pub mod flow_log;

pub use flow_log::{FlowLog, FlowLogStats, NewFlowLog};
