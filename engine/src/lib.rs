pub mod align;
pub mod correlation;
pub mod gate;
pub mod monitor;
pub mod report;
pub mod types;

pub use align::{AlignedPair, align};
pub use correlation::{CorrelationEngine, CorrelationError, CorrelationResult, correlate, pearson};
pub use gate::{ErrorPolicy, MonitorState};
pub use monitor::{CorrelationMonitor, MonitorConfig, PollOutcome};
pub use report::{CorrelationReport, EventHandler, MonitorEvent, console_handler};
pub use types::PairRequest;
