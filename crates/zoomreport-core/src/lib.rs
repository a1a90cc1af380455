//! Core types: sessions, attendance aggregation, report rows, tracing

pub mod attendance;
pub mod error;
pub mod report;
pub mod session;
pub mod time;
pub mod tracing;

pub use attendance::{AggregationOptions, AttendanceStatus, AttendanceSummary, aggregate};
pub use error::{CoreError, CoreResult};
pub use report::{Cell, ReportLabels, ReportTable, report_title};
pub use session::ParticipantSession;
pub use time::ReportTimezone;
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
