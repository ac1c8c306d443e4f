//! Partition table handling for the parted subshell.

pub mod session;
pub mod table;
pub mod validate;

pub use session::{CommandError, Outcome, PartedSession};
pub use table::{parse, PartitionRecord, PartitionTableReport, TableHeader, TableStatus};
pub use validate::{
    validate, PartedOperation, Rejection, ReportSource, UnknownOperation, Validated, Violation,
    FLAG_STATES, PARTITION_FLAGS, PARTITION_TYPES, TABLE_FORMATS,
};
