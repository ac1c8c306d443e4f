//! Argument validation for the parted subshell.
//!
//! Turns a requested operation plus raw words into the argument vector handed to
//! `parted -s <image>`, or into a [`Rejection`] listing every violated constraint.

use super::table::{PartitionTableReport, TableStatus};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TABLE_FORMATS: [&str; 8] = ["bsd", "dvh", "gpt", "loop", "mac", "msdos", "pc98", "sun"];
pub const PARTITION_TYPES: [&str; 3] = ["primary", "logical", "extended"];
pub const PARTITION_FLAGS: [&str; 9] = [
    "boot",
    "root",
    "swap",
    "hidden",
    "raid",
    "lvm",
    "lba",
    "legacy_boot",
    "palo",
];
pub const FLAG_STATES: [&str; 2] = ["on", "off"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartedOperation {
    CreateTable,
    CreatePartition,
    SetFlag,
    Show,
}

impl PartedOperation {
    pub const ALL: [PartedOperation; 4] = [
        PartedOperation::CreateTable,
        PartedOperation::CreatePartition,
        PartedOperation::SetFlag,
        PartedOperation::Show,
    ];

    /// The word typed in the parted subshell.
    pub fn name(self) -> &'static str {
        match self {
            PartedOperation::CreateTable => "mktbl",
            PartedOperation::CreatePartition => "mkpart",
            PartedOperation::SetFlag => "set",
            PartedOperation::Show => "show",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            PartedOperation::CreateTable => "create-table",
            PartedOperation::CreatePartition => "create-partition",
            PartedOperation::SetFlag => "set-flag",
            PartedOperation::Show => "show",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            PartedOperation::CreateTable => 1,
            PartedOperation::CreatePartition | PartedOperation::SetFlag => 3,
            PartedOperation::Show => 0,
        }
    }

    /// Whether validating this operation needs the current partition table.
    pub fn needs_report(self) -> bool {
        matches!(self, PartedOperation::SetFlag)
    }
}

impl fmt::Display for PartedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parted operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for PartedOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s || op.long_name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// A single broken constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("requires {expected} argument(s), {given} supplied")]
    Arity { expected: usize, given: usize },

    #[error("no partition found")]
    NoPartitions,

    #[error("'{value}' is not one of {allowed:?}")]
    NotOneOf {
        /// Which argument was wrong (`format`, `type`, `id`, `flag`, `state`).
        argument: &'static str,
        value: String,
        allowed: Vec<String>,
    },
}

impl Violation {
    fn not_one_of<S: AsRef<str>>(argument: &'static str, value: &str, allowed: &[S]) -> Self {
        Violation::NotOneOf {
            argument,
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

/// Every constraint a call violated. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub operation: PartedOperation,
    pub violations: Vec<Violation>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}.", self.operation, violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Rejection {}

/// What a permitted call asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    /// Arguments for `parted -s <image>`.
    Execute(Vec<String>),
    /// Read-only request for the current report.
    Show,
}

/// Supplies the current partition table when validation needs it.
pub trait ReportSource {
    fn current_report(&self) -> PartitionTableReport;
}

impl ReportSource for PartitionTableReport {
    fn current_report(&self) -> PartitionTableReport {
        self.clone()
    }
}

impl<F> ReportSource for F
where
    F: Fn() -> PartitionTableReport,
{
    fn current_report(&self) -> PartitionTableReport {
        self()
    }
}

/// Validate `args` for `operation`.
///
/// `source` is only consulted for operations that depend on existing partitions.
pub fn validate<S, R>(
    operation: PartedOperation,
    args: &[S],
    source: &R,
) -> Result<Validated, Rejection>
where
    S: AsRef<str>,
    R: ReportSource + ?Sized,
{
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    let reject = |violations: Vec<Violation>| Rejection {
        operation,
        violations,
    };

    if args.len() != operation.arity() {
        return Err(reject(vec![Violation::Arity {
            expected: operation.arity(),
            given: args.len(),
        }]));
    }

    let report = operation
        .needs_report()
        .then(|| source.current_report());

    match operation {
        PartedOperation::Show => Ok(Validated::Show),

        PartedOperation::CreateTable => {
            let format = args[0];
            if !TABLE_FORMATS.contains(&format) {
                return Err(reject(vec![Violation::not_one_of(
                    "format",
                    format,
                    &TABLE_FORMATS,
                )]));
            }
            Ok(Validated::Execute(vec!["mklabel".to_string(), format.to_string()]))
        }

        PartedOperation::CreatePartition => {
            let (part_type, start, end) = (args[0], args[1], args[2]);
            if !PARTITION_TYPES.contains(&part_type) {
                return Err(reject(vec![Violation::not_one_of(
                    "type",
                    part_type,
                    &PARTITION_TYPES,
                )]));
            }
            // Offsets are parted's business: units, percentages and alignment included.
            Ok(Validated::Execute(
                ["mkpart", part_type, start, end]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ))
        }

        PartedOperation::SetFlag => {
            let (id, flag, state) = (args[0], args[1], args[2]);

            let Some(report) =
                report.filter(|r| r.status() == TableStatus::TableWithPartitions)
            else {
                return Err(reject(vec![Violation::NoPartitions]));
            };

            let mut violations = Vec::new();
            if !report.has_partition(id) {
                violations.push(Violation::not_one_of("id", id, &report.ids()));
            }
            if !PARTITION_FLAGS.contains(&flag) {
                violations.push(Violation::not_one_of("flag", flag, &PARTITION_FLAGS));
            }
            if !FLAG_STATES.contains(&state) {
                violations.push(Violation::not_one_of("state", state, &FLAG_STATES));
            }
            if !violations.is_empty() {
                return Err(reject(violations));
            }

            Ok(Validated::Execute(
                ["set", id, flag, state]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ))
        }
    }
}
