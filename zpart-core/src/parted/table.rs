//! Parser for the machine-readable output of `parted print -m`.
//!
//! The output looks like this (anything before the `BYT;` marker is noise):
//!
//! ```text
//! BYT;
//! /tmp/tmp.img:4295MB:file:512:512:gpt:;
//! 1:17.4kB:128MB:128MB::primary:boot;
//! 2:300MB:1000MB:700MB::logical:;
//! ```
//!
//! The first line after the marker describes the disk, every following line one partition.
//! Fields are separated by `:` and each record is terminated by `;`.

use std::collections::HashSet;
use std::fmt;

const SENTINEL: &str = "BYT;";
const TITLE_MIN_TOKENS: usize = 6;
const PARTITION_TOKENS: usize = 7;

/// How much the report managed to say about the image, ordered from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableStatus {
    Unparseable,
    NoTable,
    TableOnly,
    TableWithPartitions,
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableStatus::Unparseable => "unparseable",
            TableStatus::NoTable => "no table",
            TableStatus::TableOnly => "table only",
            TableStatus::TableWithPartitions => "table with partitions",
        };
        f.write_str(s)
    }
}

/// The disk line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub path: String,
    pub total_size: String,
    pub transport: String,
    pub logical_sector_size: String,
    pub physical_sector_size: String,
    /// Partition table format, e.g. `gpt` or `msdos`.
    pub format: String,
    pub model: String,
}

/// One partition line of the report. Sizes are kept as the tool printed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRecord {
    pub id: String,
    pub start: String,
    pub end: String,
    pub length: String,
    pub filesystem: String,
    pub part_type: String,
    pub flags: Vec<String>,
}

/// Parsed view of the partition table of an image.
///
/// Built fresh from the tool output on every query; never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionTableReport {
    Unparseable,
    NoTable,
    TableOnly(TableHeader),
    TableWithPartitions(TableHeader, Vec<PartitionRecord>),
}

impl PartitionTableReport {
    pub fn status(&self) -> TableStatus {
        match self {
            PartitionTableReport::Unparseable => TableStatus::Unparseable,
            PartitionTableReport::NoTable => TableStatus::NoTable,
            PartitionTableReport::TableOnly(_) => TableStatus::TableOnly,
            PartitionTableReport::TableWithPartitions(..) => TableStatus::TableWithPartitions,
        }
    }

    pub fn header(&self) -> Option<&TableHeader> {
        match self {
            PartitionTableReport::TableOnly(header)
            | PartitionTableReport::TableWithPartitions(header, _) => Some(header),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<&str> {
        self.header().map(|h| h.format.as_str())
    }

    pub fn total_size(&self) -> Option<&str> {
        self.header().map(|h| h.total_size.as_str())
    }

    pub fn partitions(&self) -> &[PartitionRecord] {
        match self {
            PartitionTableReport::TableWithPartitions(_, partitions) => partitions,
            _ => &[],
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.partitions().iter().map(|p| p.id.as_str()).collect()
    }

    pub fn has_partition(&self, id: &str) -> bool {
        self.partitions().iter().any(|p| p.id == id)
    }
}

/// Parse the stdout of `parted -s <image> print -m`.
///
/// Never fails: malformed output degrades to the least informative status that still holds.
/// Only call this on output of a successful run; a failed run is `Unparseable` by definition.
pub fn parse(raw: &str) -> PartitionTableReport {
    let lines: Vec<&str> = raw.trim_end().lines().collect();

    let Some(sentinel) = lines.iter().position(|line| line.trim() == SENTINEL) else {
        log::debug!("parted output has no {} marker", SENTINEL);
        return PartitionTableReport::Unparseable;
    };

    let Some(title) = lines.get(sentinel + 1) else {
        return PartitionTableReport::NoTable;
    };

    let Some(header) = parse_title(title) else {
        log::warn!("malformed parted disk line: {:?}", title);
        return PartitionTableReport::Unparseable;
    };

    let rows = &lines[sentinel + 2..];
    if rows.is_empty() {
        return PartitionTableReport::TableOnly(header);
    }

    let mut seen = HashSet::new();
    let mut partitions = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(record) = parse_partition(row) else {
            log::warn!("malformed parted partition line: {:?}", row);
            return PartitionTableReport::TableOnly(header);
        };
        if !seen.insert(record.id.clone()) {
            log::warn!("duplicate partition id {:?} in parted output", record.id);
            return PartitionTableReport::TableOnly(header);
        }
        partitions.push(record);
    }

    PartitionTableReport::TableWithPartitions(header, partitions)
}

fn strip_record(line: &str) -> &str {
    let line = line.trim();
    line.strip_suffix(';').unwrap_or(line)
}

fn parse_title(line: &str) -> Option<TableHeader> {
    let toks: Vec<&str> = strip_record(line).split(':').collect();
    if toks.len() < TITLE_MIN_TOKENS {
        return None;
    }
    let tok = |i: usize| toks.get(i).map(|s| s.to_string()).unwrap_or_default();
    Some(TableHeader {
        path: tok(0),
        total_size: tok(1),
        transport: tok(2),
        logical_sector_size: tok(3),
        physical_sector_size: tok(4),
        format: tok(5),
        model: tok(6),
    })
}

fn parse_partition(line: &str) -> Option<PartitionRecord> {
    let record = strip_record(line);
    // one record per line; a second terminator means two records ran together
    if record.contains(';') {
        return None;
    }
    let toks: Vec<&str> = record.split(':').collect();
    let [id, start, end, length, filesystem, part_type, flags] = toks.as_slice() else {
        return None;
    };
    if id.is_empty() {
        return None;
    }
    Some(PartitionRecord {
        id: id.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        length: length.to_string(),
        filesystem: filesystem.to_string(),
        part_type: part_type.to_string(),
        flags: parse_flags(flags),
    })
}

fn parse_flags(raw: &str) -> Vec<String> {
    raw.split([',', ' '])
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
BYT;
/tmp/tmp.img:4295MB:file:512:512:gpt::;
1:17.4kB:128MB:128MB::primary:boot;
2:300MB:1000MB:700MB:ext4:logical:;
3:1000MB:2000MB:999MB::logical:boot, esp;
";

    #[test]
    fn end_to_end_single_partition() {
        let raw = "BYT;\n/tmp/x.img:4295MB:file:512:512:gpt:;\n1:17.4kB:128MB:128MB::primary:boot;";
        let report = parse(raw);
        assert_eq!(report.status(), TableStatus::TableWithPartitions);
        assert_eq!(report.format(), Some("gpt"));
        assert_eq!(report.total_size(), Some("4295MB"));
        assert_eq!(
            report.partitions(),
            &[PartitionRecord {
                id: "1".to_string(),
                start: "17.4kB".to_string(),
                end: "128MB".to_string(),
                length: "128MB".to_string(),
                filesystem: String::new(),
                part_type: "primary".to_string(),
                flags: vec!["boot".to_string()],
            }]
        );
    }

    #[test]
    fn partitions_follow_file_order() {
        let report = parse(FULL);
        assert_eq!(report.ids(), vec!["1", "2", "3"]);
        let parts = report.partitions();
        assert_eq!(parts[1].filesystem, "ext4");
        assert!(parts[1].flags.is_empty());
        assert_eq!(parts[2].flags, vec!["boot", "esp"]);
    }

    #[test]
    fn noise_before_marker_is_ignored() {
        let raw = format!("Warning: something odd\n  \n{}", FULL);
        assert_eq!(parse(&raw).partitions().len(), 3);
    }

    #[test]
    fn marker_is_matched_after_trimming() {
        let raw = "  BYT;  \n/tmp/x.img:1MB:file:512:512:msdos:;\n";
        assert_eq!(parse(raw).format(), Some("msdos"));
    }

    #[test]
    fn missing_marker_is_unparseable() {
        let raw = "/tmp/x.img:4295MB:file:512:512:gpt:;\n1:17.4kB:128MB:128MB::primary:boot;";
        assert_eq!(parse(raw), PartitionTableReport::Unparseable);
        assert_eq!(parse("CHS;\n"), PartitionTableReport::Unparseable);
    }

    #[test]
    fn marker_as_last_line_is_no_table() {
        assert_eq!(parse("BYT;\n"), PartitionTableReport::NoTable);
        assert_eq!(parse("BYT;"), PartitionTableReport::NoTable);
    }

    #[test]
    fn title_only_is_table_only() {
        let report = parse("BYT;\n/tmp/x.img:4295MB:file:512:512:msdos:;\n");
        assert_eq!(report.status(), TableStatus::TableOnly);
        assert_eq!(report.format(), Some("msdos"));
        assert_eq!(report.total_size(), Some("4295MB"));
        assert!(report.partitions().is_empty());
        let header = report.header().unwrap();
        assert_eq!(header.path, "/tmp/x.img");
        assert_eq!(header.model, "");
    }

    #[test]
    fn short_title_line_is_unparseable() {
        assert_eq!(
            parse("BYT;\n/tmp/x.img:4295MB:file:512;\n"),
            PartitionTableReport::Unparseable
        );
    }

    #[test]
    fn malformed_partition_line_degrades_to_table_only() {
        let raw = "BYT;\n/tmp/x.img:4295MB:file:512:512:gpt:;\n1:17.4kB:128MB;\n";
        let report = parse(raw);
        assert_eq!(report.status(), TableStatus::TableOnly);
        assert_eq!(report.format(), Some("gpt"));
    }

    #[test]
    fn stray_terminator_inside_record_degrades_to_table_only() {
        let raw = "BYT;\n/tmp/x.img:4295MB:file:512:512:gpt:;\n\
                   1:17.4kB:128MB:128MB::primary:boot;extra\n";
        let report = parse(raw);
        assert_eq!(report.status(), TableStatus::TableOnly);
        assert!(report.partitions().is_empty());
    }

    #[test]
    fn duplicate_ids_degrade_to_table_only() {
        let raw = "BYT;\n/tmp/x.img:4295MB:file:512:512:gpt:;\n\
                   1:1MB:2MB:1MB::primary:;\n1:2MB:3MB:1MB::primary:;\n";
        assert_eq!(parse(raw).status(), TableStatus::TableOnly);
    }

    #[test]
    fn parse_is_pure() {
        assert_eq!(parse(FULL), parse(FULL));
    }

    #[test]
    fn status_is_ordered_by_information() {
        assert!(TableStatus::Unparseable < TableStatus::NoTable);
        assert!(TableStatus::NoTable < TableStatus::TableOnly);
        assert!(TableStatus::TableOnly < TableStatus::TableWithPartitions);
    }

    #[test]
    fn absent_states_expose_nothing() {
        for report in [PartitionTableReport::Unparseable, PartitionTableReport::NoTable] {
            assert_eq!(report.format(), None);
            assert_eq!(report.total_size(), None);
            assert!(report.partitions().is_empty());
        }
    }
}
