//! Text rendering of partition reports.

use tabled::builder::Builder;
use tabled::settings::Style;
use zpart_core::parted::PartitionTableReport;

const COLUMNS: [&str; 7] = ["id", "start", "end", "length", "filesystem", "type", "flags"];

/// Lines printed by `show`.
pub fn render_report(report: &PartitionTableReport) -> String {
    let header = match report {
        PartitionTableReport::Unparseable => return "Cannot parse image.".to_string(),
        PartitionTableReport::NoTable => return "Cannot find partition table.".to_string(),
        PartitionTableReport::TableOnly(header)
        | PartitionTableReport::TableWithPartitions(header, _) => header,
    };

    let mut text = format!("fmt  = {}\nsize = {}\n", header.format, header.total_size);

    let partitions = report.partitions();
    if partitions.is_empty() {
        text.push_str("Cannot find partitions.");
        return text;
    }

    let mut builder = Builder::default();
    builder.push_record(COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());
    for p in partitions {
        builder.push_record(vec![
            p.id.clone(),
            p.start.clone(),
            p.end.clone(),
            p.length.clone(),
            p.filesystem.clone(),
            p.part_type.clone(),
            p.flags.join(", "),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::ascii());
    text.push_str(&table.to_string());
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use zpart_core::parted::parse;

    #[test]
    fn absent_states_have_fixed_messages() {
        assert_eq!(
            render_report(&PartitionTableReport::Unparseable),
            "Cannot parse image."
        );
        assert_eq!(
            render_report(&PartitionTableReport::NoTable),
            "Cannot find partition table."
        );
    }

    #[test]
    fn table_without_partitions_says_so() {
        let report = parse("BYT;\n/tmp/x.img:4295MB:file:512:512:msdos:;\n");
        assert_eq!(
            render_report(&report),
            "fmt  = msdos\nsize = 4295MB\nCannot find partitions."
        );
    }

    #[test]
    fn partitions_are_tabulated() {
        let report = parse(
            "BYT;\n/tmp/x.img:4295MB:file:512:512:gpt:;\n\
             1:17.4kB:128MB:128MB::primary:boot, esp;\n",
        );
        let text = render_report(&report);
        assert!(text.starts_with("fmt  = gpt\nsize = 4295MB\n+"));
        assert!(text.contains("filesystem"));
        assert!(text.contains("17.4kB"));
        assert!(text.contains("boot, esp"));
    }
}
