use std::fs::File;
use tempfile::tempdir;
use zpart_hal::{FakeHal, Inventory, Operation};
use zpart_shell::shell::{Shell, Step, TOOL_PACKAGES};

const GPT_TWO_PARTS: &str = "BYT;\n\
/tmp/disk.img:4295MB:file:512:512:gpt::;\n\
1:17.4kB:128MB:128MB:fat32:primary:boot, esp;\n\
2:128MB:4295MB:4167MB:ext4:primary:;\n";

fn run_script(hal: &FakeHal, script: &str) -> (usize, String, String) {
    let mut shell = Shell::new(hal, "zpart", Vec::new(), Vec::new());
    let failures = shell.batch(script).expect("batch");
    let (out, err) = shell.into_writers();
    (
        failures,
        String::from_utf8(out).expect("utf8 stdout"),
        String::from_utf8(err).expect("utf8 stderr"),
    )
}

fn parted_runs(hal: &FakeHal) -> Vec<Vec<String>> {
    hal.operations()
        .into_iter()
        .filter_map(|op| match op {
            Operation::PartedRun { args, .. } => Some(args),
            _ => None,
        })
        .collect()
}

#[test]
fn partitioning_script_runs_parted_in_order() {
    let temp = tempdir().expect("tempdir");
    let image = temp.path().join("disk.img");
    let hal = FakeHal::new().with_parted_output(GPT_TWO_PARTS);

    let script = format!(
        "image {}\n\
         set format raw\n\
         set size 4G\n\
         create\n\
         parted\n\
         mktbl gpt\n\
         mkpart primary 0% 128MB\n\
         mkpart primary 128MB 100%\n\
         set 1 boot on\n\
         exit\n\
         exit\n",
        image.display()
    );
    let (failures, _, err) = run_script(&hal, &script);
    assert_eq!(failures, 0, "stderr: {err}");

    assert!(hal.has_operation(|op| matches!(
        op,
        Operation::ImageCreate { format, size, .. } if format == "raw" && size == "4G"
    )));
    assert_eq!(
        parted_runs(&hal),
        vec![
            vec!["mklabel", "gpt"],
            vec!["mkpart", "primary", "0%", "128MB"],
            vec!["mkpart", "primary", "128MB", "100%"],
            vec!["set", "1", "boot", "on"],
        ]
    );
}

#[test]
fn show_renders_partition_table() {
    let hal = FakeHal::new().with_parted_output(GPT_TWO_PARTS);
    let (failures, out, _) = run_script(
        &hal,
        "image /nonexistent/disk.img\nset format raw\nparted\nshow\n",
    );
    assert_eq!(failures, 0);
    assert!(out.contains("fmt  = gpt\nsize = 4295MB\n"));
    assert!(out.contains("fat32"));
    assert!(out.contains("boot, esp"));
    assert!(out.contains("4167MB"));
}

#[test]
fn show_without_table_reports_it() {
    let hal = FakeHal::new().with_parted_output("BYT;\n");
    let (failures, out, _) = run_script(
        &hal,
        "image /nonexistent/disk.img\nset format raw\nparted\nshow\n",
    );
    assert_eq!(failures, 0);
    assert!(out.contains("Cannot find partition table."));
}

#[test]
fn rejected_commands_never_reach_parted() {
    let hal = FakeHal::new().with_parted_output(GPT_TWO_PARTS);
    let (failures, _, err) = run_script(
        &hal,
        "image /nonexistent/disk.img\n\
         set format raw\n\
         parted\n\
         mktbl zfs\n\
         mkpart bogus 0% 100%\n\
         set 9 dance maybe\n\
         mktbl\n",
    );
    assert_eq!(failures, 4);
    assert!(parted_runs(&hal).is_empty());

    let lines: Vec<&str> = err.lines().collect();
    assert!(lines[0].starts_with("mktbl: 'zfs' is not one of"));
    assert!(lines[1].starts_with("mkpart: 'bogus' is not one of"));
    // all three violations of `set` are reported
    assert!(lines[2].starts_with("set: '9' is not one of [\"1\", \"2\"]"));
    assert!(lines[3].starts_with("set: 'dance' is not one of"));
    assert!(lines[4].starts_with("set: 'maybe' is not one of"));
    assert_eq!(lines[5], "mktbl: requires 1 argument(s), 0 supplied.");
}

#[test]
fn set_flag_without_partitions_is_refused() {
    let hal = FakeHal::new()
        .with_parted_output("BYT;\n/tmp/disk.img:4295MB:file:512:512:msdos::;\n");
    let (failures, _, err) = run_script(
        &hal,
        "image /nonexistent/disk.img\nset format raw\nparted\nset 1 boot on\n",
    );
    assert_eq!(failures, 1);
    assert_eq!(err, "set: no partition found.\n");
    assert!(parted_runs(&hal).is_empty());
}

#[test]
fn parted_failure_is_reported_and_script_continues() {
    let hal = FakeHal::new().with_parted_output(GPT_TWO_PARTS);
    hal.fail_program("parted");
    let (failures, out, err) = run_script(
        &hal,
        "image /nonexistent/disk.img\nset format raw\nparted\nmktbl gpt\nshow\n",
    );
    assert_eq!(failures, 1);
    assert!(err.starts_with("mktbl: execution failed:"));
    assert!(out.contains("Cannot parse image."));
}

#[test]
fn parted_needs_raw_format() {
    let hal = FakeHal::new();
    let (failures, _, err) = run_script(
        &hal,
        "image /nonexistent/disk.img\nset format qcow2\nparted\nmktbl gpt\n",
    );
    // parted is refused, so mktbl is unknown in the image shell
    assert_eq!(failures, 2);
    assert_eq!(
        err,
        "parted: format 'qcow2' is not 'raw'.\nmktbl: command not found.\n"
    );
}

#[test]
fn existing_image_is_probed() {
    let temp = tempdir().expect("tempdir");
    let image = temp.path().join("disk.qcow2");
    File::create(&image).expect("create image");
    let hal = FakeHal::new().with_image_info("qcow2", 1 << 30);

    let (failures, out, _) = run_script(&hal, &format!("image {}\nget\n", image.display()));
    assert_eq!(failures, 0);
    assert!(out.contains("format:\t\tqcow2"));
    assert!(out.contains(&format!("size:\t\t{}", 1u64 << 30)));
}

#[test]
fn listings_are_cached_until_image_changes() {
    let temp = tempdir().expect("tempdir");
    let image = temp.path().join("disk.img");
    File::create(&image).expect("create image");
    let hal = FakeHal::new().with_image_info("raw", 1 << 30);
    hal.set_inventory(Inventory::Filesystems, "/dev/sda1\n/dev/sda2\n");

    let (failures, out, _) = run_script(
        &hal,
        &format!("image {}\nls fs\nls fs\nls part\n", image.display()),
    );
    assert_eq!(failures, 0);
    assert_eq!(out.matches("/dev/sda1").count(), 2);
    let listings = hal
        .operations()
        .into_iter()
        .filter(|op| matches!(op, Operation::ListInventory { .. }))
        .count();
    assert_eq!(listings, 2);
}

#[test]
fn mount_and_umount_use_guest_tools() {
    let temp = tempdir().expect("tempdir");
    let mnt = temp.path().join("mnt");
    std::fs::create_dir(&mnt).expect("mkdir");
    let hal = FakeHal::new();

    let script = format!(
        "image /nonexistent/disk.img\nmount /dev/sda1 {0}\numount {0}\numount {0}/missing\n",
        mnt.display()
    );
    let (failures, _, err) = run_script(&hal, &script);
    assert_eq!(failures, 1);
    assert!(err.contains("is not a directory"));
    assert!(hal.has_operation(|op| matches!(
        op,
        Operation::GuestMount { fs, .. } if fs == "/dev/sda1"
    )));
    assert!(hal.has_operation(|op| matches!(op, Operation::GuestUnmount { .. })));
}

#[test]
fn guestfish_prints_cheatsheet_first() {
    let hal = FakeHal::new();
    let (failures, out, _) = run_script(&hal, "image /nonexistent/disk.img\nguestfish\n");
    assert_eq!(failures, 0);
    assert!(out.contains("Most useful commands in the guestfish shell"));
    assert!(hal.has_operation(|op| matches!(op, Operation::Guestfish { .. })));
}

#[test]
fn install_tools_installs_prerequisites() {
    let hal = FakeHal::new();
    let (failures, out, _) = run_script(&hal, "install-tools\n");
    assert_eq!(failures, 0);
    assert!(out.starts_with("NOTE:"));
    assert!(hal.has_operation(|op| matches!(
        op,
        Operation::InstallPackages { packages } if packages == &TOOL_PACKAGES
    )));
}

#[test]
fn exit_at_root_stops_the_script() {
    let hal = FakeHal::new();
    let mut shell = Shell::new(&hal, "zpart", Vec::new(), Vec::new());
    assert_eq!(shell.execute_line("exit").expect("exit"), Step::Exit);

    let (failures, _, _) = run_script(&hal, "exit\ninstall-tools\n");
    assert_eq!(failures, 0);
    assert_eq!(hal.operation_count(), 0);
}
