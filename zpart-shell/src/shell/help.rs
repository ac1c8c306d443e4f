//! Help texts for the three shells.

pub const WELCOME: &str = "\
Welcome to zpart!
zpart: Create, partition, format, and mount disk images with ease.

Enter 'help' to list commands, 'help <cmd>' for details.
";

pub const GOODBYE: &str = "Thanks for using zpart. Bye!";

pub const ROOT: &str = "\
    image           Select a disk image to work on.
    install-tools   Install the tools this shell uses.
    exit            Leave zpart.";

pub const IMAGE: &str = "\
Manage a disk image.

    create          Create disk image.
    get             Show attributes.
    guestfish       Invoke the libguestfs shell, guestfish.
    ls              Display devices/partitions/filesystems on the disk image.
    mount           Mount a filesystem from the disk image.
    parted          Partition. Only raw format can use it.
    set             Set attributes.
    umount          Umount a filesystem.
    exit            Return to the previous shell.";

pub const PARTED: &str = "\
Create partition table and partitions.

    mktbl           Create the partition table.
    mkpart          Create a partition.
    set             Set flags for partitions.
    show            Display partition table and partitions, if any.
    exit            Return to the image shell.";

const IMAGE_CMD: &str = "\
Select a disk image to work on.
    image <file>        Select the image to create/re-create, enter a subshell.
                        If <file> already exists, its format and size are read
                        using `qemu-img info`. If <file> does not exist, the
                        format and size of the image need to be set in the
                        subshell using the 'set' command.";

const INSTALL_TOOLS: &str = "\
Install tools that this shell uses.
    install-tools       sudo apt-get install <prerequisites>.";

const SET_ATTR: &str = "\
Set a disk attribute.
    set <attribute> <value>

    <attribute> is one of
        file                The complete filename of the disk image.
        format              The format of the disk image, one of {raw,qcow2}.
        size                Virtual size of the disk image. You may use k, M, G, T,
                            P or E suffixes. Note that 1k = 1024 here. A plain
                            positive integer is a number of bytes.

To see the current values of attributes, use the 'get' command.";

const GET: &str = "\
Show disk attribute(s).
    get                 Show all attributes.
    get <attribute>     Show an attribute.";

const CREATE: &str = "\
Use qemu-img to create disk image.
    create              Create the disk image. Overwrites an existing file.";

const LS: &str = "\
List information on the disk image.
    ls dev              List devices, e.g., /dev/sda.
    ls fs               List mountable filesystems, e.g., /dev/sda1.
    ls part             List partitions, e.g., /dev/sda1.";

const MOUNT: &str = "\
Mount a filesystem using guestmount.
    mount <fs> <mnt>    Mount a filesystem, <fs>, onto a mount point, <mnt>. The
                        <fs> must be one of the mountable filesystems, i.e., the
                        ones listed by `ls fs`.";

const UMOUNT: &str = "\
Unmount a filesystem mounted via the 'mount' command.
    umount <mnt>        Unmount <mnt>.";

const PARTED_CMD: &str = "\
Partition the disk image using parted.
    parted              Enter the parted subshell. Usable only when format=raw.";

const GUESTFISH: &str = "\
Enter the libguestfs shell, guestfish, to manage the disk image.
Usable for disk images of all formats.";

const MKTBL: &str = "\
Create partition table.
    mktbl <tbl_fmt>     Create partition table of format <tbl_fmt>,
                        which can be one of the following:
                                bsd   dvh   gpt   loop
                                mac   msdos pc98  sun
                        Rule of thumb: msdos for DOS, gpt for Linux.

WARNING: This operation will erase all data on the disk image without prompting
for confirmation.";

const MKPART: &str = "\
Create a new partition.
    mkpart <type> <start> <end>

<type> is one of: primary, logical, extended

<start> and <end> are offsets. You can use k, M, G, T, and % (percent) as
suffix. Without any suffix, the unit is byte. Note that here 1k = 1000.

The actual offsets of a partition might differ from the requested ones due to
alignment.";

const SET_FLAG: &str = "\
Set flags for partitions.
    set <id> <flag> {on,off}    Set <flag> to on/off for the <id>-th partition.

<id> must be one of the ids displayed by the 'show' command.

<flag> must be one of:
        boot root swap hidden raid lvm lba legacy_boot palo

Certain flags are only applicable to a specific filesystem. Consult parted(8).";

const SHOW: &str = "\
Display the partition table.
    show";

pub const GUESTFISH_CHEATSHEET: &str = "\
Most useful commands in the guestfish shell:

    help <cmd>                          detailed help for <cmd>
    run                                 start the appliance
    list-devices, list-partitions, list-filesystems
    part-init, part-add, part-del       partition table and partitions
    part-set-bootable, part-set-name
    mkfs, mkfs-opts                     create file systems
    mount, mount-ro, umount, umount-all
    lcd                                 change guestfish's local directory
    cat, cp-a, download, edit, ls, ll, mkdir-p, mv, rm-rf, write, write-append
";

/// Detailed help for `command` in the root shell.
pub fn root_command(command: &str) -> Option<&'static str> {
    match command {
        "image" => Some(IMAGE_CMD),
        "install-tools" => Some(INSTALL_TOOLS),
        _ => None,
    }
}

/// Detailed help for `command` in the image subshell.
pub fn image_command(command: &str) -> Option<&'static str> {
    match command {
        "set" => Some(SET_ATTR),
        "get" => Some(GET),
        "create" => Some(CREATE),
        "ls" => Some(LS),
        "mount" => Some(MOUNT),
        "umount" => Some(UMOUNT),
        "parted" => Some(PARTED_CMD),
        "guestfish" => Some(GUESTFISH),
        _ => None,
    }
}

/// Detailed help for `command` in the parted subshell.
pub fn parted_command(command: &str) -> Option<&'static str> {
    match command {
        "mktbl" | "create-table" => Some(MKTBL),
        "mkpart" | "create-partition" => Some(MKPART),
        "set" | "set-flag" => Some(SET_FLAG),
        "show" => Some(SHOW),
        _ => None,
    }
}
