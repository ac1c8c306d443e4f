//! Linux HAL implementation spawning the real host tools.

use super::{
    GuestOps, ImageInfo, ImageOps, Inventory, PackageOps, PartedOps, ProcessOps, INSTALL_ARGS,
    INSTALL_PROGRAM,
};
use crate::{command_line, HalError, HalResult};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Per-tool timeouts applied by [`LinuxHal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Read-only probes: `parted print`, `qemu-img info`, `virt-filesystems`.
    pub probe: Duration,
    pub parted: Duration,
    pub create: Duration,
    pub mount: Duration,
    pub install: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(60),
            parted: Duration::from_secs(5 * 60),
            create: Duration::from_secs(10 * 60),
            mount: Duration::from_secs(2 * 60),
            install: Duration::from_secs(30 * 60),
        }
    }
}

/// Real HAL implementation for Linux systems.
///
/// Probes capture their output; mutating commands share the terminal with the shell.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal {
    timeouts: Timeouts,
    echo: bool,
    dry_run: bool,
}

impl LinuxHal {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            echo: false,
            dry_run: false,
        }
    }

    /// Print every mutating command line to stdout before running it.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Log mutating commands instead of running them. Probes still run.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Echo and, unless in dry-run, run a mutating command.
    fn mutate(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<()> {
        let line = command_line(program, args);
        if self.echo {
            println!("{}", line);
        }
        if self.dry_run {
            log::info!("DRY RUN: {}", line);
            return Ok(());
        }
        log::debug!("running: {}", line);
        self.command_status(program, args, timeout)
    }

    fn probe(&self, program: &str, args: &[&str]) -> HalResult<String> {
        log::debug!("probing: {}", command_line(program, args));
        let output = self.command_output(program, args, self.timeouts.probe)?;
        if !output.status.success() {
            return Err(output_failed(program, &output));
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

fn output_failed(program: &str, output: &Output) -> HalError {
    HalError::CommandFailed {
        program: program.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

fn output_with_timeout(program: &str, cmd: &mut Command, timeout: Duration) -> HalResult<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| map_command_err(program, e))?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    // Drain pipes concurrently to avoid deadlocks on large output.
    let stdout_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout.take() {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });
    let stderr_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr.take() {
            let _ = err.read_to_end(&mut buf);
        }
        buf
    });

    let status = match child.wait_timeout(timeout).map_err(HalError::Io)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout_handle.join();
            let _ = stderr_handle.join();
            return Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

/// Run with the terminal attached, so the user sees progress and can answer prompts.
fn status_with_timeout(program: &str, cmd: &mut Command, timeout: Duration) -> HalResult<()> {
    let mut child = cmd.spawn().map_err(|e| map_command_err(program, e))?;

    let status = match child.wait_timeout(timeout).map_err(HalError::Io)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(HalError::CommandTimeout {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    if !status.success() {
        // stderr already went to the terminal
        return Err(HalError::CommandFailed {
            program: program.to_string(),
            code: status.code(),
            stderr: String::new(),
        });
    }
    Ok(())
}

impl ProcessOps for LinuxHal {
    fn command_output(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        output_with_timeout(program, &mut cmd, timeout)
    }

    fn command_status(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<()> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        status_with_timeout(program, &mut cmd, timeout)
    }

    fn command_interactive(&self, program: &str, args: &[&str]) -> HalResult<()> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| map_command_err(program, e))?;
        if !status.success() {
            return Err(HalError::CommandFailed {
                program: program.to_string(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

impl PartedOps for LinuxHal {
    fn parted_print(&self, image: &Path) -> HalResult<String> {
        let image = image.display().to_string();
        self.probe("parted", &[image.as_str(), "-s", "print", "-m"])
    }

    fn parted_run(&self, image: &Path, args: &[String]) -> HalResult<()> {
        let image = image.display().to_string();
        let mut argv: Vec<&str> = vec![image.as_str(), "-s"];
        argv.extend(args.iter().map(String::as_str));
        self.mutate("parted", &argv, self.timeouts.parted)
    }
}

impl ImageOps for LinuxHal {
    fn image_info(&self, image: &Path) -> HalResult<ImageInfo> {
        let image = image.display().to_string();
        let raw = self.probe("qemu-img", &["info", "--output", "json", image.as_str()])?;
        ImageInfo::from_json(&raw)
    }

    fn image_create(&self, image: &Path, format: &str, size: &str) -> HalResult<()> {
        let image = image.display().to_string();
        self.mutate(
            "qemu-img",
            &["create", "-f", format, image.as_str(), size],
            self.timeouts.create,
        )
    }
}

impl GuestOps for LinuxHal {
    fn list_inventory(&self, image: &Path, what: Inventory) -> HalResult<String> {
        let image = image.display().to_string();
        self.probe("virt-filesystems", &["-a", image.as_str(), what.flag()])
    }

    fn guest_mount(&self, image: &Path, fs: &str, mountpoint: &Path) -> HalResult<()> {
        let image = image.display().to_string();
        let mountpoint = mountpoint.display().to_string();
        self.mutate(
            "guestmount",
            &[
                "-o",
                "allow_other",
                "-a",
                image.as_str(),
                "-m",
                fs,
                mountpoint.as_str(),
            ],
            self.timeouts.mount,
        )
    }

    fn guest_unmount(&self, mountpoint: &Path) -> HalResult<()> {
        let mountpoint = mountpoint.display().to_string();
        self.mutate("guestunmount", &[mountpoint.as_str()], self.timeouts.mount)
    }

    fn guestfish(&self, image: &Path) -> HalResult<()> {
        let image = image.display().to_string();
        let args = ["-a", image.as_str()];
        if self.dry_run {
            log::info!("DRY RUN: {}", command_line("guestfish", &args));
            return Ok(());
        }
        self.command_interactive("guestfish", &args)
    }
}

impl PackageOps for LinuxHal {
    fn install_packages(&self, packages: &[&str]) -> HalResult<()> {
        let mut args = INSTALL_ARGS.to_vec();
        args.extend_from_slice(packages);
        self.mutate(INSTALL_PROGRAM, &args, self.timeouts.install)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_program_maps_to_command_not_found() {
        let hal = LinuxHal::default();
        let err = hal
            .command_output("zpart-no-such-tool", &[], Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandNotFound(ref p) if p == "zpart-no-such-tool"));
    }

    #[test]
    fn failed_probe_carries_stderr() {
        let hal = LinuxHal::default();
        let err = hal.probe("sh", &["-c", "echo nope >&2; exit 3"]).unwrap_err();
        match err {
            HalError::CommandFailed {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failed_mutation_reports_exit_code() {
        let hal = LinuxHal::default();
        let err = hal
            .mutate("sh", &["-c", "exit 4"], Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandFailed { code: Some(4), .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn mutation_inherits_stdin() {
        let dir = tempdir().unwrap();
        let seen = dir.path().join("stdin");
        let script = format!("readlink /proc/self/fd/0 > '{}'", seen.display());

        let hal = LinuxHal::default();
        hal.mutate("sh", &["-c", &script], Duration::from_secs(5))
            .unwrap();

        let ours = std::fs::read_link("/proc/self/fd/0").unwrap();
        let child = std::fs::read_to_string(&seen).unwrap();
        assert_eq!(child.trim_end(), ours.to_string_lossy());
    }

    #[test]
    fn slow_mutation_times_out() {
        let hal = LinuxHal::default();
        let err = hal
            .command_status("sleep", &["5"], Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandTimeout { .. }));
    }

    #[test]
    fn slow_command_times_out() {
        let hal = LinuxHal::default();
        let err = hal
            .command_output("sleep", &["5"], Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, HalError::CommandTimeout { .. }));
    }

    #[test]
    fn dry_run_skips_mutations() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("never.img");

        let hal = LinuxHal::default().with_dry_run(true);
        hal.image_create(&image, "raw", "1G").unwrap();

        assert!(!image.exists());
    }
}
