//! The zpart command shell.
//!
//! A stack of modes: the root shell, an image subshell entered with `image <file>`, and the
//! parted subshell entered from it with `parted`. `exit` leaves the innermost mode.

pub mod help;
pub mod render;

use std::io::{self, BufRead, Write};
use zpart_core::image::{ImageCommand, ImageOutcome, ImageSession};
use zpart_core::parted::{CommandError, Outcome, PartedOperation, PartedSession};
use zpart_hal::SystemHal;

/// Packages `install-tools` pulls in.
pub const TOOL_PACKAGES: [&str; 3] = ["parted", "kpartx", "libguestfs-tools"];

/// Result of one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Done,
    Failed,
    Exit,
}

enum Mode<'h, H: SystemHal + ?Sized> {
    Image(ImageSession<'h, H>),
    Parted(PartedSession<'h, H>),
}

impl<'h, H: SystemHal + ?Sized> Mode<'h, H> {
    fn name(&self) -> String {
        match self {
            Mode::Image(session) => session
                .file()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| session.file().display().to_string()),
            Mode::Parted(_) => "parted".to_string(),
        }
    }
}

pub struct Shell<'h, H: SystemHal + ?Sized, O: Write, E: Write> {
    hal: &'h H,
    root_prompt: String,
    modes: Vec<Mode<'h, H>>,
    out: O,
    err: E,
}

impl<'h, H: SystemHal + ?Sized, O: Write, E: Write> Shell<'h, H, O, E> {
    pub fn new(hal: &'h H, root_prompt: &str, out: O, err: E) -> Self {
        Self {
            hal,
            root_prompt: root_prompt.to_string(),
            modes: Vec::new(),
            out,
            err,
        }
    }

    pub fn prompt(&self) -> String {
        let mut prompt = self.root_prompt.clone();
        for mode in &self.modes {
            prompt.push('/');
            prompt.push_str(&mode.name());
        }
        prompt.push_str("> ");
        prompt
    }

    /// Number of subshells currently entered.
    pub fn depth(&self) -> usize {
        self.modes.len()
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Read commands from `input` until EOF or `exit` at the root.
    pub fn cmdloop<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        writeln!(self.out, "{}", help::WELCOME)?;
        let mut line = String::new();
        loop {
            write!(self.out, "{}", self.prompt())?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            if self.execute_line(&line)? == Step::Exit {
                break;
            }
        }
        writeln!(self.out, "{}", help::GOODBYE)?;
        Ok(())
    }

    /// Run every line of `script`. Returns the number of failed commands.
    pub fn batch(&mut self, script: &str) -> io::Result<usize> {
        let mut failures = 0;
        for (n, line) in script.lines().enumerate() {
            match self.execute_line(line)? {
                Step::Done => {}
                Step::Failed => {
                    log::warn!("script line {} failed: {}", n + 1, line.trim());
                    failures += 1;
                }
                Step::Exit => break,
            }
        }
        Ok(failures)
    }

    pub fn execute_line(&mut self, line: &str) -> io::Result<Step> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Step::Done);
        }
        let Some(words) = shlex::split(line) else {
            writeln!(self.err, "syntax error: unbalanced quotes.")?;
            return Ok(Step::Failed);
        };
        let Some((command, args)) = words.split_first() else {
            return Ok(Step::Done);
        };
        log::debug!("{}{}", self.prompt(), line);

        match command.as_str() {
            "exit" | "quit" => return Ok(self.leave()),
            "help" | "?" => return self.help(args),
            _ => {}
        }

        match self.modes.len() {
            0 => self.root_command(command, args),
            _ => match self.modes.last() {
                Some(Mode::Image(_)) => self.image_command(command, args),
                _ => self.parted_command(command, args),
            },
        }
    }

    fn leave(&mut self) -> Step {
        match self.modes.pop() {
            Some(_) => Step::Done,
            None => Step::Exit,
        }
    }

    fn help(&mut self, args: &[String]) -> io::Result<Step> {
        let mode = self.modes.last();
        let text = match args {
            [] => Some(match mode {
                None => help::ROOT,
                Some(Mode::Image(_)) => help::IMAGE,
                Some(Mode::Parted(_)) => help::PARTED,
            }),
            [command] => match mode {
                None => help::root_command(command),
                Some(Mode::Image(_)) => help::image_command(command),
                Some(Mode::Parted(_)) => help::parted_command(command),
            },
            _ => {
                writeln!(
                    self.err,
                    "help: requires 0 or 1 argument(s), {} supplied.",
                    args.len()
                )?;
                return Ok(Step::Failed);
            }
        };
        match text {
            Some(text) => {
                writeln!(self.out, "{}", text)?;
                Ok(Step::Done)
            }
            None => {
                writeln!(self.err, "help: no help on '{}'.", args.join(" "))?;
                Ok(Step::Failed)
            }
        }
    }

    fn not_found(&mut self, command: &str) -> io::Result<Step> {
        writeln!(self.err, "{}: command not found.", command)?;
        Ok(Step::Failed)
    }

    fn root_command(&mut self, command: &str, args: &[String]) -> io::Result<Step> {
        match command {
            "image" => {
                let [file] = args else {
                    writeln!(
                        self.err,
                        "image: requires 1 argument(s), {} supplied.",
                        args.len()
                    )?;
                    return Ok(Step::Failed);
                };
                let session = ImageSession::open(self.hal, file);
                log::info!("entering image shell for {}", session.file().display());
                self.modes.push(Mode::Image(session));
                Ok(Step::Done)
            }
            "install-tools" => {
                if !args.is_empty() {
                    writeln!(
                        self.err,
                        "install-tools: requires 0 argument(s), {} supplied.",
                        args.len()
                    )?;
                    return Ok(Step::Failed);
                }
                writeln!(
                    self.out,
                    "NOTE: If prompted to configure libguestfs-tools, choose YES."
                )?;
                if let Err(err) = self.hal.install_packages(&TOOL_PACKAGES) {
                    writeln!(self.err, "install-tools: execution failed: {}", err)?;
                    return Ok(Step::Failed);
                }
                Ok(Step::Done)
            }
            _ => self.not_found(command),
        }
    }

    fn image_command(&mut self, command: &str, args: &[String]) -> io::Result<Step> {
        let parsed = match ImageCommand::parse(command, args) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return self.not_found(command),
            Err(err) => {
                writeln!(self.err, "{}", err)?;
                return Ok(Step::Failed);
            }
        };
        if parsed == ImageCommand::Guestfish {
            writeln!(self.out, "{}", help::GUESTFISH_CHEATSHEET)?;
        }

        let Some(Mode::Image(session)) = self.modes.last_mut() else {
            return self.not_found(command);
        };
        match session.run(parsed) {
            Ok(ImageOutcome::Done) => {}
            Ok(ImageOutcome::Show(lines)) => {
                for line in lines {
                    writeln!(self.out, "{}", line)?;
                }
            }
            Ok(ImageOutcome::Listing(listing)) => write!(self.out, "{}", listing)?,
            Ok(ImageOutcome::EnterParted) => match session.parted() {
                Ok(parted) => self.modes.push(Mode::Parted(parted)),
                Err(err) => {
                    writeln!(self.err, "{}", err)?;
                    return Ok(Step::Failed);
                }
            },
            Err(err) => {
                writeln!(self.err, "{}", err)?;
                return Ok(Step::Failed);
            }
        }
        Ok(Step::Done)
    }

    fn parted_command(&mut self, command: &str, args: &[String]) -> io::Result<Step> {
        let Ok(operation) = command.parse::<PartedOperation>() else {
            return self.not_found(command);
        };
        let Some(Mode::Parted(session)) = self.modes.last() else {
            return self.not_found(command);
        };
        match session.run(operation, args) {
            Ok(Outcome::Report(report)) => {
                writeln!(self.out, "{}", render::render_report(&report))?;
                Ok(Step::Done)
            }
            Ok(Outcome::Executed(argv)) => {
                log::info!("parted {} done", argv.join(" "));
                Ok(Step::Done)
            }
            Err(err) => {
                if let CommandError::ExecutionFailed { .. } = err {
                    log::error!("{}", err);
                }
                writeln!(self.err, "{}", err)?;
                Ok(Step::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zpart_hal::FakeHal;

    fn shell(hal: &FakeHal) -> Shell<'_, FakeHal, Vec<u8>, Vec<u8>> {
        Shell::new(hal, "zpart", Vec::new(), Vec::new())
    }

    #[test]
    fn prompt_tracks_mode_stack() {
        let hal = FakeHal::new();
        let mut sh = shell(&hal);
        assert_eq!(sh.prompt(), "zpart> ");

        sh.execute_line("image /nonexistent/disk.img").unwrap();
        sh.execute_line("set format raw").unwrap();
        sh.execute_line("parted").unwrap();
        assert_eq!(sh.prompt(), "zpart/disk.img/parted> ");

        assert_eq!(sh.execute_line("exit").unwrap(), Step::Done);
        assert_eq!(sh.prompt(), "zpart/disk.img> ");
        sh.execute_line("exit").unwrap();
        assert_eq!(sh.execute_line("exit").unwrap(), Step::Exit);
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        let hal = FakeHal::new();
        let mut sh = shell(&hal);
        assert_eq!(sh.execute_line("image 'oops").unwrap(), Step::Failed);
        let (_, err) = sh.into_writers();
        assert_eq!(String::from_utf8(err).unwrap(), "syntax error: unbalanced quotes.\n");
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let hal = FakeHal::new();
        let mut sh = shell(&hal);
        assert_eq!(sh.execute_line("   ").unwrap(), Step::Done);
        assert_eq!(sh.execute_line("# mktbl gpt").unwrap(), Step::Done);
        assert_eq!(hal.operation_count(), 0);
    }

    #[test]
    fn commands_are_scoped_to_their_shell() {
        let hal = FakeHal::new();
        let mut sh = shell(&hal);
        assert_eq!(sh.execute_line("mktbl gpt").unwrap(), Step::Failed);
        let (_, err) = sh.into_writers();
        assert_eq!(String::from_utf8(err).unwrap(), "mktbl: command not found.\n");
    }

    #[test]
    fn help_is_mode_specific() {
        let hal = FakeHal::new();
        let mut sh = shell(&hal);
        sh.execute_line("help image").unwrap();
        sh.execute_line("image /nonexistent/disk.img").unwrap();
        sh.execute_line("help ls").unwrap();
        assert_eq!(sh.execute_line("help mktbl").unwrap(), Step::Failed);
        let (out, _) = sh.into_writers();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("image <file>"));
        assert!(out.contains("ls part"));
    }

    #[test]
    fn cmdloop_stops_at_eof() {
        let hal = FakeHal::new();
        let mut sh = shell(&hal);
        sh.cmdloop(io::Cursor::new("image /nonexistent/disk.img\nget size\n"))
            .unwrap();
        let (out, _) = sh.into_writers();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Welcome to zpart!"));
        assert!(out.contains("zpart/disk.img> size:\t\tNone"));
        assert!(out.trim_end().ends_with("Thanks for using zpart. Bye!"));
    }
}
