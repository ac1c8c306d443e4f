use std::path::Path;

/// Initialise `env_logger`.
///
/// Logs go to `log_file` so they do not interleave with shell output; if the file cannot be
/// opened they fall back to stderr. `RUST_LOG` still wins over `verbose`.
pub fn init(log_file: Option<&Path>, verbose: bool) {
    use env_logger::Target;
    use std::fs;
    use std::io;

    let target = log_file
        .and_then(|path| {
            (|| -> io::Result<Target> {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                Ok(Target::Pipe(Box::new(file)))
            })()
            .ok()
        })
        .unwrap_or(Target::Stderr);

    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(target)
        .try_init();
}
