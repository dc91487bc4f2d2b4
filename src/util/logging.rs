use std::io::Write;
use std::path::Path;

/// Writes every log line to stderr and to a file.
struct Tee {
    file: fs_err::File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()?;
        self.file.flush()
    }
}

/// Initialize env_logger once; subsequent calls are no-ops.
///
/// Defaults to `bestimate=info` unless RUST_LOG is set. With `log_file`,
/// output is duplicated to that file.
pub fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("bestimate=info"),
    );
    builder.format_timestamp_millis();

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }
        let file = fs_err::File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
    }

    let _ = builder.try_init();
    if let Some(path) = log_file {
        log::info!("Logging initialized. Log file: {}", path.display());
    }
    Ok(())
}
