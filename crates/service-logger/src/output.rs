//! Console and log file sink shared by the channel workers

use crate::error::LoggerError;
use parking_lot::Mutex;
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

/// Writes each line to stdout and, while a file is attached, to that file
#[derive(Debug, Default)]
pub(crate) struct LogOutput {
    file: Mutex<Option<File>>,
}

impl LogOutput {
    pub(crate) fn attach(&self, file: File) {
        *self.file.lock() = Some(file);
    }

    /// Detach and flush the log file, returning to console-only output
    pub(crate) fn detach(&self) {
        if let Some(mut file) = self.file.lock().take() {
            if let Err(e) = file.flush() {
                warn!("Failed to flush log file: {}", e);
            }
        }
    }

    pub(crate) fn has_file(&self) -> bool {
        self.file.lock().is_some()
    }

    pub(crate) fn write_line(&self, line: &str) {
        // Hold the file lock across both writes so lines keep the same order
        let mut file = self.file.lock();

        let stdout = io::stdout();
        let mut console = stdout.lock();
        let _ = writeln!(console, "{line}");

        if let Some(file) = file.as_mut() {
            if let Err(e) = writeln!(file, "{line}") {
                warn!("Failed to write log file: {}", e);
            }
        }
    }
}

/// Open `{dir}/{file_name}` for appending, creating the directory and the
/// file when they do not exist
pub(crate) fn open_log_file(prefix: &str, dir: &Path, file_name: &str) -> Result<File, LoggerError> {
    let path = dir.join(file_name);
    info!("{prefix}[LOGFILE] {file_name}: Opening");

    if let Ok(file) = OpenOptions::new().read(true).append(true).open(&path) {
        info!("{prefix}[LOGFILE] {file_name}: Success: Opened {}", path.display());
        return Ok(file);
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|source| LoggerError::CreateLogDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut options = OpenOptions::new();
    options.create(true).read(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(&path)
        .map_err(|source| LoggerError::OpenLogFile {
            path: path.clone(),
            source,
        })?;

    info!(
        "{prefix}[LOGFILE] {file_name}: Success: Created NEW log file at {}",
        path.display()
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_open_log_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("logs");

        let file = open_log_file("Test - ", &dir, "server.log").unwrap();
        drop(file);

        assert!(dir.join("server.log").exists());
    }

    #[test]
    fn test_open_log_file_appends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("server.log");
        std::fs::write(&path, "first\n").unwrap();

        let output = LogOutput::default();
        output.attach(open_log_file("Test - ", temp_dir.path(), "server.log").unwrap());
        output.write_line("second");
        output.detach();
        assert!(!output.has_file());

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_in_unwritable_location() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = open_log_file("Test - ", &blocker.join("logs"), "server.log").unwrap_err();
        assert!(matches!(err, LoggerError::CreateLogDir { .. }));
    }
}
