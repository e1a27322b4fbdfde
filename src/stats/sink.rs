use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};

/// Report destination. Resolved once, on the first report; a file stays open
/// until the owning accumulator is dropped. Standard output is never closed.
pub(crate) enum ReportSink {
    Pending(Option<PathBuf>),
    Stdout,
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

impl ReportSink {
    pub(crate) const fn new() -> Self {
        Self::Pending(None)
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        match self {
            Self::Pending(target) => *target = Some(path),
            Self::Stdout | Self::File { .. } => {
                warn!(
                    "报告输出已确定，忽略新的报告文件 {path}",
                    path = path.display()
                );
            }
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::Pending(target) => target.as_deref(),
            Self::Stdout => None,
            Self::File { path, .. } => Some(path),
        }
    }

    fn resolve(&mut self) {
        let Self::Pending(target) = self else {
            return;
        };
        let target = target.take();
        *self = match target {
            Some(path) => match File::create(&path) {
                Ok(file) => {
                    debug!("统计报告写入 {path}", path = path.display());
                    Self::File {
                        path,
                        writer: BufWriter::new(file),
                    }
                }
                Err(err) => {
                    warn!(
                        "无法打开报告文件 {path}: {err}，改为输出到标准输出",
                        path = path.display()
                    );
                    Self::Stdout
                }
            },
            None => Self::Stdout,
        };
    }

    pub(crate) fn write_report(&mut self, report: &[u8]) -> io::Result<()> {
        self.resolve();
        match self {
            Self::File { writer, .. } => {
                writer.write_all(report)?;
                writer.flush()
            }
            Self::Stdout | Self::Pending(_) => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(report)?;
                stdout.flush()
            }
        }
    }
}
