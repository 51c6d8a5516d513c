//! Shared render log.
//!
//! Each successful render appends one tab-separated row to a log file that
//! lives on the shared drive. Runs on different machines write to the same
//! file without any locking; a row is written with a single `write_all` to
//! keep interleaving at row granularity where the filesystem allows it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{MytError, MytResult};

/// Log file name at the project root.
pub const LOG_FILENAME: &str = "myt_render_log.tsv";

pub const LOG_HEADERS: [&str; 10] = [
    "Date",
    "Version",
    "Frames",
    "Start",
    "End",
    "Color Space",
    "Started",
    "Finished",
    "Rendered",
    "Job ID",
];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LINE_TERMINATOR: &str = "\r\n";

/// Current local time, formatted for the log.
pub fn timestamp() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

/// Scene details the Harmony hooks write to the info file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInfo {
    pub version_name: String,
    pub frames: String,
    pub start_frame: String,
    pub end_frame: String,
    pub color_space: String,
    pub rendered_frames: String,
}

impl RenderInfo {
    /// Parse `version,frames,start,end,color space,rendered`.
    pub fn parse(contents: &str) -> MytResult<Self> {
        let fields: Vec<&str> = contents.trim_end_matches(['\r', '\n']).split(',').collect();
        let [version_name, frames, start_frame, end_frame, color_space, rendered_frames] =
            fields[..]
        else {
            return Err(MytError::render_info(format!(
                "expected 6 comma-separated fields, found {}",
                fields.len()
            )));
        };

        Ok(Self {
            version_name: version_name.to_string(),
            frames: frames.to_string(),
            start_frame: start_frame.to_string(),
            end_frame: end_frame.to_string(),
            color_space: color_space.to_string(),
            rendered_frames: rendered_frames.to_string(),
        })
    }

    pub fn read(path: &Path) -> MytResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }
}

/// One row of the render log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    fields: [String; 10],
}

impl LogRow {
    pub fn new(
        job_start_time: &str,
        info: &RenderInfo,
        render_start_time: &str,
        render_end_time: &str,
        job_id: u16,
    ) -> Self {
        Self {
            fields: [
                job_start_time.to_string(),
                info.version_name.clone(),
                info.frames.clone(),
                info.start_frame.clone(),
                info.end_frame.clone(),
                info.color_space.clone(),
                render_start_time.to_string(),
                render_end_time.to_string(),
                info.rendered_frames.clone(),
                job_id.to_string(),
            ],
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Append-only TSV render log.
#[derive(Debug, Clone)]
pub struct JobLog {
    path: PathBuf,
}

impl JobLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log for a project root.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LOG_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row, writing the header first when the file is new.
    pub fn append(&self, row: &LogRow) -> MytResult<()> {
        let mut buf = String::new();
        if !self.path.is_file() {
            push_record(&mut buf, LOG_HEADERS.iter().copied());
        }
        push_record(&mut buf, row.fields.iter().map(String::as_str));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf.as_bytes())?;
        tracing::debug!("logged job {} to {}", row.fields[9], self.path.display());
        Ok(())
    }
}

fn push_record<'a>(buf: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            buf.push('\t');
        }
        push_field(buf, field);
    }
    buf.push_str(LINE_TERMINATOR);
}

/// Excel-tab quoting: only fields that would break the row get quoted.
fn push_field(buf: &mut String, field: &str) {
    if field.contains(['\t', '"', '\r', '\n']) {
        buf.push('"');
        buf.push_str(&field.replace('"', "\"\""));
        buf.push('"');
    } else {
        buf.push_str(field);
    }
}
