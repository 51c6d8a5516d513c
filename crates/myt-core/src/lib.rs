pub mod error;
pub mod frame_range;
pub mod job_log;
pub mod render_path;
pub mod renderer;
pub mod scene;
pub mod shot;
pub mod version;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use error::{MytError, MytResult};
pub use job_log::{JobLog, LogRow, RenderInfo};
pub use renderer::{HarmonyRenderer, RenderContext, Renderer};
pub use shot::ShotId;

/// Show marker every scene, shot and version folder name carries.
pub const SHOW: &str = "myt";

/// Prefix of the per-job scratch directory holding the info file and hooks.
const INFO_FILE_PREFIX: &str = "myt_render_";
const INFO_FILE_NAME: &str = "info.txt";

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "myt_core=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Shared project root holding the act folders and the render log
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Render log path, `<root>/myt_render_log.tsv` when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Explicit Harmony executable
    #[serde(default)]
    pub harmony_program: Option<PathBuf>,
    /// Harmony version used to locate the vendor install
    #[serde(default)]
    pub harmony_version: Option<String>,
    #[serde(default)]
    pub pre_render_script: Option<PathBuf>,
    #[serde(default)]
    pub post_render_script: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            root: default_root(),
            log_file: None,
            harmony_program: None,
            harmony_version: None,
            pre_render_script: None,
            post_render_script: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl RenderOptions {
    /// Load options from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> MytResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.root.join(job_log::LOG_FILENAME))
    }

    /// Harmony renderer described by these options. An explicit program wins
    /// over a version lookup.
    pub fn renderer(&self) -> HarmonyRenderer {
        let renderer = match (&self.harmony_program, &self.harmony_version) {
            (Some(program), _) => HarmonyRenderer::new(program),
            (None, Some(version)) => HarmonyRenderer::for_version(version),
            (None, None) => HarmonyRenderer::default(),
        };
        renderer
            .with_pre_render_script(self.pre_render_script.clone())
            .with_post_render_script(self.post_render_script.clone())
    }
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Stems of the scenes that rendered
    pub rendered: Vec<String>,
    /// One message per scene that did not
    pub failed: Vec<String>,
    /// Problems that did not fail a scene, e.g. an unwritten log row
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl BatchReport {
    /// Process exit code: 1 when nothing rendered.
    pub fn exit_code(&self) -> u8 {
        if self.rendered.is_empty() {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        if !self.rendered.is_empty() {
            writeln!(f, "Successfully rendered:")?;
            for name in &self.rendered {
                writeln!(f, "{name}")?;
            }
            if self.failed.is_empty() {
                return Ok(());
            }
            writeln!(f)?;
        }
        writeln!(f, "Failed to render:")?;
        for message in &self.failed {
            writeln!(f, "{message}")?;
        }
        Ok(())
    }
}

/// Type alias for progress callback. The lifetime lets callers pass closures
/// that borrow local state.
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

struct RenderedScene {
    name: String,
    warning: Option<String>,
}

/// Render every scene in order, collecting successes and failures.
///
/// A failing scene never stops the batch; its error message is recorded and
/// the next scene starts.
pub fn run_batch(
    options: &RenderOptions,
    scenes: &[PathBuf],
    renderer: &dyn Renderer,
    progress: &ProgressCallback<'_>,
) -> BatchReport {
    let job_start_time = job_log::timestamp();
    let log = JobLog::new(options.log_path());
    let total = scenes.len() as u64;
    let mut report = BatchReport::default();

    for (i, scene) in scenes.iter().enumerate() {
        progress("render", i as u64, total, &scene.display().to_string());

        match render_scene(scene, options, renderer, &log, &job_start_time) {
            Ok(rendered) => {
                tracing::info!("rendered {}", rendered.name);
                if let Some(warning) = rendered.warning {
                    tracing::warn!("{warning}");
                    report.warnings.push(warning);
                }
                report.rendered.push(rendered.name);
            }
            Err(e) => {
                tracing::warn!("{}: {e}", scene.display());
                report.failed.push(e.to_string());
            }
        }
    }

    report
}

fn render_scene(
    scene: &Path,
    options: &RenderOptions,
    renderer: &dyn Renderer,
    log: &JobLog,
    job_start_time: &str,
) -> MytResult<RenderedScene> {
    let job_id = new_job_id();
    let render_start_time = job_log::timestamp();

    let path = std::path::absolute(scene)?;
    scene::verify(&path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let shot = ShotId::from_filename(&name)?;
    let render_path = render_path::find_render_path(&shot, &options.root)?;
    let version = version::new_version(&render_path)?;
    tracing::info!("rendering {} as {} (job {})", name, version, job_id);

    // Removed on drop, after the log row is written.
    let work_dir = tempfile::Builder::new()
        .prefix(INFO_FILE_PREFIX)
        .tempdir()?;
    let info_path = work_dir.path().join(INFO_FILE_NAME);
    std::fs::write(&info_path, "")?;
    let ctx = RenderContext {
        scene: path,
        render_path,
        version,
        info_path,
        work_dir: work_dir.path().to_path_buf(),
    };
    renderer.render(&ctx)?;
    let render_end_time = job_log::timestamp();

    let warning = RenderInfo::read(&ctx.info_path)
        .and_then(|info| {
            log.append(&LogRow::new(
                job_start_time,
                &info,
                &render_start_time,
                &render_end_time,
                job_id,
            ))
        })
        .err()
        .map(|e| format!("{name}: render log not updated: {e}"));

    Ok(RenderedScene { name, warning })
}

/// Random 16-bit job id: the time_hi_and_version field of a v4 UUID.
fn new_job_id() -> u16 {
    uuid::Uuid::new_v4().as_fields().2
}
