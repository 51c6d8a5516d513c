mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use myt_core::{BatchReport, RenderOptions};

#[derive(Parser)]
#[command(name = "myt-render", version, about = "My Turn! - batch render Harmony scenes to EXR")]
struct Cli {
    /// Paths to Harmony scene files
    #[arg(required = true)]
    scene_paths: Vec<PathBuf>,

    /// Path to the pre-render script (default: bundled hook)
    #[arg(long, alias = "pre_render_script")]
    pre_render_script: Option<PathBuf>,

    /// Path to the post-render script (default: bundled hook)
    #[arg(long, alias = "post_render_script")]
    post_render_script: Option<PathBuf>,

    /// Shared project root containing the act folders
    #[arg(long, env = "MYT_PROJECT_ROOT")]
    root: Option<PathBuf>,

    /// Harmony executable (default: "Harmony Premium" on PATH)
    #[arg(long)]
    harmony: Option<PathBuf>,

    /// Harmony version, used to find the vendor install
    #[arg(long, conflicts_with = "harmony")]
    harmony_version: Option<String>,

    /// Render log (default: <root>/myt_render_log.tsv)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(long, env = "MYT_RENDER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> anyhow::Result<RenderOptions> {
        let mut options = match &self.config {
            Some(path) => RenderOptions::load(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => RenderOptions::default(),
        };

        if let Some(root) = &self.root {
            options.root = root.clone();
        }
        if let Some(program) = &self.harmony {
            options.harmony_program = Some(program.clone());
        }
        if let Some(version) = &self.harmony_version {
            options.harmony_version = Some(version.clone());
        }
        if let Some(script) = &self.pre_render_script {
            options.pre_render_script = Some(script.clone());
        }
        if let Some(script) = &self.post_render_script {
            options.post_render_script = Some(script.clone());
        }
        if let Some(log_file) = &self.log_file {
            options.log_file = Some(log_file.clone());
        }
        if self.verbose {
            options.logging.level = "debug".to_string();
        }
        Ok(options)
    }
}

fn format_report(report: &BatchReport, json: bool) -> anyhow::Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        return Ok(out);
    }
    Ok(report.to_string())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let options = cli.options()?;
    logging::init_logging(&options.logging);

    let t_total = std::time::Instant::now();
    let renderer = options.renderer();
    tracing::debug!("rendering with {}", renderer.program.display());

    let report = myt_core::run_batch(
        &options,
        &cli.scene_paths,
        &renderer,
        &|stage, current, total, message| {
            eprintln!("[{}] {}/{} {}", stage, current + 1, total, message);
        },
    );

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    print!("{}", format_report(&report, cli.json)?);
    tracing::info!(
        "{} rendered, {} failed ({:.2}s)",
        report.rendered.len(),
        report.failed.len(),
        t_total.elapsed().as_secs_f64()
    );

    Ok(ExitCode::from(report.exit_code()))
}
