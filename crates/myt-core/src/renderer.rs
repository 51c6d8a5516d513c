use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::{MytError, MytResult};

/// Harmony executable name, as installed by the vendor.
pub const HARMONY_PROGRAM: &str = "Harmony Premium";

/// Child environment read by the pre/post render hooks.
pub const ENV_INFO_PATH: &str = "MYT_RENDER_INFO_PATH";
pub const ENV_RENDER_PATH: &str = "MYT_RENDER_PATH";
pub const ENV_RENDER_VERSION: &str = "MYT_RENDER_VERSION";

/// Bundled hooks, used when no script of their kind is configured. The
/// pre-render hook points the write node at the version folder and starts the
/// info file; the post-render hook appends the rendered frame count.
pub const PRE_RENDER_HOOK: &str = include_str!("../harmony/prerender.js");
pub const POST_RENDER_HOOK: &str = include_str!("../harmony/postrender.js");

const PRE_RENDER_HOOK_NAME: &str = "prerender.js";
const POST_RENDER_HOOK_NAME: &str = "postrender.js";

/// Everything one render needs to know about its job.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub scene: PathBuf,
    /// Shot `EXR` directory the version folder is created in
    pub render_path: PathBuf,
    /// Version label, `v###`
    pub version: String,
    /// File the hooks write scene info into
    pub info_path: PathBuf,
    /// Per-job scratch directory; bundled hooks are written here
    pub work_dir: PathBuf,
}

impl RenderContext {
    fn scene_stem(&self) -> String {
        self.scene
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Something that turns a scene into rendered frames.
pub trait Renderer {
    fn render(&self, ctx: &RenderContext) -> MytResult<()>;
}

/// Runs Harmony in batch mode as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct HarmonyRenderer {
    pub program: PathBuf,
    pub pre_render_script: Option<PathBuf>,
    pub post_render_script: Option<PathBuf>,
}

impl Default for HarmonyRenderer {
    fn default() -> Self {
        Self::new(HARMONY_PROGRAM)
    }
}

impl HarmonyRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            pre_render_script: None,
            post_render_script: None,
        }
    }

    /// Use the vendor install of a given Harmony version, or `PATH` on
    /// platforms without a known install location.
    pub fn for_version(version: &str) -> Self {
        match harmony_bin_dir(Platform::current(), version) {
            Some(bin) => Self::new(bin.join(HARMONY_PROGRAM)),
            None => Self::default(),
        }
    }

    pub fn with_pre_render_script(mut self, script: Option<PathBuf>) -> Self {
        self.pre_render_script = script;
        self
    }

    pub fn with_post_render_script(mut self, script: Option<PathBuf>) -> Self {
        self.post_render_script = script;
        self
    }

    /// Pre-render script for a job: the configured one, else the bundled hook
    /// in the job's scratch directory.
    pub fn pre_render_script(&self, ctx: &RenderContext) -> PathBuf {
        self.pre_render_script
            .clone()
            .unwrap_or_else(|| ctx.work_dir.join(PRE_RENDER_HOOK_NAME))
    }

    pub fn post_render_script(&self, ctx: &RenderContext) -> PathBuf {
        self.post_render_script
            .clone()
            .unwrap_or_else(|| ctx.work_dir.join(POST_RENDER_HOOK_NAME))
    }

    /// Write the bundled hooks that no configured script replaces.
    pub fn install_hooks(&self, ctx: &RenderContext) -> MytResult<()> {
        if self.pre_render_script.is_none() {
            fs::write(ctx.work_dir.join(PRE_RENDER_HOOK_NAME), PRE_RENDER_HOOK)?;
        }
        if self.post_render_script.is_none() {
            fs::write(ctx.work_dir.join(POST_RENDER_HOOK_NAME), POST_RENDER_HOOK)?;
        }
        Ok(())
    }

    /// Build the command line for one render. Context is passed through the
    /// child's environment only.
    pub fn command(&self, ctx: &RenderContext) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-readonly")
            .arg("-batch")
            .arg(&ctx.scene)
            .arg("-preRenderScript")
            .arg(self.pre_render_script(ctx))
            .arg("-postRenderScript")
            .arg(self.post_render_script(ctx));
        cmd.env(ENV_INFO_PATH, &ctx.info_path)
            .env(ENV_RENDER_PATH, &ctx.render_path)
            .env(ENV_RENDER_VERSION, &ctx.version);
        cmd
    }
}

impl Renderer for HarmonyRenderer {
    fn render(&self, ctx: &RenderContext) -> MytResult<()> {
        self.install_hooks(ctx)?;
        let mut cmd = self.command(ctx);
        tracing::debug!("running {:?}", cmd);

        // No timeout: Harmony owns the terminal until it exits.
        let status = cmd.status().map_err(|source| MytError::RendererLaunch {
            program: self.program.clone(),
            source,
        })?;
        check_status(status, ctx)
    }
}

fn check_status(status: ExitStatus, ctx: &RenderContext) -> MytResult<()> {
    if status.success() {
        return Ok(());
    }
    tracing::warn!("Harmony exited with {} for {}", status, ctx.scene.display());
    Err(MytError::RendererFailure {
        scene: ctx.scene_stem(),
    })
}

/// Host platform, as far as Harmony install locations are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// Directory holding the Harmony binaries of a vendor install.
pub fn harmony_bin_dir(platform: Platform, version: &str) -> Option<PathBuf> {
    match platform {
        Platform::Windows => Some(
            Path::new("C:/Program Files (x86)/Toon Boom Animation")
                .join(format!("Toon Boom Harmony {version} Premium"))
                .join("win64")
                .join("bin"),
        ),
        Platform::MacOs => Some(
            Path::new("/Applications")
                .join(format!("Toon Boom Harmony {version} Premium"))
                .join(format!("Harmony {version} Premium.app"))
                .join("Contents/tba/macosx/bin"),
        ),
        Platform::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn context() -> RenderContext {
        RenderContext {
            scene: PathBuf::from("/drive/scenes/myt_a1_002.xstage"),
            render_path: PathBuf::from("/drive/Act 1/002/EXR"),
            version: "v004".to_string(),
            info_path: PathBuf::from("/tmp/myt_render_x/info.txt"),
            work_dir: PathBuf::from("/tmp/myt_render_x"),
        }
    }

    fn env_value<'a>(cmd: &'a Command, key: &str) -> Option<&'a OsStr> {
        cmd.get_envs()
            .find(|(k, _)| *k == OsStr::new(key))
            .and_then(|(_, v)| v)
    }

    #[test]
    fn test_command_line() {
        let renderer = HarmonyRenderer::default()
            .with_pre_render_script(Some(PathBuf::from("pre.js")))
            .with_post_render_script(Some(PathBuf::from("post.js")));
        let cmd = renderer.command(&context());

        assert_eq!(cmd.get_program(), OsStr::new(HARMONY_PROGRAM));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            [
                "-readonly",
                "-batch",
                "/drive/scenes/myt_a1_002.xstage",
                "-preRenderScript",
                "pre.js",
                "-postRenderScript",
                "post.js",
            ]
            .map(OsStr::new)
        );
    }

    #[test]
    fn test_bundled_hooks_by_default() {
        let cmd = HarmonyRenderer::default().command(&context());
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args[3..],
            [
                "-preRenderScript",
                "/tmp/myt_render_x/prerender.js",
                "-postRenderScript",
                "/tmp/myt_render_x/postrender.js",
            ]
            .map(OsStr::new)
        );
    }

    #[test]
    fn test_install_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RenderContext {
            work_dir: dir.path().to_path_buf(),
            ..context()
        };
        let renderer = HarmonyRenderer::default()
            .with_post_render_script(Some(PathBuf::from("/studio/post.js")));
        renderer.install_hooks(&ctx).unwrap();

        let pre = fs::read_to_string(dir.path().join(PRE_RENDER_HOOK_NAME)).unwrap();
        assert_eq!(pre, PRE_RENDER_HOOK);
        assert!(!dir.path().join(POST_RENDER_HOOK_NAME).exists());
        assert_eq!(renderer.post_render_script(&ctx), PathBuf::from("/studio/post.js"));
    }

    #[test]
    fn test_hooks_use_child_env() {
        for hook in [PRE_RENDER_HOOK, POST_RENDER_HOOK] {
            for key in [ENV_INFO_PATH, ENV_RENDER_PATH, ENV_RENDER_VERSION] {
                assert!(hook.contains(key), "hook does not read {key}");
            }
        }
    }

    #[test]
    fn test_context_is_in_child_env() {
        let cmd = HarmonyRenderer::default().command(&context());
        assert_eq!(env_value(&cmd, ENV_RENDER_VERSION), Some(OsStr::new("v004")));
        assert_eq!(
            env_value(&cmd, ENV_RENDER_PATH),
            Some(OsStr::new("/drive/Act 1/002/EXR"))
        );
        assert_eq!(
            env_value(&cmd, ENV_INFO_PATH),
            Some(OsStr::new("/tmp/myt_render_x/info.txt"))
        );
        assert!(std::env::var_os(ENV_RENDER_VERSION).is_none());
    }

    #[test]
    fn test_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RenderContext {
            work_dir: dir.path().to_path_buf(),
            ..context()
        };
        let renderer = HarmonyRenderer::new("/nonexistent/harmony-binary");
        let err = renderer.render(&ctx).unwrap_err();
        assert!(matches!(err, MytError::RendererLaunch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        use std::os::unix::process::ExitStatusExt;

        assert!(check_status(ExitStatus::from_raw(0), &context()).is_ok());
        let err = check_status(ExitStatus::from_raw(1 << 8), &context()).unwrap_err();
        assert_eq!(err.to_string(), "Harmony failure: myt_a1_002");
    }

    #[test]
    fn test_install_dirs() {
        assert_eq!(
            harmony_bin_dir(Platform::Windows, "22").unwrap(),
            PathBuf::from(
                "C:/Program Files (x86)/Toon Boom Animation/Toon Boom Harmony 22 Premium/win64/bin"
            )
        );
        assert_eq!(
            harmony_bin_dir(Platform::MacOs, "21").unwrap(),
            PathBuf::from(
                "/Applications/Toon Boom Harmony 21 Premium/Harmony 21 Premium.app/Contents/tba/macosx/bin"
            )
        );
        assert!(harmony_bin_dir(Platform::Other, "22").is_none());
    }
}
