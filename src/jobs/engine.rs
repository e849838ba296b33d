use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    foundation::core::Fps,
    foundation::error::{EditError, EditResult},
    model::clip::MediaKind,
    transition::plan::{
        FadeDirection, FadePlan, SourceSpan, TransitionKind, TransitionPlan, WipeDir,
        parse_transition_kind,
    },
};

/// What a render job produces.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderJob {
    /// Transition between two clips.
    Transition {
        /// Validated plan.
        plan: TransitionPlan,
    },
    /// Fade over a clip's head or tail.
    Fade {
        /// Validated plan.
        plan: FadePlan,
    },
}

impl RenderJob {
    /// Frames the rendered media must hold.
    pub fn length(&self) -> u64 {
        match self {
            Self::Transition { plan } => plan.length,
            Self::Fade { plan } => plan.length,
        }
    }

    /// Kind of media the job renders.
    pub fn output_kind(&self) -> MediaKind {
        let source = match self {
            Self::Transition { plan } => plan.from_source.media.kind,
            Self::Fade { plan } => plan.source.media.kind,
        };
        match source {
            MediaKind::Audio => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }
}

/// One render request handed to a [`RenderEngine`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    /// What to render.
    pub job: RenderJob,
    /// Where to write the result.
    pub out_path: PathBuf,
    /// Frame rate of the timeline the media is rendered for.
    pub fps: Fps,
}

/// Shared cancellation flag. Checking it is up to the engine.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the job to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Produces media files for render jobs. Runs on worker threads.
pub trait RenderEngine: Send + Sync {
    /// Render `req`, returning the written file. Engines should poll `cancel` while working.
    fn render(&self, req: &RenderRequest, cancel: &CancelToken) -> EditResult<PathBuf>;
}

/// Engine driving the system `ffmpeg` binary.
#[derive(Clone, Copy, Debug)]
pub struct FfmpegRenderEngine {
    /// Overwrite existing output files.
    pub overwrite: bool,
}

impl Default for FfmpegRenderEngine {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

fn push_input(args: &mut Vec<String>, span: &SourceSpan, fps: Fps) {
    let len = span.clip_out + 1 - span.clip_in;
    if span.media.kind.is_synthetic() {
        args.extend(["-loop".to_string(), "1".to_string()]);
    } else {
        args.extend([
            "-ss".to_string(),
            format!("{:.6}", fps.frames_to_secs(span.clip_in)),
        ]);
    }
    args.extend([
        "-t".to_string(),
        format!("{:.6}", fps.frames_to_secs(len)),
        "-i".to_string(),
        span.media.path.clone(),
    ]);
}

fn xfade_name(kind: TransitionKind) -> &'static str {
    match kind {
        TransitionKind::Dissolve => "fade",
        TransitionKind::Wipe(WipeDir::LeftToRight) => "wiperight",
        TransitionKind::Wipe(WipeDir::RightToLeft) => "wipeleft",
        TransitionKind::Wipe(WipeDir::TopToBottom) => "wipedown",
        TransitionKind::Wipe(WipeDir::BottomToTop) => "wipeup",
    }
}

impl FfmpegRenderEngine {
    /// Command-line arguments (without the program name) rendering `req`.
    pub fn args(&self, req: &RenderRequest) -> EditResult<Vec<String>> {
        let fps = req.fps;
        let audio = req.job.output_kind() == MediaKind::Audio;
        let duration = format!("{:.6}", fps.frames_to_secs(req.job.length()));
        let mut args = vec![
            if self.overwrite { "-y" } else { "-n" }.to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];
        match &req.job {
            RenderJob::Transition { plan } => {
                let kind = parse_transition_kind(&plan.kind, &plan.params)?;
                push_input(&mut args, &plan.from_source, fps);
                push_input(&mut args, &plan.to_source, fps);
                let graph = if audio {
                    format!("[0:a][1:a]acrossfade=d={duration}[out]")
                } else {
                    format!(
                        "[0:v][1:v]xfade=transition={}:duration={duration}:offset=0[out]",
                        xfade_name(kind)
                    )
                };
                args.extend(["-filter_complex".to_string(), graph, "-map".to_string()]);
                args.push("[out]".to_string());
            }
            RenderJob::Fade { plan } => {
                push_input(&mut args, &plan.source, fps);
                let dir = match plan.direction {
                    FadeDirection::In => "in",
                    FadeDirection::Out => "out",
                };
                let (flag, filter) = if audio {
                    ("-af", "afade")
                } else {
                    ("-vf", "fade")
                };
                args.extend([
                    flag.to_string(),
                    format!("{filter}=t={dir}:st=0:d={duration}"),
                ]);
            }
        }
        if audio {
            args.push("-vn".to_string());
        } else {
            args.extend(
                ["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-r"].map(str::to_string),
            );
            args.push(format!("{}/{}", fps.num, fps.den));
        }
        args.push(req.out_path.display().to_string());
        Ok(args)
    }
}

fn ensure_parent_dir(path: &Path) -> EditResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

impl RenderEngine for FfmpegRenderEngine {
    fn render(&self, req: &RenderRequest, cancel: &CancelToken) -> EditResult<PathBuf> {
        let args = self.args(req)?;
        ensure_parent_dir(&req.out_path)?;
        run_ffmpeg(&args, cancel)?;
        Ok(req.out_path.clone())
    }
}

#[cfg(feature = "media-ffmpeg")]
fn run_ffmpeg(args: &[String], cancel: &CancelToken) -> EditResult<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            EditError::job(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
    loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EditError::job("render cancelled"));
        }
        match child.try_wait()? {
            Some(_) => break,
            None => std::thread::sleep(std::time::Duration::from_millis(50)),
        }
    }
    let output = child
        .wait_with_output()
        .map_err(|e| EditError::job(format!("failed to wait for ffmpeg to finish: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EditError::job(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(not(feature = "media-ffmpeg"))]
fn run_ffmpeg(_args: &[String], _cancel: &CancelToken) -> EditResult<()> {
    Err(EditError::job(
        "rendering requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/engine.rs"]
mod tests;
