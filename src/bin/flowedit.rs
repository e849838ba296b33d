use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use flowedit::{
    EditRequest, EditorConfig, EditorSession, FfprobeMediaInfo, Fps, Profile, Project, Sequence,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowedit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty project.
    New(NewArgs),
    /// Print each track's clip list.
    List(ListArgs),
    /// Apply a JSON array of edit requests to a project.
    Apply(ApplyArgs),
    /// Check a project's structure and media.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// Project and sequence name.
    #[arg(long, default_value = "untitled")]
    name: String,

    /// Number of video tracks.
    #[arg(long, default_value_t = 2)]
    video: usize,

    /// Number of audio tracks.
    #[arg(long, default_value_t = 2)]
    audio: usize,

    /// Frame rate, `25` or `30000/1001`.
    #[arg(long, default_value = "25")]
    fps: String,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// JSON array of edit requests.
    #[arg(long)]
    edits: PathBuf,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// Undo this many edits after applying them.
    #[arg(long, default_value_t = 0)]
    undo: usize,

    /// Editor options JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::New(args) => cmd_new(args),
        Command::List(args) => cmd_list(args),
        Command::Apply(args) => cmd_apply(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_new(args: NewArgs) -> anyhow::Result<()> {
    let fps: Fps = args
        .fps
        .parse()
        .with_context(|| format!("parse --fps '{}'", args.fps))?;
    let profile = Profile {
        fps,
        ..Profile::default()
    };
    let sequence = Sequence::new(args.name.clone(), profile, args.video, args.audio);
    Project::new(args.name, sequence)
        .save(&args.out)
        .with_context(|| format!("write project '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let project = Project::from_path(&args.in_path)?;
    let seq = &project.sequence;
    println!(
        "{} ({} frames at {}/{} fps)",
        seq.name, seq.len_frames(), seq.profile.fps.num, seq.profile.fps.den
    );
    for track in &seq.tracks {
        println!(
            "track {} {:?}{} ({} frames)",
            track.id,
            track.kind,
            if track.is_locked() { " locked" } else { "" },
            track.len_frames()
        );
        for span in track.display_list() {
            let name = if span.is_blank { "<blank>" } else { span.name.as_str() };
            let sync = span
                .sync_parent
                .map(|p| format!(" sync->{p}"))
                .unwrap_or_default();
            println!(
                "  [{}] {} {}..{} {name} in={} out={}{sync}",
                span.index, span.id, span.range.start, span.range.end, span.clip_in, span.clip_out
            );
        }
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let project = Project::from_path(&args.in_path)?;
    let config = match &args.config {
        Some(p) => EditorConfig::from_path(p)?,
        None => EditorConfig::default(),
    };
    let f = std::fs::File::open(&args.edits)
        .with_context(|| format!("open edits '{}'", args.edits.display()))?;
    let requests: Vec<EditRequest> = serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| "parse edit requests JSON")?;

    let Project {
        format_version,
        name,
        bin,
        sequence,
    } = project;
    let mut session = EditorSession::new(sequence, config);
    for (i, request) in requests.into_iter().enumerate() {
        let summary = session
            .apply(request)
            .with_context(|| format!("edit #{i} failed"))?;
        eprintln!("{}: {}", i, summary.label);
    }
    for _ in 0..args.undo {
        let label = session.undo().with_context(|| "undo failed")?;
        eprintln!("undo: {label}");
    }

    let project = Project {
        format_version,
        name,
        bin,
        sequence: session.into_sequence(),
    };
    project
        .save(&args.out)
        .with_context(|| format!("write project '{}'", args.out.display()))?;
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let fps = Project::from_path(&args.in_path)?.sequence.profile.fps;
    let (project, report) = Project::load(&args.in_path, &FfprobeMediaInfo::new(fps))?;
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "ok: {} tracks, {} frames, {} missing media",
        project.sequence.tracks.len(),
        project.sequence.len_frames(),
        report.missing.len()
    );
    Ok(())
}
