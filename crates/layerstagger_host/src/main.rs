// SPDX-License-Identifier: MIT OR Apache-2.0
//! `layer-repeater` - stagger the selected clips of a project
//!
//! Loads a RON project, staggers every selected video clip with the stored
//! settings, writes the project back and prints a JSON report on stdout.
//! Logs go to stderr; set `RUST_LOG` to change the level.
//!
//! Options such as `--count` or `--range` override the stored settings for
//! the run and are saved with them. `--clear` removes earlier copies instead
//! of making new ones.

use anyhow::{bail, Context};
use clap::Parser;
use layerstagger_engine::{
    repeat_selection, MemorySettings, ModeType, RangeStrategy, SplitConfirmation, StaggerSettings,
};
use layerstagger_timeline::Project;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "layer-repeater")]
#[command(version)]
#[command(about = "Stagger selected clips into time-offset copies on nested tracks")]
struct Args {
    /// Project file (RON)
    project: PathBuf,

    /// Settings file (RON); created with defaults when missing
    settings: Option<PathBuf>,

    /// Where to write the result; defaults to the project file
    output: Option<PathBuf>,

    /// Answer yes to every effect split prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Remove earlier copies and move parent motion back to the track
    #[arg(long, conflicts_with = "count", conflicts_with = "mode")]
    clear: bool,

    /// Scheduling mode: count or velocity
    #[arg(long)]
    mode: Option<String>,

    /// Number of copies in count mode
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Range: whole, motion, effects, playhead or loop
    #[arg(short, long)]
    range: Option<String>,

    /// Reverse the copy order (true/false)
    #[arg(long)]
    reverse: Option<bool>,

    /// Mute the source clip afterwards (true/false)
    #[arg(long)]
    mute: Option<bool>,
}

/// Apply command line choices on top of the stored settings
fn apply_overrides(args: &Args, settings: &mut StaggerSettings) -> anyhow::Result<()> {
    if args.clear {
        settings.mode = ModeType::FixedCount;
        settings.count = 0;
    }
    if let Some(mode) = &args.mode {
        settings.mode = match mode.as_str() {
            "count" => ModeType::FixedCount,
            "velocity" => ModeType::FixedVelocity,
            other => bail!("Unknown mode: {other}"),
        };
    }
    if let Some(count) = args.count {
        settings.count = count;
    }
    if let Some(range) = &args.range {
        settings.range = match range.as_str() {
            "whole" => RangeStrategy::WholeClip,
            "motion" => RangeStrategy::MotionKeyframes,
            "effects" => RangeStrategy::EffectKeyframes,
            "playhead" => RangeStrategy::PlayheadPosition,
            "loop" => RangeStrategy::LoopRegion,
            other => bail!("Unknown range: {other}"),
        };
    }
    if let Some(reverse) = args.reverse {
        settings.reverse = reverse;
    }
    if let Some(mute) = args.mute {
        settings.mute = mute;
    }
    Ok(())
}

/// Asks split questions on the terminal
struct TerminalConfirmation {
    assume_yes: bool,
}

impl SplitConfirmation for TerminalConfirmation {
    fn confirm_split(&mut self, effect_index: usize, effect_name: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        ask_split(
            &mut std::io::stderr(),
            &mut std::io::stdin().lock(),
            effect_index,
            effect_name,
        )
    }
}

/// Prompt on `out` and read the answer from `input`; any IO failure means no
fn ask_split(
    out: &mut impl Write,
    input: &mut impl BufRead,
    effect_index: usize,
    effect_name: &str,
) -> bool {
    let prompt = write!(
        out,
        "Effect #{} ({effect_name}) is animated. Split it across the copies? [y/N] ",
        effect_index + 1
    )
    .and_then(|()| out.flush());
    if let Err(e) = prompt {
        tracing::warn!("Could not ask about {effect_name}: {e}");
        return false;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => is_yes(&line),
        Err(e) => {
            tracing::warn!("Could not read answer: {e}");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("layerstagger_engine=info".parse()?)
        .add_directive("layerstagger_host=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting layer-repeater v{}", env!("CARGO_PKG_VERSION"));

    let mut project = Project::load(&args.project)
        .with_context(|| format!("Failed to load project {}", args.project.display()))?;

    let mut store = match &args.settings {
        Some(path) if path.exists() => MemorySettings::load(path)
            .with_context(|| format!("Failed to load settings {}", path.display()))?,
        _ => MemorySettings::new(),
    };
    let mut settings = StaggerSettings::load(&store);
    apply_overrides(&args, &mut settings)?;
    tracing::debug!(?settings, "loaded settings");

    if project.selected_video_clips().is_empty() {
        tracing::warn!("No selected video clips in {}", args.project.display());
    }

    let mut confirm = TerminalConfirmation {
        assume_yes: args.yes,
    };
    let report = repeat_selection(&mut project, &settings, &mut confirm);
    tracing::info!(
        repeated = report.repeated.len(),
        failed = report.failed.len(),
        "Finished"
    );

    let output = args.output.as_ref().unwrap_or(&args.project);
    project
        .save(output)
        .with_context(|| format!("Failed to write project {}", output.display()))?;

    if let Some(path) = &args.settings {
        settings.save(&mut store);
        store
            .save(path)
            .with_context(|| format!("Failed to write settings {}", path.display()))?;
    }

    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    Ok(())
}
