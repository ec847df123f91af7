use console::style;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::cli::{Args, OutputFormat};
use crate::error::ExportError;
use crate::image_processing::convert::{load_frames, FrameFailure, FrameSettings};
use crate::image_processing::encode::{save_animation, AnimationSettings};
use crate::image_processing::grouping::group_by_dimensions;
use crate::image_processing::discover_images;
use crate::prompt::Prompter;
use crate::session::{ExportPlan, Session, SessionOutcome};
use crate::utils::{create_progress_bar, verbose_println};

/// What a finished export produced
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub frames: usize,
    /// Selected files that could not be loaded
    pub failures: Vec<FrameFailure>,
    pub fps: u32,
    pub format: OutputFormat,
    pub quality: u8,
    pub size_bytes: u64,
    pub elapsed: Duration,
}

impl ExportSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Exported(ExportSummary),
    /// Plan shown, nothing written
    DryRun(ExportPlan),
    Cancelled,
}

/// Run one export: discover, group, select, then load and encode.
pub fn run(args: &Args, prompter: &mut dyn Prompter) -> Result<RunOutcome, ExportError> {
    let start_time = Instant::now();

    if !args.dir.is_dir() {
        return Err(ExportError::Config(format!(
            "{} is not a directory",
            args.dir.display()
        )));
    }
    // Canonical so that "." yields the real folder name for the output file
    let dir = args.dir.canonicalize().map_err(|e| {
        ExportError::Config(format!("cannot resolve {}: {}", args.dir.display(), e))
    })?;

    let discovered = discover_images(&dir, args.verbose);
    if discovered.is_empty() {
        return Err(ExportError::NoImages(dir));
    }
    println!(
        "{}",
        style(format!("Found {} images in {}", discovered.len(), dir.display())).dim()
    );

    let groups = group_by_dimensions(&discovered, args.verbose);
    if groups.is_empty() {
        return Err(ExportError::NoDecodableImages(discovered.len()));
    }

    let plan = match Session::new(args, &dir, &discovered, &groups, prompter).run()? {
        SessionOutcome::Confirmed(plan) => plan,
        SessionOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
    };

    if plan.dry_run {
        return Ok(RunOutcome::DryRun(plan));
    }

    let mut summary = export(&plan, args.verbose)?;
    summary.elapsed = start_time.elapsed();
    Ok(RunOutcome::Exported(summary))
}

/// Load every planned frame and write the animation file
pub fn export(plan: &ExportPlan, verbose: bool) -> Result<ExportSummary, ExportError> {
    let started = Instant::now();
    let paths = plan.paths();

    println!(
        "\n{}",
        style(format!("Loading {} frames...", paths.len())).bold().blue()
    );

    let settings = FrameSettings {
        format: plan.format,
        resize: plan.resize,
    };

    let progress = create_progress_bar(paths.len() as u64);
    progress.set_message("Processing images");
    let loaded = load_frames(&paths, &settings, verbose, |done, path| {
        progress.set_position(done as u64);
        if let Some(name) = path.file_name() {
            progress.set_message(name.to_string_lossy().into_owned());
        }
    });
    progress.finish_and_clear();
    let report = loaded?;

    verbose_println(
        verbose,
        &format!(
            "Encoding {} frames as {} to {}",
            report.frames.len(),
            plan.format,
            plan.output_path.display()
        ),
    );

    let animation = AnimationSettings {
        format: plan.format,
        fps: plan.fps,
        quality: plan.quality,
    };
    let size_bytes = save_animation(&report.frames, &plan.output_path, &animation)?;

    Ok(ExportSummary {
        output_path: plan.output_path.clone(),
        frames: report.frames.len(),
        failures: report.failures,
        fps: plan.fps,
        format: plan.format,
        quality: plan.quality,
        size_bytes,
        elapsed: started.elapsed(),
    })
}
