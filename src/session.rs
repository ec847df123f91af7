use console::style;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::cli::{Args, GroupSelector, OutputFormat};
use crate::error::ExportError;
use crate::image_processing::encode::{frame_duration_ms, unique_output_path};
use crate::image_processing::grouping::GroupTable;
use crate::image_processing::ordering::{sort_by_creation_time, OrderKey};
use crate::image_processing::{Dimensions, ImageFile};
use crate::prompt::{Prompt, Prompter};
use crate::report;
use crate::utils::{verbose_println, warn_println};

/// Where the frames of a plan came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    Group {
        dimensions: Dimensions,
        order: OrderKey,
    },
    /// Hand-built sequence, frame sizes may differ
    Manual,
}

/// Frames picked in the Selecting state, already in playback order
#[derive(Debug, Clone)]
pub struct Selection {
    pub mode: SelectionMode,
    pub files: Vec<ImageFile>,
}

/// Everything needed to produce the animation
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub mode: SelectionMode,
    pub files: Vec<ImageFile>,
    pub format: OutputFormat,
    pub fps: u32,
    pub resize: Option<Dimensions>,
    pub quality: u8,
    pub reverse: bool,
    pub output_path: PathBuf,
    /// Sources whose color type carries alpha
    pub alpha_count: usize,
    pub dry_run: bool,
}

impl ExportPlan {
    pub fn frame_count(&self) -> usize {
        self.files.len()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

pub enum SessionState {
    Listing,
    Selecting,
    Reviewing(Selection),
    Confirmed(ExportPlan),
    Cancelled,
}

#[derive(Debug)]
pub enum SessionOutcome {
    Confirmed(ExportPlan),
    Cancelled,
}

/// Result of one manual-mode command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualStep {
    Continue(Feedback),
    Done,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Warning(String),
}

/// Ordered frame list built one command at a time.
///
/// Commands: `N` appends image N, `rN` removes position N, `clear`,
/// `preview`, `done` and `quit`. Numbers are 1-based.
pub struct ManualSelection<'a> {
    available: &'a [ImageFile],
    selected: Vec<usize>,
}

impl<'a> ManualSelection<'a> {
    pub fn new(available: &'a [ImageFile]) -> Self {
        Self {
            available,
            selected: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &'a ImageFile> + '_ {
        let available = self.available;
        self.selected.iter().map(move |&i| &available[i])
    }

    pub fn into_files(self) -> Vec<ImageFile> {
        self.selected
            .iter()
            .map(|&i| self.available[i].clone())
            .collect()
    }

    pub fn apply(&mut self, input: &str, fps: u32) -> ManualStep {
        let command = input.trim().to_lowercase();

        match command.as_str() {
            "done" if self.selected.is_empty() => ManualStep::Continue(Feedback::Warning(
                "No images selected! Add at least one image first.".to_string(),
            )),
            "done" => ManualStep::Done,
            "quit" => ManualStep::Quit,
            "clear" => {
                self.selected.clear();
                ManualStep::Continue(Feedback::Info("All frames cleared.".to_string()))
            }
            "preview" => ManualStep::Continue(Feedback::Info(self.preview(fps))),
            _ if command.len() > 1 && command.starts_with('r') => self.remove(&command[1..]),
            _ if !command.is_empty() && command.chars().all(|c| c.is_ascii_digit()) => {
                self.add(&command)
            }
            _ => ManualStep::Continue(Feedback::Warning(
                "Unknown command. Try again or type 'done' to finish.".to_string(),
            )),
        }
    }

    fn preview(&self, fps: u32) -> String {
        if self.selected.is_empty() {
            return "No frames to preview yet.".to_string();
        }
        let total_ms = self.selected.len() as u64 * frame_duration_ms(fps) as u64;
        format!(
            "Current animation: {} frames, about {:.1}s at {} FPS",
            self.selected.len(),
            total_ms as f64 / 1000.0,
            fps
        )
    }

    fn add(&mut self, number: &str) -> ManualStep {
        match number.parse::<usize>() {
            Ok(n) if (1..=self.available.len()).contains(&n) => {
                self.selected.push(n - 1);
                ManualStep::Continue(Feedback::Info(format!(
                    "Added frame {}: {}",
                    self.selected.len(),
                    self.available[n - 1].file_name()
                )))
            }
            _ => ManualStep::Continue(Feedback::Warning(format!(
                "Invalid image number. Use 1-{}",
                self.available.len()
            ))),
        }
    }

    fn remove(&mut self, position: &str) -> ManualStep {
        let Ok(n) = position.parse::<usize>() else {
            return ManualStep::Continue(Feedback::Warning(
                "Invalid remove command. Use 'r1', 'r2', etc.".to_string(),
            ));
        };
        if !(1..=self.selected.len()).contains(&n) {
            return ManualStep::Continue(Feedback::Warning(format!(
                "Invalid frame number. Use 1-{}",
                self.selected.len()
            )));
        }
        let removed = self.selected.remove(n - 1);
        ManualStep::Continue(Feedback::Info(format!(
            "Removed frame {}: {}",
            n,
            self.available[removed].file_name()
        )))
    }
}

/// Drives one run from the group listing to a confirmed (or cancelled) plan.
///
/// Interactive and non-interactive runs use the same states; only the
/// prompter differs.
pub struct Session<'a> {
    args: &'a Args,
    output_dir: &'a Path,
    discovered: &'a [ImageFile],
    groups: &'a GroupTable,
    prompter: &'a mut dyn Prompter,
}

impl<'a> Session<'a> {
    pub fn new(
        args: &'a Args,
        output_dir: &'a Path,
        discovered: &'a [ImageFile],
        groups: &'a GroupTable,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            args,
            output_dir,
            discovered,
            groups,
            prompter,
        }
    }

    pub fn run(mut self) -> Result<SessionOutcome, ExportError> {
        let mut state = SessionState::Listing;
        loop {
            state = match state {
                SessionState::Listing => {
                    report::print_group_table(self.discovered.len(), self.groups);
                    SessionState::Selecting
                }
                SessionState::Selecting => self.select()?,
                SessionState::Reviewing(selection) => self.review(selection)?,
                SessionState::Confirmed(plan) => return Ok(SessionOutcome::Confirmed(plan)),
                SessionState::Cancelled => return Ok(SessionOutcome::Cancelled),
            };
        }
    }

    fn select(&mut self) -> Result<SessionState, ExportError> {
        let raw = match &self.args.group {
            Some(raw) => raw.clone(),
            None => self.prompter.ask(
                &Prompt::new(
                    "--group",
                    "Pick a group by index, '0' for manual selection, or type dimensions (like 1920x1080)",
                )
                .with_default("1")
                .required(),
            )?,
        };

        let selector: GroupSelector = raw.parse()?;
        if selector == GroupSelector::Manual {
            return self.select_manually();
        }

        let groups = self.groups;
        let group = groups.resolve(&selector, &raw)?;
        let (files, order) = sort_by_creation_time(&group.files, self.args.reverse);

        verbose_println(
            self.args.verbose,
            &format!(
                "Selected group {} with {} images, ordered by {}",
                group.dimensions,
                files.len(),
                match order {
                    OrderKey::CreationTime => "creation time",
                    OrderKey::FileName => "file name",
                }
            ),
        );

        Ok(SessionState::Reviewing(Selection {
            mode: SelectionMode::Group {
                dimensions: group.dimensions,
                order,
            },
            files,
        }))
    }

    fn select_manually(&mut self) -> Result<SessionState, ExportError> {
        println!("\n{}", style("Manual frame selection").bold().cyan());
        report::print_available_images(self.discovered);

        let mut scripted: VecDeque<String> = match self.args.sequence_commands() {
            Some(mut commands) => {
                commands.push("done".to_string());
                commands.into()
            }
            None => VecDeque::new(),
        };
        if scripted.is_empty() {
            report::print_manual_help();
        }

        let mut builder = ManualSelection::new(self.discovered);
        loop {
            let input = match scripted.pop_front() {
                Some(command) => command,
                None => {
                    report::print_sequence(builder.selected());
                    let text = if builder.is_empty() {
                        "Add your first image (enter number)".to_string()
                    } else {
                        format!(
                            "Add image, modify sequence, or type 'done' ({} frames)",
                            builder.len()
                        )
                    };
                    self.prompter
                        .ask(&Prompt::new("--sequence", &text).required())?
                }
            };

            match builder.apply(&input, self.args.fps) {
                ManualStep::Continue(Feedback::Info(message)) => {
                    println!("{}", style(message).green())
                }
                ManualStep::Continue(Feedback::Warning(message)) => warn_println(&message),
                ManualStep::Done => break,
                ManualStep::Quit => {
                    println!("{}", style("Manual selection cancelled.").yellow());
                    return Ok(SessionState::Cancelled);
                }
            }
        }

        println!(
            "{}",
            style(format!(
                "Selection complete: {} frames in custom order",
                builder.len()
            ))
            .bold()
            .green()
        );

        Ok(SessionState::Reviewing(Selection {
            mode: SelectionMode::Manual,
            files: builder.into_files(),
        }))
    }

    fn ask_format(&mut self) -> Result<OutputFormat, ExportError> {
        println!("\n{}", style("Output format").bold().cyan());
        println!("  {} widely supported, smaller palette, no transparency", style("gif ").green());
        println!("  {} full color with alpha", style("webp").green());

        loop {
            let answer = self
                .prompter
                .ask(&Prompt::new("--format", "Choose output format [gif/webp]").with_default("gif"))?;
            match answer.parse::<OutputFormat>() {
                Ok(format) => return Ok(format),
                Err(e) => warn_println(&e),
            }
        }
    }

    fn ask_resize(&mut self) -> Result<Option<Dimensions>, ExportError> {
        let answer = self.prompter.ask(&Prompt::new(
            "--resize",
            "Resize to WIDTHxHEIGHT (Enter keeps the original size)",
        ))?;
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<Dimensions>() {
            Ok(target) => {
                println!("Will resize to {}", target);
                Ok(Some(target))
            }
            Err(e) => {
                warn_println(&format!("{}. Using original dimensions.", e));
                Ok(None)
            }
        }
    }

    fn review(&mut self, selection: Selection) -> Result<SessionState, ExportError> {
        let format = match self.args.format {
            Some(format) => format,
            None => self.ask_format()?,
        };
        let resize = match self.args.resize_target()? {
            Some(target) => Some(target),
            None => self.ask_resize()?,
        };

        let output_path = unique_output_path(self.output_dir, format.extension(), self.args.overwrite);
        let alpha_count = selection.files.iter().filter(|f| f.has_alpha()).count();

        let plan = ExportPlan {
            mode: selection.mode,
            files: selection.files,
            format,
            fps: self.args.fps,
            resize,
            quality: self.args.quality,
            reverse: self.args.reverse,
            output_path,
            alpha_count,
            dry_run: self.args.dry_run,
        };

        report::print_plan(&plan);

        if plan.dry_run {
            println!("\n{}", style("Dry run complete: no files were written.").green());
            println!("{}", style(format!("Would create: {}", plan.output_path.display())).dim());
            return Ok(SessionState::Confirmed(plan));
        }

        if self.prompter.confirm("Ready to create your animation?", true)? {
            Ok(SessionState::Confirmed(plan))
        } else {
            println!("{}", style("Animation creation cancelled by user.").yellow());
            Ok(SessionState::Cancelled)
        }
    }
}
