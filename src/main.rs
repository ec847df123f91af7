use clap::Parser;
use console::style;
use std::process::ExitCode;

use folder2anim::cli::Args;
use folder2anim::pipeline::{self, RunOutcome};
use folder2anim::prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
use folder2anim::report;
use folder2anim::utils::{error_println, verbose_println};
use folder2anim::ExportError;

fn run() -> Result<RunOutcome, ExportError> {
    let mut args = Args::parse();
    args.load_and_merge_config()?;

    verbose_println(
        args.verbose,
        &format!(
            "Settings: dir={}, fps={}, quality={}, reverse={}, overwrite={}",
            args.dir.display(),
            args.fps,
            args.quality,
            args.reverse,
            args.overwrite
        ),
    );

    let mut prompter: Box<dyn Prompter> = if args.non_interactive {
        Box::new(ScriptedPrompter::unattended())
    } else {
        Box::new(TerminalPrompter::stdin())
    };

    pipeline::run(&args, prompter.as_mut())
}

fn main() -> ExitCode {
    // Print banner
    println!("{}", style("folder2anim - Image to Animation Exporter").bold().blue());
    println!("{}", style("Group folder images by size and export GIF or WebP").dim());
    println!();

    match run() {
        Ok(RunOutcome::Exported(summary)) => {
            report::print_summary(&summary);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::DryRun(_)) => ExitCode::SUCCESS,
        Ok(RunOutcome::Cancelled) => ExitCode::SUCCESS,
        Err(err) => {
            error_println(&err.to_string());
            ExitCode::from(err.exit_code())
        }
    }
}
