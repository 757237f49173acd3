use color_replacer::config::init;
use color_replacer::error::AppError;
use color_replacer::script;
use color_replacer::session::{Outcome, Session};
use color_replacer::types::{AppConfig, BatchJob, Mode, ScriptInput};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::error;
use rayon::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = init()?;

    match &config.mode {
        Mode::Batch(job) => run_batch(&config, job),
        Mode::Script(input) => run_script(&config, input),
    }
}

fn run_batch(config: &AppConfig, job: &BatchJob) -> anyhow::Result<()> {
    let multi_progress = MultiProgress::new();
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent_precise}% ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let results: Vec<Result<(), AppError>> = job
        .input_output_pairs
        .par_iter()
        .map(|(input_path, output_path)| {
            let pb = multi_progress.add(ProgressBar::new(0));
            pb.set_style(style.clone());
            pb.set_message(format!("Processing: {}", input_path.display()));

            let result = process_image(input_path, output_path, config, job, pb.clone());

            match &result {
                Ok(()) => pb.finish_with_message(format!(
                    "Finished: {} (Saved to: {})",
                    input_path.display(),
                    output_path.display()
                )),
                Err(err) => pb.finish_with_message(format!(
                    "Failed: {} ({})",
                    input_path.display(),
                    err
                )),
            }

            result
        })
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        for err in results.into_iter().filter_map(Result::err) {
            error!("{}", err);
        }
        bail!("{} of {} images failed", failed, job.input_output_pairs.len());
    }

    Ok(())
}

fn process_image(
    input_path: &Path,
    output_path: &Path,
    config: &AppConfig,
    job: &BatchJob,
    pb: ProgressBar,
) -> Result<(), AppError> {
    let mut session =
        Session::new(config.viewport, config.default_format).with_progress(pb.clone());

    for command in job.commands_for(input_path, output_path, config.tolerance) {
        match session.dispatch(command)? {
            Outcome::Loaded { height, .. } => pb.set_length(height as u64),
            outcome @ (Outcome::SourcePicked(_) | Outcome::SourceSet(_)) => {
                pb.set_message(format!("{}: {}", input_path.display(), outcome))
            }
            _ => {}
        }
    }
    Ok(())
}

fn run_script(config: &AppConfig, input: &ScriptInput) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = match input {
        ScriptInput::Stdin => Box::new(BufReader::new(io::stdin())),
        ScriptInput::File(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open script {}", path.display()))?,
        )),
    };

    let mut session =
        Session::new(config.viewport, config.default_format).with_tolerance(config.tolerance);

    let failed = script::run(
        reader,
        &mut session,
        &config.colors,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .context("Failed to read script")?;

    if failed > 0 {
        bail!("{} script command(s) failed", failed);
    }
    Ok(())
}
