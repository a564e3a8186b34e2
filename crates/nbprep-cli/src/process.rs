//! Process command implementation.
//!
//! Drives the per-file pipeline: load → sequential gate → execute, with
//! errors deferred until every file has been seen, then the write phase
//! (student copy, extracted images, in-place overwrite) for clean runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;

use nbprep_core::{Notebook, is_sequentially_executed, resolve_static_dir, strip_solutions};

use crate::colors;
use crate::executor::KernelExecutor;
use crate::report;

/// Sibling directory receiving student notebooks.
const STUDENT_DIR: &str = "student";

/// Sibling directory receiving extracted images.
const STATIC_DIR: &str = "static";

/// Flags controlling a processing run.
pub struct Options {
    /// Execute and validate only; write nothing
    pub check_only: bool,

    /// Skip the sequential-execution gate
    pub allow_non_sequential: bool,

    /// Per-notebook execution timeout in seconds
    pub timeout_secs: u64,
}

/// Execute the process command over the given paths.
pub async fn execute(files: &[PathBuf], options: &Options) -> anyhow::Result<ExitCode> {
    // Only notebook files are processed; everything else is ignored
    let nb_paths: Vec<&PathBuf> = files
        .iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "ipynb"))
        .collect();
    if nb_paths.is_empty() {
        println!("No notebook files found");
        return Ok(ExitCode::SUCCESS);
    }

    // Resolving jupyter can fail; defer that too, so a missing install is
    // reported against each file instead of aborting the batch
    let executor = KernelExecutor::from_env(Duration::from_secs(options.timeout_secs));

    let mut errors: BTreeMap<PathBuf, String> = BTreeMap::new();
    let mut notebooks: Vec<(&Path, Notebook)> = Vec::new();

    for &nb_path in &nb_paths {
        let notebook = Notebook::read_from_file(nb_path)
            .with_context(|| format!("Failed to load {}", nb_path.display()))?;

        if !options.allow_non_sequential && !is_sequentially_executed(&notebook) {
            errors.insert(
                nb_path.clone(),
                "Notebook code cells were not executed sequentially from 1 \
                 (re-run it top to bottom in a fresh kernel, or pass \
                 --allow-non-sequential)"
                    .to_string(),
            );
            continue;
        }

        println!(
            "{}Executing{} {}",
            colors::CYAN,
            colors::RESET,
            nb_path.display()
        );
        match &executor {
            Ok(executor) => match executor.execute(&notebook).await {
                Ok(executed) => {
                    notebooks.push((nb_path.as_path(), executed));
                }
                Err(err) => {
                    errors.insert(nb_path.clone(), format!("{err:#}"));
                }
            },
            Err(err) => {
                errors.insert(nb_path.clone(), format!("{err:#}"));
            }
        }
    }

    // Nothing is written for a failed or check-only run
    if options.check_only || !errors.is_empty() {
        return Ok(report::summarize(&errors));
    }

    for (nb_path, notebook) in &notebooks {
        write_outputs(nb_path, notebook)
            .with_context(|| format!("Failed to write outputs for {}", nb_path.display()))?;
    }

    Ok(report::summarize(&errors))
}

/// Write the three artifacts derived from an executed notebook.
fn write_outputs(nb_path: &Path, notebook: &Notebook) -> anyhow::Result<()> {
    let nb_dir = match nb_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let nb_fname = nb_path
        .file_name()
        .context("Notebook path has no file name")?;
    let key = nb_path
        .file_stem()
        .context("Notebook path has no file stem")?
        .to_string_lossy();

    let student_dir = nb_dir.join(STUDENT_DIR);
    let static_dir = nb_dir.join(STATIC_DIR);
    fs::create_dir_all(&student_dir)?;
    fs::create_dir_all(&static_dir)?;

    // Student copy: solutions out, image links pointing at ../static
    let mut student = notebook.clone();
    let resources = strip_solutions(&mut student, &key)?;
    resolve_static_dir(&mut student, &format!("../{STATIC_DIR}"));

    let student_path = student_dir.join(nb_fname);
    println!("Writing student notebook to {}", student_path.display());
    student.write_to_file(&student_path)?;

    for (name, bytes) in &resources {
        fs::write(static_dir.join(name), bytes)?;
    }
    if !resources.is_empty() {
        println!(
            "Wrote {} extracted images to {}",
            resources.len(),
            static_dir.display()
        );
    }

    // The executed, solution-intact notebook replaces the input
    notebook.write_to_file(nb_path)?;

    Ok(())
}
