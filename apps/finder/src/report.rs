//! Console progress, end-of-run tallies, and optional output files.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::resolver::{Resolution, ResolutionOutcome};
use crate::validate::Validation;

pub const VALID_FILE: &str = "valid.csv";
pub const NO_PAGE_FILE: &str = "no-page.txt";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub active: usize,
    pub dead: usize,
    pub skipped: usize,
    pub errors: usize,
    pub relocated: usize,
}

impl Tally {
    pub fn from_resolutions(results: &[Resolution]) -> Self {
        let mut tally = Tally::default();
        for r in results {
            match r.outcome {
                ResolutionOutcome::Active { .. } => tally.active += 1,
                ResolutionOutcome::Dead { .. } => tally.dead += 1,
                ResolutionOutcome::Skipped { .. } => tally.skipped += 1,
                ResolutionOutcome::ProbeError { .. } => tally.errors += 1,
            }
        }
        tally
    }

    pub fn from_validations(results: &[Validation]) -> Self {
        let mut tally = Tally::default();
        for v in results {
            if v.is_active() {
                tally.active += 1;
            } else {
                tally.dead += 1;
            }
            if v.relocated {
                tally.relocated += 1;
            }
            if v.error.is_some() {
                tally.errors += 1;
            }
        }
        tally
    }

    pub fn print(&self) {
        println!();
        println!("========================================");
        println!("ACTIVE:    {}", self.active);
        println!("DEAD:      {}", self.dead);
        if self.skipped > 0 {
            println!("SKIPPED:   {}", self.skipped);
        }
        if self.relocated > 0 {
            println!("RELOCATED: {}", self.relocated);
        }
        if self.errors > 0 {
            println!("ERRORS:    {}", self.errors);
        }
        println!("========================================");
    }
}

/// `--json` output: every per-item result followed by the tally.
#[derive(Serialize)]
struct JsonReport<'a, T> {
    results: &'a [T],
    tally: &'a Tally,
}

pub fn json_report<T: Serialize>(results: &[T], tally: &Tally) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport { results, tally })?)
}

pub fn print_json<T: Serialize>(results: &[T], tally: &Tally) -> Result<()> {
    println!("{}", json_report(results, tally)?);
    Ok(())
}

pub fn resolution_line(r: &Resolution) -> String {
    match &r.outcome {
        ResolutionOutcome::Active { url, .. } => format!("✓ {} → {}", r.name, url),
        ResolutionOutcome::Dead { .. } => format!("✗ {}", r.name),
        ResolutionOutcome::Skipped { existing_slug } => {
            format!("- {} (already stored as {})", r.name, existing_slug)
        }
        ResolutionOutcome::ProbeError {
            slug,
            provider,
            cause,
        } => format!("! {} found on {provider}/{slug} but not recorded: {cause}", r.name),
    }
}

pub fn validation_line(v: &Validation) -> String {
    match (&v.error, v.is_active(), v.relocated) {
        (Some(e), _, _) => format!("! {} ({})", v.name, e),
        (None, true, true) => format!("↪ {} → {}", v.name, v.url),
        (None, true, false) => format!("✓ {}", v.name),
        (None, false, _) => format!("✗ {}", v.name),
    }
}

pub fn print_progress(done: usize, total: usize) {
    println!("[{done}/{total}]\n");
}

/// Writes `valid.csv` (`Company,URL`) and `no-page.txt` into `dir`.
pub fn write_outputs(dir: &Path, active: &[(&str, &str)], dead: &[&str]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create output directory {}", dir.display()))?;

    let mut csv = String::from("Company,URL\n");
    for (name, url) in active {
        writeln!(csv, "\"{}\",\"{}\"", csv_escape(name), csv_escape(url))?;
    }
    let valid_path = dir.join(VALID_FILE);
    std::fs::write(&valid_path, csv)
        .with_context(|| format!("could not write {}", valid_path.display()))?;

    let no_page_path = dir.join(NO_PAGE_FILE);
    std::fs::write(&no_page_path, dead.join("\n"))
        .with_context(|| format!("could not write {}", no_page_path.display()))?;

    info!("Saved {} and {}", valid_path.display(), no_page_path.display());
    Ok(())
}

fn csv_escape(field: &str) -> String {
    field.replace('"', "\"\"")
}

/// Splits resolutions into `(name, url)` for active boards and names with no board.
pub fn resolution_outputs(results: &[Resolution]) -> (Vec<(&str, &str)>, Vec<&str>) {
    let mut active = Vec::new();
    let mut dead = Vec::new();
    for r in results {
        match &r.outcome {
            ResolutionOutcome::Active { url, .. } => active.push((r.name.as_str(), url.as_str())),
            ResolutionOutcome::Dead { .. } => dead.push(r.name.as_str()),
            _ => {}
        }
    }
    (active, dead)
}

pub fn validation_outputs(results: &[Validation]) -> (Vec<(&str, &str)>, Vec<&str>) {
    let mut active = Vec::new();
    let mut dead = Vec::new();
    for v in results {
        if v.is_active() {
            active.push((v.name.as_str(), v.url.as_str()));
        } else {
            dead.push(v.name.as_str());
        }
    }
    (active, dead)
}
