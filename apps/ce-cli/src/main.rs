use ce_app::{
    AppResult, CharacterizeOptions, CharacterizeRequest, CharacterizeResponse, ProgressEvent, ResampleRequest,
    characterize, pipeline, project_service,
};
use ce_core::units::{as_mw, w};
use ce_envelope::ParameterSet;
use ce_results::ResultStore;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ce-cli")]
#[command(about = "CHP and heat pump operating envelope characterization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List plant units and heat pumps in a project
    Units {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Sweep and extract envelopes for one unit or heat pump, or all of them
    Characterize {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Unit or heat pump ID (all when omitted)
        unit_id: Option<String>,
        /// Skip cache and force a fresh sweep
        #[arg(long)]
        no_cache: bool,
        /// Sweep boundary values one after another
        #[arg(long)]
        sequential: bool,
    },
    /// List cached runs of a unit
    Runs {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Unit ID to list runs for
        unit_id: String,
    },
    /// Show the manifest of a cached run
    ShowRun {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Write the dense envelope table of a unit or heat pump as CSV
    Interpolate {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Unit or heat pump ID
        unit_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Map a boundary timeseries onto dispatch parameters of every unit
    Resample {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// `;`-separated CSV file with the boundary series
        #[arg(long)]
        series: PathBuf,
        /// Column holding the boundary values
        #[arg(long)]
        column: Option<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Units { project_path } => cmd_units(&project_path),
        Commands::Characterize {
            project_path,
            unit_id,
            no_cache,
            sequential,
        } => cmd_characterize(&project_path, unit_id.as_deref(), options(no_cache, sequential)),
        Commands::Runs {
            project_path,
            unit_id,
        } => cmd_runs(&project_path, &unit_id),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::Interpolate {
            project_path,
            unit_id,
            output,
        } => cmd_interpolate(&project_path, &unit_id, output.as_deref()),
        Commands::Resample {
            project_path,
            series,
            column,
            output,
        } => cmd_resample(&project_path, &series, column.as_deref(), output.as_deref()),
    }
}

fn options(no_cache: bool, sequential: bool) -> CharacterizeOptions {
    CharacterizeOptions {
        use_cache: no_cache.then_some(false),
        parallel: sequential.then_some(false),
        ..CharacterizeOptions::default()
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_units(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let units = project_service::list_units(&project);
    let heat_pumps = project_service::list_heat_pumps(&project);

    if units.is_empty() && heat_pumps.is_empty() {
        println!("No units found in project");
        return Ok(());
    }
    println!(
        "Units in project (boundary {} {}..{} {}):",
        project.boundary.name, project.boundary.lo, project.boundary.hi, project.boundary.unit
    );
    for unit in units {
        println!(
            "  {} - {} ({:?}, {} plant, {:.1} MW load, {:.1} MW heat, {} samples, {} excluded)",
            unit.id,
            unit.name,
            unit.kind,
            unit.plant,
            as_mw(w(unit.nameplate_load_w)),
            as_mw(w(unit.max_heat_duty_w)),
            unit.sample_count,
            unit.excluded_count
        );
    }
    for hp in heat_pumps {
        println!(
            "  {} - {} (heat pump, {:.1} MW heat, {:.0} % turndown, {} samples, {} excluded)",
            hp.id,
            hp.name,
            as_mw(w(hp.nameplate_heat_w)),
            hp.min_load_fraction * 100.0,
            hp.sample_count,
            hp.excluded_count
        );
    }
    Ok(())
}

fn is_heat_pump(project_path: &Path, unit_id: &str) -> AppResult<bool> {
    let project = project_service::load_project(project_path)?;
    if project_service::get_unit(&project, unit_id).is_ok() {
        return Ok(false);
    }
    project_service::get_heat_pump(&project, unit_id).map(|_| true)
}

fn cmd_characterize(project_path: &Path, unit_id: Option<&str>, options: CharacterizeOptions) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let unit_ids: Vec<(String, bool)> = match unit_id {
        Some(id) => vec![(id.to_string(), is_heat_pump(project_path, id)?)],
        None => project
            .units
            .iter()
            .map(|u| (u.id.clone(), false))
            .chain(project.heat_pumps.iter().map(|hp| (hp.id.clone(), true)))
            .collect(),
    };

    for (unit_id, heat_pump) in &unit_ids {
        println!("Characterizing {}: {unit_id}", if *heat_pump { "heat pump" } else { "unit" });
        let request = CharacterizeRequest {
            project_path,
            unit_id,
            options: options.clone(),
        };

        let mut last_emit = Instant::now();
        let mut last_stage = String::new();
        let mut progress = |event: ProgressEvent| {
            let stage_key = format!("{:?}", event.stage);
            if stage_key != last_stage || last_emit.elapsed().as_millis() >= 100 {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        };
        if *heat_pump {
            let response = characterize::ensure_heat_pump_characterization_with_progress(&request, Some(&mut progress))?;
            report_characterization(&response);
        } else {
            let response = characterize::ensure_characterization_with_progress(&request, Some(&mut progress))?;
            report_characterization(&response);
        }
    }
    Ok(())
}

fn report_characterization<P>(response: &CharacterizeResponse<P>) {
    clear_progress_line();
    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Characterization completed: {}", response.run_id);
    }
    let manifest = &response.manifest;
    println!("  Sampled:  {:?}", manifest.sampled);
    for issue in &manifest.excluded {
        println!("  Excluded: {} ({})", issue.value, issue.reason);
    }
    for issue in &manifest.failed {
        println!("  Failed:   {} ({})", issue.value, issue.reason);
    }
    let sim = &manifest.simulation;
    println!(
        "  Simulator calls: {} ({} converged, {} not converged, {} linearly dependent, {} non-finite)",
        sim.calls, sim.converged, sim.not_converged, sim.linear_dependent, sim.non_finite
    );
    println!("  Elapsed: {:.3}s", response.elapsed_s);
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &ProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} [{}] {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.unit_id,
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {msg}"));
    }
    print!("{line}");
    let _ = io::stdout().flush();
}

fn cmd_runs(project_path: &Path, unit_id: &str) -> AppResult<()> {
    let store = ResultStore::for_project(project_path)?;
    let runs = store.list_runs(unit_id)?;

    if runs.is_empty() {
        println!("No cached runs found for unit: {unit_id}");
    } else {
        println!("Cached runs for unit '{unit_id}':");
        for manifest in runs {
            println!(
                "  {} ({}, {} sampled)",
                manifest.run_id,
                manifest.timestamp,
                manifest.sampled.len()
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    let store = ResultStore::for_project(project_path)?;
    let manifest = store.load_manifest(run_id)?;
    let traces = store.load_traces(run_id)?;

    println!("Run {run_id}");
    println!("  Unit: {}", manifest.unit_id);
    println!("  Created: {}", manifest.timestamp);
    println!("  Tool version: {}", manifest.tool_version);
    println!("  Boundary: {}", manifest.boundary_name);
    println!("  Sampled: {:?}", manifest.sampled);
    for issue in manifest.excluded.iter().chain(&manifest.failed) {
        println!("  Skipped {}: {}", issue.value, issue.reason);
    }

    println!("\nSweeps:");
    for trace in traces {
        println!(
            "  {:>5}: {} points, {} failed steps, {:.3}s",
            trace.boundary,
            trace.p.len(),
            trace.failed_steps,
            trace.runtime_s
        );
    }
    Ok(())
}

fn cmd_interpolate(project_path: &Path, unit_id: &str, output: Option<&Path>) -> AppResult<()> {
    if is_heat_pump(project_path, unit_id)? {
        let (response, table) = pipeline::load_heat_pump_table(project_path, unit_id, CharacterizeOptions::default())?;
        let rows: Vec<_> = table.iter().map(|(key, row)| (key, row.envelope)).collect();
        write_table(&rows, response.envelopes.len(), output)
    } else {
        let (response, table) = pipeline::load_table(project_path, unit_id, CharacterizeOptions::default())?;
        let rows: Vec<_> = table.iter().map(|(key, row)| (key, row.envelope)).collect();
        write_table(&rows, response.envelopes.len(), output)
    }
}

fn write_table<P: ParameterSet>(rows: &[(i32, P)], sampled: usize, output: Option<&Path>) -> AppResult<()> {
    match output {
        Some(path) => {
            ce_results::write_envelopes_csv(rows, BufWriter::new(File::create(path)?))?;
            println!("✓ Wrote {} rows ({sampled} sampled) to {}", rows.len(), path.display());
        }
        None => ce_results::write_envelopes_csv(rows, io::stdout().lock())?,
    }
    Ok(())
}

fn cmd_resample(project_path: &Path, series: &Path, column: Option<&str>, output: Option<&Path>) -> AppResult<()> {
    let request = ResampleRequest {
        project_path,
        series_path: series,
        column,
        options: CharacterizeOptions::default(),
    };
    // Progress only when stdout is not the table itself.
    let mut render = |event: ProgressEvent| render_cli_progress(&event);
    let progress: Option<&mut dyn FnMut(ProgressEvent)> = if output.is_some() { Some(&mut render) } else { None };
    let response = pipeline::resample_project(&request, progress)?;
    if output.is_some() {
        clear_progress_line();
    }
    let columns = response.columns();

    match output {
        Some(path) => {
            ce_results::write_timeseries_csv("step", &columns, BufWriter::new(File::create(path)?))?;
            println!(
                "✓ Wrote {} steps x {} columns to {}",
                response.horizon,
                columns.len(),
                path.display()
            );
            for unit in &response.units {
                println!("  {}: {}", unit.unit_id, unit.timeseries_path.display());
            }
        }
        None => ce_results::write_timeseries_csv("step", &columns, io::stdout().lock())?,
    }
    Ok(())
}
