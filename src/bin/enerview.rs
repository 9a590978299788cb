use enerview::app::ViewerApp;
use enerview::events::AppEvent;
use enerview::heatmap::HeatmapRenderer;
use enerview::job_api::{JobClient, JobSubmission};
use enerview::polling::JobPoller;
use enerview::viewer::{HeadlessEngine, RenderEngine};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use std::{env, fs};

#[derive(Serialize)]
struct ClickOutcome {
    resolved_file: String,
    chain: String,
    residue: i32,
    name: String,
    atom_count: usize,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  enerview --version\n  \
  enerview archive ARCHIVE.tar.gz tables\n  \
  enerview archive ARCHIVE.tar.gz heatmap combined|TABLE_KEY OUTPUT.png\n  \
  enerview archive ARCHIVE.tar.gz click RESIDUE MUTANT [TABLE_KEY]\n  \
  enerview archive ARCHIVE.tar.gz export OUTPUT.tar.gz\n  \
  enerview job BASE_URL start STRUCTURE.pdb CHAIN MUTATIONS [INTERVAL_SECS]"
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

/// Surface queued warnings/errors/log excerpts on stderr.
fn report_events(app: &mut ViewerApp<HeadlessEngine>) {
    for event in app.events.drain() {
        match event {
            AppEvent::Warning(w) => eprintln!("Warning: {w}"),
            AppEvent::Error(e) => eprintln!("Error: {e}"),
            AppEvent::LogUpdated(tail) => eprintln!("{tail}"),
            _ => {}
        }
    }
}

fn open_archive_app(path: &str) -> Result<ViewerApp<HeadlessEngine>, String> {
    let mut app = ViewerApp::new(HeadlessEngine::new());
    app.open_archive(Path::new(path)).map_err(|e| e.to_string())?;
    Ok(app)
}

fn cmd_tables(archive: &str) -> Result<(), String> {
    let mut app = open_archive_app(archive)?;
    let keys: Vec<String> = app.session().cache.keys().to_vec();
    report_events(&mut app);
    print_json(&keys)
}

fn cmd_heatmap(archive: &str, selection: &str, output: &str) -> Result<(), String> {
    let mut app = open_archive_app(archive)?;
    let matrix = if selection == "combined" {
        app.select_combined()
    } else {
        app.select_table(selection)
    };
    let png = HeatmapRenderer::png_bytes(&matrix)?;
    fs::write(output, png).map_err(|e| format!("Could not write '{output}': {e}"))?;
    report_events(&mut app);
    println!(
        "Wrote {output} ({} residues x {} mutants)",
        matrix.row_labels.len(),
        matrix.column_labels.len()
    );
    Ok(())
}

fn cmd_click(archive: &str, residue: &str, mutant: &str, table: Option<&str>) -> Result<(), String> {
    let mut app = open_archive_app(archive)?;
    if let Some(key) = table {
        let _ = app.select_table(key);
    } else {
        let _ = app.select_combined();
    }
    let mutant = mutant
        .chars()
        .next()
        .ok_or_else(|| "Mutant letter must not be empty".to_string())?;
    let result = app.click_cell(residue, mutant);
    report_events(&mut app);
    let located = result.map_err(|e| e.to_string())?;
    let resolved_file = app
        .current_structure()
        .and_then(|h| app.engine().structure(h))
        .map(|s| s.name.clone())
        .unwrap_or_default();
    print_json(&ClickOutcome {
        resolved_file,
        chain: located.chain,
        residue: located.number,
        name: located.name,
        atom_count: located.atom_count,
    })
}

fn cmd_export(archive: &str, output: &str) -> Result<(), String> {
    let mut app = open_archive_app(archive)?;
    let result = app.export_results(Path::new(output)).map_err(|e| e.to_string());
    report_events(&mut app);
    result?;
    println!("Wrote {output}");
    Ok(())
}

fn cmd_job_start(
    base_url: &str,
    structure_path: &str,
    chain: &str,
    mutations: &str,
    interval_secs: u64,
) -> Result<(), String> {
    let structure_pdb = fs::read_to_string(structure_path)
        .map_err(|e| format!("Could not read structure '{structure_path}': {e}"))?;
    let client = JobClient::new(base_url)?;
    let submission = JobSubmission {
        structure_pdb,
        chain: chain.to_string(),
        mutations: mutations.to_string(),
    };
    let poller = JobPoller::new(Duration::from_secs(interval_secs));

    let mut app = ViewerApp::new(HeadlessEngine::new());
    let result = app
        .start_job(&client, &submission, &poller)
        .map_err(|e| e.to_string());
    report_events(&mut app);
    result?;

    let keys: Vec<String> = app.session().cache.keys().to_vec();
    print_json(&keys)
}

fn run(args: &[String]) -> Result<(), String> {
    match args {
        [flag] if flag == "--version" => {
            println!("{}", enerview::about::version_cli_text());
            Ok(())
        }
        [cmd, archive, rest @ ..] if cmd == "archive" => match rest {
            [sub] if sub == "tables" => cmd_tables(archive),
            [sub, selection, output] if sub == "heatmap" => cmd_heatmap(archive, selection, output),
            [sub, residue, mutant] if sub == "click" => cmd_click(archive, residue, mutant, None),
            [sub, residue, mutant, table] if sub == "click" => {
                cmd_click(archive, residue, mutant, Some(table.as_str()))
            }
            [sub, output] if sub == "export" => cmd_export(archive, output),
            _ => {
                usage();
                Err("Unknown archive subcommand".to_string())
            }
        },
        [cmd, base_url, sub, structure, chain, mutations] if cmd == "job" && sub == "start" => {
            cmd_job_start(base_url, structure, chain, mutations, 5)
        }
        [cmd, base_url, sub, structure, chain, mutations, interval]
            if cmd == "job" && sub == "start" =>
        {
            let interval = interval
                .parse()
                .map_err(|e| format!("Bad interval '{interval}': {e}"))?;
            cmd_job_start(base_url, structure, chain, mutations, interval)
        }
        _ => {
            usage();
            Err("Unknown command".to_string())
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
