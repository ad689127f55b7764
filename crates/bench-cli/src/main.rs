use std::env;
use std::path::PathBuf;
use std::time::Duration;

use bench_core::{
    CancelToken, CharacterizationJob, ExtractionResult, JobConfig, SchematicTemplate, SpiceCli,
    SweepPlan,
};
use bench_models::{ModelLibrary, ModelRecord};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!(
        r#"mosbench MOSFET characterization bench

USAGE:
    bench-cli [OPTIONS]

MODEL SELECTION (repeatable, at least one):
    --model NAME=PATH       Characterize model NAME defined in the library
                            file at absolute PATH
    --library FILE          JSON model library to look names up in
    --name NAME             Model name from --library

OPTIONS:
    -h, --help              Print help information
    -V, --version           Print version information
    --pins LIST             Subcircuit pin order, comma separated
                            (default: D,G,S)
    --simulator EXE         External simulator executable (default: ltspice)
    --timeout SECS          Per-invocation wall-clock timeout (default: 300)
    --current AMPS          Reference current for the threshold definition
                            (default: 1e-3)
    --gate-stop VOLTS       Gate sweep end voltage (default: 5)
    --gate-step VOLTS       Gate sweep step (default: 0.05)
    --no-temp-step          Run a single sweep instead of stepping
                            temperature -55..175
    --report-temp DEGC      Temperature whose step is reported as the
                            scalar threshold (default: 25)
    --keep-artifacts        Retain per-job working directories
    --workdir DIR           Base directory for job workspaces (default:
                            fresh temporary directories)
    --json PATH             Write results as JSON to PATH
    --serve ADDR            Run the HTTP API on ADDR instead of a one-shot
                            characterization

EXAMPLES:
    bench-cli --model PSMN1R4=/abs/models/psmn1r4.lib
    bench-cli --library models.json --name NMOS_A --name NMOS_B
    bench-cli --model NMOS_A=/abs/a.lib --pins DRAIN,GATE,SOURCE --json out.json
    bench-cli --serve 127.0.0.1:8080 --simulator /opt/ltspice/ltspice"#
    );
}

fn print_version() {
    println!("mosbench {}", VERSION);
}

struct CliOptions {
    models: Vec<(String, PathBuf)>,
    library: Option<PathBuf>,
    names: Vec<String>,
    pins: Vec<String>,
    simulator: PathBuf,
    timeout: Duration,
    reference_current: f64,
    gate_stop: f64,
    gate_step: f64,
    temp_step: bool,
    report_temp: f64,
    keep_artifacts: bool,
    workdir: Option<PathBuf>,
    json_out: Option<PathBuf>,
    serve: Option<String>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            library: None,
            names: Vec::new(),
            pins: vec!["D".to_string(), "G".to_string(), "S".to_string()],
            simulator: PathBuf::from("ltspice"),
            timeout: Duration::from_secs(300),
            reference_current: 1e-3,
            gate_stop: 5.0,
            gate_step: 0.05,
            temp_step: true,
            report_temp: 25.0,
            keep_artifacts: false,
            workdir: None,
            json_out: None,
            serve: None,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = parse_args();

    if let Some(addr) = options.serve {
        let config = bench_api::HttpServerConfig {
            bind_addr: addr,
            simulator: options.simulator,
            run_timeout: options.timeout,
        };
        if let Err(err) = bench_api::serve(config) {
            eprintln!("{}", err);
            std::process::exit(1);
        }
        return;
    }

    let records = collect_records(&options);
    if records.is_empty() {
        eprintln!("no models selected; use --model or --library/--name (see --help)");
        std::process::exit(2);
    }

    let simulator = SpiceCli::new(&options.simulator).with_timeout(options.timeout);
    let plan = build_plan(&options);
    let cancel = CancelToken::new();

    let mut outcomes: Vec<(String, Result<ExtractionResult, String>)> =
        Vec::with_capacity(records.len());
    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(records.len());
        for record in records {
            let name = record.name.clone();
            let simulator = &simulator;
            let plan = plan.clone();
            let cancel = cancel.clone();
            let config = job_config(&options, &name);
            let handle = scope.spawn(move || {
                let outcome = CharacterizationJob::new(
                    SchematicTemplate::vth_test(),
                    record,
                    plan,
                    config,
                )
                .and_then(|job| job.run(simulator, &cancel))
                .map_err(|err| err.diagnostic());
                (name, outcome)
            });
            handles.push(handle);
        }
        for handle in handles {
            match handle.join() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => outcomes.push(("unknown".to_string(), Err("job panicked".to_string()))),
            }
        }
    });

    let report = build_report(&outcomes);
    let rendered = match serde_json::to_string_pretty(&report) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("failed to render results: {}", err);
            std::process::exit(1);
        }
    };
    match &options.json_out {
        Some(path) => {
            if let Err(err) = std::fs::write(path, &rendered) {
                eprintln!("failed to write {}: {}", path.display(), err);
                std::process::exit(1);
            }
            println!("results written: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if outcomes.iter().any(|(_, outcome)| outcome.is_err()) {
        std::process::exit(1);
    }
}

fn parse_args() -> CliOptions {
    let mut options = CliOptions::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                print_version();
                std::process::exit(0);
            }
            "--model" => {
                let value = require_value(&mut args, &arg);
                let Some((name, path)) = value.split_once('=') else {
                    eprintln!("--model expects NAME=PATH, got {}", value);
                    std::process::exit(2);
                };
                options
                    .models
                    .push((name.to_string(), PathBuf::from(path)));
            }
            "--library" => {
                options.library = Some(PathBuf::from(require_value(&mut args, &arg)));
            }
            "--name" => {
                options.names.push(require_value(&mut args, &arg));
            }
            "--pins" => {
                let value = require_value(&mut args, &arg);
                options.pins = value
                    .split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
            }
            "--simulator" => {
                options.simulator = PathBuf::from(require_value(&mut args, &arg));
            }
            "--timeout" => {
                options.timeout = Duration::from_secs(parse_number(&mut args, &arg) as u64);
            }
            "--current" => {
                options.reference_current = parse_number(&mut args, &arg);
            }
            "--gate-stop" => {
                options.gate_stop = parse_number(&mut args, &arg);
            }
            "--gate-step" => {
                options.gate_step = parse_number(&mut args, &arg);
            }
            "--no-temp-step" => {
                options.temp_step = false;
            }
            "--report-temp" => {
                options.report_temp = parse_number(&mut args, &arg);
            }
            "--keep-artifacts" => {
                options.keep_artifacts = true;
            }
            "--workdir" => {
                options.workdir = Some(PathBuf::from(require_value(&mut args, &arg)));
            }
            "--json" => {
                options.json_out = Some(PathBuf::from(require_value(&mut args, &arg)));
            }
            "--serve" => {
                options.serve = Some(require_value(&mut args, &arg));
            }
            other => {
                eprintln!("unknown argument: {}", other);
                std::process::exit(2);
            }
        }
    }
    options
}

fn require_value(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    let Some(value) = args.next() else {
        eprintln!("missing value for {}", flag);
        std::process::exit(2);
    };
    value
}

fn parse_number(args: &mut impl Iterator<Item = String>, flag: &str) -> f64 {
    let value = require_value(args, flag);
    match value.parse::<f64>() {
        Ok(number) => number,
        Err(_) => {
            eprintln!("{} expects a number, got {}", flag, value);
            std::process::exit(2);
        }
    }
}

fn collect_records(options: &CliOptions) -> Vec<ModelRecord> {
    let mut records = Vec::new();

    for (name, path) in &options.models {
        match ModelRecord::new(name.clone(), path.clone(), options.pins.clone()) {
            Ok(record) => records.push(record),
            Err(err) => {
                eprintln!("invalid model {}: {}", name, err);
                std::process::exit(2);
            }
        }
    }

    if let Some(library_path) = &options.library {
        let library = match ModelLibrary::load(library_path) {
            Ok(library) => library,
            Err(err) => {
                eprintln!("failed to load {}: {}", library_path.display(), err);
                std::process::exit(2);
            }
        };
        for name in &options.names {
            match library.get(name) {
                Some(record) => records.push(record.clone()),
                None => {
                    eprintln!("model {} not found in {}", name, library_path.display());
                    std::process::exit(2);
                }
            }
        }
    } else if !options.names.is_empty() {
        eprintln!("--name requires --library");
        std::process::exit(2);
    }

    records
}

fn build_plan(options: &CliOptions) -> SweepPlan {
    let mut plan = SweepPlan {
        reference_current: options.reference_current,
        report_temperature: options.report_temp,
        ..SweepPlan::default()
    };
    plan.gate.stop = options.gate_stop;
    plan.gate.step = options.gate_step;
    if !options.temp_step {
        plan.temperature = None;
    }
    plan
}

fn job_config(options: &CliOptions, model_name: &str) -> JobConfig {
    JobConfig {
        keep_artifacts: options.keep_artifacts,
        // Concurrent jobs must not share a working directory.
        workdir: options.workdir.as_ref().map(|base| base.join(model_name)),
    }
}

fn build_report(
    outcomes: &[(String, Result<ExtractionResult, String>)],
) -> serde_json::Value {
    let jobs: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|(name, outcome)| match outcome {
            Ok(result) => serde_json::json!({
                "model_name": name,
                "status": "success",
                "test_type": "vth_analysis",
                "results": result,
            }),
            Err(message) => serde_json::json!({
                "model_name": name,
                "status": "error",
                "error_message": message,
            }),
        })
        .collect();
    serde_json::json!({ "jobs": jobs })
}
