use std::path::{Path, PathBuf};
use std::process;
use std::thread::available_parallelism;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::error;

use cyclic_frames::constants::Algorithm;
use cyclic_frames::scheduler::{IlpScheduler, NetworkFlowScheduler, Scheduler};
use cyclic_frames::utils::loader::read_task_dir;
use cyclic_frames::utils::{read_config_file, read_task_file};
use cyclic_frames::{run_batch, AssignmentCode, EngineConfig, RunRecord, TimingModel};

pub fn build_cli_command() -> Command {
    Command::new("cyclic-frames")
        .version("0.1.0")
        .about("Assigns periodic jobs to the frames of a cyclic executive")

        .arg(Arg::new("task_file")
            .required(true)
            .help("Taskset file (.json or .csv), or a directory of .json tasksets for a batch run"))

        .arg(Arg::new("algorithm")
            .short('a')
            .long("algorithm")
            .help("Construction to run")
            .value_parser(["flow", "ilp", "both"])
            .default_value("both"))

        .arg(Arg::new("time_limit")
            .short('t')
            .long("time-limit")
            .help("ILP solver time limit in seconds, overrides the configuration")
            .value_parser(clap::value_parser!(f64)))

        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .help("JSON engine configuration"))

        .arg(Arg::new("workers")
            .short('w')
            .long("workers")
            .help("Number of threads for batch runs")
            .value_parser(clap::value_parser!(usize)))

        .arg(Arg::new("utilization")
            .short('u')
            .long("utilization")
            .help("Target utilization reported in batch summaries")
            .value_parser(clap::value_parser!(f64))
            .default_value("0"))

        .arg(Arg::new("json")
            .long("json")
            .help("Print results as JSON")
            .action(ArgAction::SetTrue))

        .arg(Arg::new("timeline")
            .long("timeline")
            .help("Print the frame-by-frame layout of each assignment")
            .action(ArgAction::SetTrue))
}

/// Builds the engine configuration from the optional file and the command line.
fn load_config(matches: &ArgMatches) -> EngineConfig {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => read_config_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error reading configuration: {}", e);
            process::exit(AssignmentCode::InvalidTaskset as i32);
        }),
        None => EngineConfig::default(),
    };

    if let Some(&seconds) = matches.get_one::<f64>("time_limit") {
        config = config.with_time_limit(Some(Duration::from_secs_f64(seconds.max(0.0))));
    }

    config
}

fn print_record(record: &RunRecord, json: bool, timeline: bool) {
    let summary = record.summary();

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("cannot serialize result: {}", e),
        }
        return;
    }

    println!(
        "{}: {:?} in {:.6}s{}",
        summary.scheduler,
        record.code(),
        summary.elapsed_secs,
        summary.detail.map(|d| format!(" ({})", d)).unwrap_or_default()
    );

    if let Some(assignment) = record.assignment() {
        for job in assignment.jobs() {
            let placements: Vec<String> = job
                .allocations()
                .iter()
                .map(|a| format!("frame {}: {}", a.frame, a.time))
                .collect();
            println!("  {} ({}) -> [{}]", job.job(), job.requirement(), placements.join(", "));
        }

        if timeline {
            for interval in assignment.timeline() {
                let who = interval.job.map(|j| j.to_string()).unwrap_or_else(|| "idle".to_string());
                println!("  [{:>8.3}, {:>8.3}) {}", interval.start, interval.end, who);
            }
        }
    }
}

fn run_single(path: &Path, schedulers: &[&dyn Scheduler], config: &EngineConfig, matches: &ArgMatches) -> i32 {
    let taskset = match read_task_file(path) {
        Ok(taskset) => taskset,
        Err(e) => {
            eprintln!("Error reading task file: {}", e);
            return AssignmentCode::InvalidTaskset as i32;
        }
    };

    let timing = match TimingModel::new(&taskset, config) {
        Ok(timing) => timing,
        Err(e) => {
            eprintln!("Invalid taskset: {}", e);
            return AssignmentCode::InvalidTaskset as i32;
        }
    };

    if !matches.get_flag("json") {
        println!(
            "Major cycle {}, frame size {}, {} frames, {} jobs",
            timing.major_cycle(),
            timing.frame_size(),
            timing.frame_count(),
            timing.jobs().len()
        );
    }

    schedulers
        .iter()
        .map(|scheduler| {
            let record = cyclic_frames::run_on(*scheduler, &timing);
            print_record(&record, matches.get_flag("json"), matches.get_flag("timeline"));
            record.code() as i32
        })
        .max()
        .unwrap_or(0)
}

fn run_directory(dir: &Path, schedulers: &[&dyn Scheduler], config: &EngineConfig, matches: &ArgMatches) -> i32 {
    let tasksets = match read_task_dir(dir) {
        Ok(entries) => entries.into_iter().map(|(_, taskset)| taskset).collect::<Vec<_>>(),
        Err(e) => {
            eprintln!("Error reading task directory: {}", e);
            return AssignmentCode::InvalidTaskset as i32;
        }
    };

    let default_parallelism_approx = available_parallelism().map(|n| n.get()).unwrap_or(1);
    let workers = matches.get_one::<usize>("workers").copied().unwrap_or(default_parallelism_approx);
    let utilization = matches.get_one::<f64>("utilization").copied().unwrap_or(0.0);

    let summaries = run_batch(schedulers, &tasksets, config, utilization, workers);

    match serde_json::to_string_pretty(&summaries) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("cannot serialize batch summary: {}", e),
    }

    AssignmentCode::Feasible as i32
}

fn main() {
    // cargo run -- <task_file|dir> [-a flow|ilp|both] [-t <seconds>] [-c <config.json>] [-w <workers>] [--json]
    // example : cargo run -- tasksets/ce_test_0.json -a both --timeline
    env_logger::Builder::from_default_env()
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    let matches: ArgMatches = build_cli_command().get_matches();

    let config = load_config(&matches);
    let algorithm = matches
        .get_one::<String>("algorithm")
        .and_then(|a| Algorithm::parse(a))
        .unwrap_or(Algorithm::Both);

    let flow = NetworkFlowScheduler;
    let ilp = IlpScheduler::new(&config);
    let mut schedulers: Vec<&dyn Scheduler> = Vec::new();
    if algorithm.runs_flow() {
        schedulers.push(&flow);
    }
    if algorithm.runs_ilp() {
        schedulers.push(&ilp);
    }

    let path = PathBuf::from(matches.get_one::<String>("task_file").map(String::as_str).unwrap_or_default());
    let code = if path.is_dir() {
        run_directory(&path, &schedulers, &config, &matches)
    } else {
        run_single(&path, &schedulers, &config, &matches)
    };

    process::exit(code);
}
