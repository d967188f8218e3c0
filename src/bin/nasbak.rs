//! NAS backup CLI (nasbak) - Main binary entry point

use nasbak::cli::args::{Command, HistoryArgs, PlanArgs, RunArgs, parse_args};
use nasbak::cli::output::{
    format_history_json, format_history_text, format_plan_json, format_plan_text, format_progress,
};
use nasbak::cli::interrupt::install_interrupt_handler;
use nasbak::io::config::{
    Configuration, default_config_path, load_configuration, save_configuration,
    set_aside_configuration,
};
use nasbak::services::plan;
use nasbak::source::LocalDirSource;
use nasbak::{HistoryLog, Orchestrator, RunEvent};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, mpsc};

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug nasbak run /mnt/nas/photos /media/usb/photos
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            println!("nasbak {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let exit_code = match &cli_args.command {
        Command::Run(run_args) => handle_run(run_args),
        Command::Plan(plan_args) => handle_plan(plan_args),
        Command::History(history_args) => handle_history(history_args),
    };

    process::exit(exit_code);
}

fn config_path(explicit: Option<&String>) -> PathBuf {
    explicit.map_or_else(default_config_path, PathBuf::from)
}

fn handle_run(args: &RunArgs) -> i32 {
    if !Path::new(&args.source).is_dir() {
        eprintln!("Error: source is not a directory: {}", args.source);
        return 2;
    }

    let config_path = config_path(args.config.as_ref());
    let mut config = match load_configuration(&config_path) {
        Ok(config) => config,
        Err(e) => {
            // Keep the unreadable history instead of saving over it.
            eprintln!("Warning: could not read {}: {e}", config_path.display());
            match set_aside_configuration(&config_path) {
                Ok(aside) => eprintln!("Previous configuration kept at {}", aside.display()),
                Err(e) => {
                    eprintln!("Error: could not move the configuration aside: {e}");
                    return 1;
                }
            }
            Configuration::default()
        }
    };
    let history = HistoryLog::from_entries(std::mem::take(&mut config.histories));

    let orchestrator = match Orchestrator::new(history.clone()) {
        Ok(o) => Arc::new(o),
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let (tx, rx) = mpsc::channel::<RunEvent>();
    let notifier = Arc::new(move |event: &RunEvent| {
        // The receiver only disappears once main has stopped listening.
        let _ = tx.send(event.clone());
    });

    let destination = Path::new(&args.destination);
    let handle = match orchestrator.start_run(
        Arc::new(LocalDirSource::new()),
        &args.source,
        destination,
        notifier,
    ) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let on_interrupt = {
        let orchestrator = Arc::clone(&orchestrator);
        let handle = handle.clone();
        move || orchestrator.cancel_run(&handle)
    };
    if let Err(e) = install_interrupt_handler(on_interrupt) {
        log::warn!("{e}; Ctrl+C will stop the process without recording the run");
    }

    let mut success = false;
    for event in rx {
        match event {
            RunEvent::Status(message) => {
                if !args.quiet {
                    eprintln!("{message}");
                }
            }
            RunEvent::Progress(progress) => {
                if !args.quiet {
                    eprintln!("{}", format_progress(&progress));
                }
            }
            RunEvent::Completed { success: ok } => {
                success = ok;
                break;
            }
        }
    }
    orchestrator.wait_idle();

    config.histories = history.entries();
    config.source_root = Some(args.source.clone());
    config.last_destination = Some(destination.to_path_buf());
    if let Err(e) = save_configuration(&config_path, &config) {
        eprintln!("Warning: failed to save history: {e}");
    }

    if success { 0 } else { 1 }
}

fn handle_plan(args: &PlanArgs) -> i32 {
    let source = LocalDirSource::new();
    let plan = match plan::plan(&source, &args.source, Path::new(&args.destination)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    if args.json {
        println!("{}", format_plan_json(&plan));
    } else {
        print!("{}", format_plan_text(&plan));
    }
    0
}

fn handle_history(args: &HistoryArgs) -> i32 {
    let config = match load_configuration(&config_path(args.config.as_ref())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    if args.json {
        println!("{}", format_history_json(&config.histories, args.limit));
    } else {
        print!("{}", format_history_text(&config.histories, args.limit));
    }
    0
}

fn print_help() {
    println!("NAS backup CLI (nasbak) - Mirror a network share onto a local volume");
    println!();
    println!("USAGE:");
    println!("    nasbak run <SOURCE> <DEST> [OPTIONS]");
    println!("    nasbak plan <SOURCE> <DEST> [OPTIONS]");
    println!("    nasbak history [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    run       Copy new and changed files from SOURCE into DEST");
    println!("    plan      Show what a run would copy without copying anything");
    println!("    history   List previous runs");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help                 Show this help message");
    println!("    -v, --version              Show version information");
    println!();
    println!("RUN OPTIONS:");
    println!("    --config <FILE>           Configuration/history file");
    println!("                              (default: ~/.nas-backup/backup-config.json)");
    println!("    --quiet                   Suppress progress output");
    println!("                              Ctrl+C stops after the file being copied");
    println!();
    println!("PLAN OPTIONS:");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("HISTORY OPTIONS:");
    println!("    --config <FILE>           Configuration/history file");
    println!("    --limit <N>               Show only the N most recent runs");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("SOURCE is a share mounted into the local filesystem (SMB/CIFS, NFS, ...).");
    println!();
    println!("EXAMPLES:");
    println!("    nasbak plan /mnt/nas/photos /media/usb/photos");
    println!("    nasbak run /mnt/nas/photos /media/usb/photos");
    println!("    nasbak history --limit 5");
}
