//! CLI argument parsing

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Run(RunArgs),
    Plan(PlanArgs),
    History(HistoryArgs),
}

#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub source: String,
    pub destination: String,
    pub config: Option<String>,
    pub quiet: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlanArgs {
    pub source: String,
    pub destination: String,
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryArgs {
    pub config: Option<String>,
    pub limit: Option<usize>,
    pub json: bool,
}

/// Parse command line arguments
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "run" => Command::Run(parse_run_args(&args[2..])?),
        "plan" => Command::Plan(parse_plan_args(&args[2..])?),
        "history" => Command::History(parse_history_args(&args[2..])?),
        _ => return Err(format!("Unknown command: {}", args[1])),
    };

    Ok(CliArgs { command })
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Collect `<SOURCE> <DEST>` positionals in order.
fn push_positional(positionals: &mut Vec<String>, arg: &str) -> Result<(), String> {
    if positionals.len() >= 2 {
        return Err(format!("Unexpected argument: {arg}"));
    }
    positionals.push(arg.to_string());
    Ok(())
}

fn split_source_destination(positionals: Vec<String>) -> Result<(String, String), String> {
    let mut iter = positionals.into_iter();
    let source = iter
        .next()
        .ok_or_else(|| "Missing required argument: SOURCE".to_string())?;
    let destination = iter
        .next()
        .ok_or_else(|| "Missing required argument: DEST".to_string())?;
    Ok((source, destination))
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut run_args = RunArgs::default();
    let mut positionals = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                run_args.config = Some(take_value(args, &mut i, "--config")?.to_string());
            }
            "--quiet" => {
                run_args.quiet = true;
            }
            arg if !arg.starts_with("--") => push_positional(&mut positionals, arg)?,
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let (source, destination) = split_source_destination(positionals)?;
    run_args.source = source;
    run_args.destination = destination;
    Ok(run_args)
}

fn parse_plan_args(args: &[String]) -> Result<PlanArgs, String> {
    let mut plan_args = PlanArgs::default();
    let mut positionals = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                plan_args.json = true;
            }
            arg if !arg.starts_with("--") => push_positional(&mut positionals, arg)?,
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let (source, destination) = split_source_destination(positionals)?;
    plan_args.source = source;
    plan_args.destination = destination;
    Ok(plan_args)
}

fn parse_history_args(args: &[String]) -> Result<HistoryArgs, String> {
    let mut history_args = HistoryArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                history_args.config = Some(take_value(args, &mut i, "--config")?.to_string());
            }
            "--limit" => {
                let value = take_value(args, &mut i, "--limit")?;
                let limit: usize = value
                    .parse()
                    .map_err(|_| "--limit must be a number".to_string())?;
                if limit == 0 {
                    return Err("--limit must be greater than zero".to_string());
                }
                history_args.limit = Some(limit);
            }
            "--json" => {
                history_args.json = true;
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    Ok(history_args)
}
