//! Teaching cache simulator CLI.
//!
//! This binary is the terminal front-end for the simulator. It performs:
//! 1. **Listing:** Show the builtin worksheet exercises.
//! 2. **Running:** Execute an exercise end to end, with a table or JSON report.
//! 3. **Quizzing:** Interactive hit/miss predictions graded with the two-attempt rule.
//! 4. **Decoding:** Standalone address decomposition under any geometry.

use std::io::{self, BufRead, Write};
use std::{fs, process};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::addr;
use cachesim_core::exercise::driver::{ExerciseDriver, ExerciseReport};
use cachesim_core::exercise::{Exercise, library};
use cachesim_core::{AccessOutcome, EngineError, FieldWidths, Geometry, WritePolicy};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Interactive teaching simulator for set-associative CPU caches",
    long_about = "Work through cache worksheets against a real simulation: configure a geometry, \
predict hits and misses, and watch LRU eviction and write policies do their thing.\n\n\
Examples:\n  \
cachesim list\n  \
cachesim run part2-direct-mapped\n  \
cachesim quiz part3-two-way-lru\n  \
cachesim decode --slots 256 --block-words 4 0xBD28 0x8128"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the builtin exercises.
    List,

    /// Show an exercise's geometry, memory image, and steps.
    Show {
        /// Builtin exercise name or path to an exercise JSON file.
        exercise: String,
    },

    /// Run an exercise start to finish and report every step.
    Run {
        /// Builtin exercise name or path to an exercise JSON file.
        exercise: String,

        /// Emit the report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Work through an exercise interactively, predicting hit or miss.
    Quiz {
        /// Builtin exercise name or path to an exercise JSON file.
        exercise: String,
    },

    /// Decompose addresses under a given geometry.
    Decode {
        /// Total number of cache lines.
        #[arg(long, default_value_t = 256)]
        slots: usize,

        /// Words per cache line.
        #[arg(long = "block-words", default_value_t = 1)]
        block_words: usize,

        /// Ways per set.
        #[arg(long, default_value_t = 1)]
        assoc: usize,

        /// Byte addresses, 0x-prefixed hex or decimal.
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Show { exercise } => cmd_show(&exercise),
        Commands::Run { exercise, json } => cmd_run(&exercise, json),
        Commands::Quiz { exercise } => cmd_quiz(&exercise),
        Commands::Decode {
            slots,
            block_words,
            assoc,
            addresses,
        } => cmd_decode(slots, block_words, assoc, &addresses),
    }
}

/// Installs the log subscriber. `RUST_LOG` wins; `--verbose` raises the
/// default from warn to debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn cmd_list() {
    println!("Builtin exercises:");
    println!();
    for exercise in library::all() {
        println!(
            "  {:<22} {}",
            exercise.name,
            geometry_line(&exercise.geometry)
        );
        println!("  {:<22} {}", "", exercise.description);
        println!();
    }
    println!("Run one with 'cachesim run <name>' or 'cachesim quiz <name>'.");
}

fn cmd_show(arg: &str) {
    let exercise = load_exercise(arg);
    let widths = field_widths_or_exit(&exercise.geometry);

    println!("[*] {} — {}", exercise.name, exercise.description);
    println!();
    println!("Geometry:       {}", geometry_line(&exercise.geometry));
    println!("Address fields: {}", widths_line(&widths));
    println!();

    if exercise.memory_image.is_empty() {
        println!("Memory image:   (all zeros)");
    } else {
        println!("Memory image:");
        for word in &exercise.memory_image {
            println!("  {:#06x} = {}", word.addr, word.value);
        }
    }
    println!();

    println!("Steps:");
    for (index, step) in exercise.steps.iter().enumerate() {
        let expected = match step.expected_hit {
            Some(true) => "expect hit ",
            Some(false) => "expect miss",
            None => "           ",
        };
        let note = step.note.as_deref().unwrap_or("");
        println!("  {:>2}. {:<24} {expected}  {note}", index + 1, step.op.to_string());
    }
}

/// Runs every step, prints the per-step table (or JSON), and exits nonzero
/// if the exercise's answer key was contradicted.
fn cmd_run(arg: &str, json: bool) {
    let exercise = load_exercise(arg);
    let mut driver = driver_or_exit(exercise);

    let report = match driver.run_all() {
        Ok(report) => report,
        Err(err) => fail(&err),
    };
    debug!(
        "ran {}: {} hits, {} misses, {} flushed",
        report.exercise, report.stats.hits, report.stats.misses, report.flushed
    );

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("[!] could not serialize the report: {err}");
                process::exit(1);
            }
        }
        return;
    }

    print_report(&report);

    if !report.all_matched() {
        eprintln!("[!] some steps contradicted the exercise's answer key");
        process::exit(1);
    }
}

fn print_report(report: &ExerciseReport) {
    println!("[*] {}: {} steps", report.exercise, report.records.len());
    println!();
    println!("step  operation               result  set   way  {:<9} key", "tag");
    for record in &report.records {
        let key = match record.matched() {
            Some(true) => "ok",
            Some(false) => "MISMATCH",
            None => "-",
        };
        let mut extra = String::new();
        if let Some(tag) = record.outcome.evicted_tag {
            extra.push_str(&format!("  evicted {tag:#x}"));
            if record.outcome.writeback {
                extra.push_str(" (written back)");
            }
        }
        println!(
            "{:>4}  {:<22} {:>7}  {:<5} {:>3}  {:<9} {key}{extra}",
            record.index + 1,
            record.op.to_string(),
            hit_name(record.outcome.hit),
            format!("{:#x}", record.outcome.decoded.set_index),
            record.outcome.way,
            format!("{:#x}", record.outcome.decoded.tag),
        );
    }
    println!();
    if report.flushed > 0 {
        println!("[*] final flush wrote back {} dirty lines", report.flushed);
    }
    report.stats.print();
}

/// Interactive quiz loop over stdin.
fn cmd_quiz(arg: &str) {
    let exercise = load_exercise(arg);
    let widths = field_widths_or_exit(&exercise.geometry);
    let total = exercise.steps.len();

    println!("[*] {} — {}", exercise.name, exercise.description);
    println!("    {}", geometry_line(&exercise.geometry));
    println!("    address fields: {}", widths_line(&widths));
    println!();
    println!("Predict each access: answer 'h' (hit), 'm' (miss), or 'q' to quit.");
    println!();

    let mut driver = driver_or_exit(exercise);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut correct_steps = 0usize;

    while let Some(step) = driver.current().cloned() {
        println!("step {} of {total}: {}", driver.step_index() + 1, step.op);

        loop {
            print!("  hit or miss? ");
            let _ = io::stdout().flush();

            let answer = match lines.next() {
                Some(Ok(line)) => match line.trim().to_lowercase().as_str() {
                    "h" | "hit" => true,
                    "m" | "miss" => false,
                    "q" | "quit" => {
                        println!("[*] quiz aborted");
                        return;
                    }
                    _ => {
                        println!("  please answer 'h', 'm', or 'q'");
                        continue;
                    }
                },
                _ => {
                    println!();
                    println!("[*] quiz aborted");
                    return;
                }
            };

            let verdict = match driver.check_hit_miss(answer) {
                Ok(verdict) => verdict,
                Err(err) => fail(&err),
            };
            println!("  {}", verdict.feedback);
            if verdict.correct {
                correct_steps += 1;
            }
            if let Some(outcome) = &verdict.outcome {
                narrate(outcome, &widths);
                if let Some(note) = &step.note {
                    println!("  note: {note}");
                }
                println!();
                break;
            }
        }
    }

    let flushed = match driver.flush() {
        Ok(flushed) => flushed,
        Err(err) => fail(&err),
    };
    if flushed > 0 {
        println!("[*] final flush wrote back {flushed} dirty lines");
    }
    println!("[*] quiz complete: {correct_steps}/{total} answered correctly");
    println!();
    driver.engine().stats().unwrap_or_default().print();
}

/// Prints what a committed access did, including the binary address split.
fn narrate(outcome: &AccessOutcome, widths: &FieldWidths) {
    let decoded = &outcome.decoded;
    println!(
        "  -> {} in set {:#x}, way {}   tag {} | set {} | block {} | byte {}",
        hit_name(outcome.hit),
        decoded.set_index,
        outcome.way,
        bin(decoded.tag, widths.tag_bits),
        bin(decoded.set_index, widths.set_index_bits),
        bin(decoded.block_offset, widths.block_offset_bits),
        bin(decoded.byte_offset, widths.byte_offset_bits),
    );
    if let Some(value) = outcome.value {
        println!("  -> word value {value}");
    }
    if let Some(tag) = outcome.evicted_tag {
        if outcome.writeback {
            println!("  -> evicted tag {tag:#x} and wrote its block back");
        } else {
            println!("  -> evicted tag {tag:#x}");
        }
    }
}

fn cmd_decode(slots: usize, block_words: usize, assoc: usize, addresses: &[String]) {
    let geometry = Geometry {
        num_slots: slots,
        block_size_words: block_words,
        associativity: assoc,
        write_policy: WritePolicy::WriteThrough,
    };
    let widths = field_widths_or_exit(&geometry);

    println!("Address fields: {}", widths_line(&widths));
    println!();
    for raw in addresses {
        let Some(parsed) = parse_address(raw) else {
            eprintln!("[!] '{raw}' is not a valid address");
            process::exit(1);
        };
        let address = match addr::check(parsed) {
            Ok(address) => address,
            Err(err) => fail(&err),
        };
        let decoded = widths.decompose(address);
        println!(
            "  {:#06x} -> tag {} | set {} | block {} | byte {}",
            address,
            bin(decoded.tag, widths.tag_bits),
            bin(decoded.set_index, widths.set_index_bits),
            bin(decoded.block_offset, widths.block_offset_bits),
            bin(decoded.byte_offset, widths.byte_offset_bits),
        );
    }
}

/// Resolves an exercise argument: builtin name first, then a JSON file path.
fn resolve_exercise(arg: &str) -> Result<Exercise, String> {
    if let Some(exercise) = library::find(arg) {
        debug!("resolved '{arg}' to a builtin exercise");
        return Ok(exercise);
    }
    let text = fs::read_to_string(arg).map_err(|err| {
        format!(
            "no builtin exercise named '{arg}', and reading it as a file failed: {err}\n\
             \x20   try 'cachesim list' for the builtin names"
        )
    })?;
    let exercise: Exercise = serde_json::from_str(&text)
        .map_err(|err| format!("{arg} is not a valid exercise file: {err}"))?;
    debug!(
        "loaded exercise '{}' from {arg} ({} steps)",
        exercise.name,
        exercise.steps.len()
    );
    Ok(exercise)
}

fn load_exercise(arg: &str) -> Exercise {
    match resolve_exercise(arg) {
        Ok(exercise) => exercise,
        Err(message) => {
            eprintln!("[!] {message}");
            process::exit(1);
        }
    }
}

fn driver_or_exit(exercise: Exercise) -> ExerciseDriver {
    match ExerciseDriver::new(exercise) {
        Ok(driver) => driver,
        Err(err) => fail(&err),
    }
}

fn field_widths_or_exit(geometry: &Geometry) -> FieldWidths {
    match FieldWidths::for_geometry(geometry) {
        Ok(widths) => widths,
        Err(err) => fail(&err),
    }
}

fn fail(err: &EngineError) -> ! {
    eprintln!("[!] {err}");
    process::exit(1);
}

/// One-line geometry summary for listings and headers.
fn geometry_line(geometry: &Geometry) -> String {
    format!(
        "{} slots, {}-word blocks, {}, {}",
        geometry.num_slots,
        geometry.block_size_words,
        assoc_name(geometry.associativity),
        policy_name(geometry.write_policy),
    )
}

fn widths_line(widths: &FieldWidths) -> String {
    format!(
        "tag {} | set {} | block {} | byte {}",
        widths.tag_bits, widths.set_index_bits, widths.block_offset_bits, widths.byte_offset_bits
    )
}

fn assoc_name(associativity: usize) -> String {
    if associativity == 1 {
        "direct-mapped".to_owned()
    } else {
        format!("{associativity}-way")
    }
}

fn policy_name(policy: WritePolicy) -> &'static str {
    match policy {
        WritePolicy::WriteThrough => "write-through",
        WritePolicy::WriteBack => "write-back",
    }
}

fn hit_name(hit: bool) -> &'static str {
    if hit { "hit" } else { "miss" }
}

/// Parses a 0x-prefixed hex or decimal address.
fn parse_address(raw: &str) -> Option<u32> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}

/// Binary rendering of a field padded to its width; zero-width fields show
/// as a dash.
fn bin(value: u16, bits: u32) -> String {
    if bits == 0 {
        "-".to_owned()
    } else {
        format!("{value:0width$b}", width = bits as usize)
    }
}
