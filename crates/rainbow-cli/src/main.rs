//! Interactive rainbow table CLI
//!
//! Usage: rainbow [options]
//!
//! Builds a table in the background until `q` is entered, then searches
//! hashes typed as hex. An empty line goes back to building.
//!
//! Example:
//!   rainbow --sample abc123 --hash-length 3 --row-length 64
//!   rainbow --alphabet 0123456789 --length 6 --threads 4

use rainbow_table::{
    Alphabet, CancelToken, DEFAULT_HASH_LENGTH, DEFAULT_ROW_LENGTH, HashKey, RainbowParameters,
    RainbowTable, hash_password, search_password_parallel,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::Level;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

struct Args {
    sample: Option<String>,
    alphabet: Option<String>,
    length: Option<usize>,
    hash_length: usize,
    row_length: u32,
    threads: usize,
    verbose: bool,
}

/// What to do after a build or search phase
enum Next {
    Continue,
    Quit,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Password policy (prompted for a sample if neither is given):");
    eprintln!("  --sample <PW>           Derive alphabet and length from a sample password");
    eprintln!("  --alphabet <CHARS>      Explicit alphabet (requires --length)");
    eprintln!("  --length <N>            Password length");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  --hash-length <N>       Hash size in bytes, 1-16 (default: {})",
        DEFAULT_HASH_LENGTH
    );
    eprintln!(
        "  --row-length <N>        Chain length (default: {})",
        DEFAULT_ROW_LENGTH
    );
    eprintln!("  --threads <N>           Build threads (default: available parallelism)");
    eprintln!("  --verbose, -v           Log build and search details to stderr");
    eprintln!("  --help, -h              Show this help message");
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize) -> Result<T, String> {
    let flag = &args[i - 1];
    let value = args
        .get(i)
        .ok_or_else(|| format!("{} requires a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut parsed = Args {
        sample: None,
        alphabet: None,
        length: None,
        hash_length: DEFAULT_HASH_LENGTH,
        row_length: DEFAULT_ROW_LENGTH,
        threads: thread::available_parallelism().map_or(1, |n| n.get()),
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sample" => {
                i += 1;
                parsed.sample = Some(parse_value(&args, i)?);
            }
            "--alphabet" => {
                i += 1;
                parsed.alphabet = Some(parse_value(&args, i)?);
            }
            "--length" => {
                i += 1;
                parsed.length = Some(parse_value(&args, i)?);
            }
            "--hash-length" => {
                i += 1;
                parsed.hash_length = parse_value(&args, i)?;
            }
            "--row-length" => {
                i += 1;
                parsed.row_length = parse_value(&args, i)?;
            }
            "--threads" => {
                i += 1;
                parsed.threads = parse_value(&args, i)?;
            }
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    if parsed.sample.is_some() && parsed.alphabet.is_some() {
        return Err("--sample and --alphabet are mutually exclusive".to_string());
    }
    if parsed.alphabet.is_some() && parsed.length.is_none() {
        return Err("--alphabet requires --length".to_string());
    }

    Ok(parsed)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn prompt(text: &str) {
    print!("{}", text);
    io::stdout().flush().ok();
}

fn read_sample() -> String {
    println!("Type sample password (may include uppercase alpha, lowercase alpha, digits)");
    prompt("> ");

    let mut line = String::new();
    if let Err(e) = io::stdin().read_line(&mut line) {
        fail(format!("failed to read sample password: {}", e));
    }
    line.trim().to_string()
}

fn build_parameters(args: &Args) -> rainbow_table::Result<RainbowParameters> {
    let (alphabet, length) = match (&args.sample, &args.alphabet) {
        (_, Some(chars)) => (Alphabet::new(chars)?, args.length.unwrap_or_default()),
        (Some(sample), None) => (Alphabet::from_sample(sample)?, sample.chars().count()),
        (None, None) => {
            let sample = read_sample();
            (Alphabet::from_sample(&sample)?, sample.chars().count())
        }
    };

    RainbowParameters::new(
        alphabet,
        length,
        args.hash_length,
        args.row_length,
        args.threads,
    )
}

/// Forward stdin lines to the main loop; the channel closes on EOF
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line.trim().to_string()).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        fail(format!("failed to spawn input thread: {}", e));
    }
    rx
}

fn print_progress(table: &RainbowTable) {
    let coverage = table.estimate_coverage();
    prompt(&format!(
        "\r{} rows, coverage est {:.4}% (best {:.4}%, worst {:.4}%)   ",
        table.row_count(),
        coverage.estimated * 100.0,
        coverage.best_case * 100.0,
        coverage.worst_case * 100.0,
    ));
}

fn build_phase(table: &RainbowTable, input: &Receiver<String>) -> Next {
    let handle = match table.start_building(CancelToken::new()) {
        Ok(handle) => handle,
        Err(e) => fail(e),
    };

    println!();
    println!(
        "Building with {} threads. Enter q to pause and search for a hash.",
        table.params().thread_count
    );

    let next = loop {
        match input.recv_timeout(PROGRESS_INTERVAL) {
            Ok(line) if line.eq_ignore_ascii_case("q") => break Next::Continue,
            Ok(_) | Err(RecvTimeoutError::Timeout) => print_progress(table),
            Err(RecvTimeoutError::Disconnected) => break Next::Quit,
        }
    };

    handle.cancel();
    let start_join = Instant::now();
    match handle.join() {
        Ok(built) => {
            print_progress(table);
            println!();
            println!(
                "Paused: {} chains computed this session, joined in {:.2} seconds.",
                built,
                start_join.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            println!();
            eprintln!("Error: build stopped: {}", e);
        }
    }

    next
}

fn search_phase(table: &RainbowTable, input: &Receiver<String>) -> Next {
    let hash_length = table.params().hash_length;

    loop {
        println!();
        println!(
            "Enter hash value to search (hexadecimal, no prefix, length {} bytes)",
            hash_length
        );
        prompt("Leave empty to go back to building, 'quit' to exit: ");

        let Ok(line) = input.recv() else {
            return Next::Quit;
        };

        if line.is_empty() {
            return Next::Continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            return Next::Quit;
        }

        let target = match HashKey::from_hex(&line, hash_length) {
            Ok(target) => target,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        println!("Searching for hash '{}'...", target);
        let start = Instant::now();

        match search_password_parallel(table, &target) {
            Ok(Some(password)) => {
                debug_assert_eq!(hash_password(table.params(), &password), target);
                println!("Found match: {}", password);
            }
            Ok(None) => println!("No match found."),
            Err(e) => eprintln!("Error: {}", e),
        }

        println!("Search completed in {:.3} seconds.", start.elapsed().as_secs_f64());
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage("rainbow");
            std::process::exit(1);
        }
    };

    let level = if args.verbose { Level::INFO } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let params = match build_parameters(&args) {
        Ok(params) => params,
        Err(e) => fail(e),
    };

    println!(
        "Params: alphabet \"{}\" ({} chars), password length {}, hash length {} bytes, row length {}",
        params.alphabet,
        params.alphabet.len(),
        params.password_length,
        params.hash_length,
        params.row_length
    );

    let table = RainbowTable::new(params);
    let input = spawn_stdin_reader();

    loop {
        if let Next::Quit = build_phase(&table, &input) {
            break;
        }
        if let Next::Quit = search_phase(&table, &input) {
            break;
        }
    }

    println!("Goodbye!");
}
