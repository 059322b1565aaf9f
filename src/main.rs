//! Paged-memory simulator - command-line front end
//!
//! Usage: pagesim [OPTIONS] <commands>
//!
//! Commands (any number, executed left to right against one memory):
//!   create-process <id> <pages>  - allocate a page table and data pages
//!   destroy-process <id>         - free every page the process owns
//!   free-map                     - print the physical page allocation map
//!   page-table <id>              - print a process's virtual-to-physical map
//!
//! Options:
//!   -v, --verbose  Trace page-level allocator activity to stderr
//!   -h, --help     Print help information

use std::env;
use std::process;

use anyhow::{Context, Result, bail};

use pagesim::logging;
use pagesim::memory::PhysicalMemory;
use pagesim::process::{create_process, destroy_process};
use pagesim::report;

/// One core operation, as written on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create { process_id: usize, page_count: usize },
    Destroy { process_id: usize },
    FreeMap,
    PageTable { process_id: usize },
}

/// Command-line configuration
struct Config {
    commands: Vec<Command>,
    verbose: bool,
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    logging::init(config.verbose);

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("Paged-memory simulator - allocates and reclaims pages for simulated processes");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <commands>", program);
    eprintln!();
    eprintln!("Commands (any number, executed left to right):");
    eprintln!("  create-process <id> <pages>  - allocate a page table and <pages> data pages");
    eprintln!("  destroy-process <id>         - free every page the process owns");
    eprintln!("  free-map                     - print the physical page allocation map");
    eprintln!("  page-table <id>              - print a process's virtual-to-physical map");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose  Trace page-level allocator activity to stderr");
    eprintln!("  -h, --help     Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} create-process 1 2 page-table 1 free-map", program);
    eprintln!("  {} -v create-process 1 3 destroy-process 1 free-map", program);
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];

    let mut verbose = false;
    let mut tokens: Vec<String> = Vec::new();

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            _ if arg.starts_with('-') => {
                bail!("Unknown option: {}\nUse --help for usage information.", arg);
            }
            _ => {
                tokens.push(arg.clone());
            }
        }
    }

    if tokens.is_empty() {
        print_help(program);
        bail!("\nError: no commands given");
    }

    let commands = parse_commands(&tokens)?;
    Ok(Config { commands, verbose })
}

fn parse_commands(tokens: &[String]) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    let mut it = tokens.iter();

    while let Some(token) = it.next() {
        let command = match token.as_str() {
            "create-process" => Command::Create {
                process_id: next_argument(&mut it, token, "process id")?,
                page_count: next_argument(&mut it, token, "page count")?,
            },
            "destroy-process" => Command::Destroy {
                process_id: next_argument(&mut it, token, "process id")?,
            },
            "free-map" => Command::FreeMap,
            "page-table" => Command::PageTable {
                process_id: next_argument(&mut it, token, "process id")?,
            },
            _ => bail!("Unknown command: {}\nUse --help for usage information.", token),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn next_argument(
    it: &mut std::slice::Iter<'_, String>,
    command: &str,
    name: &str,
) -> Result<usize> {
    let token = it
        .next()
        .with_context(|| format!("{}: missing {}", command, name))?;
    token
        .parse()
        .with_context(|| format!("{}: invalid {} '{}'", command, name, token))
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<()> {
    let mut mem = PhysicalMemory::new().context("memory initialization failed")?;

    for command in &config.commands {
        match *command {
            Command::Create { process_id, page_count } => {
                create_process(&mut mem, process_id, page_count)
                    .with_context(|| format!("create-process {}", process_id))?;
            }
            Command::Destroy { process_id } => {
                destroy_process(&mut mem, process_id)
                    .with_context(|| format!("destroy-process {}", process_id))?;
            }
            Command::FreeMap => {
                println!("--- PAGE FREE MAP ---");
                print!("{}", report::free_map(&mem));
            }
            Command::PageTable { process_id } => {
                let table = report::page_table(&mem, process_id)
                    .with_context(|| format!("page-table {}", process_id))?;
                println!("--- PROCESS {} PAGE TABLE ---", process_id);
                print!("{}", table);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_command_stream() {
        let commands =
            parse_commands(&tokens("create-process 1 2 page-table 1 free-map destroy-process 1"))
                .unwrap();

        assert_eq!(
            commands,
            vec![
                Command::Create { process_id: 1, page_count: 2 },
                Command::PageTable { process_id: 1 },
                Command::FreeMap,
                Command::Destroy { process_id: 1 },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_commands(&tokens("grow-process 1")).is_err());
        assert!(parse_commands(&tokens("create-process 1")).is_err());
        assert!(parse_commands(&tokens("page-table yes")).is_err());
    }
}
