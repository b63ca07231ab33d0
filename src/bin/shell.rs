//! Blockpool Shell
//!
//! Interactive line-oriented shell over the block pool operations.

use blockpool_rs::{MemoryPool, PoolConfig, PoolError};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "blockpool-shell")]
#[command(about = "Interactive shell for the block pool simulator")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total pool capacity in bytes
    #[arg(long)]
    size: Option<u64>,

    /// Block size in bytes
    #[arg(long)]
    block_size: Option<u64>,

    /// Consecutive faults tolerated before recovery triggers
    #[arg(long)]
    threshold: Option<u32>,

    /// Directory for the JSON journal (in-memory journal when omitted)
    #[arg(short, long)]
    journal_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing; default to warnings so the prompt stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PoolConfig::from_toml_file(path)?,
        None => PoolConfig::default(),
    };
    if let Some(size) = args.size {
        config.total_size = size;
    }
    if let Some(block_size) = args.block_size {
        config.block_size = block_size;
    }
    if let Some(threshold) = args.threshold {
        config.escalation_threshold = threshold;
    }
    if let Some(dir) = args.journal_dir {
        config.journal_dir = Some(dir);
    }

    let pool = MemoryPool::new(config)?;
    info!("shell attached to pool");

    println!(
        "blockpool {} — {} block(s) of {} byte(s), type 'help' for commands",
        env!("CARGO_PKG_VERSION"),
        pool.total_blocks(),
        pool.block_size()
    );

    repl(&pool)
}

fn repl(pool: &MemoryPool) -> anyhow::Result<()> {
    let stdin = io::stdin();

    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, rest)) = parts.split_first() else {
            continue;
        };

        match cmd {
            "exit" | "quit" => break,
            "help" => print_help(),
            "ver" => println!("blockpool {}", env!("CARGO_PKG_VERSION")),
            "status" => {
                let status = pool.status();
                println!(
                    "total: {}  free: {}  occupied: {}",
                    status.total_blocks, status.free_blocks, status.occupied_blocks
                );
            }
            "allocate" => cmd_allocate(pool, rest),
            "deallocate" => cmd_deallocate(pool, rest),
            "write" => cmd_write(pool, rest),
            "read" => cmd_read(pool, rest),
            "recover" => {
                let report = pool.recover();
                println!("recovery complete, {} record(s) restored", report.restored.len());
            }
            "faults" => {
                let snapshot = pool.fault_snapshot();
                println!(
                    "fault count: {}  recoveries: {}  last code: {}",
                    snapshot.fault_count,
                    snapshot.recoveries,
                    snapshot.last_code.as_deref().unwrap_or("-")
                );
            }
            _ => println!("unknown command (type 'help')"),
        }
    }

    Ok(())
}

fn cmd_allocate(pool: &MemoryPool, args: &[&str]) {
    let &[owner, amount] = args else {
        println!("usage: allocate <owner> <amount>");
        return;
    };
    let Ok(amount) = amount.parse::<u64>() else {
        println!("usage: allocate <owner> <amount>");
        return;
    };

    match pool.allocate(owner, amount) {
        Ok(ids) => println!("allocated blocks {:?} for '{}'", ids, owner),
        Err(err) => report(&err),
    }
}

fn cmd_deallocate(pool: &MemoryPool, args: &[&str]) {
    let &[owner] = args else {
        println!("usage: deallocate <owner>");
        return;
    };

    match pool.deallocate(owner) {
        Ok(freed) => println!("freed {} block(s) for '{}'", freed, owner),
        Err(err) => report(&err),
    }
}

fn cmd_write(pool: &MemoryPool, args: &[&str]) {
    let Some((&address, data)) = args.split_first() else {
        println!("usage: write <address> <data...>");
        return;
    };
    let Ok(address) = address.parse::<u64>() else {
        println!("usage: write <address> <data...>");
        return;
    };
    if data.is_empty() {
        println!("usage: write <address> <data...>");
        return;
    }

    match pool.write(address, data.join(" ").as_bytes()) {
        Ok(()) => println!("data written to block {}", address),
        Err(err) => report(&err),
    }
}

fn cmd_read(pool: &MemoryPool, args: &[&str]) {
    let &[address, length] = args else {
        println!("usage: read <address> <length>");
        return;
    };
    let (Ok(address), Ok(length)) = (address.parse::<u64>(), length.parse::<u64>()) else {
        println!("usage: read <address> <length>");
        return;
    };

    match pool.read(address, length) {
        Ok(data) => println!("{}", String::from_utf8_lossy(&data)),
        Err(err) => report(&err),
    }
}

fn report(err: &PoolError) {
    println!("error [{}]: {}", err.kind(), err);
}

fn print_help() {
    println!("commands:");
    println!("  allocate <owner> <amount>   allocate blocks for an owner");
    println!("  deallocate <owner>          free every block an owner holds");
    println!("  write <address> <data...>   write a payload into a block");
    println!("  read <address> <length>     read payloads from a block range");
    println!("  status                      show pool occupancy");
    println!("  faults                      show fault state");
    println!("  recover                     run a recovery pass now");
    println!("  ver                         show version");
    println!("  exit                        leave the shell");
}
