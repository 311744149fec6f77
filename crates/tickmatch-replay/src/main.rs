//! CSV replay utility.
//!
//! Streams a CSV order file through the matching engine, optionally running
//! the reference book in lockstep (`--validate`) and journaling every input
//! and output for deterministic replay (`--deterministic`). Unknown symbols
//! are auto-registered with default configuration.

mod csv;

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tickmatch_book::{trade_digest_hex, BookValidator};
use tickmatch_engine::MatchingEngine;
use tickmatch_types::{ResultCode, SymbolConfig, TradeEvent};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "tickmatch-replay")]
#[command(version, about = "Replay CSV order flow through the tickmatch engine", long_about = None)]
struct Cli {
    /// CSV file with columns timestamp,symbol,side,order_type,price,quantity,order_id,trader_id
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Journal every input and output to the event log
    #[arg(long)]
    deterministic: bool,

    /// Stream trade events to stdout
    #[arg(long)]
    print_trades: bool,

    /// Render a depth snapshot of the top N levels per symbol on exit
    #[arg(long, value_name = "N")]
    print_depth: Option<usize>,

    /// Run the reference book in lockstep and diff every output
    #[arg(long)]
    validate: bool,

    /// Prefer the binary codec over JSON when rendering snapshots
    #[arg(long)]
    binary_snapshots: bool,

    /// Print telemetry on exit
    #[arg(long)]
    stats: bool,
}

struct ReplaySession {
    engine: MatchingEngine,
    validators: HashMap<String, BookValidator>,
    symbols: BTreeSet<String>,
    orders_processed: u64,
    trades_executed: u64,
    lines_skipped: u64,
    validation_mismatches: u64,
    trade_stream: Vec<TradeEvent>,
}

impl ReplaySession {
    fn new(deterministic: bool) -> Self {
        let engine = if deterministic {
            MatchingEngine::deterministic("logs/events.log")
        } else {
            MatchingEngine::new()
        };
        Self {
            engine,
            validators: HashMap::new(),
            symbols: BTreeSet::new(),
            orders_processed: 0,
            trades_executed: 0,
            lines_skipped: 0,
            validation_mismatches: 0,
            trade_stream: Vec::new(),
        }
    }

    fn process_line(&mut self, cli: &Cli, idx: usize, line: &str) {
        if line.is_empty() {
            return;
        }
        let line_number = idx + 1;

        let order = match csv::parse_line(line, line_number) {
            Ok(order) => order,
            Err(e) => {
                warn!("{e}");
                self.lines_skipped += 1;
                return;
            }
        };

        if self.symbols.insert(order.symbol.clone()) {
            let config = SymbolConfig::with_defaults(order.symbol.clone());
            self.engine.add_symbol(config.clone());
            if cli.validate {
                self.validators.insert(
                    order.symbol.clone(),
                    BookValidator::new(order.symbol.clone(), config.stp_policy),
                );
            }
            info!(symbol = %order.symbol, "symbol auto-registered");
        }

        let request = order.to_request();
        let response = self.engine.handle_new_order(&request);
        self.orders_processed += 1;

        if response.result == ResultCode::Success {
            self.trades_executed += response.trades.len() as u64;
            for trade in &response.trades {
                if cli.print_trades {
                    println!(
                        "TRADE [{}] {} @ {} ({} x {})",
                        trade.symbol,
                        trade.quantity,
                        trade.price,
                        trade.aggressive_order_id,
                        trade.passive_order_id
                    );
                }
                self.trade_stream.push(trade.clone());
            }

            // Only orders the engine accepted reach the validator pair.
            if cli.validate {
                if let Some(validator) = self.validators.get_mut(&order.symbol) {
                    let result = validator.add_order(request.to_order(), self.orders_processed);
                    if !result.passed() {
                        self.validation_mismatches += 1;
                        warn!(
                            line = line_number,
                            "validation mismatch:\n{}",
                            result.summary()
                        );
                    }
                }
            }
        }

        if self.orders_processed % 1_000 == 0 {
            info!(
                orders_processed = self.orders_processed,
                trades_executed = self.trades_executed,
                "replay progress"
            );
        }
    }

    fn print_summary(&mut self, cli: &Cli) {
        self.engine.event_log_mut().flush();

        println!("=== Replay Complete ===");
        println!("Orders processed: {}", self.orders_processed);
        println!("Trades executed:  {}", self.trades_executed);
        println!("Symbols:          {}", self.symbols.len());
        if self.lines_skipped > 0 {
            println!("Lines skipped:    {}", self.lines_skipped);
        }
        println!("Trade digest:     {}", trade_digest_hex(&self.trade_stream));

        for symbol in &self.symbols {
            if let Some(tob) = self.engine.top_of_book(symbol, 0) {
                let bid = if tob.has_bid() {
                    format!("bid {} ({})", tob.best_bid, tob.bid_size)
                } else {
                    "bid -".to_string()
                };
                let ask = if tob.has_ask() {
                    format!("ask {} ({})", tob.best_ask, tob.ask_size)
                } else {
                    "ask -".to_string()
                };
                println!("{symbol}: {bid} | {ask}");
            }
        }

        if let Some(levels) = cli.print_depth {
            for symbol in &self.symbols {
                if let Some(depth) = self.engine.depth_snapshot(symbol, levels, 0) {
                    if cli.binary_snapshots {
                        println!("{symbol} depth (binary): {}", hex::encode(depth.to_binary()));
                    } else {
                        println!("{symbol} depth: {}", depth.to_json());
                    }
                }
            }
        }

        if cli.validate {
            if self.validation_mismatches == 0 {
                println!("Validation: PASSED ({} symbols)", self.validators.len());
            } else {
                println!("Validation: {} mismatches", self.validation_mismatches);
            }
        }

        if cli.stats {
            match serde_json::to_string_pretty(&self.engine.telemetry().to_json()) {
                Ok(stats) => println!("{stats}"),
                Err(_) => println!("{}", self.engine.telemetry().to_json()),
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let file = match File::open(&cli.input) {
        Ok(file) => file,
        Err(e) => {
            error!(path = %cli.input.display(), error = %e, "cannot open input file");
            return ExitCode::from(1);
        }
    };

    let mut session = ReplaySession::new(cli.deterministic);

    let reader = BufReader::new(file);
    let mut lines = reader.lines().enumerate();

    // Optional header row.
    if let Some((idx, line)) = lines.next() {
        match line {
            Ok(line) if csv::is_header(&line) => {}
            Ok(line) => session.process_line(&cli, idx, &line),
            Err(e) => {
                error!(error = %e, "cannot read input file");
                return ExitCode::from(1);
            }
        }
    }

    for (idx, line) in lines {
        match line {
            Ok(line) => session.process_line(&cli, idx, &line),
            Err(e) => {
                warn!(error = %e, "unreadable line skipped");
                session.lines_skipped += 1;
            }
        }
    }

    session.print_summary(&cli);
    ExitCode::SUCCESS
}
