mod logger;
mod script;
mod sim;
mod trace;

use anyhow::{Context, Result};
use bsp_buttons::{config, Config, HaltPolicy, Millis, StuckChannel};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;

#[derive(Parser)]
#[command(name = "bsp-cli")]
#[command(about = "Simulate the board's debounced buttons")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a button script and print every notification
    Run {
        /// Path to the script file
        script: String,
        #[command(flatten)]
        timing: Timing,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Run a button script and render a timing diagram as HTML
    Trace {
        /// Path to the script file
        script: String,
        /// Output HTML file
        #[arg(short, long, default_value = "trace.html")]
        output: String,
        #[command(flatten)]
        timing: Timing,
    },
}

#[derive(Args)]
struct Timing {
    /// Button task period in milliseconds
    #[arg(long, default_value_t = config::TICK_PERIOD)]
    tick_ms: Millis,
    /// Debounce window in milliseconds
    #[arg(long, default_value_t = config::DEBOUNCE_WINDOW)]
    debounce_ms: Millis,
    /// Stuck-button timeout in milliseconds
    #[arg(long, default_value_t = config::STUCK_TIMEOUT)]
    stuck_ms: Millis,
    /// On a machine failure, park only that button instead of halting all
    #[arg(long)]
    halt_instance: bool,
    /// Let a stuck button watch its own input instead of button 0's
    #[arg(long)]
    stuck_own_channel: bool,
}

impl Timing {
    fn config(&self) -> Config {
        let halt = if self.halt_instance {
            HaltPolicy::StopInstance
        } else {
            HaltPolicy::StopAll
        };
        let stuck = if self.stuck_own_channel {
            StuckChannel::Own
        } else {
            StuckChannel::First
        };
        Config::new()
            .with_tick_period(self.tick_ms)
            .with_debounce_window(self.debounce_ms)
            .with_stuck_timeout(self.stuck_ms)
            .with_halt_policy(halt)
            .with_stuck_channel(stuck)
    }
}

fn load_script(path: &str) -> Result<script::Script> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    script::parse_script(&contents).with_context(|| format!("parsing {}", path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Command::Run {
            script,
            timing,
            quiet,
        } => {
            let parsed = load_script(&script)?;
            let config = timing.config();
            println!(
                "Script: {} actions over {} ms, tick {} ms",
                parsed.actions.len(),
                parsed.end,
                config.tick_period
            );

            let pb = (!quiet).then(|| {
                let pb = ProgressBar::new(u64::from(parsed.end));
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ms")
                        .unwrap()
                        .progress_chars("=> "),
                );
                pb.set_message("Simulating");
                pb
            });

            let outcome = sim::simulate(&parsed, config, pb.as_ref());
            if let Some(pb) = &pb {
                pb.finish_and_clear();
            }

            for note in &outcome.notifications {
                println!(
                    "{:>8} ms  button {}  {}",
                    note.at,
                    note.event.data,
                    note.event.id.name()
                );
            }
            println!(
                "{} ticks, {} notifications",
                outcome.ticks,
                outcome.notifications.len()
            );
            if let Some(at) = outcome.halted_at {
                eprintln!("Button task halted at {} ms.", at);
                std::process::exit(1);
            }
        }
        Command::Trace {
            script,
            output,
            timing,
        } => {
            let parsed = load_script(&script)?;
            let outcome = sim::simulate(&parsed, timing.config(), None);
            let html = trace::generate_html(&outcome, &script);
            fs::write(&output, html).with_context(|| format!("writing {}", output))?;
            println!(
                "Wrote {} ({} ticks, {} notifications)",
                output,
                outcome.ticks,
                outcome.notifications.len()
            );
        }
    }

    Ok(())
}
