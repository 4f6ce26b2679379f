use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use cadlink::bridge::Bridge;
use cadlink::scheduler::Scheduler;
use cadlink::state::SharedState;

#[derive(Parser)]
#[command(
    name = "cadlink",
    about = "Cross-thread RPC bridge for a CAD-style document model"
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8765)]
    port: u16,

    /// Scheduler tick interval in milliseconds.
    #[arg(long = "poll-interval-ms", default_value_t = 10)]
    poll_interval_ms: u64,
}

fn main() {
    let cli = Cli::parse();

    let ip: IpAddr = match cli.host.parse() {
        Ok(ip) => ip,
        Err(_) => {
            eprintln!("[CadLink] Invalid host address '{}'", cli.host);
            std::process::exit(2);
        }
    };
    let addr = SocketAddr::new(ip, cli.port);

    let state = Arc::new(SharedState::default());
    let bridge = Bridge::new(state.clone());
    if bridge.start(addr).is_err() {
        // start() already logged the cause.
        std::process::exit(1);
    }

    // The main thread is the owning thread: it alone mutates the model.
    // The loop runs until the bridge is stopped or the process is killed.
    let scheduler = Scheduler::new(state, Duration::from_millis(cli.poll_interval_ms));
    scheduler.run();
}
