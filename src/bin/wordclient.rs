use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::Parser;
use wordserv::client::{Download, Downloader};
use wordserv::fairness::Summary;
use wordserv::Config;

/// Downloads the server's word sequence and reports completion times.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// JSON experiment config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Requests sent back-to-back before reading replies
    #[arg(long)]
    batch_size: Option<u32>,
    /// Name used in reports and for the completion-time log
    #[arg(long, default_value = "client")]
    client_id: String,
    /// Run `num_clients` clients at once, the first one greedy
    #[arg(long)]
    concurrent: bool,
    /// Directory receiving `<client-id>.log` with the completion time
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn report(name: &str, greedy: bool, download: &Download) {
    let kind = if greedy { "GREEDY" } else { "NORMAL" };
    let frequencies = download.frequencies();
    println!("\n=== Client {name} ({kind}) Results ===");
    println!("Total words downloaded: {}", download.words.len());
    println!("Unique words: {}", frequencies.len());
    println!("Requests sent: {}", download.requests);
    println!("Completion time: {:.3} seconds", download.elapsed.as_secs_f64());
    if frequencies.len() <= 10 {
        for (word, count) in frequencies {
            println!("{word}, {count}");
        }
    }
}

fn write_log(dir: Option<&Path>, name: &str, elapsed: Duration) -> std::io::Result<()> {
    let Some(dir) = dir else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(format!("{name}.log")), format!("{:.6}\n", elapsed.as_secs_f64()))
}

fn main() -> wordserv::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let addr = (config.server_ip.clone(), config.server_port);

    if !args.concurrent {
        let downloader = Downloader::new(config.k).greedy(args.batch_size.unwrap_or(1));
        let download = downloader.run(addr)?;
        report(&args.client_id, downloader.is_greedy(), &download);
        write_log(args.log_dir.as_deref(), &args.client_id, download.elapsed)?;
        return Ok(());
    }

    let burst = args.batch_size.unwrap_or(config.c);
    println!("Starting {} clients (client 1 is greedy with c={burst})", config.num_clients);
    let handles: Vec<_> = (0..config.num_clients)
        .map(|i| {
            let downloader = Downloader::new(config.k).greedy(if i == 0 { burst } else { 1 });
            let addr = addr.clone();
            let handle = thread::spawn(move || (downloader, downloader.run(addr)));
            // staggered starts, 100ms apart
            thread::sleep(Duration::from_millis(100));
            handle
        })
        .collect();

    let mut completion_times = vec![];
    for (i, handle) in handles.into_iter().enumerate() {
        let name = format!("{}", i + 1);
        let Ok((downloader, result)) = handle.join() else {
            log::error!("client {name} panicked");
            continue;
        };
        match result {
            Ok(download) => {
                report(&name, downloader.is_greedy(), &download);
                write_log(args.log_dir.as_deref(), &name, download.elapsed)?;
                completion_times.push(download.elapsed);
            }
            Err(e) => log::error!("client {name} failed: {e}"),
        }
    }

    if let Some(summary) = Summary::from_durations(&completion_times) {
        println!("\n=== Fairness Metrics ===\n{summary}");
    }
    Ok(())
}
