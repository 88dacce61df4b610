pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod interpolation;
pub(crate) mod intervaltimer;
pub(crate) mod olaoutput;
pub(crate) mod osc;
pub(crate) mod programs;
pub(crate) mod programstatus;
pub(crate) mod sink;
pub(crate) mod stage;
pub(crate) mod task;
pub(crate) mod taskqueue;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use config::Config;
use engine::{Engine, EngineOptions};
use olaoutput::OlaOutput;
use osc::OscReceiver;
use sink::{DeviceSink, LogSink};
use task::Task;

#[derive(Parser)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Log frames instead of sending them to OLA
    #[arg(long)]
    dry_run: bool,

    /// Override the configured number of pixels
    #[arg(short, long, value_name = "N")]
    pixel_count: Option<usize>,
}

fn create_sink(args: &Cli, config: &Config) -> Result<Box<dyn DeviceSink>, String> {
    if args.dry_run {
        return Ok(Box::new(LogSink::new(config.pixel_count)));
    }

    let output = &config.output;
    match OlaOutput::new(
        output.target,
        output.universe,
        output.channel_order,
        config.pixel_count,
    ) {
        Ok(ola) => Ok(Box::new(ola)),
        Err(err) => Err(err.to_string()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => panic!("Cannot load configuration: {}", err),
    };
    if let Some(pixel_count) = args.pixel_count {
        config.pixel_count = pixel_count;
        if let Err(err) = config.validate() {
            panic!("{}", err);
        }
    }

    let sink = match create_sink(&args, &config) {
        Ok(sink) => sink,
        Err(msg) => panic!("Cannot set up output: {}", msg),
    };

    let engine = Engine::new(sink, EngineOptions::from(&config));
    let engine_thread = match engine.spawn() {
        Ok(engine_thread) => engine_thread,
        Err(err) => panic!("Failed to start engine: {}", err),
    };

    let handle = engine_thread.handle();
    // The strip rests in blackout until told otherwise.
    handle.enqueue(Task::Blackout);

    let osc_receiver = match OscReceiver::new(config.control.listen, handle) {
        Ok(osc_receiver) => osc_receiver,
        Err(msg) => panic!("Cannot set up OSC: {}", msg),
    };

    let res = thread::Builder::new()
        .name("OSC".to_string())
        .spawn(move || {
            osc_receiver.run();
        });
    if let Err(error) = res {
        panic!("Failed to create thread: {}", error);
    }

    let (quit_tx, quit_rx) = mpsc::channel();
    if let Err(error) = ctrlc::set_handler(move || {
        let _ = quit_tx.send(());
    }) {
        panic!("Cannot install signal handler: {}", error);
    }

    log::info!("Listening for program requests on {}", config.control.listen);
    loop {
        match quit_rx.recv_timeout(Duration::from_millis(500)) {
            Err(mpsc::RecvTimeoutError::Timeout) if !engine_thread.is_finished() => continue,
            _ => break,
        }
    }

    log::info!("Stopping engine");
    let timeout = Duration::from_millis(config.shutdown_timeout_ms);
    if let Err(err) = engine_thread.shutdown(timeout) {
        log::error!("{}", err);
        std::process::exit(1);
    }
    log::info!("Bye");
}
