#[macro_use]
extern crate log;

use std::io::Write;
use std::process;

use first_writer::{Config, Error, FirstWriterRegister, HttpServer};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(Config::DEFAULT_LOG_FILTER),
    )
    .init();

    if let Err(e) = run() {
        eprintln!("first_writer: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    if let Some(workers) = config.workers {
        may::config().set_workers(workers);
    }

    let server = HttpServer(FirstWriterRegister::new()).start(config.addr())?;
    info!("serving first writer register on {}", server.local_addr());
    println!("Register is ready on {}.", server.local_addr());
    std::io::stdout().flush()?;

    wait_for_interrupt()?;
    info!("interrupted, shutting down");
    server.shutdown();
    Ok(())
}

// block the main thread until ctrl-c
fn wait_for_interrupt() -> Result<(), Error> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(tokio::signal::ctrl_c())?;
    Ok(())
}
