use crate::{
    cli::{Cli, SubCommand},
    demo::Demo,
    other::config::RawConfig,
    utils::log::{LogManager, get_default_filter},
};
use clap::Parser;
use std::process::exit;
use tracing::{error, info};
#[cfg(feature = "console")]
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::{
    fmt::{self},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
};

mod cli;
mod demo;
mod file_watcher;
mod other;
mod utils;

#[cfg(feature = "tracy-allocations")]
#[global_allocator]
static GLOBAL: tracy_client::ProfiledAllocator<std::alloc::System> =
    tracy_client::ProfiledAllocator::new(std::alloc::System, 100);

#[cfg(not(feature = "tracy-allocations"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub fn main() -> iced::Result {
    #[cfg(feature = "tracy")]
    tracy_client::Client::start();

    let cli = Cli::parse();

    if let Some(sub) = cli.subcommand {
        match sub {
            SubCommand::Validate => match RawConfig::validate(cli.config_dir) {
                Ok(()) => {
                    println!("config is valid");
                    exit(0);
                }
                Err(e) => {
                    eprintln!("{e:?}");
                    exit(1);
                }
            },
        }
    }

    let stderr_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_filter(get_default_filter());

    let (file_layer, handle) = reload::Layer::new(None);
    let file_layer = file_layer.with_filter(get_default_filter());

    let registry = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer);

    #[cfg(feature = "console")]
    let registry = registry.with(
        console_subscriber::spawn()
            .with_filter(EnvFilter::new("trace,tokio=trace,runtime=trace")),
    );

    registry.init();

    let (config, color_vars, config_path) = match RawConfig::init(cli.config_dir)
    {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{e:?}");
            exit(1);
        }
    };

    info!("starting version {}", env!("CARGO_PKG_VERSION"));
    match LogManager::init() {
        Some(logs) => {
            let logfile_path = logs.setup_logging(&handle);
            info!("saving logs to {:?}", logfile_path);
        }
        None => error!("no state directory, logging to stderr only"),
    }

    let window_size = config.window.size;

    iced::application(Demo::title, Demo::update, Demo::view)
        .subscription(Demo::subscription)
        .theme(Demo::theme)
        .window_size(window_size)
        .antialiasing(true)
        .run_with(move || Demo::new(config, color_vars, config_path))
}
