use tracing::{error, info};
use tracing_subscriber;

use clap::{values_t, App, Arg};

use metastable::server::{node, Settings};
use metastable::snowball::Shutdown;
use metastable::{Error, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_level(false)
        .with_target(false)
        .without_time()
        .compact()
        .with_max_level(tracing::Level::INFO)
        .init();

    let matches = App::new("metastable")
        .version("0.1")
        .author("zero.fx labs ltd.")
        .about("Runs a snowball node")
        .arg(
            Arg::with_name("listener-ip")
                .short("a")
                .long("listener-ip")
                .value_name("LISTENER_IP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("bootstrap-peer")
                .short("b")
                .long("bootstrap-peer")
                .value_name("BOOTSTRAP_PEER")
                .help("IP or ID@IP, replaces the configured peers")
                .multiple(true),
        )
        .arg(
            Arg::with_name("id")
                .long("id")
                .value_name("ID")
                .takes_value(true)
                .required(false),
        )
        .get_matches();

    let mut settings = Settings::new()?;
    if let Some(listener_ip) = matches.value_of("listener-ip") {
        settings.listener_ip = String::from(listener_ip);
    }
    if matches.is_present("bootstrap-peer") {
        settings.bootstrap_peers =
            values_t!(matches.values_of("bootstrap-peer"), String).unwrap_or_else(|e| e.exit());
    }
    if let Some(id) = matches.value_of("id") {
        settings.id = Some(String::from(id));
    }

    let sys = actix::System::new();
    let result = sys.block_on(async move {
        let engine = node::run(settings).await?;

        let sig = if cfg!(unix) {
            use futures::future::FutureExt;
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            futures::select! {
                _ = sigint.recv().fuse() => "SIGINT",
                _ = sigterm.recv().fuse() => "SIGTERM"
            }
        } else {
            tokio::signal::ctrl_c().await?;
            "Ctrl+C"
        };
        info!(target: "metastable", "Got {}, stopping...", sig);

        if let Err(err) = engine.send(Shutdown).await {
            error!("engine already stopped: {}", err);
        }
        actix::System::current().stop();
        Ok::<(), Error>(())
    });
    result?;
    sys.run()?;

    Ok(())
}
