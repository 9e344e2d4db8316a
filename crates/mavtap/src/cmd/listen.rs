use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use mavtap_fanout::{channel_subscriber, Relay, RelayConfig, SubscriberHub};
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{fanout_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_event, OutputFormat};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let hub = SubscriberHub::new();
    let (stdout_subscriber, events) = channel_subscriber("stdout");
    hub.register(Box::new(stdout_subscriber));

    let _listener = start_subscriber_endpoint(&args, &hub)?;

    let config = RelayConfig {
        bind: args.bind_addr(),
        message_filter: args.types.clone(),
        ..RelayConfig::default()
    };
    let mut relay = Relay::start(config, hub).map_err(|err| fanout_error("bind failed", err))?;
    if let Some(addr) = relay.local_addr() {
        info!(%addr, "listening for MAVLink telemetry");
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        match events.recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(event) => {
                print_event(&event, format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) if !relay.is_running() => {
                return Err(CliError::new(
                    TRANSPORT_ERROR,
                    "relay stopped: datagram socket failed",
                ));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    relay.stop();
    let stats = relay.stats();
    info!(
        received = stats.received,
        decoded = stats.decoded,
        unknown = stats.unknown,
        dropped = stats.dropped,
        filtered = stats.filtered,
        "listen finished"
    );
    Ok(SUCCESS)
}

#[cfg(unix)]
fn start_subscriber_endpoint(
    args: &ListenArgs,
    hub: &SubscriberHub,
) -> CliResult<Option<mavtap_fanout::SubscriberListener>> {
    let Some(path) = &args.subscribers else {
        return Ok(None);
    };
    let listener = mavtap_fanout::SubscriberListener::start(path, hub.clone())
        .map_err(|err| fanout_error("subscriber endpoint failed", err))?;
    info!(path = ?listener.path(), "serving events to socket subscribers");
    Ok(Some(listener))
}

#[cfg(not(unix))]
fn start_subscriber_endpoint(args: &ListenArgs, _hub: &SubscriberHub) -> CliResult<Option<()>> {
    if args.subscribers.is_some() {
        return Err(CliError::new(
            crate::exit::USAGE,
            "--subscribers requires Unix domain sockets",
        ));
    }
    Ok(None)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
