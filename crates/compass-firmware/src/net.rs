//! Wi-Fi bring-up and the single-connection HTTP server loop

use alloc::string::String;

use compass_core::config::Config;
use compass_core::connection::{ConnectionHandle, ConnectionHandler, CycleOutcome};
use compass_core::sensors::AnalogInput;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, DhcpConfig, Runner, Stack, StackResources, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};
use esp_hal::{peripherals::WIFI, rng::Rng};
use esp_radio::{
    Controller as RadioController,
    wifi::{self, ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent},
};
use log::{debug, info, warn};
use static_cell::StaticCell;

use crate::app_state::{AppError, AppRunState, detail, set_run_state};
use crate::outbox::Outbox;

const RX_BUFFER_SIZE: usize = 1536;
const TX_BUFFER_SIZE: usize = 4096;
/// Bytes pulled from the socket per data event
const READ_CHUNK: usize = 1024;
/// A client that stays silent this long is treated as gone, freeing the slot
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

static RADIO_CONTROLLER: StaticCell<RadioController<'static>> = StaticCell::new();
// DHCP plus the one TCP socket, with a spare.
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

/// Bring the radio up, associate, and wait for an IPv4 address.
///
/// Association and address acquisition are each bounded by
/// `config.server.connect_timeout_ms`. Any failure is returned as a fatal
/// [`AppError`]; nothing here retries.
pub async fn bring_up_wifi(
    spawner: &Spawner,
    wifi_peripheral: WIFI<'static>,
    config: &Config<'_>,
) -> Result<Stack<'static>, AppError> {
    set_run_state(AppRunState::RadioStarting).await;

    let radio = esp_radio::init().map_err(|e| AppError::Radio(detail(&e)))?;
    let radio = RADIO_CONTROLLER.init(radio);

    let (mut controller, interfaces) = wifi::new(radio, wifi_peripheral, Default::default())
        .map_err(|e| AppError::Radio(detail(&e)))?;

    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(String::from(config.internet.ssid))
            .with_password(String::from(config.internet.password)),
    );
    controller
        .set_config(&client_config)
        .map_err(|e| AppError::WifiConfig(detail(&e)))?;

    info!("Starting Wi-Fi STA");
    controller
        .start_async()
        .await
        .map_err(|e| AppError::WifiConfig(detail(&e)))?;

    set_run_state(AppRunState::WifiConnecting).await;
    info!("Connecting to Wi-Fi SSID=\"{}\"", config.internet.ssid);

    let timeout_ms = config.server.connect_timeout_ms;
    let timeout = Duration::from_millis(timeout_ms as u64);
    match with_timeout(timeout, controller.connect_async()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(AppError::WifiAssociation(detail(&e))),
        Err(_) => return Err(AppError::WifiTimeout(timeout_ms)),
    }

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let resources = NET_RESOURCES.init(StackResources::new());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(DhcpConfig::default()),
        resources,
        seed,
    );

    spawner.spawn(net_task(runner).map_err(|e| AppError::Socket(detail(&e)))?);
    spawner.spawn(link_monitor_task(controller).map_err(|e| AppError::Socket(detail(&e)))?);

    with_timeout(timeout, stack.wait_config_up())
        .await
        .map_err(|_| AppError::Dhcp(timeout_ms))?;

    if let Some(cfg) = stack.config_v4() {
        info!("Wi-Fi link up: ip={}", cfg.address.address());
    }
    set_run_state(AppRunState::WifiConnected).await;

    Ok(stack)
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

/// Owns the Wi-Fi controller for the life of the firmware and reports link
/// loss. Reconnection is out of scope; the state just moves to `Error`.
#[embassy_executor::task]
async fn link_monitor_task(mut controller: WifiController<'static>) {
    loop {
        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("Wi-Fi STA disconnected");
        set_run_state(AppRunState::Error).await;
    }
}

/// Accept one client at a time on `port` and run a handler cycle for every
/// chunk of bytes it sends.
pub async fn serve<A: AnalogInput>(
    stack: Stack<'static>,
    handler: &mut ConnectionHandler<A>,
    port: u16,
) -> ! {
    let mut rx_buf = [0u8; RX_BUFFER_SIZE];
    let mut tx_buf = [0u8; TX_BUFFER_SIZE];
    let mut chunk = [0u8; READ_CHUNK];
    let mut outbox = Outbox::new();

    set_run_state(AppRunState::Listening).await;
    info!("Server listening on port {}", port);

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
        socket.set_timeout(Some(IDLE_TIMEOUT));

        if let Err(e) = socket.accept(port).await {
            warn!("Accept error: {:?}", e);
            Timer::after(Duration::from_millis(200)).await;
            continue;
        }

        let handle = handler.on_accept();
        debug!("Client connected: {:?}", socket.remote_endpoint());

        loop {
            let read = match socket.read(&mut chunk).await {
                Ok(n) => n,
                Err(e) => {
                    warn!("Read error on connection {}: {:?}", handle.id(), e);
                    0
                }
            };

            if read == 0 {
                close(handler, handle, &mut outbox);
                break;
            }

            outbox.clear();
            let segment: &[u8] = &chunk[..read];
            let outcome = handler.on_data(handle, Some(core::slice::from_ref(&segment)), &mut outbox);

            if let Err(e) = flush(&mut socket, &outbox).await {
                warn!("Write error on connection {}: {:?}", handle.id(), e);
                close(handler, handle, &mut outbox);
                break;
            }
            debug!("Connection {}: {:?}", handle.id(), outcome);
        }

        socket.close();
        let _ = socket.flush().await;
        socket.abort();
    }
}

/// Report a transport-side close to the handler.
fn close<A: AnalogInput>(
    handler: &mut ConnectionHandler<A>,
    handle: ConnectionHandle,
    outbox: &mut Outbox,
) {
    if handler.on_data(handle, None, outbox) != CycleOutcome::Closed {
        debug!("Connection {} was already inactive", handle.id());
    }
}

/// Push the staged response into the socket and wait for it to drain.
async fn flush(socket: &mut TcpSocket<'_>, outbox: &Outbox) -> Result<(), embassy_net::tcp::Error> {
    if outbox.is_empty() {
        return Ok(());
    }
    let mut pending = outbox.as_bytes();
    while !pending.is_empty() {
        let written = socket.write(pending).await?;
        if written == 0 {
            return Err(embassy_net::tcp::Error::ConnectionReset);
        }
        pending = &pending[written..];
    }
    socket.flush().await
}
