//! Desktop simulator for the joystick compass responder.
//!
//! Serves the compass page from `compass-core` over a plain `std::net`
//! listener, with a synthetic joystick that sweeps around the dial so every
//! direction shows up without hardware. Like the firmware, it holds exactly
//! one client at a time and answers every chunk of bytes with the page.
//!
//! # Environment
//!
//! | Variable             | Default | Meaning                          |
//! |----------------------|---------|----------------------------------|
//! | `COMPASS_SIM_PORT`   | 8080    | TCP port to listen on            |
//! | `COMPASS_SIM_LOCALE` | en      | Page language (`en` or `pt-BR`)  |
//! | `RUST_LOG`           | unset   | `env_logger` filter              |

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use compass_core::config::{Locale, PageConfig, ServerConfig};
use compass_core::connection::{ConnectionHandler, Transmit};
use compass_core::sensors::{AnalogInput, AxisChannel, DEFAULT_MAX_CODE};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Port used when `COMPASS_SIM_PORT` is not set. Port 80 needs privileges.
const DEFAULT_SIM_PORT: u16 = 8080;

/// Bytes read from the client per data event.
const READ_CHUNK: usize = 1024;

/// A client silent for this long is dropped so the next one can connect.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Time for the stick to go once around the dial.
const SWEEP_PERIOD_SECS: f64 = 16.0;

/// Time for the deflection to go from rest to full and back.
const DEFLECTION_PERIOD_SECS: f64 = 5.0;

// ---------------------------------------------------------------------------
// Mock joystick
// ---------------------------------------------------------------------------

/// Synthetic joystick that circles the dial while pulsing in and out of the
/// dead zone.
struct SimulatedJoystick {
    started: Instant,
}

impl SimulatedJoystick {
    fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Raw codes for a stick position `t` seconds into the simulation.
    ///
    /// Heading 0 is North (+Y) and increases clockwise toward East (+X).
    fn position_at(t: f64) -> (u16, u16) {
        let heading = core::f64::consts::TAU * (t / SWEEP_PERIOD_SECS);
        let deflection = 0.5 - 0.5 * (core::f64::consts::TAU * t / DEFLECTION_PERIOD_SECS).cos();

        let x = 0.5 + 0.5 * deflection * heading.sin();
        let y = 0.5 + 0.5 * deflection * heading.cos();

        let full_scale = f64::from(DEFAULT_MAX_CODE);
        (
            (x * full_scale).round() as u16,
            (y * full_scale).round() as u16,
        )
    }
}

impl AnalogInput for SimulatedJoystick {
    fn read(&mut self, channel: AxisChannel) -> u16 {
        let (x, y) = Self::position_at(self.started.elapsed().as_secs_f64());
        match channel {
            AxisChannel::X => x,
            AxisChannel::Y => y,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Outbound half of a client stream.
struct StreamTx<'a>(&'a mut TcpStream);

impl Transmit for StreamTx<'_> {
    type Error = io::Error;

    fn transmit(&mut self, bytes: &[u8]) -> Result<usize, io::Error> {
        let written = self.0.write(bytes)?;
        self.0.flush()?;
        Ok(written)
    }
}

/// Drive one client until it closes, errors, or idles out.
fn serve_client<A: AnalogInput>(handler: &mut ConnectionHandler<A>, mut stream: TcpStream) {
    let handle = handler.on_accept();
    if let Err(e) = stream.set_read_timeout(Some(IDLE_TIMEOUT)) {
        warn!("Could not set read timeout: {}", e);
    }

    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) => {
                debug!("Read on connection {} ended: {}", handle.id(), e);
                0
            }
        };

        if read == 0 {
            handler.on_data(handle, None, &mut StreamTx(&mut stream));
            break;
        }

        let segment: &[u8] = &chunk[..read];
        let outcome = handler.on_data(
            handle,
            Some(std::slice::from_ref(&segment)),
            &mut StreamTx(&mut stream),
        );
        info!("Connection {}: {:?}", handle.id(), outcome);
    }

    let stats = handler.stats();
    info!(
        "Connection {} closed ({} cycles, {} rejected, {} partial sends so far)",
        handle.id(),
        stats.cycles,
        stats.rejected,
        stats.partial_sends
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn server_config() -> ServerConfig {
    let port = match std::env::var("COMPASS_SIM_PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid COMPASS_SIM_PORT={:?}", value);
            DEFAULT_SIM_PORT
        }),
        Err(_) => DEFAULT_SIM_PORT,
    };
    ServerConfig {
        port,
        ..ServerConfig::default()
    }
}

fn page_config() -> PageConfig {
    let locale = match std::env::var("COMPASS_SIM_LOCALE") {
        Ok(tag) => Locale::from_tag(&tag).unwrap_or_else(|| {
            warn!("Unknown COMPASS_SIM_LOCALE={:?}, using English", tag);
            Locale::English
        }),
        Err(_) => Locale::English,
    };
    PageConfig { locale }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn run() -> io::Result<()> {
    let server = server_config();
    let page = page_config();

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, server.port))?;
    info!(
        "Listening on http://{} (locale {})",
        listener.local_addr()?,
        page.locale.tag()
    );

    let mut handler = ConnectionHandler::new(SimulatedJoystick::new(), page);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Ok(peer) = stream.peer_addr() {
                    debug!("Client connected: {}", peer);
                }
                serve_client(&mut handler, stream);
            }
            Err(e) => warn!("Accept error: {}", e),
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    info!("Starting compass simulator");

    if let Err(e) = run() {
        error!("Simulator failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::direction::{Direction, classify};
    use compass_core::sensors::SensorSample;

    fn direction_at(t: f64) -> Direction {
        let (x, y) = SimulatedJoystick::position_at(t);
        let sample = SensorSample::from_raw(x, y, DEFAULT_MAX_CODE);
        classify(sample.pct_x, sample.pct_y).direction
    }

    #[test]
    fn test_rest_position_is_center() {
        assert_eq!(direction_at(0.0), Direction::Center);
    }

    #[test]
    fn test_sweep_stays_in_range() {
        for step in 0..10_000 {
            let (x, y) = SimulatedJoystick::position_at(step as f64 * 0.01);
            assert!(x <= DEFAULT_MAX_CODE);
            assert!(y <= DEFAULT_MAX_CODE);
        }
    }

    #[test]
    fn test_sweep_visits_every_direction() {
        let mut seen = Vec::new();
        for step in 0..80_000 {
            let direction = direction_at(step as f64 * 0.001);
            if !seen.contains(&direction) {
                seen.push(direction);
            }
        }
        for direction in Direction::ALL {
            assert!(seen.contains(&direction), "{direction:?} never reached");
        }
    }
}
