#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use compass_core::config::{Config, InternetConfig};
use compass_core::connection::ConnectionHandler;
use compass_firmware::adc::JoystickAdc;
use compass_firmware::app_state::{AppError, AppRunState, set_run_state};
use compass_firmware::{net, wifi_secrets};
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "the server loop keeps its socket buffers in main's future"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(log::LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let config = Config {
        internet: InternetConfig {
            ssid: wifi_secrets::WIFI_SSID,
            password: wifi_secrets::WIFI_PASSWORD,
        },
        ..Default::default()
    };

    let stack = match net::bring_up_wifi(&spawner, peripherals.WIFI, &config).await {
        Ok(stack) => stack,
        Err(err) => halt(err).await,
    };

    let adc = JoystickAdc::new(peripherals.ADC1, peripherals.GPIO1, peripherals.GPIO2);
    info!("Joystick ADC ready (X=GPIO1/ch0, Y=GPIO2/ch1)");

    let mut handler = ConnectionHandler::new(adc, config.page);
    net::serve(stack, &mut handler, config.server.port).await
}

/// Report a fatal bring-up error and park forever.
async fn halt(err: AppError) -> ! {
    error!("Bring-up failed: {}", err);
    set_run_state(AppRunState::Error).await;
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
