//! Pool-heater pump controller: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareSensors    PumpRelay       LogEventSink  Esp32Time  │
//! │  (SensorPort)       (ActuatorPort)  (EventSink)   (Clock)    │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  AppService (pure logic)                               │  │
//! │  │  Temps · Flow · Energy · FSM                           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  Flow ISR ──▶ FlowPulseCounter (atomic)                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use poolheat::adapters::hardware::HardwareSensors;
use poolheat::adapters::log_sink::LogEventSink;
use poolheat::adapters::time::Esp32TimeAdapter;
use poolheat::app::ports::ClockPort;
use poolheat::app::service::AppService;
use poolheat::config::SystemConfig;
use poolheat::drivers::onewire::{Ds18b20Bus, OneWire};
use poolheat::drivers::pump::PumpRelay;
use poolheat::drivers::hw_init;
use poolheat::drivers::watchdog::{WATCHDOG_TIMEOUT_MS, Watchdog};
use poolheat::error::Error;
use poolheat::pins;
use poolheat::sensors::flow::FlowPulseCounter;

/// Superloop period.  Every stage inside `AppService::tick` has its own,
/// longer, interval gate.
const LOOP_PERIOD_MS: u32 = 50;

/// Written by the flow ISR, drained by the control loop.
static FLOW_PULSES: FlowPulseCounter = FlowPulseCounter::new();

/// Configuration baked in at build time, or defaults.
fn load_config() -> Result<SystemConfig> {
    match option_env!("POOLHEAT_CONFIG_JSON") {
        Some(json) => {
            let config = SystemConfig::from_json(json).map_err(Error::Config)?;
            info!("Config loaded from POOLHEAT_CONFIG_JSON");
            Ok(config)
        }
        None => {
            info!("Using default configuration");
            Ok(SystemConfig::default())
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Pool heater controller v{:<11} ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config()?;
    info!(
        "target {:.1} C, threshold {:.0} W, hibernation {} min",
        config.target_temp_c,
        config.energy_threshold_w,
        config.hibernation_period_ms / 60_000
    );

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::Init)?;
    hw_init::init_isr_service(&FLOW_PULSES).map_err(Error::Init)?;

    let peripherals = Peripherals::take()?;
    // GPIO 21 is pins::ONE_WIRE_BUS_GPIO.
    let bus_pin = PinDriver::input_output_od(peripherals.pins.gpio21)?;
    let probes = Ds18b20Bus::new(OneWire::new(bus_pin, Ets));
    info!("one-wire bus on GPIO{}", pins::ONE_WIRE_BUS_GPIO);

    let mut sensors = HardwareSensors::new(probes, &FLOW_PULSES);
    let mut pump = PumpRelay::new();
    let mut sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();
    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 3. Application core ───────────────────────────────────
    let mut app = AppService::new(
        config,
        [
            pins::INPUT_TEMP_ROM,
            pins::OUTPUT_TEMP_ROM,
            pins::ENCLOSURE_TEMP_ROM,
        ],
    );
    app.start(clock.now_ms(), &mut sink);

    // ── 4. Superloop ──────────────────────────────────────────
    loop {
        watchdog.feed();
        let now = clock.now_ms();
        app.tick(now, &mut sensors, &mut pump, &mut sink);

        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
