//! itemtag firmware - nRF52840 + MFRC522 NFC item station.
//!
//! Reader build (default): reports the `ITEM:<code>` text of every newly
//! placed tag on the USB serial port and beeps.
//!
//! Writer build (`--features writer`): takes single-character commands on
//! the serial port and writes the chosen item (or an empty NDEF format) to
//! the next placed tag.
//!
//! Tasks:
//! - USB device + serial TX/RX (I/O only)
//! - buzzer (cue playback)
//! - main: the poll loop, sole owner of controller state

#![no_std]
#![no_main]

mod buzzer;
mod nfc;
mod usb;

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::{bind_interrupts, peripherals, spim};
use embassy_time::{Delay, Instant, Timer};
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use embassy_usb::UsbDevice;
use embedded_hal_bus::spi::ExclusiveDevice;
use itemtag::config;
use itemtag::feedback::{Cue, Feedback};
use itemtag::presence::{EdgeTrigger, TriggerPolicy, UidDebounce};
use itemtag::transport::TagTransport;
use itemtag::TickOutcome;
use mfrc522::comm::blocking::spi::SpiInterface;
use {defmt_rtt as _, panic_probe as _};

use crate::buzzer::{BuzzerPwm, CUES};
use crate::nfc::Mfrc522Transport;
use crate::usb::serial::{StatusLine, UsbDriver, STATUS_LINES};

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
});

// Embassy tasks

#[embassy_executor::task]
async fn usb_device_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    usb::serial::run_usb_device(device).await
}

#[embassy_executor::task]
async fn serial_tx_task(sender: Sender<'static, UsbDriver>) -> ! {
    usb::serial::serial_tx_task(sender).await
}

#[embassy_executor::task]
async fn serial_rx_task(receiver: Receiver<'static, UsbDriver>) -> ! {
    usb::serial::serial_rx_task(receiver).await
}

#[embassy_executor::task]
async fn buzzer_task(pwm: BuzzerPwm) -> ! {
    buzzer::buzzer_task(pwm).await
}

/// Routes controller feedback to the serial and buzzer queues without
/// blocking the poll loop.
struct QueuedFeedback;

impl Feedback for QueuedFeedback {
    fn line(&mut self, text: &[u8]) {
        let mut line = StatusLine::new();
        let n = text.len().min(line.capacity());
        if n < text.len() {
            warn!("Status line truncated ({} of {} bytes)", n, text.len());
        }
        let _ = line.extend_from_slice(&text[..n]);
        if STATUS_LINES.try_send(line).is_err() {
            warn!("Status queue full, line dropped");
        }
    }

    fn cue(&mut self, cue: Cue) {
        if CUES.try_send(cue).is_err() {
            warn!("Cue queue full, {} dropped", cue);
        }
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("itemtag starting");

    // USB serial
    let usb = usb::serial::init(p.USBD);
    spawner.must_spawn(usb_device_task(usb.device));
    spawner.must_spawn(serial_tx_task(usb.sender));
    spawner.must_spawn(serial_rx_task(usb.receiver));

    // Buzzer
    let pwm = SimplePwm::new_1ch(p.PWM0, p.P0_03);
    spawner.must_spawn(buzzer_task(pwm));

    // MFRC522 on SPIM3. RST is held high for the lifetime of the firmware.
    let _nfc_rst = Output::new(p.P1_11, Level::High, OutputDrive::Standard);
    let cs = Output::new(p.P1_12, Level::High, OutputDrive::Standard);
    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M4; // MFRC522 tops out at 10 MHz
    spi_config.mode = spim::MODE_0;
    let bus = spim::Spim::new(p.SPI3, Irqs, p.P1_15, p.P1_14, p.P1_13, spi_config);
    let device = match ExclusiveDevice::new(bus, cs, Delay) {
        Ok(device) => device,
        Err(e) => match e {},
    };

    let mut transport = match Mfrc522Transport::new(SpiInterface::new(device)) {
        Ok(transport) => transport,
        Err(e) => {
            // Serial and buzzer keep running so the host still enumerates.
            error!("MFRC522 init failed: {}", e);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    if config::UID_DEBOUNCE_ENABLED {
        run(&mut transport, UidDebounce::new(config::REPEAT_SUPPRESS_WINDOW_MS)).await
    } else {
        run(&mut transport, EdgeTrigger).await
    }
}

#[cfg(not(feature = "writer"))]
async fn run<T: TagTransport, P: TriggerPolicy>(transport: &mut T, policy: P) -> ! {
    let mut controller = itemtag::ReaderController::new(policy);
    let mut out = QueuedFeedback;
    let mut buf = [0u8; config::TAG_DATA_AREA_BYTES];

    controller.announce(&mut out);
    info!("Reader ready");

    loop {
        let delay = match controller.tick(transport, &mut out, &mut buf, now_ms()) {
            TickOutcome::Idle => config::POLL_INTERVAL_MS,
            TickOutcome::Acted => config::READ_COOLDOWN_MS,
        };
        Timer::after_millis(delay).await;
    }
}

#[cfg(feature = "writer")]
async fn run<T: TagTransport, P: TriggerPolicy>(transport: &mut T, policy: P) -> ! {
    use crate::usb::serial::COMMANDS;

    let mut controller = itemtag::WriterController::new(policy);
    let mut out = QueuedFeedback;

    controller.announce(&mut out);
    info!("Writer ready");

    loop {
        for _ in 0..config::COMMANDS_PER_TICK {
            let Ok(byte) = COMMANDS.try_receive() else {
                break;
            };
            controller.handle_input(byte, &mut out);
        }

        let delay = match controller.tick(transport, &mut out, now_ms()) {
            TickOutcome::Idle => config::POLL_INTERVAL_MS,
            TickOutcome::Acted => {
                info!("Writer action done, pending={}", controller.pending());
                config::WRITE_COOLDOWN_MS
            }
        };
        Timer::after_millis(delay).await;
    }
}
