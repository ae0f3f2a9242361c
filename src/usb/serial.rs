//! USB CDC-ACM status/control channel.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes one CDC-ACM interface, split into a TX half fed
//! from [`STATUS_LINES`] and an RX half feeding [`COMMANDS`].

use defmt::{debug, info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use heapless::Vec;
use itemtag::config;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// One status line, without terminator.
pub type StatusLine = Vec<u8, { config::STATUS_LINE_CAPACITY }>;

/// Lines waiting to be sent to the host.
pub static STATUS_LINES: Channel<
    CriticalSectionRawMutex,
    StatusLine,
    { config::STATUS_QUEUE_DEPTH },
> = Channel::new();

/// Command bytes received from the host.
pub static COMMANDS: Channel<CriticalSectionRawMutex, u8, { config::COMMAND_QUEUE_DEPTH }> =
    Channel::new();

static CDC_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

const LINE_END: &[u8] = b"\r\n";

/// Build result containing the USB device runner and the two serial halves.
pub struct UsbSerial {
    pub device: UsbDevice<'static, UsbDriver>,
    pub sender: Sender<'static, UsbDriver>,
    pub receiver: Receiver<'static, UsbDriver>,
}

/// Initialise the USB stack and create the CDC-ACM device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbSerial {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // Required for Windows to bind the CDC-ACM interface via IAD.
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    let class = CdcAcmClass::new(
        &mut builder,
        CDC_STATE.init(State::new()),
        config::USB_CDC_PACKET_SIZE,
    );
    let (sender, receiver) = class.split();

    let device = builder.build();

    info!("USB CDC-ACM serial device initialised");

    UsbSerial {
        device,
        sender,
        receiver,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Status forwarding task - drains [`STATUS_LINES`] to the host.
///
/// Lines queue up while no terminal is attached and go out once the host
/// opens the port.
pub async fn serial_tx_task(mut sender: Sender<'static, UsbDriver>) -> ! {
    info!("Serial TX task started");

    loop {
        sender.wait_connection().await;
        debug!("Serial TX: host connected");

        loop {
            let line = STATUS_LINES.receive().await;
            if send_line(&mut sender, &line).await.is_err() {
                warn!("Serial TX: host disconnected, line dropped");
                break;
            }
        }
    }
}

async fn send_line(
    sender: &mut Sender<'static, UsbDriver>,
    line: &[u8],
) -> Result<(), EndpointError> {
    let mut frame: Vec<u8, { config::STATUS_LINE_CAPACITY + 2 }> = Vec::new();
    let _ = frame.extend_from_slice(line);
    let _ = frame.extend_from_slice(LINE_END);

    let packet_size = config::USB_CDC_PACKET_SIZE as usize;
    for packet in frame.chunks(packet_size) {
        sender.write_packet(packet).await?;
    }
    // A full last packet needs a zero-length packet to end the transfer.
    if frame.len() % packet_size == 0 {
        sender.write_packet(&[]).await?;
    }
    Ok(())
}

/// Command intake task - pushes every received byte into [`COMMANDS`].
pub async fn serial_rx_task(mut receiver: Receiver<'static, UsbDriver>) -> ! {
    info!("Serial RX task started");

    let mut buf = [0u8; config::USB_CDC_PACKET_SIZE as usize];

    loop {
        receiver.wait_connection().await;

        loop {
            let n = match receiver.read_packet(&mut buf).await {
                Ok(n) => n,
                Err(EndpointError::Disabled) => break,
                Err(EndpointError::BufferOverflow) => {
                    warn!("Serial RX: oversized packet");
                    continue;
                }
            };

            for &byte in &buf[..n] {
                if COMMANDS.try_send(byte).is_err() {
                    warn!("Serial RX: command queue full, byte dropped");
                }
            }
        }
    }
}
