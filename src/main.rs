//! USB Pixel Main Application
//!
//! Entry point for the STM32G474-based USB pixel firmware.
//! Initializes hardware, brings up USB and runs the poll loop.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::Flex;
use embassy_stm32::peripherals::USB;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::Driver;
use embassy_stm32::{bind_interrupts, peripherals, usb};
use embassy_time::{with_timeout, Delay};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use usb_pixel::drivers::ws2812::Ws2812Spi;
use usb_pixel::hal::gpio::DplusLine;
use usb_pixel::indicator::Indicator;
use usb_pixel::prelude::*;
use usb_pixel::protocol::reenumerate;
use usb_pixel::usb::cdc::{device_config, CdcControl, CdcDataPipe, UsbDeviceInfo, UsbStrings};

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    USB_LP => usb::InterruptHandler<peripherals::USB>;
});

type UsbDriver = Driver<'static, USB>;

static CONFIG_DESCRIPTOR: StaticCell<[u8; 128]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 16]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_CONTROL: StaticCell<CdcControl> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("USB Pixel Firmware v{}", env!("CARGO_PKG_VERSION"));

    // USB needs a 48 MHz clock; HSI48 trimmed from USB SOF.
    // SYSCLK = PCLK2 = 48 MHz from the HSI PLL so SPI1 /16 is exactly 3 MHz.
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{
            mux, Hsi48Config, Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk,
        };
        config.rcc.hsi48 = Some(Hsi48Config { sync_from_usb: true });
        config.rcc.mux.clk48sel = mux::Clk48sel::HSI48;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL72,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV6),
        });
        config.rcc.sys = Sysclk::PLL1_R;
    }
    let mut p = embassy_stm32::init(config);

    info!("Peripherals initialized, SYSCLK {} Hz", SYSTEM_CLOCK_HZ);

    // WS2812 on SPI1 MOSI (PA7); SCK (PA5) is driven but unconnected
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(WS2812_SPI_HZ);
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, spi_config);
    let mut led = Ws2812Spi::new(spi);

    if led.write(core::iter::once(STARTUP_COLOR)).is_err() {
        warn!("LED write failed");
    }

    // Make the host drop any stale enumeration before the stack starts
    {
        let mut dplus = DplusLine::new(Flex::new(&mut p.PA12));
        reenumerate(&mut dplus, &mut Delay);
    }
    info!("Re-enumeration hold done ({} ms)", REENUMERATION_HOLD_MS);

    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);
    let info = UsbDeviceInfo::default();
    info!("{}", info);

    let mut builder = Builder::new(
        driver,
        device_config(info, &UsbStrings::default()),
        CONFIG_DESCRIPTOR.init([0; 128]),
        BOS_DESCRIPTOR.init([0; 16]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );
    let mut pipe = CdcDataPipe::new(&mut builder, CDC_CONTROL.init(CdcControl::new()));
    let usb = builder.build();

    spawner.spawn(usb_task(usb)).unwrap();

    let settings = Settings::default();
    info!("Command grammar: {}, ACK heartbeat: {}", settings.grammar, settings.ack_heartbeat);

    poll_loop(&mut pipe, &mut led, Indicator::new(settings)).await;
}

/// Runs the USB stack: enumeration and control transfers
#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// Cooperative poll loop: service the data pipe, drain one command,
/// refresh the LED, send the liveness byte
async fn poll_loop<L>(pipe: &mut CdcDataPipe<'static, UsbDriver>, led: &mut L, mut indicator: Indicator) -> !
where
    L: SmartLedsWrite<Color = rgb::RGB8>,
{
    let mut packet = [0u8; USB_CDC_PACKET_SIZE as usize];
    let mut last_stats = indicator.stats();
    let mut connected = false;

    loop {
        match select(pipe.read_packet(&mut packet), Timer::after_millis(POLL_PERIOD_MS)).await {
            Either::First(Ok(len)) => {
                connected = true;
                indicator.feed(&packet[..len]);
            }
            Either::First(Err(EndpointError::Disabled)) => {
                if connected {
                    info!("Host disconnected");
                    connected = false;
                }
                // Keep refreshing the LED while the host is away
                Timer::after_millis(POLL_PERIOD_MS).await;
            }
            Either::First(Err(EndpointError::BufferOverflow)) => {
                warn!("Bulk OUT packet larger than {} bytes", pipe.max_packet_size());
            }
            Either::Second(()) => {}
        }

        match indicator.tick(led) {
            Ok(tick) => {
                match tick.command {
                    Some(Ok(color)) => info!("Color set to {}", color),
                    Some(Err(err)) => debug!("Command rejected: {}", err),
                    None => {}
                }
                if let Some(ack) = tick.ack {
                    let sent = with_timeout(
                        Duration::from_millis(ACK_WRITE_TIMEOUT_MS),
                        pipe.write_packet(&[ack]),
                    )
                    .await;
                    if matches!(sent, Ok(Ok(()))) {
                        connected = true;
                    }
                }
            }
            Err(_) => warn!("LED write failed"),
        }

        let stats = indicator.stats();
        if stats != last_stats {
            warn!("Receive path: {}", stats);
            last_stats = stats;
        }
    }
}
