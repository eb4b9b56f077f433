//! LPC4337 (EDU-CIAA-NXP) Hardware Implementation
//!
//! Register-level drivers for the converters, the USB-bridged UART and the
//! LED used as TX indicator. Everything is polled; no interrupt is enabled.

use core::convert::Infallible;

use cortex_m::peripheral::{DCB, DWT};
use embedded_hal::digital::{ErrorType, OutputPin};
use heapless::Deque;

use modem_core::{CycleCounter, ModemHal, TxIndicator, Q15};

// ========================================
// LPC4337 Memory Map
// ========================================

const CGU_BASE: u32 = 0x4005_0000;
const SCU_BASE: u32 = 0x4008_6000;
const USART2_BASE: u32 = 0x400C_1000;
const DAC_BASE: u32 = 0x400E_1000;
const ADC0_BASE: u32 = 0x400E_3000;
const GPIO_BASE: u32 = 0x400F_4000;

// CGU registers
const CGU_XTAL_OSC_CTRL: u32 = 0x018;
const CGU_PLL1_STAT: u32 = 0x040;
const CGU_PLL1_CTRL: u32 = 0x044;
const CGU_BASE_M4_CLK: u32 = 0x06C;
const CGU_BASE_APB3_CLK: u32 = 0x084;
const CGU_BASE_UART2_CLK: u32 = 0x0A4;

const CLK_SEL_XTAL: u32 = 0x06 << 24;
const CLK_SEL_PLL1: u32 = 0x09 << 24;
const CLK_AUTOBLOCK: u32 = 1 << 11;

// PLL1: 12 MHz crystal * 17 = 204 MHz, direct output
const PLL1_MSEL: u32 = 16 << 16;
const PLL1_DIRECT: u32 = 1 << 7;
const PLL1_FBSEL: u32 = 1 << 6;
const PLL1_LOCK: u32 = 1 << 0;

// SCU
const SCU_SFSP7_1: u32 = 0x380 + 1 * 4;
const SCU_SFSP7_2: u32 = 0x380 + 2 * 4;
const SCU_SFSP2_10: u32 = 0x100 + 10 * 4;
const SCU_ENAIO2: u32 = 0xC90;
const SCU_FUNC0: u32 = 0;
const SCU_FUNC6: u32 = 6;
const SCU_EPD_DISABLE: u32 = 1 << 4;
const SCU_EZI: u32 = 1 << 6;

// USART2 (UART_USB on the EDU-CIAA)
const UART_RBR_THR_DLL: u32 = 0x00;
const UART_DLM_IER: u32 = 0x04;
const UART_FCR: u32 = 0x08;
const UART_LCR: u32 = 0x0C;
const UART_LSR: u32 = 0x14;
const UART_FDR: u32 = 0x28;
const UART_TER: u32 = 0x5C;

const LCR_8N1: u32 = 0x03;
const LCR_DLAB: u32 = 1 << 7;
const FCR_ENABLE_RESET: u32 = 0x07;
const LSR_RDR: u32 = 1 << 0;
const LSR_THRE: u32 = 1 << 5;
const TER_TXEN: u32 = 1 << 0;
const UART_FIFO_DEPTH: usize = 16;

// 204 MHz / (16 * 24 * (1 + 2/13)) = 460 937 baud, 0.03 % off 460 800
const UART_DL: u32 = 24;
const UART_DIVADDVAL: u32 = 2;
const UART_MULVAL: u32 = 13;

// DAC
const DAC_CR: u32 = 0x00;
const DAC_CTRL: u32 = 0x04;
const DAC_CTRL_DMA_ENA: u32 = 1 << 3;
const DAC_VALUE_SHIFT: u32 = 6;

// ADC0, channel 1 in burst mode
const ADC_CR: u32 = 0x00;
const ADC_DR1: u32 = 0x14;
const ADC_CHANNEL: u32 = 1;
const ADC_CLKDIV: u32 = 45 << 8;
const ADC_BURST: u32 = 1 << 16;
const ADC_PDN: u32 = 1 << 21;
const ADC_VALUE_SHIFT: u32 = 6;

// GPIO (LED1 = P2_10 = GPIO0[14])
const GPIO_DIR: u32 = 0x2000;
const GPIO_SET: u32 = 0x2200;
const GPIO_CLR: u32 = 0x2280;

/// Size of the outbound byte queue drained into the UART FIFO
pub const UART_TX_QUEUE_LEN: usize = 256;

#[inline(always)]
fn read_reg(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

#[inline(always)]
fn write_reg(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

#[inline(always)]
fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

/// Bring the core and peripheral clocks up to 204 MHz from the crystal
pub fn init_clocks() {
    // Crystal on, low-frequency mode
    write_reg(CGU_BASE + CGU_XTAL_OSC_CTRL, 0);
    cortex_m::asm::delay(250_000);

    write_reg(CGU_BASE + CGU_BASE_M4_CLK, CLK_SEL_XTAL | CLK_AUTOBLOCK);

    write_reg(
        CGU_BASE + CGU_PLL1_CTRL,
        CLK_SEL_XTAL | CLK_AUTOBLOCK | PLL1_MSEL | PLL1_DIRECT | PLL1_FBSEL,
    );
    while read_reg(CGU_BASE + CGU_PLL1_STAT) & PLL1_LOCK == 0 {}

    for base in [CGU_BASE_M4_CLK, CGU_BASE_APB3_CLK, CGU_BASE_UART2_CLK] {
        write_reg(CGU_BASE + base, CLK_SEL_PLL1 | CLK_AUTOBLOCK);
    }
}

/// ADC0 sampling channel 1 continuously
pub struct Adc0 {
    _private: (),
}

impl Adc0 {
    pub fn new() -> Self {
        write_reg(
            ADC0_BASE + ADC_CR,
            (1 << ADC_CHANNEL) | ADC_CLKDIV | ADC_BURST | ADC_PDN,
        );
        Self { _private: () }
    }

    /// Latest 10-bit conversion result
    pub fn read(&self) -> u16 {
        ((read_reg(ADC0_BASE + ADC_DR1) >> ADC_VALUE_SHIFT) & 0x03FF) as u16
    }
}

/// 10-bit DAC on P4_4
pub struct Dac {
    _private: (),
}

impl Dac {
    pub fn new() -> Self {
        write_reg(SCU_BASE + SCU_ENAIO2, 1);
        write_reg(DAC_BASE + DAC_CTRL, DAC_CTRL_DMA_ENA);
        let dac = Self { _private: () };
        dac.write(Q15::ZERO.to_dac10());
        dac
    }

    pub fn write(&self, code: u16) {
        write_reg(DAC_BASE + DAC_CR, ((code & 0x03FF) as u32) << DAC_VALUE_SHIFT);
    }
}

/// USART2 at 460 800 baud, 8N1, with a software TX queue
pub struct Uart2 {
    tx: Deque<u8, UART_TX_QUEUE_LEN>,
    dropped: u32,
}

impl Uart2 {
    pub fn new() -> Self {
        write_reg(SCU_BASE + SCU_SFSP7_1, SCU_FUNC6 | SCU_EPD_DISABLE);
        write_reg(SCU_BASE + SCU_SFSP7_2, SCU_FUNC6 | SCU_EPD_DISABLE | SCU_EZI);

        write_reg(USART2_BASE + UART_FCR, FCR_ENABLE_RESET);
        write_reg(USART2_BASE + UART_LCR, LCR_8N1 | LCR_DLAB);
        write_reg(USART2_BASE + UART_RBR_THR_DLL, UART_DL & 0xFF);
        write_reg(USART2_BASE + UART_DLM_IER, UART_DL >> 8);
        write_reg(USART2_BASE + UART_FDR, (UART_MULVAL << 4) | UART_DIVADDVAL);
        write_reg(USART2_BASE + UART_LCR, LCR_8N1);
        write_reg(USART2_BASE + UART_DLM_IER, 0);
        write_reg(USART2_BASE + UART_TER, TER_TXEN);

        Self {
            tx: Deque::new(),
            dropped: 0,
        }
    }

    pub fn try_read(&self) -> Option<u8> {
        if read_reg(USART2_BASE + UART_LSR) & LSR_RDR != 0 {
            Some((read_reg(USART2_BASE + UART_RBR_THR_DLL) & 0xFF) as u8)
        } else {
            None
        }
    }

    /// Queue bytes; bytes that do not fit are dropped and counted
    pub fn enqueue(&mut self, bytes: &[u8]) {
        for byte in bytes {
            if self.tx.push_back(*byte).is_err() {
                self.dropped = self.dropped.wrapping_add(1);
                #[cfg(feature = "defmt")]
                self.warn_dropped();
            }
        }
    }

    #[cfg(feature = "defmt")]
    fn warn_dropped(&self) {
        if self.dropped.is_power_of_two() {
            defmt::warn!("uart: {} TX bytes dropped", self.dropped);
        }
    }

    /// Refill the hardware FIFO once it has drained
    pub fn flush_some(&mut self) {
        if read_reg(USART2_BASE + UART_LSR) & LSR_THRE == 0 {
            return;
        }
        for _ in 0..UART_FIFO_DEPTH {
            let Some(byte) = self.tx.pop_front() else {
                break;
            };
            write_reg(USART2_BASE + UART_RBR_THR_DLL, byte as u32);
        }
    }
}

/// GPIO output pin on the LPC43xx GPIO block
pub struct GpioPin {
    port: u32,
    pin: u8,
}

impl GpioPin {
    /// Configure `port[pin]` as output; the SCU function must already be GPIO
    pub fn output(port: u32, pin: u8) -> Self {
        modify_reg(GPIO_BASE + GPIO_DIR + 4 * port, |dir| dir | (1 << pin));
        Self { port, pin }
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        write_reg(GPIO_BASE + GPIO_SET + 4 * self.port, 1 << self.pin);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        write_reg(GPIO_BASE + GPIO_CLR + 4 * self.port, 1 << self.pin);
        Ok(())
    }
}

/// LED1 (P2_10, GPIO0[14]), active high
pub fn led1() -> GpioPin {
    write_reg(SCU_BASE + SCU_SFSP2_10, SCU_FUNC0 | SCU_EPD_DISABLE);
    GpioPin::output(0, 14)
}

/// EDU-CIAA transducers behind the modem scheduler
pub struct EduCiaaModemHal {
    adc: Adc0,
    dac: Dac,
    uart: Uart2,
    tx_led: TxIndicator<GpioPin>,
}

impl EduCiaaModemHal {
    /// Configure pins and peripherals; clocks must already run
    pub fn new() -> Self {
        #[cfg(feature = "defmt")]
        defmt::info!("LPC4337: ADC0 CH1, DAC, USART2 @ 460800");

        Self {
            adc: Adc0::new(),
            dac: Dac::new(),
            uart: Uart2::new(),
            tx_led: TxIndicator::new(led1(), false),
        }
    }
}

impl ModemHal for EduCiaaModemHal {
    fn read_input_sample(&mut self) -> Q15 {
        Q15::from_adc10(self.adc.read())
    }

    fn write_output_sample(&mut self, sample: Q15) {
        self.dac.write(sample.to_dac10());
    }

    fn try_read_inbound_byte(&mut self) -> Option<u8> {
        self.uart.try_read()
    }

    fn write_outbound_bytes(&mut self, bytes: &[u8]) {
        self.uart.enqueue(bytes);
    }

    fn set_tx_active(&mut self, active: bool) {
        let _ = self.tx_led.set_active(active);
    }

    fn service(&mut self) {
        self.uart.flush_some();
    }
}

/// DWT cycle counter pacing the scheduler
pub struct DwtCycleCounter {
    dwt: DWT,
}

impl DwtCycleCounter {
    pub fn new(mut dcb: DCB, mut dwt: DWT) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();
        Self { dwt }
    }
}

impl CycleCounter for DwtCycleCounter {
    fn reset(&mut self) {
        self.dwt.set_cycle_count(0);
    }

    fn elapsed(&self) -> u32 {
        DWT::cycle_count()
    }
}
