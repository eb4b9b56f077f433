//! TX indicator pin behaviour against embedded-hal-mock

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use embedded_hal_mock::eh1::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};

use modem_core::{HalError, TxIndicator};

#[test]
fn test_indicator_only_drives_edges() {
    let expectations = [
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ];
    let mut indicator = TxIndicator::new(PinMock::new(&expectations), false);

    indicator.set_active(false).unwrap();
    indicator.set_active(true).unwrap();
    indicator.set_active(true).unwrap();
    assert!(indicator.is_active());
    indicator.set_active(false).unwrap();

    indicator.free().done();
}

#[test]
fn test_active_low_indicator() {
    let expectations = [
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ];
    let mut indicator = TxIndicator::new(PinMock::new(&expectations), true);

    indicator.set_active(true).unwrap();
    indicator.set_active(false).unwrap();

    indicator.free().done();
}

/// Pin whose first `failures` writes fail
struct FlakyPin {
    failures: usize,
    writes: usize,
}

impl ErrorType for FlakyPin {
    type Error = ErrorKind;
}

impl OutputPin for FlakyPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_low()
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes += 1;
        if self.writes <= self.failures {
            Err(ErrorKind::Other)
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_pin_error_keeps_previous_state() {
    let mut indicator = TxIndicator::new(FlakyPin { failures: 1, writes: 0 }, false);

    assert_eq!(indicator.set_active(true), Err(HalError::GpioError));
    assert!(!indicator.is_active());
    // Retried on the next call since the state never changed
    indicator.set_active(true).unwrap();
    assert!(indicator.is_active());
    assert_eq!(indicator.free().writes, 2);
}
