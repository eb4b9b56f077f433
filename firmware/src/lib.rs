#![no_std]

//! Firmware library for the EDU-CIAA-NXP (LPC4337) baseband modem

pub use static_cell::StaticCell;

pub use modem_core::*;

pub use crate::lpc4337_hardware::*;

// LPC4337 hardware module
pub mod lpc4337_hardware;

/// Scheduler type running on the board
pub type BoardScheduler = Scheduler<EduCiaaModemHal, DwtCycleCounter>;
