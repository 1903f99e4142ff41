//! Active-port sensor on the KVM's LED-select lines.
//!
//! Two digital inputs carry the 2-bit code the KVM uses to light its
//! port LEDs.  The code is decoded through the fixed table in
//! [`crate::kvm::led`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers.
//! On host/test: reads the simulated register file.
//!
//! No reading is cached: the KVM's own buttons can change the port at
//! any time, so every query goes to the pins.

use crate::drivers::hw_init;
use crate::kvm::{LedCode, Port};
use crate::pins;

pub struct PortLedSensor {
    bit0_gpio: i32,
    bit1_gpio: i32,
}

impl PortLedSensor {
    pub fn new(bit0_gpio: i32, bit1_gpio: i32) -> Self {
        Self {
            bit0_gpio,
            bit1_gpio,
        }
    }

    /// Raw code on the two lines.
    pub fn read_code(&self) -> LedCode {
        let bit0 = hw_init::gpio_read(self.bit0_gpio);
        let bit1 = hw_init::gpio_read(self.bit1_gpio);
        LedCode::from_bits(bit1, bit0)
    }

    /// Port the KVM currently reports as active.
    pub fn read(&self) -> Port {
        self.read_code().port()
    }
}

impl Default for PortLedSensor {
    fn default() -> Self {
        Self::new(pins::LED_BIT0_GPIO, pins::LED_BIT1_GPIO)
    }
}
