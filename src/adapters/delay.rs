//! Blocking delay adapter.
//!
//! - **`target_os = "espidf"`** — FreeRTOS `vTaskDelay`, so the calling
//!   task yields while a line is held and other tasks keep running.
//! - **`not(target_os = "espidf")`** — `std::thread::sleep`.

use embedded_hal::delay::DelayNs;

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingDelay;

impl BlockingDelay {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for BlockingDelay {
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::FreeRtos.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for BlockingDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
