//! One-shot GPIO initialisation and raw line access.
//!
//! Configures the LED-select inputs and the four switch lines using raw
//! ESP-IDF sys calls.  Called once from `main()` before the HTTP server
//! starts.  Switch lines leave init as floating inputs; only
//! [`gpio_drive_low`] ever turns one into an output.
//!
//! On host targets the same functions operate on an in-memory register
//! file ([`sim`]) with a simulated KVM attached, so the full
//! press → settle → read sequence can run without hardware.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the HTTP server starts; single-threaded.
    unsafe {
        init_led_inputs()?;
        init_switch_lines()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── LED-select inputs ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_led_inputs() -> Result<(), HwInitError> {
    for &pin in &pins::LED_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: LED-select inputs configured");
    Ok(())
}

// ── Switch lines ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_switch_lines() -> Result<(), HwInitError> {
    for &pin in &pins::SWITCH_GPIOS {
        // Floating input: no pulls, so the KVM's own pull-up and the
        // physical button own the line while idle.
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        // Preload the output latch low so a later direction flip drives low
        // without a high glitch.
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: switch lines configured as floating inputs");
    Ok(())
}

// ── Raw line access ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::input(pin)
}

/// Set the pressed (low) level, then switch the pin to output.
#[cfg(target_os = "espidf")]
pub fn gpio_drive_low(pin: i32) {
    // SAFETY: pin was configured in init_switch_lines(); callers hold the
    // service lock, so no other task touches the switch lines.
    unsafe {
        gpio_set_level(pin, 0);
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_drive_low(pin: i32) {
    sim::drive_low(pin);
}

/// Return the pin to a non-driving input.
#[cfg(target_os = "espidf")]
pub fn gpio_float(pin: i32) {
    // SAFETY: see gpio_drive_low().
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_float(pin: i32) {
    sim::float(pin);
}

// ── Host simulation ───────────────────────────────────────────

/// In-memory GPIO register file plus a simulated KVM.
///
/// Input levels and driven-low outputs are one bit per GPIO.  While
/// `kvm_follows_presses` is set (the default), driving a switch line low
/// moves the LED-select inputs to that port's code, as the real device
/// does when its button is pressed.
#[cfg(not(target_os = "espidf"))]
pub mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use crate::kvm::{LedCode, Port};
    use crate::pins;

    static INPUT_LEVELS: AtomicU64 = AtomicU64::new(0);
    static DRIVEN_LOW: AtomicU64 = AtomicU64::new(0);
    static KVM_FOLLOWS_PRESSES: AtomicBool = AtomicBool::new(true);

    const fn bit(pin: i32) -> u64 {
        1u64 << (pin as u32 & 63)
    }

    pub fn input(pin: i32) -> bool {
        INPUT_LEVELS.load(Ordering::Acquire) & bit(pin) != 0
    }

    pub fn set_input(pin: i32, high: bool) {
        if high {
            INPUT_LEVELS.fetch_or(bit(pin), Ordering::AcqRel);
        } else {
            INPUT_LEVELS.fetch_and(!bit(pin), Ordering::AcqRel);
        }
    }

    /// Present `port` on the LED-select lines, as a physical press would.
    pub fn set_active_port(port: Port) {
        let code = LedCode::for_port(port);
        set_input(pins::LED_BIT0_GPIO, code.bit0());
        set_input(pins::LED_BIT1_GPIO, code.bit1());
    }

    /// Whether a press on a switch line changes the simulated LED lines.
    pub fn set_kvm_follows_presses(follow: bool) {
        KVM_FOLLOWS_PRESSES.store(follow, Ordering::Release);
    }

    pub fn is_driven_low(pin: i32) -> bool {
        DRIVEN_LOW.load(Ordering::Acquire) & bit(pin) != 0
    }

    pub fn driven_low_mask() -> u64 {
        DRIVEN_LOW.load(Ordering::Acquire)
    }

    /// Back to power-on: port 1 active, every line floating.
    pub fn reset() {
        INPUT_LEVELS.store(0, Ordering::Release);
        DRIVEN_LOW.store(0, Ordering::Release);
        KVM_FOLLOWS_PRESSES.store(true, Ordering::Release);
    }

    pub(super) fn drive_low(pin: i32) {
        DRIVEN_LOW.fetch_or(bit(pin), Ordering::AcqRel);
        if !KVM_FOLLOWS_PRESSES.load(Ordering::Acquire) {
            return;
        }
        if let Some(port) = pins::SWITCH_GPIOS
            .iter()
            .position(|&p| p == pin)
            .and_then(Port::from_index)
        {
            set_active_port(port);
        }
    }

    pub(super) fn float(pin: i32) {
        DRIVEN_LOW.fetch_and(!bit(pin), Ordering::AcqRel);
    }

    /// Serialises unit tests that share the simulated register file.
    #[cfg(test)]
    pub(crate) fn exclusive() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        let guard = LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        reset();
        guard
    }
}
