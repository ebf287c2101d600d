//! One-shot hardware peripheral initialization.
//!
//! Configures the button GPIO (input, pull-up, falling-edge ISR), the
//! LEDC channel for the chime piezo, and brings up the audio pipeline and
//! LED ring components. Called once from `main()` before the event loop
//! starts.
//!
//! The audio decode pipeline and the WS2812 ring live in ESP-IDF C
//! components (see `package.metadata.esp-idf-sys`); this module declares
//! their C entry points and wraps them for the drivers.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed,
    IsrInstallFailed(i32),
    AudioPipelineFailed,
    RingInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::AudioPipelineFailed => write!(f, "audio pipeline component init failed"),
            Self::RingInitFailed => write!(f, "LED ring component init failed"),
        }
    }
}

// ── C component entry points ──────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" {
    fn lh_audio_init(bclk: i32, lrclk: i32, dout: i32) -> bool;
    fn lh_audio_play(source: *const core::ffi::c_char) -> bool;
    fn lh_audio_is_playing() -> bool;
    fn lh_audio_stop();
    fn lh_audio_level() -> f32;
    fn lh_ring_init(gpio: i32, count: u32) -> bool;
    fn lh_ring_write(rgb: *const u8, count: u32);
}

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the event loop; single-threaded.
    unsafe {
        init_button_gpio()?;
        init_ledc()?;
        if !lh_audio_init(
            pins::I2S_BCLK_GPIO,
            pins::I2S_LRCLK_GPIO,
            pins::I2S_DOUT_GPIO,
        ) {
            return Err(HwInitError::AudioPipelineFailed);
        }
        if !lh_ring_init(pins::RING_DATA_GPIO, pins::RING_PIXELS as u32) {
            return Err(HwInitError::RingInitFailed);
        }
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_button_gpio() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::BUTTON_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        ..Default::default()
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer_cfg = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        freq_hz: 2000,
        clk_cfg: ledc_clk_cfg_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    if unsafe { ledc_timer_config(&timer_cfg) } != ESP_OK {
        return Err(HwInitError::LedcInitFailed);
    }
    let chan_cfg = ledc_channel_config_t {
        gpio_num: pins::CHIME_GPIO,
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: ledc_channel_t_LEDC_CHANNEL_0,
        intr_type: ledc_intr_type_t_LEDC_INTR_DISABLE,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    if unsafe { ledc_channel_config(&chan_cfg) } != ESP_OK {
        return Err(HwInitError::LedcInitFailed);
    }
    Ok(())
}

/// Install the GPIO ISR service and hook the button handler.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    unsafe extern "C" fn button_isr(_arg: *mut core::ffi::c_void) {
        let now_ms = (unsafe { esp_timer_get_time() } / 1000) as u32;
        crate::drivers::button::button_isr_handler(now_ms);
    }

    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
        return Err(HwInitError::IsrInstallFailed(ret));
    }
    let ret = unsafe {
        gpio_isr_handler_add(
            pins::BUTTON_GPIO,
            Some(button_isr),
            core::ptr::null_mut(),
        )
    };
    if ret != ESP_OK {
        return Err(HwInitError::IsrInstallFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    Ok(())
}

// ── Runtime wrappers ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    unsafe { gpio_get_level(pin) != 0 }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true // released (active-low button)
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(duty_10bit: u32) {
    unsafe {
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_0,
            duty_10bit,
        );
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_duty_10bit: u32) {}

#[cfg(target_os = "espidf")]
pub fn ledc_set_freq(freq_hz: u32) {
    unsafe {
        esp_idf_svc::sys::ledc_set_freq(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_timer_t_LEDC_TIMER_0,
            freq_hz,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set_freq(_freq_hz: u32) {}

#[cfg(target_os = "espidf")]
pub fn audio_play(source: &core::ffi::CStr) -> bool {
    unsafe { lh_audio_play(source.as_ptr()) }
}

#[cfg(target_os = "espidf")]
pub fn audio_is_playing() -> bool {
    unsafe { lh_audio_is_playing() }
}

#[cfg(target_os = "espidf")]
pub fn audio_stop() {
    unsafe { lh_audio_stop() }
}

#[cfg(target_os = "espidf")]
pub fn audio_level() -> f32 {
    unsafe { lh_audio_level() }
}

#[cfg(target_os = "espidf")]
pub fn ring_write(frame: &[(u8, u8, u8)]) {
    let mut buf = [0u8; 3 * pins::RING_PIXELS];
    for (i, (r, g, b)) in frame.iter().enumerate().take(pins::RING_PIXELS) {
        buf[i * 3] = *r;
        buf[i * 3 + 1] = *g;
        buf[i * 3 + 2] = *b;
    }
    unsafe { lh_ring_write(buf.as_ptr(), frame.len().min(pins::RING_PIXELS) as u32) }
}

#[cfg(not(target_os = "espidf"))]
pub fn ring_write(_frame: &[(u8, u8, u8)]) {}
