//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channels, the illumination GPIO and the UART that
//! carries the frame stream, using raw ESP-IDF sys calls.  Called once
//! from `main()` before the polling loop starts.  On host targets every
//! function is a stub so the rest of the crate links unchanged.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::InitError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(baud_rate: u32) -> Result<(), InitError> {
    // SAFETY: Called once from main() before the polling loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
        init_uart(baud_rate)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_baud_rate: u32) -> Result<(), InitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// polling loop.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), InitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(InitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::PHOTODIODE_ADC_CHANNEL, pins::SEED_ADC_CHANNEL] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 { return Err(InitError::AdcInitFailed(ret)); }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=photodiode, CH{}=seed)",
        pins::PHOTODIODE_ADC_CHANNEL,
        pins::SEED_ADC_CHANNEL
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), InitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ILLUMINATION_LED_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(InitError::GpioConfigFailed(ret)); }
    unsafe { gpio_set_level(pins::ILLUMINATION_LED_GPIO, 0) };

    info!("hw_init: illumination GPIO configured (off)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── UART (frame link) ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
const UART_TX_BUFFER: i32 = 1024;
#[cfg(target_os = "espidf")]
const UART_RX_BUFFER: i32 = 256;

#[cfg(target_os = "espidf")]
unsafe fn init_uart(baud_rate: u32) -> Result<(), InitError> {
    let cfg = uart_config_t {
        baud_rate: baud_rate as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(pins::UART_PORT, &cfg) };
    if ret != ESP_OK as i32 { return Err(InitError::UartInitFailed(ret)); }

    // -1: leave RTS/CTS unassigned.
    let ret = unsafe { uart_set_pin(pins::UART_PORT, pins::UART_TX_GPIO, pins::UART_RX_GPIO, -1, -1) };
    if ret != ESP_OK as i32 { return Err(InitError::UartInitFailed(ret)); }

    let ret = unsafe {
        uart_driver_install(
            pins::UART_PORT,
            UART_RX_BUFFER,
            UART_TX_BUFFER,
            0,
            core::ptr::null_mut(),
            0,
        )
    };
    if ret != ESP_OK as i32 { return Err(InitError::UartInitFailed(ret)); }

    info!("hw_init: UART{} at {} baud", pins::UART_PORT, baud_rate);
    Ok(())
}

/// Queue `data` on the frame UART.  Returns bytes accepted, or the
/// negative driver return code.
#[cfg(target_os = "espidf")]
pub fn uart_write(data: &[u8]) -> Result<usize, i32> {
    // SAFETY: the driver was installed in init_uart(); the buffer outlives the call.
    let ret = unsafe {
        uart_write_bytes(pins::UART_PORT, data.as_ptr().cast(), data.len())
    };
    if ret < 0 { Err(ret) } else { Ok(ret as usize) }
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_write(data: &[u8]) -> Result<usize, i32> {
    Ok(data.len())
}

/// Block until the UART TX FIFO has drained (or `timeout_ticks` pass).
#[cfg(target_os = "espidf")]
pub fn uart_flush(timeout_ticks: u32) -> Result<(), i32> {
    // SAFETY: the driver was installed in init_uart().
    let ret = unsafe { uart_wait_tx_done(pins::UART_PORT, timeout_ticks) };
    if ret != ESP_OK as i32 { Err(ret) } else { Ok(()) }
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_flush(_timeout_ticks: u32) -> Result<(), i32> {
    Ok(())
}
