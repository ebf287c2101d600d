//! GPIO pin assignments for the lighthouse board.
//!
//! Single source of truth; drivers take pins from here rather than
//! hardcoding numbers.

/// Momentary button, active low with external pull-up.
pub const BUTTON_GPIO: i32 = 16;

/// WS2812 data line for the 12-pixel ring.
pub const RING_DATA_GPIO: i32 = 4;

/// Piezo chime output (LEDC).
pub const CHIME_GPIO: i32 = 25;

/// I2S bus to the audio codec.
pub const I2S_BCLK_GPIO: i32 = 26;
pub const I2S_LRCLK_GPIO: i32 = 22;
pub const I2S_DOUT_GPIO: i32 = 21;

/// Number of pixels on the ring.
pub const RING_PIXELS: usize = 12;
