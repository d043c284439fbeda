//! OLED status line.
//!
//! Implements [`DisplayPort`] on a 128x64 SSD1306 over I²C. Every call
//! clears the frame buffer and draws one line, so the panel always shows
//! the most recent status only.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `ssd1306` buffered graphics mode drawn
//!   with `embedded-graphics`.
//! - **all other targets**: the line is kept in memory for inspection.

#[cfg(not(target_os = "espidf"))]
use log::debug;

use crate::app::ports::DisplayPort;

/// Characters that fit across the panel in the 6x10 font.
pub const LINE_CHARS: usize = 21;

/// Truncate `text` to the panel width on a char boundary.
pub fn fit_line(text: &str) -> heapless::String<{ LINE_CHARS * 4 }> {
    let mut line = heapless::String::new();
    for c in text.chars().take(LINE_CHARS) {
        let _ = line.push(c);
    }
    line
}

#[cfg(target_os = "espidf")]
pub use panel::OledDisplay;

#[cfg(target_os = "espidf")]
mod panel {
    use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle, MonoTextStyleBuilder};
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::text::{Baseline, Text};
    use log::{debug, warn};
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use super::{fit_line, DisplayPort};
    use crate::pins;

    type Panel<I2C> = Ssd1306<
        I2CInterface<I2C>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    /// Vertical centre of the 64-row panel for a 10-row font.
    const LINE_Y: i32 = 27;

    pub struct OledDisplay<I2C: embedded_hal::i2c::I2c> {
        panel: Option<Panel<I2C>>,
        style: MonoTextStyle<'static, BinaryColor>,
        flush_failures: u32,
    }

    impl<I2C: embedded_hal::i2c::I2c> OledDisplay<I2C> {
        /// Initialise the panel. An unresponsive panel is logged and the
        /// adapter degrades to log-only output.
        pub fn new(i2c: I2C) -> Self {
            let interface = I2CDisplayInterface::new_custom_address(i2c, pins::OLED_I2C_ADDR);
            let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            let panel = match panel.init() {
                Ok(()) => Some(panel),
                Err(e) => {
                    warn!("OLED: init failed ({:?}), status goes to log only", e);
                    None
                }
            };
            let style = MonoTextStyleBuilder::new()
                .font(&FONT_6X10)
                .text_color(BinaryColor::On)
                .build();
            Self {
                panel,
                style,
                flush_failures: 0,
            }
        }

        pub fn flush_failures(&self) -> u32 {
            self.flush_failures
        }
    }

    impl<I2C: embedded_hal::i2c::I2c> DisplayPort for OledDisplay<I2C> {
        fn show_line(&mut self, text: &str) {
            let line = fit_line(text);
            debug!("OLED | {}", line);
            let Some(panel) = self.panel.as_mut() else {
                return;
            };
            panel.clear_buffer();
            let _ = Text::with_baseline(&line, Point::new(0, LINE_Y), self.style, Baseline::Top)
                .draw(panel);
            if panel.flush().is_err() {
                self.flush_failures = self.flush_failures.wrapping_add(1);
            }
        }
    }
}

/// Host stand-in for the panel.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimDisplay {
    current: heapless::String<{ LINE_CHARS * 4 }>,
    writes: u32,
}

#[cfg(not(target_os = "espidf"))]
impl SimDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the panel would show right now.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

#[cfg(not(target_os = "espidf"))]
impl DisplayPort for SimDisplay {
    fn show_line(&mut self, text: &str) {
        self.current = fit_line(text);
        self.writes += 1;
        debug!("OLED(sim) | {}", self.current);
    }
}
