//! P1 (FF00).

use tickboy_common::input::{Button, InputProvider, NoInput};

use crate::cpu::interrupts::{Interrupt, InterruptController};

pub const P1: u16 = 0xFF00;

const SELECT_DPAD: u8 = 0x10;
const SELECT_BUTTONS: u8 = 0x20;
const SELECT_MASK: u8 = SELECT_DPAD | SELECT_BUTTONS;

pub struct Joypad {
    select: u8,
    /// Low nibble as last latched, active-low.
    state: u8,
    previous: u8,
    provider: Box<dyn InputProvider + Send>,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: SELECT_MASK,
            state: 0x0F,
            previous: 0x0F,
            provider: Box::new(NoInput),
        }
    }
}

impl std::fmt::Debug for Joypad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joypad")
            .field("select", &self.select)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Joypad {
    /// Back to power-on selection; the input provider is kept.
    pub fn reset(&mut self) {
        self.select = SELECT_MASK;
        self.state = 0x0F;
        self.previous = 0x0F;
    }

    pub fn set_provider(&mut self, provider: Box<dyn InputProvider + Send>) {
        self.provider = provider;
    }

    fn poll(&self) -> u8 {
        let mut pressed = 0u8;
        for button in Button::ALL {
            let group_selected = if button.is_direction() {
                self.select & SELECT_DPAD == 0
            } else {
                self.select & SELECT_BUTTONS == 0
            };
            if group_selected && self.provider.is_pressed(button) {
                pressed |= button.mask();
            }
        }
        !pressed & 0x0F
    }

    pub fn read(&self) -> u8 {
        0xC0 | self.select | self.state
    }

    pub fn write(&mut self, value: u8) {
        self.select = value & SELECT_MASK;
        self.state = self.poll();
    }

    /// Per-frame poll. Any selected line going low requests INT 60.
    pub fn update(&mut self, interrupts: &mut InterruptController) {
        self.state = self.poll();
        if self.previous & !self.state & 0x0F != 0 {
            interrupts.request(Interrupt::Joypad);
        }
        self.previous = self.state;
    }
}

#[cfg(test)]
mod tests {
    use tickboy_common::input::Buttons;

    use super::*;

    fn joypad_with(buttons: Buttons) -> Joypad {
        let mut joypad = Joypad::default();
        joypad.set_provider(Box::new(buttons));
        joypad
    }

    #[test]
    fn nothing_selected_reads_high() {
        let joypad = joypad_with(Buttons::all());
        assert_eq!(joypad.read(), 0xFF);
    }

    #[test]
    fn selected_group_reads_active_low() {
        let mut joypad = joypad_with(Buttons::RIGHT | Buttons::START);

        joypad.write(0x20); // d-pad
        assert_eq!(joypad.read(), 0xE0 | 0x0E);

        joypad.write(0x10); // buttons
        assert_eq!(joypad.read(), 0xD0 | 0x07);
    }

    #[test]
    fn press_requests_interrupt() {
        let mut ic = InterruptController::default();
        ic.write_if(0);
        let mut joypad = joypad_with(Buttons::A);
        joypad.write(0x10);

        joypad.update(&mut ic);
        assert_eq!(ic.read_if() & 0x1F, Interrupt::Joypad.mask());

        // Held button does not re-trigger.
        ic.write_if(0);
        joypad.update(&mut ic);
        assert_eq!(ic.read_if() & 0x1F, 0);
    }
}
