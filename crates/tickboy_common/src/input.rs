use bitflags::bitflags;

/// The eight logical buttons of a DMG.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    /// Bit inside the active-low P1 nibble. Directions and action buttons
    /// share bit positions and are told apart by the P1 select lines.
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Button::Right | Button::A => 0x01,
            Button::Left | Button::B => 0x02,
            Button::Up | Button::Select => 0x04,
            Button::Down | Button::Start => 0x08,
        }
    }

    #[inline]
    pub const fn is_direction(self) -> bool {
        matches!(
            self,
            Button::Right | Button::Left | Button::Up | Button::Down
        )
    }
}

/// Polled once per frame by the joypad device.
pub trait InputProvider {
    fn is_pressed(&self, button: Button) -> bool;
}

/// Input source with nothing ever pressed.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoInput;

impl InputProvider for NoInput {
    fn is_pressed(&self, _button: Button) -> bool {
        false
    }
}

bitflags! {
    /// A plain set of held buttons, handy for hosts that translate their own
    /// key events and for tests.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct Buttons: u8 {
        const RIGHT = 1 << 0;
        const LEFT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const A = 1 << 4;
        const B = 1 << 5;
        const SELECT = 1 << 6;
        const START = 1 << 7;
    }
}

impl From<Button> for Buttons {
    fn from(button: Button) -> Self {
        match button {
            Button::Right => Buttons::RIGHT,
            Button::Left => Buttons::LEFT,
            Button::Up => Buttons::UP,
            Button::Down => Buttons::DOWN,
            Button::A => Buttons::A,
            Button::B => Buttons::B,
            Button::Select => Buttons::SELECT,
            Button::Start => Buttons::START,
        }
    }
}

impl Buttons {
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.set(Buttons::from(button), pressed);
    }
}

impl InputProvider for Buttons {
    fn is_pressed(&self, button: Button) -> bool {
        self.contains(Buttons::from(button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_set_reports_pressed() {
        let mut held = Buttons::empty();
        held.set_button(Button::Start, true);
        held.set_button(Button::Left, true);
        assert!(held.is_pressed(Button::Start));
        assert!(held.is_pressed(Button::Left));
        assert!(!held.is_pressed(Button::A));

        held.set_button(Button::Start, false);
        assert!(!held.is_pressed(Button::Start));
    }

    #[test]
    fn direction_and_action_share_bits() {
        assert_eq!(Button::Right.mask(), Button::A.mask());
        assert_eq!(Button::Down.mask(), Button::Start.mask());
        assert!(Button::Up.is_direction());
        assert!(!Button::Select.is_direction());
    }
}
