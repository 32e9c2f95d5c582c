/// Interrupt sources, in priority order (bit 0 is serviced first).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    /// Dispatch vector: 0x40, 0x48, 0x50, 0x58, 0x60.
    #[inline]
    pub const fn vector(self) -> u16 {
        0x40 + 8 * (self as u16)
    }

    fn from_bit(bit: u32) -> Option<Self> {
        Self::ALL.get(bit as usize).copied()
    }
}

pub const IF_ADDRESS: u16 = 0xFF0F;
pub const IE_ADDRESS: u16 = 0xFFFF;

const INTERRUPT_MASK: u8 = 0x1F;
const IF_UNUSED_BITS: u8 = 0xE0;

/// IE/IF registers plus the master enable.
///
/// EI does not enable interrupts right away: it arms a two-step countdown
/// that `update_ime` advances at every instruction completion. IME therefore
/// becomes set only once the instruction *after* EI has finished.
#[derive(Clone, Debug)]
pub struct InterruptController {
    ime: bool,
    /// Remaining instruction completions until IME is set; 0 = nothing scheduled.
    ime_delay: u8,
    ie: u8,
    iflag: u8,
}

impl Default for InterruptController {
    fn default() -> Self {
        let mut ic = Self {
            ime: false,
            ime_delay: 0,
            ie: 0,
            iflag: 0,
        };
        ic.reset();
        ic
    }
}

impl InterruptController {
    pub fn reset(&mut self) {
        self.ime = false;
        self.ime_delay = 0;
        self.ie = 0x00;
        self.iflag = 0xE1 & INTERRUPT_MASK;
    }

    #[inline]
    pub fn ime(&self) -> bool {
        self.ime
    }

    #[inline]
    pub fn ime_scheduled(&self) -> bool {
        self.ime_delay != 0
    }

    /// Any enabled request, regardless of IME.
    #[inline]
    pub fn has_pending(&self) -> bool {
        (self.ie & self.iflag & INTERRUPT_MASK) != 0
    }

    #[inline]
    pub fn should_dispatch(&self) -> bool {
        self.ime && self.has_pending()
    }

    /// Take the highest-priority pending interrupt: clears its IF bit, IME
    /// and any scheduled enable.
    pub fn acknowledge(&mut self) -> Option<Interrupt> {
        let pending = self.ie & self.iflag & INTERRUPT_MASK;
        if pending == 0 {
            return None;
        }
        let interrupt = Interrupt::from_bit(pending.trailing_zeros())?;
        self.iflag &= !interrupt.mask();
        self.ime = false;
        self.ime_delay = 0;
        Some(interrupt)
    }

    #[inline]
    pub fn request(&mut self, interrupt: Interrupt) {
        self.iflag |= interrupt.mask();
    }

    #[inline]
    pub fn clear(&mut self, interrupt: Interrupt) {
        self.iflag &= !interrupt.mask();
    }

    /// EI.
    pub fn schedule_enable(&mut self) {
        self.ime_delay = 2;
    }

    /// RETI.
    pub fn enable(&mut self) {
        self.ime = true;
        self.ime_delay = 0;
    }

    /// DI; also cancels a pending EI.
    pub fn disable(&mut self) {
        self.ime = false;
        self.ime_delay = 0;
    }

    /// Called by the CPU each time an instruction completes.
    pub fn update_ime(&mut self) {
        if self.ime_delay > 0 {
            self.ime_delay -= 1;
            if self.ime_delay == 0 {
                self.ime = true;
            }
        }
    }

    #[inline]
    pub fn ie(&self) -> u8 {
        self.ie
    }

    #[inline]
    pub fn set_ie(&mut self, value: u8) {
        self.ie = value & INTERRUPT_MASK;
    }

    /// IF as the CPU sees it: unused upper bits read as 1.
    #[inline]
    pub fn read_if(&self) -> u8 {
        self.iflag | IF_UNUSED_BITS
    }

    #[inline]
    pub fn write_if(&mut self, value: u8) {
        self.iflag = value & INTERRUPT_MASK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_if_reads_e1() {
        let ic = InterruptController::default();
        assert_eq!(ic.read_if(), 0xE1);
        assert_eq!(ic.ie(), 0);
        assert!(!ic.ime());
    }

    #[test]
    fn acknowledge_picks_lowest_bit() {
        let mut ic = InterruptController::default();
        ic.write_if(0);
        ic.set_ie(0x1F);
        ic.request(Interrupt::Joypad);
        ic.request(Interrupt::Timer);
        ic.enable();

        let taken = ic.acknowledge();
        assert_eq!(taken, Some(Interrupt::Timer));
        assert_eq!(Interrupt::Timer.vector(), 0x50);
        assert!(!ic.ime());
        assert_eq!(ic.read_if() & 0x1F, Interrupt::Joypad.mask());
    }

    #[test]
    fn ei_takes_effect_after_following_instruction() {
        let mut ic = InterruptController::default();
        ic.schedule_enable();
        // Completion of EI itself.
        ic.update_ime();
        assert!(!ic.ime());
        // Completion of the next instruction.
        ic.update_ime();
        assert!(ic.ime());
    }

    #[test]
    fn di_cancels_scheduled_enable() {
        let mut ic = InterruptController::default();
        ic.schedule_enable();
        ic.update_ime();
        ic.disable();
        ic.update_ime();
        assert!(!ic.ime());
        assert!(!ic.ime_scheduled());
    }

    #[test]
    fn ie_is_masked_to_five_bits() {
        let mut ic = InterruptController::default();
        ic.set_ie(0xFF);
        assert_eq!(ic.ie(), 0x1F);
    }
}
