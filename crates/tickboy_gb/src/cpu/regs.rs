use bitflags::bitflags;

bitflags! {
    /// Flag bits in the F register. Bits 0-3 are always zero.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct Flags: u8 {
        /// Zero.
        const Z = 0x80;
        /// Subtract.
        const N = 0x40;
        /// Half carry.
        const H = 0x20;
        /// Carry.
        const C = 0x10;
    }
}

/// 8-bit register selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

/// 16-bit register pair selector. `AF` only appears in PUSH/POP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R16 {
    BC,
    DE,
    HL,
    SP,
    AF,
}

/// Branch condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    NZ,
    Z,
    NC,
    C,
}

impl R8 {
    pub const fn name(self) -> &'static str {
        match self {
            R8::B => "B",
            R8::C => "C",
            R8::D => "D",
            R8::E => "E",
            R8::H => "H",
            R8::L => "L",
            R8::A => "A",
        }
    }
}

impl R16 {
    pub const fn name(self) -> &'static str {
        match self {
            R16::BC => "BC",
            R16::DE => "DE",
            R16::HL => "HL",
            R16::SP => "SP",
            R16::AF => "AF",
        }
    }
}

impl Cond {
    pub const fn name(self) -> &'static str {
        match self {
            Cond::NZ => "NZ",
            Cond::Z => "Z",
            Cond::NC => "NC",
            Cond::C => "C",
        }
    }
}

/// Registers for the Game Boy CPU (SM83).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Register contents left behind by the DMG boot ROM at PC=0x0100.
    pub const fn post_boot() -> Self {
        Self {
            a: 0x01,
            f: 0xB0,
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            sp: 0xFFFE,
            pc: 0x0100,
        }
    }

    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f & 0xF0])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.f)
    }

    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.f = flags.bits();
    }

    /// Overwrite only the flags in `mask`, taking their new state from `value`.
    #[inline]
    pub fn update_flags(&mut self, mask: Flags, value: Flags) {
        let kept = self.flags() - mask;
        self.set_flags(kept | (value & mask));
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    pub fn read8(&self, reg: R8) -> u8 {
        match reg {
            R8::B => self.b,
            R8::C => self.c,
            R8::D => self.d,
            R8::E => self.e,
            R8::H => self.h,
            R8::L => self.l,
            R8::A => self.a,
        }
    }

    pub fn write8(&mut self, reg: R8, value: u8) {
        match reg {
            R8::B => self.b = value,
            R8::C => self.c = value,
            R8::D => self.d = value,
            R8::E => self.e = value,
            R8::H => self.h = value,
            R8::L => self.l = value,
            R8::A => self.a = value,
        }
    }

    pub fn read16(&self, reg: R16) -> u16 {
        match reg {
            R16::BC => self.bc(),
            R16::DE => self.de(),
            R16::HL => self.hl(),
            R16::SP => self.sp,
            R16::AF => self.af(),
        }
    }

    pub fn write16(&mut self, reg: R16, value: u16) {
        match reg {
            R16::BC => self.set_bc(value),
            R16::DE => self.set_de(value),
            R16::HL => self.set_hl(value),
            R16::SP => self.sp = value,
            R16::AF => self.set_af(value),
        }
    }

    pub fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::NZ => !self.flag(Flags::Z),
            Cond::Z => self.flag(Flags::Z),
            Cond::NC => !self.flag(Flags::C),
            Cond::C => self.flag(Flags::C),
        }
    }
}
