//! MBC3 real-time clock.
//!
//! Time is not ticked by the emulator; the clock value is derived from
//! elapsed host seconds, so it keeps running while the emulator is paused.

use std::time::{SystemTime, UNIX_EPOCH};

pub const RTC_SECONDS: u8 = 0x08;
pub const RTC_MINUTES: u8 = 0x09;
pub const RTC_HOURS: u8 = 0x0A;
pub const RTC_DAY_LOW: u8 = 0x0B;
pub const RTC_DAY_HIGH: u8 = 0x0C;

pub(super) const RTC_FIRST: u8 = RTC_SECONDS;
pub(super) const RTC_LAST: u8 = RTC_DAY_HIGH;

const DAY_HIGH_BIT8: u8 = 0x01;
const DAY_HIGH_HALT: u8 = 0x40;
const DAY_HIGH_CARRY: u8 = 0x80;
const DAY_COUNTER_LIMIT: u64 = 512;

/// Source of whole seconds for the cartridge clock.
pub trait RtcClock: Send {
    fn now_secs(&self) -> u64;
}

/// Host wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl RtcClock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Broken-down counter value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct RtcTime {
    seconds: u64,
    minutes: u64,
    hours: u64,
    days: u64,
}

impl RtcTime {
    fn from_total(total: u64) -> Self {
        Self {
            seconds: total % 60,
            minutes: total / 60 % 60,
            hours: total / 3600 % 24,
            days: total / 86_400,
        }
    }

    fn total(&self) -> u64 {
        self.days * 86_400 + self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

pub(super) struct Rtc {
    clock: Box<dyn RtcClock>,
    /// Host time at which the counter read zero.
    base: i64,
    /// Frozen counter value while halted.
    halted: Option<u64>,
    carry: bool,
    latched: [u8; 5],
}

impl Rtc {
    pub(super) fn new(clock: Box<dyn RtcClock>) -> Self {
        let base = clock.now_secs() as i64;
        Self {
            clock,
            base,
            halted: None,
            carry: false,
            latched: [0; 5],
        }
    }

    fn elapsed(&self) -> u64 {
        match self.halted {
            Some(total) => total,
            None => (self.clock.now_secs() as i64 - self.base).max(0) as u64,
        }
    }

    fn set_elapsed(&mut self, total: u64) {
        if self.halted.is_some() {
            self.halted = Some(total);
        } else {
            self.base = self.clock.now_secs() as i64 - total as i64;
        }
    }

    /// Copy the live counter into the readable registers.
    pub(super) fn latch(&mut self) {
        let mut total = self.elapsed();
        let mut time = RtcTime::from_total(total);
        if time.days >= DAY_COUNTER_LIMIT {
            self.carry = true;
            time.days %= DAY_COUNTER_LIMIT;
            total = time.total();
            self.set_elapsed(total);
        }

        let mut day_high = ((time.days >> 8) as u8) & DAY_HIGH_BIT8;
        if self.halted.is_some() {
            day_high |= DAY_HIGH_HALT;
        }
        if self.carry {
            day_high |= DAY_HIGH_CARRY;
        }
        self.latched = [
            time.seconds as u8,
            time.minutes as u8,
            time.hours as u8,
            time.days as u8,
            day_high,
        ];
    }

    pub(super) fn read(&self, register: u8) -> u8 {
        match register {
            RTC_FIRST..=RTC_LAST => self.latched[(register - RTC_FIRST) as usize],
            _ => 0xFF,
        }
    }

    /// Writes go to the live counter.
    pub(super) fn write(&mut self, register: u8, value: u8) {
        let mut time = RtcTime::from_total(self.elapsed());
        match register {
            RTC_SECONDS => time.seconds = (value & 0x3F) as u64,
            RTC_MINUTES => time.minutes = (value & 0x3F) as u64,
            RTC_HOURS => time.hours = (value & 0x1F) as u64,
            RTC_DAY_LOW => time.days = (time.days & 0x100) | value as u64,
            RTC_DAY_HIGH => {
                time.days = (time.days & 0xFF) | (((value & DAY_HIGH_BIT8) as u64) << 8);
                self.carry = value & DAY_HIGH_CARRY != 0;
                let total = time.total();
                // `set_elapsed` below restarts counting from `total` on resume.
                self.halted = (value & DAY_HIGH_HALT != 0).then_some(total);
            }
            _ => return,
        }
        self.set_elapsed(time.total());
        if let RTC_FIRST..=RTC_LAST = register {
            self.latched[(register - RTC_FIRST) as usize] = value;
        }
    }
}
