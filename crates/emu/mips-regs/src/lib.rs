//! MIPS32 register file.
//!
//! [`Regs`] holds the 32 general-purpose registers together with `PC` and
//! the `HI`/`LO` multiply/divide result registers. All registers reset to
//! zero.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

use core::fmt;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 32;

/// The architectural register state of one MIPS32 thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regs {
    gpr: [u32; GPR_COUNT],
    pc: u32,
    hi: u32,
    lo: u32,
}

impl Regs {
    /// Creates a register file with every register zeroed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gpr: [0; GPR_COUNT],
            pc: 0,
            hi: 0,
            lo: 0,
        }
    }

    /// Zeroes every register.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reads general-purpose register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not below [`GPR_COUNT`].
    #[must_use]
    pub fn read_gpr(&self, n: usize) -> u32 {
        assert!(n < GPR_COUNT, "GPR index {n} out of range");
        self.gpr[n]
    }

    /// Writes `value` to general-purpose register `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not below [`GPR_COUNT`].
    pub fn write_gpr(&mut self, n: usize, value: u32) {
        assert!(n < GPR_COUNT, "GPR index {n} out of range");
        self.gpr[n] = value;
    }

    /// Program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    /// `HI` register.
    #[must_use]
    pub const fn hi(&self) -> u32 {
        self.hi
    }

    /// Sets the `HI` register.
    pub fn set_hi(&mut self, value: u32) {
        self.hi = value;
    }

    /// `LO` register.
    #[must_use]
    pub const fn lo(&self) -> u32 {
        self.lo
    }

    /// Sets the `LO` register.
    pub fn set_lo(&mut self, value: u32) {
        self.lo = value;
    }
}

impl Default for Regs {
    fn default() -> Self {
        Self::new()
    }
}

/// Four registers per row, then `PC`, `HI` and `LO` on a final row.
impl fmt::Display for Regs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.gpr.iter().enumerate() {
            write!(f, "   r{i:<2} {value:<#10x}")?;
            if (i + 1) % 4 == 0 {
                writeln!(f)?;
            }
        }
        writeln!(
            f,
            "    PC {:<#10x}    HI {:<#10x}    LO {:<#10x}",
            self.pc, self.hi, self.lo
        )
    }
}
