//! # Repeat counts
//!
//! ## Overview
//!
//! Typing digits in Normal mode builds up a count that multiplies the next command. The
//! [RepeatCounter] holds that count until a command consumes it with [RepeatCounter::run].
//!
//! ```
//! use selkie::count::RepeatCounter;
//!
//! let mut counter = RepeatCounter::default();
//! counter.push_digit(1);
//! counter.push_digit(2);
//!
//! let mut runs = 0;
//! counter.run(|| -> Result<(), ()> { runs += 1; Ok(()) }).unwrap();
//!
//! assert_eq!(runs, 12);
//! assert_eq!(counter.value(), 0);
//! ```
use tracing::trace;

/// Accumulates the digits typed before a command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RepeatCounter {
    value: usize,
}

impl RepeatCounter {
    /// Create a new counter at zero.
    pub fn new() -> Self {
        RepeatCounter::default()
    }

    /// The count typed so far. Zero means no count has been typed.
    pub fn value(&self) -> usize {
        self.value
    }

    /// The number of times the next command will run.
    pub fn repetitions(&self) -> usize {
        self.value.max(1)
    }

    /// The value to show to the user, if any.
    pub fn display(&self) -> Option<usize> {
        if self.value == 0 {
            None
        } else {
            Some(self.value)
        }
    }

    /// Append a decimal digit to the count.
    ///
    /// Values above 9 only keep their last decimal digit. The count saturates instead of
    /// overflowing.
    pub fn push_digit(&mut self, digit: u8) {
        let digit = usize::from(digit % 10);

        self.value = self.value.saturating_mul(10).saturating_add(digit);

        trace!(target: "selkie.count", value = self.value, "push_digit");
    }

    /// Append the digit represented by `c`, returning whether it was a digit.
    pub fn push_char(&mut self, c: char) -> bool {
        match c.to_digit(10) {
            Some(d) => {
                self.push_digit(d as u8);
                true
            },
            None => false,
        }
    }

    /// Remove the last digit of the count.
    pub fn pop_digit(&mut self) {
        self.value /= 10;

        trace!(target: "selkie.count", value = self.value, "pop_digit");
    }

    /// Throw away the current count.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Run `action` [RepeatCounter::repetitions] times, and then reset the count.
    ///
    /// The first failure stops the repetitions. The count is reset before the failure is
    /// returned.
    pub fn run<E, F>(&mut self, mut action: F) -> Result<(), E>
    where
        F: FnMut() -> Result<(), E>,
    {
        let times = self.repetitions();

        trace!(target: "selkie.count", times, "run");

        let res = (0..times).try_for_each(|_| action());

        self.reset();

        return res;
    }
}
