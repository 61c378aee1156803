//! PIN gates for the assets view and board administration.
//!
//! A gate is a plaintext string comparison that keeps casual eyes off a
//! screen. It is not authentication: the PIN is stored unhashed next to the
//! data it guards, and wrong attempts never lock anything out.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Incorrect PIN")]
    WrongPin,
    #[error("Locked: enter the PIN first")]
    Locked,
}

#[derive(Debug, Clone)]
pub struct PinGate {
    pin: String,
    unlocked: bool,
}

impl PinGate {
    /// A gate with an empty PIN starts (and stays) unlocked.
    /// The unlocked flag is session state and is never persisted.
    pub fn new(pin: impl Into<String>) -> Self {
        let pin = pin.into();
        let unlocked = pin.is_empty();
        Self { pin, unlocked }
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn has_pin(&self) -> bool {
        !self.pin.is_empty()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn try_unlock(&mut self, attempt: &str) -> Result<(), GateError> {
        if attempt == self.pin {
            self.unlocked = true;
            Ok(())
        } else {
            debug!("PIN attempt rejected");
            Err(GateError::WrongPin)
        }
    }

    pub fn ensure_unlocked(&self) -> Result<(), GateError> {
        if self.unlocked {
            Ok(())
        } else {
            Err(GateError::Locked)
        }
    }

    /// Re-engage the gate. Has no effect when no PIN is set.
    pub fn lock(&mut self) {
        self.unlocked = self.pin.is_empty();
    }

    /// Replace the PIN. The gate must be unlocked; it stays unlocked afterwards.
    pub fn set_pin(&mut self, new_pin: &str) -> Result<(), GateError> {
        self.ensure_unlocked()?;
        self.pin = new_pin.trim().to_string();
        self.unlocked = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pin_starts_unlocked() {
        let mut gate = PinGate::new("");
        assert!(gate.is_unlocked());
        gate.lock();
        assert!(gate.is_unlocked());
    }

    #[test]
    fn test_pin_gate_unlock_flow() {
        let mut gate = PinGate::new("1234");
        assert!(!gate.is_unlocked());
        assert_eq!(gate.ensure_unlocked(), Err(GateError::Locked));
        assert_eq!(gate.try_unlock("0000"), Err(GateError::WrongPin));
        // repeated failures never lock out
        assert_eq!(gate.try_unlock("0001"), Err(GateError::WrongPin));
        assert!(gate.try_unlock("1234").is_ok());
        assert!(gate.is_unlocked());
        gate.lock();
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn test_set_pin_requires_unlock() {
        let mut gate = PinGate::new("1234");
        assert_eq!(gate.set_pin("9999"), Err(GateError::Locked));
        gate.try_unlock("1234").unwrap();
        gate.set_pin(" 9999 ").unwrap();
        assert_eq!(gate.pin(), "9999");
        gate.lock();
        assert!(gate.try_unlock("9999").is_ok());
    }
}
