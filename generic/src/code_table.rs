//! Valid-code table: maps a debounced 3-bit raw code to a decoded phase.

use serde::{Deserialize, Serialize};

use crate::encoder_error::EncoderError;

/// Number of distinct raw codes three lines can produce.
pub const CODE_COUNT: usize = 8;

/// Decoded logical state: index of the code in the table's phase cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phase(u8);

impl Phase {
    pub const fn new(index: u8) -> Self {
        Phase(index)
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

/// How two consecutive committed phases relate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseStep {
    Hold,
    Forward,
    Reverse,
    /// Jumped more than one phase; the direction cannot be told.
    Skip,
}

impl PhaseStep {
    pub fn reversed(self) -> Self {
        match self {
            PhaseStep::Forward => PhaseStep::Reverse,
            PhaseStep::Reverse => PhaseStep::Forward,
            other => other,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodeTable {
    phases: [Option<Phase>; CODE_COUNT],
    cycle_len: u8,
}

impl CodeTable {
    /// Three lines 120 degrees apart. Phase order (A B C):
    /// `100 -> 110 -> 010 -> 011 -> 001 -> 101`. `000` and `111` never occur
    /// on a healthy encoder.
    pub const THREE_PHASE: CodeTable = CodeTable {
        phases: [
            None,                 // 000
            Some(Phase::new(4)),  // 001
            Some(Phase::new(2)),  // 010
            Some(Phase::new(3)),  // 011
            Some(Phase::new(0)),  // 100
            Some(Phase::new(5)),  // 101
            Some(Phase::new(1)),  // 110
            None,                 // 111
        ],
        cycle_len: 6,
    };

    /// Build a table from raw codes listed in phase order.
    ///
    /// At least three codes are needed to tell direction; every code must fit
    /// in three bits and appear once.
    pub fn from_sequence(codes: &[u8]) -> Result<Self, EncoderError> {
        if codes.len() < 3 || codes.len() > CODE_COUNT {
            return Err(EncoderError::InvalidCodeTable);
        }

        let mut phases = [None; CODE_COUNT];
        for (index, code) in codes.iter().enumerate() {
            let slot = phases.get_mut(*code as usize).ok_or(EncoderError::InvalidCodeTable)?;
            if slot.is_some() {
                return Err(EncoderError::InvalidCodeTable);
            }
            *slot = Some(Phase::new(index as u8));
        }

        Ok(Self { phases, cycle_len: codes.len() as u8 })
    }

    pub fn decode(&self, raw: u8) -> Option<Phase> {
        self.phases.get(raw as usize).copied().flatten()
    }

    pub fn is_valid(&self, raw: u8) -> bool {
        self.decode(raw).is_some()
    }

    pub fn cycle_len(&self) -> u8 {
        self.cycle_len
    }

    /// Classify the move between two phases. Indices are taken modulo the
    /// cycle length.
    pub fn step(&self, from: Phase, to: Phase) -> PhaseStep {
        let n = self.cycle_len;
        let delta = (to.0 % n + n - from.0 % n) % n;
        if delta == 0 {
            PhaseStep::Hold
        } else if delta == 1 {
            PhaseStep::Forward
        } else if delta == n - 1 {
            PhaseStep::Reverse
        } else {
            PhaseStep::Skip
        }
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::THREE_PHASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_phase_codes() {
        let table = CodeTable::THREE_PHASE;
        assert_eq!(table.decode(0b100), Some(Phase::new(0)));
        assert_eq!(table.decode(0b110), Some(Phase::new(1)));
        assert_eq!(table.decode(0b101), Some(Phase::new(5)));
        assert!(!table.is_valid(0b000));
        assert!(!table.is_valid(0b111));
        assert_eq!(table.decode(0b1000), None);
    }

    #[test]
    fn test_three_phase_matches_sequence_builder() {
        let built = CodeTable::from_sequence(&[0b100, 0b110, 0b010, 0b011, 0b001, 0b101]);
        assert_eq!(built, Ok(CodeTable::THREE_PHASE));
    }

    #[test]
    fn test_steps_wrap_around() {
        let table = CodeTable::THREE_PHASE;
        assert_eq!(table.step(Phase::new(5), Phase::new(0)), PhaseStep::Forward);
        assert_eq!(table.step(Phase::new(0), Phase::new(5)), PhaseStep::Reverse);
        assert_eq!(table.step(Phase::new(2), Phase::new(2)), PhaseStep::Hold);
        assert_eq!(table.step(Phase::new(0), Phase::new(3)), PhaseStep::Skip);
        assert_eq!(table.step(Phase::new(1), Phase::new(3)), PhaseStep::Skip);
    }

    #[test]
    fn test_step_accepts_out_of_cycle_phases() {
        let table = CodeTable::THREE_PHASE;
        // 200 % 6 == 2
        assert_eq!(table.step(Phase::new(200), Phase::new(0)), PhaseStep::Skip);
        assert_eq!(table.step(Phase::new(200), Phase::new(3)), PhaseStep::Forward);
        assert_eq!(table.step(Phase::new(0), Phase::new(255)), PhaseStep::Skip);
        assert_eq!(table.step(Phase::new(11), Phase::new(0)), PhaseStep::Forward);
    }

    #[test]
    fn test_rejects_malformed_sequences() {
        assert_eq!(CodeTable::from_sequence(&[0b00, 0b01]), Err(EncoderError::InvalidCodeTable));
        assert_eq!(
            CodeTable::from_sequence(&[0b000, 0b001, 0b001]),
            Err(EncoderError::InvalidCodeTable)
        );
        assert_eq!(
            CodeTable::from_sequence(&[0b000, 0b001, 0b1000]),
            Err(EncoderError::InvalidCodeTable)
        );
    }

    #[test]
    fn test_gray_code_table() {
        // A/B quadrature with C tied low
        let table = CodeTable::from_sequence(&[0b000, 0b100, 0b110, 0b010]).unwrap();
        assert_eq!(table.cycle_len(), 4);
        assert_eq!(table.step(Phase::new(3), Phase::new(0)), PhaseStep::Forward);
        assert!(!table.is_valid(0b001));
    }
}
