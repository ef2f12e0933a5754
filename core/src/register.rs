//! Register references: `M17`, `Y12`, `D100`, `T3`, `C8`, ...

use crate::error::ClientError;

/// The closed set of PLC register classes this gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    /// `S` — state register.
    State,
    /// `X` — input.
    Input,
    /// `Y` — output.
    Output,
    /// `T` — timer.
    Timer,
    /// `M` — memory (internal relay).
    Memory,
    /// `D` — data register.
    Data,
    /// `C` — counter.
    Counter,
}

impl RegisterClass {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'S' => Some(Self::State),
            'X' => Some(Self::Input),
            'Y' => Some(Self::Output),
            'T' => Some(Self::Timer),
            'M' => Some(Self::Memory),
            'D' => Some(Self::Data),
            'C' => Some(Self::Counter),
            _ => None,
        }
    }

    /// The canonical letter this class is written with.
    pub fn letter(self) -> char {
        match self {
            Self::State => 'S',
            Self::Input => 'X',
            Self::Output => 'Y',
            Self::Timer => 'T',
            Self::Memory => 'M',
            Self::Data => 'D',
            Self::Counter => 'C',
        }
    }
}

/// A parsed register reference: a class plus a non-negative index.
///
/// Textual form is the class letter followed by a decimal index, e.g.
/// `D100`, `Y12`. Parsing accepts a lowercase class letter (the original
/// implementation upper-cases its input before matching) but is otherwise
/// strict: exactly one letter prefix from the closed class set, the
/// remainder must parse as a non-negative decimal integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterRef {
    pub class: RegisterClass,
    pub index: u32,
}

impl RegisterRef {
    pub fn new(class: RegisterClass, index: u32) -> Self {
        Self { class, index }
    }

    /// Parse a register reference such as `"D100"` or `"y12"`.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let mut chars = text.chars();
        let letter = chars.next().ok_or(ClientError::InvalidRegister)?;
        let class = RegisterClass::from_letter(letter.to_ascii_uppercase())
            .ok_or(ClientError::InvalidRegister)?;
        let rest = chars.as_str();
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClientError::InvalidRegister);
        }
        let index: u32 = rest.parse().map_err(|_| ClientError::InvalidRegister)?;
        Ok(Self { class, index })
    }
}

impl std::fmt::Display for RegisterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.class.letter(), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_classes() {
        for (text, class, index) in [
            ("S0", RegisterClass::State, 0),
            ("X10", RegisterClass::Input, 10),
            ("Y12", RegisterClass::Output, 12),
            ("T3", RegisterClass::Timer, 3),
            ("M17", RegisterClass::Memory, 17),
            ("D100", RegisterClass::Data, 100),
            ("C8", RegisterClass::Counter, 8),
        ] {
            let r = RegisterRef::parse(text).unwrap();
            assert_eq!(r.class, class);
            assert_eq!(r.index, index);
        }
    }

    #[test]
    fn accepts_lowercase_class_letter() {
        let r = RegisterRef::parse("d100").unwrap();
        assert_eq!(r.class, RegisterClass::Data);
        assert_eq!(r.index, 100);
    }

    #[test]
    fn rejects_unknown_class() {
        assert!(RegisterRef::parse("Z1").is_err());
    }

    #[test]
    fn rejects_missing_index() {
        assert!(RegisterRef::parse("D").is_err());
    }

    #[test]
    fn rejects_non_decimal_index() {
        assert!(RegisterRef::parse("D1a").is_err());
        assert!(RegisterRef::parse("D-1").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let r = RegisterRef::new(RegisterClass::Memory, 17);
        assert_eq!(RegisterRef::parse(&r.to_string()).unwrap(), r);
    }
}
