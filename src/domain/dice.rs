use core::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::errors::EngineError;

/// Число граней одной кости.
pub const DIE_FACES: u8 = 6;

/// Символы граней для текстового вывода.
const FACE_GLYPHS: [char; 6] = ['⚀', '⚁', '⚂', '⚃', '⚄', '⚅'];

/// Бросок трёх костей в порядке выпадения. Каждое значение 1..=6.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "[u8; 3]")]
pub struct Dice(pub(crate) [u8; 3]);

impl Dice {
    /// Собрать бросок из внешних значений (с проверкой диапазона).
    pub fn new(values: [u8; 3]) -> Result<Self, EngineError> {
        if let Some(bad) = values.iter().copied().find(|v| !(1..=DIE_FACES).contains(v)) {
            return Err(EngineError::InvalidDice(bad));
        }
        Ok(Dice(values))
    }

    pub fn values(&self) -> [u8; 3] {
        self.0
    }

    /// Значения по возрастанию – вход для оценки руки.
    pub fn sorted(&self) -> [u8; 3] {
        let mut d = self.0;
        d.sort_unstable();
        d
    }
}

impl TryFrom<[u8; 3]> for Dice {
    type Error = EngineError;

    fn try_from(values: [u8; 3]) -> Result<Self, Self::Error> {
        Dice::new(values)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        let glyph = |v: u8| FACE_GLYPHS[usize::from(v - 1)];
        write!(f, "{} {} {}", glyph(a), glyph(b), glyph(c))
    }
}
