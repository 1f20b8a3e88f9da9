use std::collections::VecDeque;

use rand::Rng;

use crate::engine::DiceSource;

/// Системный RNG: равномерная кость через `thread_rng`, без seed/реплея.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl DiceSource for SystemRng {
    fn roll_die(&mut self) -> u8 {
        rand::thread_rng().gen_range(1..=6)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Детерминированный RNG для тестов и dev-CLI.
/// Одинаковый seed – одинаковая последовательность бросков.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: rand::rngs::StdRng,
}

impl DeterministicRng {
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            inner: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceSource for DeterministicRng {
    fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }
}

/// Скриптованные кости: отдаёт заранее заданные броски по порядку.
///
/// Когда скрипт кончился, кости падают единицами, а выбор индекса – нулём.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
    picks: VecDeque<usize>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Скрипт из троек в порядке бросков.
    pub fn from_rolls(rolls: &[[u8; 3]]) -> Self {
        let mut s = Self::new();
        for roll in rolls {
            s.push_roll(*roll);
        }
        s
    }

    pub fn push_roll(&mut self, roll: [u8; 3]) -> &mut Self {
        self.faces.extend(roll);
        self
    }

    /// Индексы, которые вернут следующие выборы родителя при ротации.
    pub fn with_picks(mut self, picks: &[usize]) -> Self {
        self.picks.extend(picks.iter().copied());
        self
    }

    pub fn remaining_faces(&self) -> usize {
        self.faces.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        self.faces.pop_front().unwrap_or(1)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        let idx = self.picks.pop_front().unwrap_or(0);
        if len == 0 {
            0
        } else {
            idx.min(len - 1)
        }
    }
}
