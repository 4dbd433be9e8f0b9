//! Free-form game rolls: N dice of one type plus a flat modifier

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::Result;

const MAX_DICE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DiceType {
    pub fn sides(&self) -> u32 {
        match self {
            DiceType::D4 => 4,
            DiceType::D6 => 6,
            DiceType::D8 => 8,
            DiceType::D10 => 10,
            DiceType::D12 => 12,
            DiceType::D20 => 20,
            DiceType::D100 => 100,
        }
    }
}

impl std::fmt::Display for DiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl std::str::FromStr for DiceType {
    type Err = OracleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d4" => Ok(DiceType::D4),
            "d6" => Ok(DiceType::D6),
            "d8" => Ok(DiceType::D8),
            "d10" => Ok(DiceType::D10),
            "d12" => Ok(DiceType::D12),
            "d20" => Ok(DiceType::D20),
            "d100" => Ok(DiceType::D100),
            _ => Err(OracleError::UnknownDice(s.to_string())),
        }
    }
}

/// A validated roll request; only [`GameRoll::new`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameRoll {
    count: u32,
    sides: DiceType,
    modifier: i32,
}

impl GameRoll {
    pub fn new(count: u32, sides: DiceType, modifier: i32) -> Result<Self> {
        if count == 0 || count > MAX_DICE {
            return Err(OracleError::InvalidCount {
                count,
                max: MAX_DICE,
            });
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sides(&self) -> DiceType {
        self.sides
    }

    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// `"3d6"`, `"3d6+2"`, `"1d20-1"`
    pub fn notation(&self) -> String {
        match self.modifier {
            0 => format!("{}{}", self.count, self.sides),
            m if m > 0 => format!("{}{}+{}", self.count, self.sides, m),
            m => format!("{}{}-{}", self.count, self.sides, m.unsigned_abs()),
        }
    }

    pub fn roll(&self) -> GameRollResult {
        let mut rng = rand::rng();
        let sides = self.sides.sides();
        let results = (0..self.count)
            .map(|_| rng.random_range(1..=sides))
            .collect();

        GameRollResult {
            roll: *self,
            results,
        }
    }

    pub fn with_results(&self, results: Vec<u32>) -> GameRollResult {
        GameRollResult {
            roll: *self,
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRollResult {
    pub roll: GameRoll,
    pub results: Vec<u32>,
}

impl GameRollResult {
    pub fn sum(&self) -> i64 {
        self.results.iter().map(|r| i64::from(*r)).sum()
    }

    pub fn total(&self) -> i64 {
        self.sum() + i64::from(self.roll.modifier)
    }

    /// `"3 + 5 + 1 - 1 = 8"`
    pub fn details(&self) -> String {
        let mut out = self
            .results
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" + ");

        match self.roll.modifier {
            0 => {}
            m if m > 0 => out.push_str(&format!(" + {m}")),
            m => out.push_str(&format!(" - {}", m.unsigned_abs())),
        }

        out.push_str(&format!(" = {}", self.total()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dice_type_parsing() {
        assert_eq!("d20".parse::<DiceType>().unwrap(), DiceType::D20);
        assert_eq!("D100".parse::<DiceType>().unwrap().sides(), 100);
        assert!("d7".parse::<DiceType>().is_err());
    }

    #[test]
    fn test_count_bounds() {
        assert!(GameRoll::new(0, DiceType::D6, 0).is_err());
        assert!(GameRoll::new(101, DiceType::D6, 0).is_err());
        let max = GameRoll::new(100, DiceType::D6, 0).unwrap();
        assert_eq!(max.count(), 100);
        assert_eq!(max.sides(), DiceType::D6);
        assert_eq!(max.roll().results.len(), 100);
    }

    #[test]
    fn test_details_and_total() {
        let roll = GameRoll::new(3, DiceType::D6, -1).unwrap();
        let result = roll.with_results(vec![3, 5, 1]);
        assert_eq!(result.total(), 8);
        assert_eq!(result.details(), "3 + 5 + 1 - 1 = 8");
        assert_eq!(roll.notation(), "3d6-1");

        let plain = GameRoll::new(1, DiceType::D20, 0).unwrap().with_results(vec![17]);
        assert_eq!(plain.details(), "17 = 17");
        assert_eq!(plain.roll.notation(), "1d20");
    }

    #[test]
    fn test_roll_ranges() {
        let roll = GameRoll::new(50, DiceType::D4, 2).unwrap();
        let result = roll.roll();
        assert_eq!(result.results.len(), 50);
        assert!(result.results.iter().all(|r| (1..=4).contains(r)));
        assert_eq!(result.total(), result.sum() + 2);
    }
}
