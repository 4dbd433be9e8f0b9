//! Oracle lookup tables, indexed by die face

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::Result;

type Table = [&'static str; 6];

/// Die 1 tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Answer {
    #[default]
    Plain,
    Mixed,
}

impl Answer {
    pub const ALL: [Answer; 2] = [Answer::Plain, Answer::Mixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Plain => "Plain",
            Answer::Mixed => "Mixed",
        }
    }

    fn table(&self) -> &'static Table {
        match self {
            Answer::Plain => &["No", "No", "No", "Yes", "Yes", "Yes"],
            Answer::Mixed => &["No", "No", "Mixed or Maybe", "Mixed or Maybe", "Yes", "Yes"],
        }
    }
}

/// Die 2 tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Modifier {
    #[default]
    Wrinkle,
    Certainty,
}

impl Modifier {
    pub const ALL: [Modifier; 2] = [Modifier::Wrinkle, Modifier::Certainty];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Wrinkle => "Wrinkle",
            Modifier::Certainty => "Certainty",
        }
    }

    fn table(&self) -> &'static Table {
        match self {
            Modifier::Wrinkle => &["But", "But", "Plain Answer", "Plain Answer", "And", "And"],
            Modifier::Certainty => &[
                "Uncertain/Very Weak",
                "Some Doubt/Fairly Weak",
                "Average Doubt",
                "Pretty Middling",
                "Fairly Certain/Strong",
                "Very Certain/Very Strong",
            ],
        }
    }
}

/// Die 3 tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Focus {
    #[default]
    Activity,
    Advantage,
    Attention,
    Disposition,
    Impression,
    Progress,
    Safety,
    Supernatural,
    Utility,
    Value,
    Weird,
    #[serde(rename = "YOUR CHOICE")]
    YourChoice,
}

impl Focus {
    pub const ALL: [Focus; 12] = [
        Focus::Activity,
        Focus::Advantage,
        Focus::Attention,
        Focus::Disposition,
        Focus::Impression,
        Focus::Progress,
        Focus::Safety,
        Focus::Supernatural,
        Focus::Utility,
        Focus::Value,
        Focus::Weird,
        Focus::YourChoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Activity => "Activity",
            Focus::Advantage => "Advantage",
            Focus::Attention => "Attention",
            Focus::Disposition => "Disposition",
            Focus::Impression => "Impression",
            Focus::Progress => "Progress",
            Focus::Safety => "Safety",
            Focus::Supernatural => "Supernatural",
            Focus::Utility => "Utility",
            Focus::Value => "Value",
            Focus::Weird => "Weird",
            Focus::YourChoice => "YOUR CHOICE",
        }
    }

    fn table(&self) -> &'static Table {
        match self {
            Focus::Activity => &["None", "Low", "Moderate", "Moderate", "High", "Very High"],
            Focus::Advantage => &[
                "Very Disadvantageous",
                "Disadvantageous",
                "Neutral",
                "Neutral",
                "Advantageous",
                "Very Advantageous",
            ],
            Focus::Attention => &[
                "Completely Ignored",
                "Overlooked",
                "Normal Notice",
                "Normal Notice",
                "Extra Attention",
                "Completely Noticed",
            ],
            Focus::Disposition => &[
                "Hostile",
                "Unfriendly",
                "Neutral",
                "Neutral",
                "Friendly",
                "Very Friendly",
            ],
            Focus::Impression => &[
                "Very Negative",
                "Negative",
                "Neutral",
                "Neutral",
                "Positive",
                "Very Positive",
            ],
            Focus::Progress => &[
                "Major Setback",
                "Minor Setback",
                "As Expected",
                "As Expected",
                "Extra Progress",
                "Breakthrough",
            ],
            Focus::Safety => &[
                "Very Dangerous",
                "Dangerous",
                "Normal Risk",
                "Normal Risk",
                "Safe",
                "Very Safe",
            ],
            Focus::Supernatural => &["None", "Trace", "Low", "Modest", "Strong", "Overwhelming"],
            Focus::Utility => &[
                "Useless",
                "Limited Use",
                "Somewhat Useful",
                "Somewhat Useful",
                "Very Useful",
                "Essential",
            ],
            Focus::Value => &[
                "Worthless",
                "Low Value",
                "Average",
                "Average",
                "Valuable",
                "Priceless",
            ],
            Focus::Weird => &[
                "Very Mundane",
                "Normal",
                "Notable",
                "Slightly Odd",
                "Strange",
                "Very Weird",
            ],
            Focus::YourChoice => &[
                "None/Complete Opposite",
                "Little/Opposite",
                "Weak/Mildly Contrary",
                "Average/Modest",
                "Notable/Strong",
                "Extreme/Overwhelming",
            ],
        }
    }
}

macro_rules! impl_table_names {
    ($($ty:ident),*) => {$(
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = OracleError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| OracleError::UnknownTable(s.to_string()))
            }
        }
    )*};
}

impl_table_names!(Answer, Modifier, Focus);

/// Which table each die reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OracleSelection {
    pub answer: Answer,
    pub modifier: Modifier,
    pub focus: Focus,
}

fn lookup(table: &'static Table, face: u8) -> Result<&'static str> {
    match face {
        1..=6 => Ok(table[usize::from(face - 1)]),
        _ => Err(OracleError::InvalidFace(face)),
    }
}

/// `"{answer} ({modifier}) [{focus}]"` for the three faces.
pub fn interpret(faces: [u8; 3], selection: &OracleSelection) -> Result<String> {
    let answer = lookup(selection.answer.table(), faces[0])?;
    let modifier = lookup(selection.modifier.table(), faces[1])?;
    let focus = lookup(selection.focus.table(), faces[2])?;
    Ok(format!("{answer} ({modifier}) [{focus}]"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleRoll {
    pub faces: [u8; 3],
    pub interpretation: String,
}

impl OracleRoll {
    pub fn roll(selection: &OracleSelection) -> Self {
        let mut rng = rand::rng();
        let faces = [
            rng.random_range(1..=6u8),
            rng.random_range(1..=6u8),
            rng.random_range(1..=6u8),
        ];

        // Faces come from 1..=6, so interpretation cannot fail
        let interpretation = interpret(faces, selection).unwrap_or_default();
        tracing::debug!(?faces, %interpretation, "Oracle roll");

        Self {
            faces,
            interpretation,
        }
    }

    pub fn from_faces(faces: [u8; 3], selection: &OracleSelection) -> Result<Self> {
        Ok(Self {
            faces,
            interpretation: interpret(faces, selection)?,
        })
    }

    /// All three dice show the same face
    pub fn is_triple(&self) -> bool {
        self.faces[0] == self.faces[1] && self.faces[1] == self.faces[2]
    }

    /// `"4, 2, 6"`
    pub fn faces_display(&self) -> String {
        self.faces
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_default_tables() {
        let selection = OracleSelection::default();
        assert_eq!(
            interpret([4, 2, 6], &selection).unwrap(),
            "Yes (But) [Very High]"
        );
        assert_eq!(
            interpret([1, 3, 1], &selection).unwrap(),
            "No (Plain Answer) [None]"
        );
    }

    #[test]
    fn test_interpret_other_tables() {
        let selection = OracleSelection {
            answer: Answer::Mixed,
            modifier: Modifier::Certainty,
            focus: Focus::YourChoice,
        };
        assert_eq!(
            interpret([3, 6, 4], &selection).unwrap(),
            "Mixed or Maybe (Very Certain/Very Strong) [Average/Modest]"
        );
    }

    #[test]
    fn test_invalid_faces() {
        let selection = OracleSelection::default();
        assert_eq!(interpret([0, 1, 1], &selection), Err(OracleError::InvalidFace(0)));
        assert_eq!(interpret([1, 1, 7], &selection), Err(OracleError::InvalidFace(7)));
    }

    #[test]
    fn test_every_table_has_six_faces() {
        for focus in Focus::ALL {
            for face in 1..=6 {
                assert!(!lookup(focus.table(), face).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_table_names() {
        assert_eq!("your choice".parse::<Focus>().unwrap(), Focus::YourChoice);
        assert_eq!("Certainty".parse::<Modifier>().unwrap(), Modifier::Certainty);
        assert_eq!(Focus::Supernatural.to_string(), "Supernatural");
        assert!("Luck".parse::<Focus>().is_err());

        let json = serde_json::to_string(&Focus::YourChoice).unwrap();
        assert_eq!(json, "\"YOUR CHOICE\"");
    }

    #[test]
    fn test_roll_stays_on_the_dice() {
        let selection = OracleSelection::default();
        for _ in 0..200 {
            let roll = OracleRoll::roll(&selection);
            assert!(roll.faces.iter().all(|f| (1..=6).contains(f)));
            assert_eq!(roll.interpretation, interpret(roll.faces, &selection).unwrap());
        }
    }

    #[test]
    fn test_triple() {
        let selection = OracleSelection::default();
        assert!(OracleRoll::from_faces([5, 5, 5], &selection).unwrap().is_triple());
        let roll = OracleRoll::from_faces([4, 2, 6], &selection).unwrap();
        assert!(!roll.is_triple());
        assert_eq!(roll.faces_display(), "4, 2, 6");
    }
}
