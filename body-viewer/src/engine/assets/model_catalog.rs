use constants::model_catalog::model_file;
use serde::{Deserialize, Serialize};

/// Which body the model shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    Male,
    Female,
}

impl Subject {
    /// Convert string identifier to subject for RPC and query compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" | "man" => Some(Self::Male),
            "female" | "woman" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

/// How the model surface is rendered: plain skin or colour-coded regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Normal,
    Colored,
}

impl Variant {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" | "skin" | "flesh" => Some(Self::Normal),
            "colored" | "coloured" | "color" | "colour" => Some(Self::Colored),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Colored => "colored",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Colored,
            Self::Colored => Self::Normal,
        }
    }
}

/// The active subject and variant pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelSelection {
    pub subject: Subject,
    pub variant: Variant,
}

impl ModelSelection {
    pub fn new(subject: Subject, variant: Variant) -> Self {
        Self { subject, variant }
    }

    /// Model file for this combination, relative to the asset root.
    pub fn file(&self) -> Option<&'static str> {
        model_file(self.subject.as_str(), self.variant.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_combination_has_a_model_file() {
        for subject in [Subject::Male, Subject::Female] {
            for variant in [Variant::Normal, Variant::Colored] {
                assert!(
                    ModelSelection::new(subject, variant).file().is_some(),
                    "missing file for {subject:?}/{variant:?}"
                );
            }
        }
    }

    #[test]
    fn male_files_match_published_assets() {
        let normal = ModelSelection::new(Subject::Male, Variant::Normal);
        let colored = ModelSelection::new(Subject::Male, Variant::Colored);
        assert_eq!(normal.file(), Some("man_normal.glb"));
        assert_eq!(colored.file(), Some("man_colored.glb"));
    }

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(Subject::Female.toggled().toggled(), Subject::Female);
        assert_eq!(Variant::Normal.toggled(), Variant::Colored);
        assert_eq!(Variant::Colored.toggled(), Variant::Normal);
    }

    #[test]
    fn parses_button_aliases() {
        assert_eq!(Variant::from_string("Flesh"), Some(Variant::Normal));
        assert_eq!(Variant::from_string("colour"), Some(Variant::Colored));
        assert_eq!(Subject::from_string("WOMAN"), Some(Subject::Female));
        assert_eq!(Subject::from_string("robot"), None);
    }

    #[test]
    fn serializes_lowercase_names() {
        let selection = ModelSelection::new(Subject::Female, Variant::Colored);
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"subject":"female","variant":"colored"}"#);
    }
}
