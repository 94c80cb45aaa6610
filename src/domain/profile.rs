//! Domain profiles.
//!
//! The same pipeline is deployed for different audiences (music creators,
//! AI research readers, ...). A profile names the audience and the content
//! categories items are sorted into.

use serde::{Deserialize, Serialize};

use super::content::ModelError;

/// A content category and the keywords that place an item in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

impl Category {
    /// Whether any of the category keywords occurs in the (lower-cased) text
    pub fn matches(&self, text_lower: &str) -> bool {
        self.keywords.iter().any(|kw| text_lower.contains(kw))
    }
}

const GENERAL_CATEGORIES: &[Category] = &[
    Category {
        name: "technology",
        keywords: &["software", "programming", "developer", "computer", "code"],
    },
    Category {
        name: "business",
        keywords: &["startup", "market", "revenue", "company", "business"],
    },
    Category {
        name: "education",
        keywords: &["tutorial", "course", "learn", "lesson", "guide"],
    },
    Category {
        name: "entertainment",
        keywords: &["movie", "game", "show", "series", "comedy"],
    },
];

const MUSIC_CATEGORIES: &[Category] = &[
    Category {
        name: "production",
        keywords: &["production", "producer", "beat", "daw", "sample"],
    },
    Category {
        name: "mixing",
        keywords: &["mixing", "mastering", "eq", "compressor", "reverb"],
    },
    Category {
        name: "theory",
        keywords: &["chord", "scale", "harmony", "melody", "rhythm"],
    },
    Category {
        name: "gear",
        keywords: &["synth", "guitar", "microphone", "interface", "plugin"],
    },
    Category {
        name: "performance",
        keywords: &["live", "concert", "tour", "dj set", "gig"],
    },
];

const RESEARCH_CATEGORIES: &[Category] = &[
    Category {
        name: "agents",
        keywords: &["agent", "autonomous", "tool use", "planning"],
    },
    Category {
        name: "models",
        keywords: &["llm", "transformer", "language model", "fine-tun", "weights"],
    },
    Category {
        name: "evaluation",
        keywords: &["benchmark", "evaluation", "eval", "leaderboard"],
    },
    Category {
        name: "papers",
        keywords: &["arxiv", "paper", "preprint", "abstract"],
    },
    Category {
        name: "safety",
        keywords: &["alignment", "safety", "interpretability", "red team"],
    },
];

/// Audience profile the pipeline is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    General,
    Music,
    Research,
}

impl Domain {
    pub fn name(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Music => "music",
            Domain::Research => "research",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Domain::General => "General purpose content extraction",
            Domain::Music => "Music creation and audio content optimization",
            Domain::Research => "AI agent research and academic content optimization",
        }
    }

    /// Categories in their canonical order
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Domain::General => GENERAL_CATEGORIES,
            Domain::Music => MUSIC_CATEGORIES,
            Domain::Research => RESEARCH_CATEGORIES,
        }
    }

    /// Names of the categories matching `text`, in canonical order
    pub fn categorize(&self, text: &str) -> Vec<&'static str> {
        let text_lower = text.to_lowercase();
        self.categories()
            .iter()
            .filter(|c| c.matches(&text_lower))
            .map(|c| c.name)
            .collect()
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Domain {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Domain::General),
            "music" => Ok(Domain::Music),
            "research" => Ok(Domain::Research),
            _ => Err(ModelError::UnknownDomain(s.to_string())),
        }
    }
}
