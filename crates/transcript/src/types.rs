use serde::{Deserialize, Serialize};

/// Speaker role attached to a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    /// Text seen before the first recognized header
    Unlabeled,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Unlabeled => "unlabeled",
        }
    }

    /// True for `User` and `Assistant`
    #[must_use]
    pub const fn is_labeled(self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

/// One speaker's contiguous utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// How a transcript was split into turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStrategy {
    /// At least one role header was recognized
    HeaderLabeled,

    /// No headers anywhere: blank-line blocks with alternating roles
    Alternation,
}

impl SegmentationStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeaderLabeled => "header_labeled",
            Self::Alternation => "alternation",
        }
    }
}

/// Turn sequence tagged with the strategy that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub strategy: SegmentationStrategy,
    pub turns: Vec<Turn>,
}

impl Segmentation {
    #[must_use]
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|turn| turn.role == role).count()
    }
}

/// A (user, assistant) unit that scoring operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// 1-based position in conversational order
    pub index: usize,
    pub user: String,
    pub assistant: String,
}

impl Pair {
    #[must_use]
    pub fn new(index: usize, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            index,
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}
