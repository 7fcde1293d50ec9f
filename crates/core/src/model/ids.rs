use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing an identifier from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    input: String,
}

impl ParseIdError {
    fn new(kind: &'static str, input: &str) -> Self {
        Self {
            kind,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseIdError {}

//
// ─── STAGE ID ──────────────────────────────────────────────────────────────────
//

/// Identifier for a curriculum stage.
///
/// The curriculum is a closed set, so stage ids are an enumeration rather
/// than free-form strings. Invalid ids fail at parse time instead of
/// surfacing as "not found" deep inside progression logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    Foundations,
    ArchitectureMessages,
    AdvancedPatterns,
    BuildingDebugging,
    Mastery,
}

impl StageId {
    /// All stages in canonical sequence order.
    pub const ALL: [StageId; 5] = [
        StageId::Foundations,
        StageId::ArchitectureMessages,
        StageId::AdvancedPatterns,
        StageId::BuildingDebugging,
        StageId::Mastery,
    ];

    /// Returns the wire form of the id (kebab-case).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Foundations => "foundations",
            StageId::ArchitectureMessages => "architecture-messages",
            StageId::AdvancedPatterns => "advanced-patterns",
            StageId::BuildingDebugging => "building-debugging",
            StageId::Mastery => "mastery",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseIdError::new("StageId", s))
    }
}

//
// ─── MODULE ID ─────────────────────────────────────────────────────────────────
//

/// Identifier for a lesson module, formatted as `{stage-id}-{index}`.
///
/// Constructed from its parts, so a `ModuleId` always names a real stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    stage: StageId,
    index: u32,
}

impl ModuleId {
    /// Creates a module id for the given stage and 1-based index.
    #[must_use]
    pub fn new(stage: StageId, index: u32) -> Self {
        Self { stage, index }
    }

    /// Returns the stage this module belongs to.
    #[must_use]
    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// Returns the 1-based index of the module within its stage.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stage, self.index)
    }
}

impl FromStr for ModuleId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Stage ids themselves contain '-', so match on the known prefixes.
        for stage in StageId::ALL {
            let prefix = stage.as_str();
            if let Some(rest) = s.strip_prefix(prefix) {
                if let Some(index) = rest.strip_prefix('-') {
                    if let Ok(index) = index.parse::<u32>() {
                        return Ok(ModuleId::new(stage, index));
                    }
                }
            }
        }
        Err(ParseIdError::new("ModuleId", s))
    }
}

// Module ids are used as JSON map keys, so they serialize as strings.
impl Serialize for ModuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

//
// ─── CONCEPT ID ────────────────────────────────────────────────────────────────
//

/// Validated identifier for a curriculum concept tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(String);

impl ConceptId {
    /// Creates a concept id from a non-empty tag.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the tag is empty or padded with whitespace.
    pub fn new(tag: impl Into<String>) -> Result<Self, ParseIdError> {
        let tag = tag.into();
        if tag.is_empty() || tag.trim() != tag {
            return Err(ParseIdError::new("ConceptId", &tag));
        }
        Ok(Self(tag))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ConceptId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConceptId::new(s)
    }
}

//
// ─── QUESTION ID ───────────────────────────────────────────────────────────────
//

/// Opaque identifier for a quiz question.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a question id from a non-empty string.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the string is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ParseIdError::new("QuestionId", &id));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── UUID-BACKED IDS ───────────────────────────────────────────────────────────
//

/// Unique identifier for a quiz attempt.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Generates a fresh attempt id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier for a learner session, generated once at session start.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier for a feedback entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedbackId(Uuid);

impl FeedbackId {
    /// Generates a fresh feedback id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Debug for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedbackId({})", self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_id_display() {
        assert_eq!(StageId::ArchitectureMessages.to_string(), "architecture-messages");
        assert_eq!(StageId::Foundations.to_string(), "foundations");
    }

    #[test]
    fn test_stage_id_from_str() {
        let id: StageId = "building-debugging".parse().unwrap();
        assert_eq!(id, StageId::BuildingDebugging);
    }

    #[test]
    fn test_stage_id_from_str_invalid() {
        assert!("not-a-stage".parse::<StageId>().is_err());
    }

    #[test]
    fn test_stage_id_all_in_order() {
        assert_eq!(StageId::ALL.len(), 5);
        assert_eq!(StageId::ALL[0], StageId::Foundations);
        assert_eq!(StageId::ALL[4], StageId::Mastery);
    }

    #[test]
    fn test_module_id_roundtrip() {
        let id = ModuleId::new(StageId::AdvancedPatterns, 2);
        assert_eq!(id.to_string(), "advanced-patterns-2");
        let parsed: ModuleId = "advanced-patterns-2".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_module_id_from_str_rejects_bad_stage() {
        assert!("unknown-stage-1".parse::<ModuleId>().is_err());
        assert!("foundations".parse::<ModuleId>().is_err());
        assert!("foundations-x".parse::<ModuleId>().is_err());
    }

    #[test]
    fn test_module_id_serializes_as_string() {
        let id = ModuleId::new(StageId::Foundations, 1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"foundations-1\"");
        let back: ModuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_concept_id_rejects_empty() {
        assert!(ConceptId::new("").is_err());
        assert!(ConceptId::new(" padded ").is_err());
        assert!(ConceptId::new("json-rpc").is_ok());
    }

    #[test]
    fn test_attempt_ids_are_unique() {
        assert_ne!(AttemptId::generate(), AttemptId::generate());
    }

    #[test]
    fn test_stage_id_serde_kebab_case() {
        let json = serde_json::to_string(&StageId::BuildingDebugging).unwrap();
        assert_eq!(json, "\"building-debugging\"");
    }
}
