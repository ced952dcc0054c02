//! Candidate definitions

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RaffleError, RaffleResult};

/// Candidate identity
///
/// Always serialized as a string. Deserialization also accepts JSON numbers,
/// since older records stored the generated set with numeric ids. Floats are
/// accepted only with an integral value (`7.0` reads as `"7"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for CandidateId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for CandidateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

/// Largest float below which every integer is exact
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

impl<'de> Deserialize<'de> for CandidateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Float(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_FLOAT => {
                Self((n as i64).to_string())
            }
            RawId::Float(n) => {
                return Err(serde::de::Error::custom(format!(
                    "candidate id {} is not an integer",
                    n
                )));
            }
        })
    }
}

/// A raffle participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique id within the active set
    pub id: CandidateId,
    /// Display name
    pub name: String,
    /// Image URI (remote avatar, static asset path, or local file URI)
    pub image: String,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
        }
    }
}

/// Find a candidate by id
pub fn find_candidate<'a>(candidates: &'a [Candidate], id: &CandidateId) -> Option<&'a Candidate> {
    candidates.iter().find(|c| &c.id == id)
}

/// Check that a set is usable as the active candidate set:
/// non-empty, with unique ids.
pub fn validate_candidates(candidates: &[Candidate]) -> RaffleResult<()> {
    if candidates.is_empty() {
        return Err(RaffleError::EmptyCandidateSet);
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.insert(&candidate.id) {
            return Err(RaffleError::DuplicateCandidate(candidate.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_reads_as_string() {
        let c: Candidate =
            serde_json::from_str(r#"{"id": 7, "name": "Person 7", "image": "x.png"}"#).unwrap();
        assert_eq!(c.id, CandidateId::from("7"));

        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains(r#""id":"7""#));
    }

    #[test]
    fn test_integral_float_id_reads_as_integer() {
        let c: Candidate =
            serde_json::from_str(r#"{"id": 7.0, "name": "Person 7", "image": "x.png"}"#).unwrap();
        assert_eq!(c.id, CandidateId::from("7"));

        let list: Vec<Candidate> = serde_json::from_str(
            r#"[{"id": 1, "name": "A", "image": ""}, {"id": -2.0, "name": "B", "image": ""}]"#,
        )
        .unwrap();
        assert_eq!(list[1].id.as_str(), "-2");

        for id in ["7.5", "1e300"] {
            let json = format!(r#"{{"id": {}, "name": "X", "image": ""}}"#, id);
            assert!(serde_json::from_str::<Candidate>(&json).is_err(), "{}", id);
        }
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicates() {
        assert_eq!(validate_candidates(&[]), Err(RaffleError::EmptyCandidateSet));

        let dup = vec![
            Candidate::new("a", "A", "a.png"),
            Candidate::new("b", "B", "b.png"),
            Candidate::new("a", "A again", "a2.png"),
        ];
        assert_eq!(
            validate_candidates(&dup),
            Err(RaffleError::DuplicateCandidate("a".into()))
        );

        assert!(validate_candidates(&dup[..2]).is_ok());
    }

    #[test]
    fn test_find_candidate() {
        let set = vec![Candidate::new("a", "A", ""), Candidate::new("b", "B", "")];
        assert_eq!(find_candidate(&set, &"b".into()).map(|c| c.name.as_str()), Some("B"));
        assert!(find_candidate(&set, &"zz".into()).is_none());
    }
}
