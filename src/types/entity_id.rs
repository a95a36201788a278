use std::{fmt, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable key for a candidate organization.
/// Keeps the source text (with leading zeros) but avoids repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId(Arc<str>);

/// Stable key for a field agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(Arc<str>);

macro_rules! impl_entity_id {
    ($ty:ident) => {
        impl $ty {
            #[inline] pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self { Self::new(id) }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self { Self(Arc::from(id)) }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

impl_entity_id!(CandidateId);
impl_entity_id!(AgentId);
