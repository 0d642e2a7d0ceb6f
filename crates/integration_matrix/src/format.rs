//! Serialization formats a generated test can be built for.
//!
//! The set is closed.  Every per-format decision in the pipeline is an exhaustive match on [SerFormat], so adding a
//! format without teaching the pipeline about it is a compile error rather than a silent default.
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum SerFormat {
    #[display(fmt = "avro")]
    Avro,
    #[display(fmt = "cbor")]
    Cbor,
    #[display(fmt = "json")]
    Json,
    #[display(fmt = "proto2")]
    Proto2,
    #[display(fmt = "proto3")]
    Proto3,
}

/// How library types are produced from the schemas of a format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum TypeStrategy {
    /// One `avrogen` run per `.avsc` file.
    #[display(fmt = "avro")]
    Avro,

    /// One type generator run per `.schema.json` file.  CBOR reuses the JSON schema tooling.
    #[display(fmt = "json-schema")]
    JsonSchema,

    /// One `protoc` run per `.proto` file, plus one for the shared options file.
    #[display(fmt = "protobuf")]
    Protobuf,
}

impl SerFormat {
    pub const ALL: [SerFormat; 5] = [
        SerFormat::Avro,
        SerFormat::Cbor,
        SerFormat::Json,
        SerFormat::Proto2,
        SerFormat::Proto3,
    ];

    /// The lowercase name, as used in model ids and namespaces.
    pub fn as_str(&self) -> &'static str {
        match self {
            SerFormat::Avro => "avro",
            SerFormat::Cbor => "cbor",
            SerFormat::Json => "json",
            SerFormat::Proto2 => "proto2",
            SerFormat::Proto3 => "proto3",
        }
    }

    /// First letter upper-cased, the rest lower-cased: `Json`, `Proto3`.
    pub fn capitalized(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Folder under the shared serializer root holding the pre-built serializers for this format.
    pub fn serializer_folder(&self) -> &'static str {
        match self {
            SerFormat::Avro => "AVRO",
            SerFormat::Cbor => "CBOR",
            SerFormat::Json => "JSON",
            SerFormat::Proto2 | SerFormat::Proto3 => "protobuf",
        }
    }

    pub fn type_strategy(&self) -> TypeStrategy {
        match self {
            SerFormat::Avro => TypeStrategy::Avro,
            SerFormat::Json | SerFormat::Cbor => TypeStrategy::JsonSchema,
            SerFormat::Proto2 | SerFormat::Proto3 => TypeStrategy::Protobuf,
        }
    }
}

impl std::str::FromStr for SerFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SerFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownFormat(s.to_string()))
    }
}
