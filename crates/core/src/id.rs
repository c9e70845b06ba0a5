// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kind-prefixed resource identifiers.
//!
//! Every persistent resource is addressed by an id of the form
//! `<kind>:<suffix>` where `kind` is one of [`ResourceKind`] and `suffix` is
//! a random nanoid. Ids are fixed-capacity inline buffers so they stay `Copy`
//! and never allocate on the hot paths.

/// Number of random characters in a generated id suffix.
pub const ID_SUFFIX_LEN: usize = 18;

/// Maximum byte length for an inline id.
///
/// The longest kind prefix is `work_item_state:` (16 bytes); generated ids
/// are at most 34 bytes. The buffer leaves headroom for externally supplied
/// suffixes.
pub const ID_MAX_LEN: usize = 40;

/// The kind component of a resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Build,
    Job,
    Step,
    Artifact,
    Repo,
    Commit,
    LegalEntity,
    Identity,
    Runner,
    Credential,
    Secret,
    Group,
    Grant,
    LogDescriptor,
    Event,
    WorkItem,
    WorkItemState,
}

impl ResourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Build => "build",
            ResourceKind::Job => "job",
            ResourceKind::Step => "step",
            ResourceKind::Artifact => "artifact",
            ResourceKind::Repo => "repo",
            ResourceKind::Commit => "commit",
            ResourceKind::LegalEntity => "legal_entity",
            ResourceKind::Identity => "identity",
            ResourceKind::Runner => "runner",
            ResourceKind::Credential => "credential",
            ResourceKind::Secret => "secret",
            ResourceKind::Group => "group",
            ResourceKind::Grant => "grant",
            ResourceKind::LogDescriptor => "log_descriptor",
            ResourceKind::Event => "event",
            ResourceKind::WorkItem => "work_item",
            ResourceKind::WorkItemState => "work_item_state",
        }
    }

    pub fn parse(s: &str) -> Option<ResourceKind> {
        const ALL: [ResourceKind; 17] = [
            ResourceKind::Build,
            ResourceKind::Job,
            ResourceKind::Step,
            ResourceKind::Artifact,
            ResourceKind::Repo,
            ResourceKind::Commit,
            ResourceKind::LegalEntity,
            ResourceKind::Identity,
            ResourceKind::Runner,
            ResourceKind::Credential,
            ResourceKind::Secret,
            ResourceKind::Group,
            ResourceKind::Grant,
            ResourceKind::LogDescriptor,
            ResourceKind::Event,
            ResourceKind::WorkItem,
            ResourceKind::WorkItemState,
        ];
        ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size inline id buffer. Always ≤ [`ID_MAX_LEN`] ASCII bytes, `Copy`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IdBuf {
    len: u8,
    buf: [u8; ID_MAX_LEN],
}

impl std::hash::Hash for IdBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash only the active bytes so it matches str::hash,
        // which is required for Borrow<str> HashMap lookups.
        self.as_str().hash(state);
    }
}

impl IdBuf {
    pub const fn empty() -> Self {
        Self { len: 0, buf: [0; ID_MAX_LEN] }
    }

    pub fn new(s: &str) -> Self {
        debug_assert!(
            s.len() <= ID_MAX_LEN,
            "id exceeds {} bytes ({} bytes): {:?}",
            ID_MAX_LEN,
            s.len(),
            s,
        );
        let len = s.len().min(ID_MAX_LEN);
        let mut buf = [0u8; ID_MAX_LEN];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, buf }
    }

    pub fn as_str(&self) -> &str {
        // Invariant: only constructed from &str, always valid UTF-8.
        match std::str::from_utf8(&self.buf[..self.len as usize]) {
            Ok(s) => s,
            Err(_) => unreachable!("IdBuf constructed from non-UTF-8"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::borrow::Borrow<str> for IdBuf {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for IdBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for IdBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() > ID_MAX_LEN {
            return Err(serde::de::Error::custom(format!(
                "id exceeds {} bytes: {:?}",
                ID_MAX_LEN, s
            )));
        }
        Ok(IdBuf::new(&s))
    }
}

/// An id of any resource kind.
///
/// Ownership rows, grant targets and log-descriptor parents point at
/// resources of varying kinds; this is the untyped form every typed id
/// converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub IdBuf);

impl ResourceId {
    pub const fn empty() -> Self {
        Self(IdBuf::empty())
    }

    pub fn from_string(id: impl AsRef<str>) -> Self {
        Self(IdBuf::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The kind encoded in the id prefix, if any.
    pub fn kind(&self) -> Option<ResourceKind> {
        let s = self.0.as_str();
        let (prefix, _) = s.split_once(':')?;
        ResourceKind::parse(prefix)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

impl std::borrow::Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

/// Define a newtype id wrapper around [`IdBuf`] for one [`ResourceKind`].
///
/// Generates `new()` for random id generation, `empty()` for
/// populate-defaults flows, `from_string()` for parsing, `as_str()`,
/// `suffix()`, `Display`, string conversions, and `From<$name> for
/// ResourceId`.
///
/// The id format is `{kind}:{nanoid}`:
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the id type.
///     pub struct BuildId(ResourceKind::Build);
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($kind:expr);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $crate::id::IdBuf);

        impl $name {
            pub const KIND: $crate::id::ResourceKind = $kind;

            /// Generate a new random id with the kind prefix.
            pub fn new() -> Self {
                // Suffix length matches ID_SUFFIX_LEN; the macro needs a
                // literal.
                Self($crate::id::IdBuf::new(&format!(
                    "{}:{}",
                    Self::KIND.as_str(),
                    nanoid::nanoid!(18)
                )))
            }

            /// An empty id, to be assigned during populate-defaults.
            pub const fn empty() -> Self {
                Self($crate::id::IdBuf::empty())
            }

            /// Create an id from an existing string (for parsing/deserialization).
            pub fn from_string(id: impl AsRef<str>) -> Self {
                Self($crate::id::IdBuf::new(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// The id without its kind prefix.
            pub fn suffix(&self) -> &str {
                let s = self.0.as_str();
                s.split_once(':').map(|(_, rest)| rest).unwrap_or(s)
            }

            /// Returns true if the id is an empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl From<$name> for $crate::id::ResourceId {
            fn from(id: $name) -> Self {
                $crate::id::ResourceId(id.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0.as_str() == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
