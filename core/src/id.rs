use std::fmt;

use uuid::Uuid;

use crate::error::GraphError;

/// Identity of a node: a (shard, uuid) pair. The external form is
/// `<shard>-<uuid>`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Id {
    pub shard: String,
    pub uuid: Uuid,
}

impl Id {
    /// Generates a fresh id in the given shard.
    pub fn new_in(shard: impl Into<String>) -> Result<Self, GraphError> {
        let shard = shard.into();
        validate_label(&shard)?;
        Ok(Self {
            shard,
            uuid: Uuid::new_v4(),
        })
    }

    /// Parses the external id grammar: `id := shard "-" uuid`. Splitting on
    /// the first `-` is correct even though canonical uuids contain dashes
    /// themselves, because `shard` never does.
    ///
    /// Input without a `-` is interpreted as "shard only" and a fresh uuid is
    /// generated for it.
    pub fn parse(input: &str) -> Result<Self, GraphError> {
        match input.split_once('-') {
            Some((shard, rest)) => {
                validate_label(shard).map_err(|_| GraphError::InvalidId(input.to_string()))?;
                let uuid = Uuid::parse_str(rest)
                    .map_err(|_| GraphError::InvalidId(input.to_string()))?;
                Ok(Self {
                    shard: shard.to_string(),
                    uuid,
                })
            }
            None => Self::new_in(input).map_err(|_| GraphError::InvalidId(input.to_string())),
        }
    }

    /// First two characters of the canonical hyphenated uuid, used by
    /// [`crate::path`] to build the two-level hashed directory prefix.
    pub fn uuid_prefix(&self) -> String {
        let s = self.uuid.as_hyphenated().to_string();
        s[..2].to_string()
    }

    /// Remainder of the canonical uuid after [`Id::uuid_prefix`].
    pub fn uuid_suffix(&self) -> String {
        let s = self.uuid.as_hyphenated().to_string();
        s[2..].to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.shard, self.uuid.as_hyphenated())
    }
}

/// `shard`/`category` grammar: `[a-z][a-z0-9]+`. Kept hand-rolled rather
/// than pulling in a regex crate for one tiny character class.
pub(crate) fn validate_label(label: &str) -> Result<(), GraphError> {
    let mut chars = label.chars();
    let first = chars
        .next()
        .ok_or_else(|| GraphError::InvalidId(label.to_string()))?;
    if !first.is_ascii_lowercase() {
        return Err(GraphError::InvalidId(label.to_string()));
    }
    let mut rest_len = 0;
    for c in chars {
        if !(c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(GraphError::InvalidId(label.to_string()));
        }
        rest_len += 1;
    }
    if rest_len == 0 {
        return Err(GraphError::InvalidId(label.to_string()));
    }
    Ok(())
}
