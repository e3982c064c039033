//! Static set of entity kinds that may be stacked.

use std::collections::HashSet;

use tracing::debug;

use crate::state::EntityKind;

/// Stackable kinds, resolved once at startup against the running host.
///
/// Kinds the configuration asks for but the host does not support are dropped
/// here, so later lookups are a plain set membership test and never have to
/// deal with kinds the host can't produce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EligibleKinds {
    kinds: HashSet<EntityKind>,
}

impl EligibleKinds {
    pub fn resolve(requested: &[EntityKind], supported: &[EntityKind]) -> Self {
        let kinds: HashSet<EntityKind> = requested
            .iter()
            .copied()
            .filter(|kind| kind.is_living())
            .filter(|kind| {
                let known = supported.contains(kind);
                if !known {
                    debug!(%kind, "kind not supported by host, excluded from stacking");
                }
                known
            })
            .collect();
        Self { kinds }
    }

    #[inline]
    pub fn contains(&self, kind: EntityKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
