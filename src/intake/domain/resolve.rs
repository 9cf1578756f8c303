//! Tiered fuzzy resolution of names against a board catalog.

use super::{CatalogEntity, EntityId, EntityKind, ResolutionError};
use std::future::Future;

const MIN_OPAQUE_ID_CHARS: usize = 6;

/// Outcome of resolving a name against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Identifier of the matched or created entity.
    pub id: EntityId,
    /// Name of the matched or created entity.
    pub name: String,
    /// Whether the entity was created during resolution.
    pub was_created: bool,
}

impl Resolution {
    /// Resolution to an entity already on the board.
    #[must_use]
    pub fn existing(entity: &CatalogEntity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            was_created: false,
        }
    }

    /// Resolution to an identifier the caller supplied without a catalog
    /// match; the identifier doubles as the name.
    #[must_use]
    pub fn assumed(id: &str) -> Self {
        Self {
            id: EntityId::new(id),
            name: id.to_owned(),
            was_created: false,
        }
    }

    /// Resolution to an entity created during resolution.
    #[must_use]
    pub fn created(entity: CatalogEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            was_created: true,
        }
    }
}

/// Returns `true` when `value` looks like an opaque board identifier: six or
/// more hexadecimal digits or hyphens.
#[must_use]
pub fn looks_like_id(value: &str) -> bool {
    value.chars().count() >= MIN_OPAQUE_ID_CHARS
        && value.chars().all(|ch| ch.is_ascii_hexdigit() || ch == '-')
}

/// Finds the catalog entity best matching `needle`.
///
/// Tiers, first hit wins: exact id or exact name; case-insensitive trimmed
/// name; name containing the needle; name starting with the needle.
#[must_use]
pub fn fuzzy_find<'a>(catalog: &'a [CatalogEntity], needle: &str) -> Option<&'a CatalogEntity> {
    if needle.is_empty() {
        return None;
    }
    if let Some(exact) = catalog
        .iter()
        .find(|entity| entity.id.as_str() == needle || entity.name == needle)
    {
        return Some(exact);
    }

    let normalized = needle.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    let lowered: Vec<(String, &CatalogEntity)> = catalog
        .iter()
        .map(|entity| (entity.name.trim().to_lowercase(), entity))
        .collect();

    lowered
        .iter()
        .find(|(name, _)| *name == normalized)
        .or_else(|| lowered.iter().find(|(name, _)| name.contains(&normalized)))
        .or_else(|| {
            lowered
                .iter()
                .find(|(name, _)| name.starts_with(&normalized))
        })
        .map(|(_, entity)| *entity)
}

/// Resolves `needle` in `catalog`, creating the entity when allowed.
///
/// # Errors
///
/// Returns [`ResolutionError::NotFound`] when nothing matches and
/// `allow_create` is `false`, or [`ResolutionError::Create`] when the
/// creation callback fails.
pub async fn resolve_or_create<F, Fut, E>(
    kind: EntityKind,
    catalog: &[CatalogEntity],
    needle: &str,
    allow_create: bool,
    create: F,
) -> Result<Resolution, ResolutionError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<CatalogEntity, E>>,
{
    if let Some(found) = fuzzy_find(catalog, needle) {
        return Ok(Resolution::existing(found));
    }
    if !allow_create {
        return Err(ResolutionError::NotFound {
            kind,
            requested: needle.to_owned(),
        });
    }
    let created = create().await.map_err(ResolutionError::Create)?;
    Ok(Resolution::created(created))
}
