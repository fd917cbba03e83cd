//! Association resolver.
//!
//! Given a subject category, a predicate and an object category, find every
//! association in the model that can describe such an edge, together with the
//! ranges it inherits and the qualifiers it declares.
//!
//! Resolution never fails: unknown names or a missing model yield an empty
//! list, which callers display as "no qualifiers available".

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use super::{BiolinkModel, ElementId};

/// The subject/predicate/object ranges an association inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InheritedRanges {
    pub subject: ElementId,
    pub predicate: ElementId,
    pub object: ElementId,
}

/// Value space of a qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QualifierRange {
    /// Name of an enumeration.
    Enum(String),
    Class(ElementId),
}

/// A qualifier an association declares in its own `slot_usage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidQualifier {
    pub qualifier: ElementId,
    pub range: Option<QualifierRange>,
    pub subproperty_of: Option<ElementId>,
}

/// An association legal for the requested triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidAssociation {
    pub association: ElementId,
    pub inherited: InheritedRanges,
    /// Depth below the association root (root = 0).
    pub depth: usize,
    pub qualifiers: Vec<ValidQualifier>,
}

#[derive(Debug, Clone, Copy)]
enum Part {
    Subject,
    Predicate,
    Object,
}

impl Part {
    fn key(self) -> &'static str {
        match self {
            Part::Subject => "subject",
            Part::Predicate => "predicate",
            Part::Object => "object",
        }
    }
}

/// Range of `part` for `association`: its own override, else the first
/// ancestor override that resolves, else the universal default.
fn inherited_range(model: &BiolinkModel, association: ElementId, part: Part) -> Option<ElementId> {
    model
        .first_in_ancestry(association, |element| {
            let usage = element.usage(part.key())?;
            match part {
                Part::Subject | Part::Object => model.class(usage.range.as_deref()?),
                Part::Predicate => model.slot(usage.subproperty_of.as_deref().or(usage.range.as_deref())?),
            }
        })
        .or(match part {
            Part::Subject | Part::Object => model.universal_class(),
            Part::Predicate => model.universal_predicate(),
        })
}

fn inherited_ranges(model: &BiolinkModel, association: ElementId) -> Option<InheritedRanges> {
    Some(InheritedRanges {
        subject: inherited_range(model, association, Part::Subject)?,
        predicate: inherited_range(model, association, Part::Predicate)?,
        object: inherited_range(model, association, Part::Object)?,
    })
}

/// Qualifiers declared directly on `association`, in declaration order.
fn legal_qualifiers(model: &BiolinkModel, association: ElementId) -> Vec<ValidQualifier> {
    let Some(root) = model.qualifier_root() else {
        return Vec::new();
    };
    model
        .element(association)
        .slot_usage
        .iter()
        .filter_map(|(key, usage)| {
            let usage = usage.as_ref()?;
            let qualifier = model.slot(key)?;
            if !model.compatible(qualifier, root) {
                return None;
            }
            let range = match &usage.range {
                None => None,
                Some(name) => Some(
                    model
                        .class(name)
                        .map(QualifierRange::Class)
                        .or_else(|| model.enum_def(name).map(|e| QualifierRange::Enum(e.name.clone())))?,
                ),
            };
            let subproperty_of = match &usage.subproperty_of {
                None => None,
                Some(name) => Some(model.slot(name)?),
            };
            Some(ValidQualifier {
                qualifier,
                range,
                subproperty_of,
            })
        })
        .collect()
}

/// Every association legal for `subject -predicate-> object`, most specific
/// first.
///
/// Names may be model labels or CURIEs.
pub fn resolve(subject: &str, predicate: &str, object: &str, model: &BiolinkModel) -> Vec<ValidAssociation> {
    let (Some(s), Some(p), Some(o), Some(root)) = (
        model.class(subject),
        model.slot(predicate),
        model.class(object),
        model.association_root(),
    ) else {
        return Vec::new();
    };

    let mut valid: Vec<ValidAssociation> = model
        .descendants(root)
        .into_iter()
        .filter(|&(id, _)| {
            let element = model.element(id);
            !element.is_abstract && !element.slot_usage.is_empty()
        })
        .filter_map(|(id, depth)| {
            let inherited = inherited_ranges(model, id)?;
            let legal = model.compatible(s, inherited.subject)
                && model.compatible(p, inherited.predicate)
                && model.compatible(o, inherited.object);
            legal.then(|| ValidAssociation {
                association: id,
                inherited,
                depth,
                qualifiers: legal_qualifiers(model, id),
            })
        })
        .collect();

    // Stable: equal depths keep pre-order.
    valid.sort_by(|a, b| b.depth.cmp(&a.depth));
    tracing::trace!(subject, predicate, object, found = valid.len(), "resolved associations");
    valid
}

// ---------------------------------------------------------------------------
// Memoisation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolveKey {
    subject: String,
    predicate: String,
    object: String,
    version: u64,
}

/// Resolution results memoised per triple and model version.
///
/// Shared behind `&self`. Entries for older model versions are evicted the
/// first time a newer version is queried.
#[derive(Debug, Default)]
pub struct ResolverCache {
    entries: DashMap<ResolveKey, Arc<[ValidAssociation]>>,
    /// Model version of the current entries; 0 before the first miss.
    version: AtomicU64,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve through the cache. A missing model yields an empty result.
    pub fn resolve(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        model: Option<&BiolinkModel>,
    ) -> Arc<[ValidAssociation]> {
        let Some(model) = model else {
            return Arc::from(Vec::new());
        };
        let key = ResolveKey {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
            version: model.version(),
        };
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit.value());
        }

        let version = model.version();
        let previous = self.version.swap(version, Ordering::AcqRel);
        if previous != version && previous != 0 {
            tracing::debug!(previous, version, "model changed, evicting resolver cache");
            self.entries.retain(|k, _| k.version == version);
        }
        let result: Arc<[ValidAssociation]> = resolve(subject, predicate, object, model).into();
        self.entries.insert(key, Arc::clone(&result));
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.version.store(0, Ordering::Release);
    }
}
