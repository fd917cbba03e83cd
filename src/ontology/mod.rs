//! Biolink-style ontology: classes, slots and enums with their hierarchy.
//!
//! - **Model** ([`BiolinkModel`]): immutable arena of classes and slots plus a
//!   petgraph inheritance graph (child → parent / mixin)
//! - **Names** ([`names`]): CURIE ↔ label conversion
//! - **Hierarchy** ([`hierarchy`]): ancestor walks and range compatibility
//! - **Resolver** ([`resolver`]): legal associations and qualifiers for a
//!   subject/predicate/object triple
//!
//! The model is read-only once built. Every build gets a fresh
//! [`BiolinkModel::version`] so caches keyed on it never serve stale results.

pub mod hierarchy;
pub mod names;
pub mod resolver;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::OntologyError;
use crate::ordered_map;

/// Result type for ontology operations.
pub type OntologyResult<T> = std::result::Result<T, OntologyError>;

static NEXT_MODEL_VERSION: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Serialized model
// ---------------------------------------------------------------------------

/// One `slot_usage` entry of a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subproperty_of: Option<String>,
}

/// A class or slot definition as it appears in the model file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "mixin")]
    pub is_mixin: bool,
    #[serde(default)]
    pub symmetric: bool,
    /// Per-class slot overrides in declaration order. `null` entries are kept.
    #[serde(default, with = "ordered_map", skip_serializing_if = "Vec::is_empty")]
    pub slot_usage: Vec<(String, Option<SlotUsage>)>,
}

/// A named enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub permissible_values: Vec<String>,
}

fn default_association_root() -> String {
    "association".into()
}

fn default_qualifier_root() -> String {
    "qualifier".into()
}

fn default_universal_class() -> String {
    "named thing".into()
}

fn default_universal_predicate() -> String {
    "related to".into()
}

/// The model file: flat element lists plus the names of the well-known roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(default)]
    pub classes: Vec<ElementDef>,
    #[serde(default)]
    pub slots: Vec<ElementDef>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default = "default_association_root")]
    pub association_root: String,
    #[serde(default = "default_qualifier_root")]
    pub qualifier_root: String,
    #[serde(default = "default_universal_class")]
    pub universal_class: String,
    #[serde(default = "default_universal_predicate")]
    pub universal_predicate: String,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            slots: Vec::new(),
            enums: Vec::new(),
            association_root: default_association_root(),
            qualifier_root: default_qualifier_root(),
            universal_class: default_universal_class(),
            universal_predicate: default_universal_predicate(),
        }
    }
}

// ---------------------------------------------------------------------------
// Built model
// ---------------------------------------------------------------------------

/// Index of an element in the model arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    pub(crate) fn node(self) -> NodeIndex {
        NodeIndex::new(self.0 as usize)
    }

    pub(crate) fn from_node(node: NodeIndex) -> Self {
        Self(node.index() as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Class,
    Slot,
}

/// Inheritance edge label. Sorting puts the parent before mixins, and mixins
/// in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Link {
    Parent,
    Mixin(u16),
}

/// A class or slot in the built model.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub curie: String,
    pub kind: ElementKind,
    pub parent: Option<ElementId>,
    pub mixins: Vec<ElementId>,
    /// `is_a` children in declaration order.
    pub children: Vec<ElementId>,
    pub is_abstract: bool,
    pub is_mixin: bool,
    pub symmetric: bool,
    pub slot_usage: Vec<(String, Option<SlotUsage>)>,
}

impl Element {
    /// The non-null `slot_usage` entry for `key`.
    pub fn usage(&self, key: &str) -> Option<&SlotUsage> {
        self.slot_usage
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, usage)| usage.as_ref())
    }
}

/// Immutable class/slot/enum hierarchy.
#[derive(Debug, Clone)]
pub struct BiolinkModel {
    version: u64,
    elements: Vec<Element>,
    /// Edges run child → ancestor. Node index equals element index.
    inheritance: DiGraph<ElementId, Link>,
    classes: HashMap<String, ElementId>,
    slots: HashMap<String, ElementId>,
    enums: HashMap<String, EnumDef>,
    association_root: Option<ElementId>,
    qualifier_root: Option<ElementId>,
    universal_class: Option<ElementId>,
    universal_predicate: Option<ElementId>,
    symmetric_predicates: Vec<String>,
    predicates: Vec<String>,
}

impl BiolinkModel {
    /// Build a model from its serialized form.
    ///
    /// Unknown parent or mixin references are dropped with a warning;
    /// duplicate names keep the first definition. Inheritance cycles are
    /// reported but tolerated: every walk over the model terminates.
    pub fn build(spec: ModelSpec) -> OntologyResult<Self> {
        if spec.classes.is_empty() {
            return Err(OntologyError::Empty);
        }

        let mut model = Self {
            version: NEXT_MODEL_VERSION.fetch_add(1, Ordering::Relaxed),
            elements: Vec::with_capacity(spec.classes.len() + spec.slots.len()),
            inheritance: DiGraph::new(),
            classes: HashMap::new(),
            slots: HashMap::new(),
            enums: HashMap::new(),
            association_root: None,
            qualifier_root: None,
            universal_class: None,
            universal_predicate: None,
            symmetric_predicates: Vec::new(),
            predicates: Vec::new(),
        };

        let mut defs: Vec<(ElementId, ElementDef)> = Vec::new();
        for (kind, list) in [(ElementKind::Class, spec.classes), (ElementKind::Slot, spec.slots)] {
            for def in list {
                if let Some(id) = model.insert(kind, &def) {
                    defs.push((id, def));
                }
            }
        }

        for (id, def) in &defs {
            model.link(*id, def);
        }

        for def in spec.enums {
            if model.enums.contains_key(&def.name) {
                tracing::warn!(name = %def.name, "duplicate enum definition ignored");
                continue;
            }
            model.enums.insert(def.name.clone(), def);
        }

        if is_cyclic_directed(&model.inheritance) {
            tracing::warn!("ontology inheritance contains a cycle");
        }

        model.association_root = model.class(&spec.association_root);
        model.qualifier_root = model.slot(&spec.qualifier_root);
        model.universal_class = model.class(&spec.universal_class);
        model.universal_predicate = model.slot(&spec.universal_predicate);
        for (name, found) in [
            (&spec.association_root, model.association_root),
            (&spec.qualifier_root, model.qualifier_root),
            (&spec.universal_class, model.universal_class),
            (&spec.universal_predicate, model.universal_predicate),
        ] {
            if found.is_none() {
                tracing::warn!(%name, "well-known ontology root not defined");
            }
        }

        model.symmetric_predicates = model
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Slot && e.symmetric)
            .map(|e| e.curie.clone())
            .collect();
        model.predicates = match model.universal_predicate {
            Some(root) => model
                .elements
                .iter()
                .filter(|e| e.kind == ElementKind::Slot && !e.is_abstract && !e.is_mixin)
                .filter(|e| model.reaches(e.id, root))
                .map(|e| e.curie.clone())
                .collect(),
            None => Vec::new(),
        };

        tracing::debug!(
            version = model.version,
            elements = model.elements.len(),
            predicates = model.predicates.len(),
            "built ontology model"
        );
        Ok(model)
    }

    /// Parse and build a model from JSON.
    pub fn from_json(json: &str) -> OntologyResult<Self> {
        let spec: ModelSpec = serde_json::from_str(json).map_err(|e| OntologyError::Parse {
            message: e.to_string(),
        })?;
        Self::build(spec)
    }

    /// Load a model from a JSON file.
    pub fn load(path: &Path) -> OntologyResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| OntologyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn insert(&mut self, kind: ElementKind, def: &ElementDef) -> Option<ElementId> {
        let (index, curie) = match kind {
            ElementKind::Class => (&self.classes, names::class_curie(&def.name)),
            ElementKind::Slot => (&self.slots, names::slot_curie(&def.name)),
        };
        if index.contains_key(&def.name) {
            tracing::warn!(name = %def.name, ?kind, "duplicate definition ignored");
            return None;
        }

        let id = ElementId(self.elements.len() as u32);
        let node = self.inheritance.add_node(id);
        debug_assert_eq!(ElementId::from_node(node), id);

        let index = match kind {
            ElementKind::Class => &mut self.classes,
            ElementKind::Slot => &mut self.slots,
        };
        index.insert(def.name.clone(), id);
        index.entry(curie.clone()).or_insert(id);

        self.elements.push(Element {
            id,
            name: def.name.clone(),
            curie,
            kind,
            parent: None,
            mixins: Vec::new(),
            children: Vec::new(),
            is_abstract: def.is_abstract,
            is_mixin: def.is_mixin,
            symmetric: def.symmetric,
            slot_usage: def.slot_usage.clone(),
        });
        Some(id)
    }

    fn link(&mut self, id: ElementId, def: &ElementDef) {
        let kind = self.elements[id.index()].kind;
        let lookup = |model: &Self, name: &str| match kind {
            ElementKind::Class => model.classes.get(name).copied(),
            ElementKind::Slot => model.slots.get(name).copied(),
        };

        if let Some(parent_name) = &def.is_a {
            match lookup(self, parent_name) {
                Some(parent) => {
                    self.inheritance.add_edge(id.node(), parent.node(), Link::Parent);
                    self.elements[id.index()].parent = Some(parent);
                    self.elements[parent.index()].children.push(id);
                }
                None => {
                    tracing::warn!(element = %def.name, parent = %parent_name, "unknown parent dropped");
                }
            }
        }

        for (ordinal, mixin_name) in def.mixins.iter().enumerate() {
            match lookup(self, mixin_name) {
                Some(mixin) => {
                    self.inheritance
                        .add_edge(id.node(), mixin.node(), Link::Mixin(ordinal as u16));
                    self.elements[id.index()].mixins.push(mixin);
                }
                None => {
                    tracing::warn!(element = %def.name, mixin = %mixin_name, "unknown mixin dropped");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Identifier of this build. Distinct for every model ever built.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Look up a class by label (`gene`) or CURIE (`biolink:Gene`).
    pub fn class(&self, name: &str) -> Option<ElementId> {
        let found = self
            .classes
            .get(name)
            .or_else(|| self.classes.get(&names::category_label(name)))
            .copied();
        if found.is_none() {
            tracing::trace!(%name, "unknown class");
        }
        found
    }

    /// Look up a slot by label (`related to`) or CURIE (`biolink:related_to`).
    pub fn slot(&self, name: &str) -> Option<ElementId> {
        let found = self
            .slots
            .get(name)
            .or_else(|| self.slots.get(&names::predicate_label(name)))
            .copied();
        if found.is_none() {
            tracing::trace!(%name, "unknown slot");
        }
        found
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub fn association_root(&self) -> Option<ElementId> {
        self.association_root
    }

    pub fn qualifier_root(&self) -> Option<ElementId> {
        self.qualifier_root
    }

    pub fn universal_class(&self) -> Option<ElementId> {
        self.universal_class
    }

    pub fn universal_predicate(&self) -> Option<ElementId> {
        self.universal_predicate
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    /// CURIEs of every slot flagged symmetric.
    pub fn symmetric_predicates(&self) -> &[String] {
        &self.symmetric_predicates
    }

    /// CURIEs of every concrete predicate under the universal predicate.
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Predicates selectable between the given node categories.
    ///
    /// `None` when the model has no predicates or any category is unknown;
    /// callers then offer nothing rather than an unfiltered list.
    pub fn predicate_options(
        &self,
        subject_categories: &[String],
        object_categories: &[String],
    ) -> Option<Vec<String>> {
        if self.predicates.is_empty() {
            return None;
        }
        let all_known = subject_categories
            .iter()
            .chain(object_categories)
            .all(|c| self.class(c).is_some());
        all_known.then(|| self.predicates.clone())
    }
}

/// Keep only predicates present in `options`, preserving order.
pub fn retain_known(predicates: &[String], options: &[String]) -> Vec<String> {
    predicates
        .iter()
        .filter(|p| options.contains(p))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const MINI_MODEL: &str = r#"{
        "classes": [
            {"name": "named thing"},
            {"name": "biological entity", "is_a": "named thing"},
            {"name": "gene or gene product", "mixin": true},
            {"name": "gene", "is_a": "biological entity", "mixins": ["gene or gene product", "ghost"]},
            {"name": "disease", "is_a": "biological entity"},
            {"name": "association"},
            {"name": "gene to disease association", "is_a": "association",
             "slot_usage": {
                "subject": {"range": "gene or gene product"},
                "object": {"range": "disease"},
                "frequency qualifier": null
             }},
            {"name": "gene", "is_a": "named thing"}
        ],
        "slots": [
            {"name": "related to", "symmetric": true},
            {"name": "related to at instance level", "is_a": "related to"},
            {"name": "affects", "is_a": "related to at instance level"},
            {"name": "qualifier"},
            {"name": "interacts with", "is_a": "related to at instance level", "symmetric": true}
        ],
        "enums": [{"name": "DirectionQualifierEnum", "permissible_values": ["increased", "decreased"]}]
    }"#;

    pub(crate) fn mini() -> BiolinkModel {
        BiolinkModel::from_json(MINI_MODEL).unwrap()
    }

    #[test]
    fn lookups_accept_labels_and_curies() {
        let model = mini();
        let gene = model.class("gene").unwrap();
        assert_eq!(model.class("biolink:Gene"), Some(gene));
        assert_eq!(
            model.class("biolink:GeneOrGeneProduct"),
            model.class("gene or gene product")
        );
        assert!(model.slot("biolink:related_to_at_instance_level").is_some());
        assert!(model.class("biolink:Protein").is_none());
        assert_eq!(model.element(gene).curie, "biolink:Gene");
    }

    #[test]
    fn duplicates_keep_first_and_unknown_mixins_are_dropped() {
        let model = mini();
        let gene = model.element(model.class("gene").unwrap());
        assert_eq!(gene.parent, model.class("biological entity"));
        assert_eq!(gene.mixins, vec![model.class("gene or gene product").unwrap()]);
    }

    #[test]
    fn slot_usage_keeps_order_and_nulls() {
        let model = mini();
        let assoc = model.element(model.class("gene to disease association").unwrap());
        let keys: Vec<&str> = assoc.slot_usage.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["subject", "object", "frequency qualifier"]);
        assert!(assoc.usage("frequency qualifier").is_none());
        assert_eq!(assoc.usage("object").unwrap().range.as_deref(), Some("disease"));
    }

    #[test]
    fn null_slot_usage_block_is_empty() {
        let model = BiolinkModel::from_json(
            r#"{"classes": [{"name": "named thing", "slot_usage": null}]}"#,
        )
        .unwrap();
        let thing = model.element(model.class("named thing").unwrap());
        assert!(thing.slot_usage.is_empty());
    }

    #[test]
    fn predicates_and_symmetric_lists() {
        let model = mini();
        assert_eq!(
            model.predicates(),
            [
                "biolink:related_to",
                "biolink:related_to_at_instance_level",
                "biolink:affects",
                "biolink:interacts_with"
            ]
        );
        assert_eq!(
            model.symmetric_predicates(),
            ["biolink:related_to", "biolink:interacts_with"]
        );
    }

    #[test]
    fn predicate_options_require_known_categories() {
        let model = mini();
        let gene = vec!["biolink:Gene".to_string()];
        let unknown = vec!["biolink:Spaceship".to_string()];
        assert_eq!(model.predicate_options(&gene, &gene).unwrap().len(), 4);
        assert!(model.predicate_options(&gene, &unknown).is_none());
    }

    #[test]
    fn retain_known_prunes_in_order() {
        let options = vec!["biolink:affects".to_string(), "biolink:related_to".to_string()];
        let edge = vec![
            "biolink:related_to".to_string(),
            "biolink:treats".to_string(),
            "biolink:affects".to_string(),
        ];
        assert_eq!(retain_known(&edge, &options), ["biolink:related_to", "biolink:affects"]);
    }

    #[test]
    fn versions_are_unique() {
        assert_ne!(mini().version(), mini().version());
    }

    #[test]
    fn empty_and_malformed_models_are_errors() {
        assert!(matches!(
            BiolinkModel::from_json("{}"),
            Err(OntologyError::Empty)
        ));
        assert!(matches!(
            BiolinkModel::from_json("{\"classes\": 3}"),
            Err(OntologyError::Parse { .. })
        ));
    }
}
