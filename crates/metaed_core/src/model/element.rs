//! Metamodel element records.
//!
//! # Responsibility
//! - Define the closed set of element kinds and their per-kind slots.
//! - Keep multiplicity and type references as explicit value types.
//!
//! # Invariants
//! - An element never changes kind after creation; `ElementData` is the
//!   discriminant.
//! - `container` and the opposite slot of a Reference are only writable from
//!   inside the model layer (`MetaGraph`).
//!
//! # See also
//! - `model::graph` for the store that owns these records.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one metamodel element.
pub type ElementId = Uuid;

/// Upper bound value marking a many-valued slot.
pub const UNBOUNDED: i32 = -1;

/// Primitive data type names accepted as `eType` values.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "EString",
    "EInt",
    "EBoolean",
    "EDouble",
    "EFloat",
    "ELong",
    "EShort",
    "EByte",
    "EChar",
    "EDate",
    "EBigDecimal",
    "EBigInteger",
    "EJavaObject",
];

static MULTIPLICITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+|\*)\s*(?:\.\.\s*(\d+|\*|-1)\s*)?$").expect("valid multiplicity regex")
});

/// Returns whether `name` is one of the built-in primitive types.
pub fn is_primitive_type(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

/// Element kind as seen by every editor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Package,
    Class,
    Enum,
    Attribute,
    Reference,
    Operation,
    Parameter,
    EnumLiteral,
    /// Shape the editor does not model. Offers no actions and cannot be deleted.
    Unknown,
}

impl ElementKind {
    /// User-facing kind name used in headers and messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Package => "Package",
            Self::Class => "Class",
            Self::Enum => "Enum",
            Self::Attribute => "Attribute",
            Self::Reference => "Reference",
            Self::Operation => "Operation",
            Self::Parameter => "Parameter",
            Self::EnumLiteral => "Enum Literal",
            Self::Unknown => "Unknown",
        }
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Target type of a typed element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum TypeRef {
    /// Built-in data type, e.g. `EString`.
    Primitive(String),
    /// Class, Enum or opaque classifier in the same graph.
    Classifier(ElementId),
}

impl TypeRef {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    /// Returns the classifier id when this points into the graph.
    pub fn classifier(&self) -> Option<ElementId> {
        match self {
            Self::Classifier(id) => Some(*id),
            Self::Primitive(_) => None,
        }
    }
}

/// Lower/upper bound pair. `upper == UNBOUNDED` means many-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplicity {
    pub lower: i32,
    pub upper: i32,
}

impl Multiplicity {
    pub const OPTIONAL: Self = Self { lower: 0, upper: 1 };
    pub const MANY: Self = Self {
        lower: 0,
        upper: UNBOUNDED,
    };

    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    pub fn is_many(self) -> bool {
        self.upper == UNBOUNDED
    }

    /// Returns a copy with the many-valued toggle applied.
    ///
    /// Turning the toggle on keeps the lower bound; turning it off caps
    /// both bounds at one.
    pub fn with_many(self, many: bool) -> Self {
        if many {
            Self {
                lower: self.lower,
                upper: UNBOUNDED,
            }
        } else {
            Self {
                lower: self.lower.min(1),
                upper: 1,
            }
        }
    }

    /// Parses property-sheet text such as `1`, `0..1`, `0..*` or `*`.
    pub fn parse(text: &str) -> Option<Self> {
        let captures = MULTIPLICITY_RE.captures(text)?;
        let first = captures.get(1)?.as_str();
        match captures.get(2).map(|m| m.as_str()) {
            None if first == "*" => Some(Self::MANY),
            None => {
                let bound = first.parse::<i32>().ok()?;
                Some(Self::new(bound, bound))
            }
            Some(upper) => {
                if first == "*" {
                    return None;
                }
                let lower = first.parse::<i32>().ok()?;
                let upper = match upper {
                    "*" | "-1" => UNBOUNDED,
                    value => value.parse::<i32>().ok()?,
                };
                if upper != UNBOUNDED && upper < lower {
                    return None;
                }
                Some(Self::new(lower, upper))
            }
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::OPTIONAL
    }
}

impl Display for Multiplicity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_many() {
            write!(f, "{}..*", self.lower)
        } else {
            write!(f, "{}..{}", self.lower, self.upper)
        }
    }
}

/// Boolean flags shared by Attributes and References.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub volatile: bool,
    pub transient: bool,
    pub id: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageData {
    pub ns_uri: String,
    pub ns_prefix: String,
    pub classifiers: Vec<ElementId>,
    pub subpackages: Vec<ElementId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassData {
    pub is_abstract: bool,
    pub is_interface: bool,
    pub super_types: Vec<ElementId>,
    pub attributes: Vec<ElementId>,
    pub references: Vec<ElementId>,
    pub operations: Vec<ElementId>,
}

impl ClassData {
    /// Number of structural features (attributes plus references).
    pub fn feature_count(&self) -> usize {
        self.attributes.len() + self.references.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumData {
    pub literals: Vec<ElementId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeData {
    pub e_type: Option<TypeRef>,
    pub multiplicity: Multiplicity,
    pub flags: FeatureFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub e_type: Option<TypeRef>,
    pub multiplicity: Multiplicity,
    pub containment: bool,
    pub flags: FeatureFlags,
    pub(in crate::model) opposite: Option<ElementId>,
}

impl ReferenceData {
    /// Current opposite reference, if paired.
    pub fn opposite(&self) -> Option<ElementId> {
        self.opposite
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationData {
    pub e_type: Option<TypeRef>,
    pub multiplicity: Multiplicity,
    pub parameters: Vec<ElementId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterData {
    pub e_type: Option<TypeRef>,
    pub multiplicity: Multiplicity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumLiteralData {
    pub literal: String,
    pub value: i32,
}

/// Per-kind payload of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementData {
    Package(PackageData),
    Class(ClassData),
    Enum(EnumData),
    Attribute(AttributeData),
    Reference(ReferenceData),
    Operation(OperationData),
    Parameter(ParameterData),
    EnumLiteral(EnumLiteralData),
    /// Element of a kind the editor does not understand (data types,
    /// annotations). Kept so documents survive a load/save cycle.
    Opaque { type_name: String },
}

impl ElementData {
    pub fn package() -> Self {
        Self::Package(PackageData::default())
    }

    pub fn class() -> Self {
        Self::Class(ClassData::default())
    }

    pub fn enumeration() -> Self {
        Self::Enum(EnumData::default())
    }

    pub fn attribute(e_type: Option<TypeRef>) -> Self {
        Self::Attribute(AttributeData {
            e_type,
            ..AttributeData::default()
        })
    }

    pub fn reference(e_type: Option<TypeRef>) -> Self {
        Self::Reference(ReferenceData {
            e_type,
            ..ReferenceData::default()
        })
    }

    pub fn operation() -> Self {
        Self::Operation(OperationData::default())
    }

    pub fn parameter(e_type: Option<TypeRef>) -> Self {
        Self::Parameter(ParameterData {
            e_type,
            multiplicity: Multiplicity::new(1, 1),
        })
    }

    pub fn literal(literal: impl Into<String>, value: i32) -> Self {
        Self::EnumLiteral(EnumLiteralData {
            literal: literal.into(),
            value,
        })
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
        }
    }

    /// Declared type for typed kinds; `None` for untyped kinds or unset types.
    pub fn e_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Attribute(data) => data.e_type.as_ref(),
            Self::Reference(data) => data.e_type.as_ref(),
            Self::Operation(data) => data.e_type.as_ref(),
            Self::Parameter(data) => data.e_type.as_ref(),
            _ => None,
        }
    }

    /// Multiplicity for typed kinds.
    pub fn multiplicity(&self) -> Option<Multiplicity> {
        match self {
            Self::Attribute(data) => Some(data.multiplicity),
            Self::Reference(data) => Some(data.multiplicity),
            Self::Operation(data) => Some(data.multiplicity),
            Self::Parameter(data) => Some(data.multiplicity),
            _ => None,
        }
    }
}

/// One node of the metamodel graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub(in crate::model) id: ElementId,
    pub(in crate::model) container: Option<ElementId>,
    pub name: String,
    pub data: ElementData,
}

impl Element {
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Owning element; `None` only for the document root.
    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.data {
            ElementData::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceData> {
        match &self.data {
            ElementData::Reference(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageData> {
        match &self.data {
            ElementData::Package(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&OperationData> {
        match &self.data {
            ElementData::Operation(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Multiplicity, UNBOUNDED};

    #[test]
    fn parse_accepts_common_forms() {
        assert_eq!(Multiplicity::parse("0..1"), Some(Multiplicity::new(0, 1)));
        assert_eq!(Multiplicity::parse("1..*"), Some(Multiplicity::new(1, UNBOUNDED)));
        assert_eq!(Multiplicity::parse(" * "), Some(Multiplicity::MANY));
        assert_eq!(Multiplicity::parse("2"), Some(Multiplicity::new(2, 2)));
        assert_eq!(Multiplicity::parse("0..-1"), Some(Multiplicity::MANY));
    }

    #[test]
    fn parse_rejects_reversed_and_garbage() {
        assert_eq!(Multiplicity::parse("3..1"), None);
        assert_eq!(Multiplicity::parse("many"), None);
        assert_eq!(Multiplicity::parse("*..1"), None);
    }

    #[test]
    fn many_toggle_controls_upper_bound() {
        let many = Multiplicity::new(1, 1).with_many(true);
        assert!(many.is_many());
        assert_eq!(many.lower, 1);

        let bounded = Multiplicity::new(2, 5).with_many(true);
        assert_eq!(bounded, Multiplicity::new(2, UNBOUNDED));

        let single = Multiplicity::new(3, UNBOUNDED).with_many(false);
        assert_eq!(single, Multiplicity::new(1, 1));
        assert!(!single.is_many());
    }

    #[test]
    fn display_uses_star_for_unbounded() {
        assert_eq!(Multiplicity::MANY.to_string(), "0..*");
        assert_eq!(Multiplicity::OPTIONAL.to_string(), "0..1");
    }
}
