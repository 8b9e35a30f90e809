//! Typed parameters for the catalogue endpoints
//!
//! The service expects every search parameter under a `param_` prefixed key,
//! with unset filters sent as empty strings.

use crate::composition::CompositionQuery;
use crate::resource::Resource;
use serde_json::{Map, Value};

/// Parameters of a catalogue query
pub trait CatalogueQuery {
    /// Endpoint the query is sent to
    fn resource(&self) -> Resource;

    /// Body parameters, without credentials
    fn to_params(&self) -> Map<String, Value>;
}

fn text(value: &Option<String>) -> Value {
    Value::String(value.clone().unwrap_or_default())
}

/// Comparison types, optionally filtered by property type and name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparatorQuery {
    /// Property type the comparator applies to
    pub property_type_name: Option<String>,
    /// Comparator name
    pub comparator_name: Option<String>,
}

impl ComparatorQuery {
    /// Match every comparator
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by property type name
    pub fn with_property_type(mut self, name: impl Into<String>) -> Self {
        self.property_type_name = Some(name.into());
        self
    }

    /// Filter by comparator name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.comparator_name = Some(name.into());
        self
    }
}

impl CatalogueQuery for ComparatorQuery {
    fn resource(&self) -> Resource {
        Resource::Comparators
    }

    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("param_type".into(), text(&self.property_type_name));
        params.insert("param_name".into(), text(&self.comparator_name));
        params
    }
}

/// Crystal prototypes, optionally filtered by Strukturbericht and name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrototypeQuery {
    /// Strukturbericht designation, e.g. `A1`
    pub strukturbericht: Option<String>,
    /// Prototype name, e.g. `fcc`
    pub prototype_name: Option<String>,
}

impl PrototypeQuery {
    /// Match every prototype
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by Strukturbericht designation
    pub fn with_strukturbericht(mut self, designation: impl Into<String>) -> Self {
        self.strukturbericht = Some(designation.into());
        self
    }

    /// Filter by prototype name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.prototype_name = Some(name.into());
        self
    }
}

impl CatalogueQuery for PrototypeQuery {
    fn resource(&self) -> Resource {
        Resource::Prototypes
    }

    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(
            "param_prototype_strukturbericht".into(),
            text(&self.strukturbericht),
        );
        params.insert("param_prototype_name".into(), text(&self.prototype_name));
        params
    }
}

/// Property search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyQuery {
    /// Property type name, e.g. `EOS`
    pub property_type_name: Option<String>,
    /// Property name
    pub property_name: Option<String>,
    /// Structure composition pattern
    pub composition: Option<String>,
    /// Prototype Strukturbericht designation
    pub strukturbericht: Option<String>,
    /// Prototype name
    pub prototype_name: Option<String>,
    /// Exact property id
    pub property_id: Option<i64>,
    /// Calculator name
    pub calculator_name: Option<String>,
    /// Restrict to properties marked for comparison
    pub visible_for_comparison_only: Option<bool>,
    /// Maximum number of results
    pub limit: u32,
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self {
            property_type_name: None,
            property_name: None,
            composition: None,
            strukturbericht: None,
            prototype_name: None,
            property_id: None,
            calculator_name: None,
            visible_for_comparison_only: Some(true),
            limit: 100,
        }
    }
}

impl PropertyQuery {
    /// Up to 100 properties visible for comparison
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by property type name
    pub fn with_property_type(mut self, name: impl Into<String>) -> Self {
        self.property_type_name = Some(name.into());
        self
    }

    /// Filter by property name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }

    /// Filter by composition, sent as given
    pub fn with_composition(mut self, composition: impl Into<String>) -> Self {
        self.composition = Some(composition.into());
        self
    }

    /// Filter by composition, normalized with [`CompositionQuery::parse`]
    pub fn with_normalized_composition(mut self, composition: &str) -> Self {
        self.composition = Some(CompositionQuery::parse(composition).pattern);
        self
    }

    /// Filter by prototype Strukturbericht designation
    pub fn with_strukturbericht(mut self, designation: impl Into<String>) -> Self {
        self.strukturbericht = Some(designation.into());
        self
    }

    /// Filter by prototype name
    pub fn with_prototype_name(mut self, name: impl Into<String>) -> Self {
        self.prototype_name = Some(name.into());
        self
    }

    /// Select one property by id
    pub fn with_property_id(mut self, id: i64) -> Self {
        self.property_id = Some(id);
        self
    }

    /// Filter by calculator name
    pub fn with_calculator(mut self, name: impl Into<String>) -> Self {
        self.calculator_name = Some(name.into());
        self
    }

    /// Restrict to comparison-visible properties; `None` leaves the filter unset
    pub fn with_visible_for_comparison_only(mut self, visible: Option<bool>) -> Self {
        self.visible_for_comparison_only = visible;
        self
    }

    /// Maximum number of results
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl CatalogueQuery for PropertyQuery {
    fn resource(&self) -> Resource {
        Resource::Properties
    }

    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("param_type".into(), text(&self.property_type_name));
        params.insert("param_property_name".into(), text(&self.property_name));
        params.insert("param_composition".into(), text(&self.composition));
        params.insert(
            "param_prototype_strukturbericht".into(),
            text(&self.strukturbericht),
        );
        params.insert("param_prototype_name".into(), text(&self.prototype_name));
        params.insert(
            "param_property_id".into(),
            self.property_id.map_or_else(|| Value::from(""), Value::from),
        );
        params.insert("param_calculator_name".into(), text(&self.calculator_name));
        params.insert(
            "param_visible_for_comparison_only".into(),
            self.visible_for_comparison_only
                .map_or_else(|| Value::from(""), Value::from),
        );
        params.insert("param_limit".into(), Value::from(self.limit));
        params
    }
}

/// Property types, optionally filtered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTypeQuery {
    /// Property type name
    pub name: Option<String>,
}

impl PropertyTypeQuery {
    /// Match every property type
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl CatalogueQuery for PropertyTypeQuery {
    fn resource(&self) -> Resource {
        Resource::PropertyTypes
    }

    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("param_propertytype_name".into(), text(&self.name));
        params
    }
}

/// Calculator types, optionally filtered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatorQuery {
    /// Calculator type name
    pub name: Option<String>,
}

impl CalculatorQuery {
    /// Match every calculator type
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl CatalogueQuery for CalculatorQuery {
    fn resource(&self) -> Resource {
        Resource::Calculators
    }

    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("param_calculator_type_name".into(), text(&self.name));
        params
    }
}
