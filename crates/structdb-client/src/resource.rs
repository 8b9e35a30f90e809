//! Catalogue of service endpoints

use std::fmt;
use std::str::FromStr;

/// Versioned API prefix shared by every catalogue endpoint
pub const API_VERSION: &str = "/api/v1.0/";

/// A named resource of the structure database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Comparison types (metrics used to compare properties)
    Comparators,
    /// Crystal prototypes, served by the `generics` endpoint
    Prototypes,
    /// Computed properties with their structures
    Properties,
    /// Property types (e.g., EOS, elastic constants)
    PropertyTypes,
    /// Calculator types
    Calculators,
}

impl Resource {
    /// Every catalogue resource
    pub const ALL: [Resource; 5] = [
        Resource::Comparators,
        Resource::Prototypes,
        Resource::Properties,
        Resource::PropertyTypes,
        Resource::Calculators,
    ];

    /// Endpoint name under [`API_VERSION`]
    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Comparators => "comparisontypes",
            Resource::Prototypes => "generics",
            Resource::Properties => "properties",
            Resource::PropertyTypes => "propertytypes",
            Resource::Calculators => "calculatortypes",
        }
    }

    /// Full request path, e.g. `/api/v1.0/generics`
    pub fn path(&self) -> String {
        format!("{}{}", API_VERSION, self.endpoint())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Error returned when a string names no catalogue resource
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    /// Accepts friendly names, endpoint names and full paths
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .trim()
            .trim_start_matches(API_VERSION)
            .trim_matches('/')
            .to_ascii_lowercase();

        match name.as_str() {
            "comparators" | "comparisontypes" | "comparison_types" => Ok(Resource::Comparators),
            "prototypes" | "generics" => Ok(Resource::Prototypes),
            "properties" => Ok(Resource::Properties),
            "propertytypes" | "property_types" => Ok(Resource::PropertyTypes),
            "calculators" | "calculatortypes" | "calculator_types" => Ok(Resource::Calculators),
            _ => Err(UnknownResource(s.to_string())),
        }
    }
}
