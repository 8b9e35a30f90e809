//! Test utilities and fixtures for structure database client testing

#![allow(dead_code)]

/// Access tokens
pub mod tokens {
    /// A well-formed token
    pub fn valid() -> String {
        "a1b2c3d4-test-token".to_string()
    }
}

/// Service response bodies
pub mod payloads {
    use serde_json::{json, Value};

    /// Four-site fcc aluminium cell in relative coordinates
    pub fn fcc_aluminium() -> Value {
        json!({
            "id": 11,
            "COMPOSITION": "Al-4",
            "OCCUPATION": ["Al", "Al", "Al", "Al"],
            "LATTICE_VECTORS": [[4.05, 0.0, 0.0], [0.0, 4.05, 0.0], [0.0, 0.0, 4.05]],
            "COORDINATES": [[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5]],
            "COORDINATES_TYPE": "relative",
            "MAGNETIC_MOMENTS": [],
            "CHARGES": null,
            "NUMBER_OF_ATOMS": 4,
            "NUMBER_OF_ATOMTYPES": 1,
            "PEARSON": "cF4",
            "SPACEGROUP": 225,
            "GENERICPARENT": {"__entry_type": "GenericEntry", "id": 5}
        })
    }

    /// A properties answer: one EOS property with a child property, a
    /// structure, and a calculator shared by parent and child
    pub fn property_query() -> Value {
        json!({
            "data_dump": [{"__entry_type": "Property", "id": 7}],
            "cache_dump": {
                "Property": {
                    "7": {
                        "id": 7,
                        "NAME": "fcc_eos",
                        "COMPOSITION": "Al-4",
                        "_VALUE": {"a0": 4.05, "B": 76.0},
                        "TYPE_ID": 2,
                        "TYPE": {"__entry_type": "PropertyType", "id": 2},
                        "CALCULATOR_ID": 3,
                        "CALCULATOR": {"__entry_type": "CalculatorType", "id": 3},
                        "ORIGINAL_STRUCTURE": {"__entry_type": "StructureEntry", "id": 11},
                        "CHILDREN": {"relaxed": {"__entry_type": "Property", "id": 8}},
                        "STRUCTURES": {"initial": {"__entry_type": "StructureEntry", "id": 11}}
                    },
                    "8": {
                        "id": 8,
                        "NAME": "fcc_relax",
                        "COMPOSITION": "Al-4",
                        "_VALUE": -14.96,
                        "TYPE": {"__entry_type": "PropertyType", "id": 2},
                        "CALCULATOR": {"__entry_type": "CalculatorType", "id": 3},
                        "CHILDREN": {},
                        "STRUCTURES": {}
                    }
                },
                "PropertyType": {"2": {"id": 2, "NAME": "EOS"}},
                "CalculatorType": {
                    "3": {"id": 3, "NAME": "VASP PBE", "SHORT_NAME": "PBE", "SETTINGS": {"ENCUT": 500}}
                },
                "StructureEntry": {"11": fcc_aluminium()},
                "GenericEntry": {
                    "5": {
                        "id": 5,
                        "COMPOSITION": "A-1",
                        "STRUKTURBERICHT": "A1",
                        "PROTOTYPE_NAME": "fcc",
                        "PROTOTYPE_STRUCTURE": "Cu"
                    }
                }
            }
        })
    }
}
