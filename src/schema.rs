//! Feature schema shared by the form renderer and the record builders.
//!
//! `feature` is always the column name the model was trained on; the form
//! posts values under that same key so the two can never drift apart.

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Text {
        placeholder: &'static str,
    },
    Integer {
        min: i64,
        max: Option<i64>,
        step: i64,
        default: i64,
    },
    Radio {
        choices: &'static [&'static str],
    },
    Select {
        choices: &'static [&'static str],
    },
    MultiSelect {
        choices: &'static [&'static str],
    },
    Slider {
        min: i64,
        max: i64,
        step: i64,
        default: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub feature: &'static str,
    pub label: &'static str,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub id: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn feature_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.feature).collect()
    }

    pub fn field(&self, feature: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.feature == feature)
    }
}

// ---------- Shared controls ----------

const TRANSMISSIONS: &[&str] = &["Automatic", "Manual"];
const DRIVEN_WHEELS: &[&str] = &["Rear Wheel Drive", "All Wheel Drive", "Front Wheel Drive"];
const VEHICLE_SIZES: &[&str] = &["Compact", "Midsize", "Large"];
const VEHICLE_STYLES: &[&str] = &[
    "Sedan",
    "SUV",
    "Coupe",
    "Wagon",
    "Convertible",
    "Hatchback",
    "Truck",
    "Van",
];

const YEAR: FieldSpec = FieldSpec {
    feature: "Year",
    label: "Year of Manufacture",
    control: Control::Integer { min: 1900, max: Some(2024), step: 1, default: 2022 },
};

const ENGINE_CYLINDERS: FieldSpec = FieldSpec {
    feature: "Engine Cylinders",
    label: "Number of Engine Cylinders",
    control: Control::Integer { min: 2, max: Some(12), step: 1, default: 4 },
};

const TRANSMISSION_TYPE: FieldSpec = FieldSpec {
    feature: "Transmission Type",
    label: "Transmission Type",
    control: Control::Radio { choices: TRANSMISSIONS },
};

const VEHICLE_SIZE: FieldSpec = FieldSpec {
    feature: "Vehicle Size",
    label: "Vehicle Size",
    control: Control::Select { choices: VEHICLE_SIZES },
};

const HIGHWAY_MPG: FieldSpec = FieldSpec {
    feature: "highway MPG",
    label: "Highway Miles per Gallon (MPG)",
    control: Control::Integer { min: 0, max: None, step: 1, default: 40 },
};

const CITY_MPG: FieldSpec = FieldSpec {
    feature: "city mpg",
    label: "City Miles per Gallon (MPG)",
    control: Control::Integer { min: 0, max: None, step: 1, default: 30 },
};

const MSRP: FieldSpec = FieldSpec {
    feature: "MSRP",
    label: "Manufacturer's Suggested Retail Price (MSRP)",
    control: Control::Integer { min: 0, max: None, step: 1000, default: 35000 },
};

// ---------- Forms ----------

pub const FUEL_TYPE_FORM: FormSchema = FormSchema {
    id: "fuel-type",
    fields: &[
        FieldSpec {
            feature: "Make",
            label: "Make (e.g., BMW, Toyota)",
            control: Control::Text { placeholder: "Enter the vehicle manufacturer" },
        },
        FieldSpec {
            feature: "Model",
            label: "Model (e.g., 3 Series, Corolla)",
            control: Control::Text { placeholder: "Enter the vehicle model" },
        },
        YEAR,
        FieldSpec {
            feature: "Engine HP",
            label: "Engine Horsepower (HP)",
            control: Control::Integer { min: 0, max: None, step: 10, default: 180 },
        },
        ENGINE_CYLINDERS,
        TRANSMISSION_TYPE,
        // underscore spelling is what the fuel model was trained on
        FieldSpec {
            feature: "Driven_Wheels",
            label: "Driven Wheels",
            control: Control::Radio { choices: DRIVEN_WHEELS },
        },
        FieldSpec {
            feature: "Number of Doors",
            label: "Number of Doors",
            control: Control::Slider { min: 2, max: 4, step: 2, default: 4 },
        },
        FieldSpec {
            feature: "Market Category",
            label: "Market Category (e.g., Luxury, Performance)",
            control: Control::Text { placeholder: "" },
        },
        VEHICLE_SIZE,
        FieldSpec {
            feature: "Vehicle Style",
            label: "Vehicle Style",
            control: Control::Select { choices: VEHICLE_STYLES },
        },
        HIGHWAY_MPG,
        CITY_MPG,
        FieldSpec {
            feature: "Popularity",
            label: "Popularity Index",
            control: Control::Integer { min: 0, max: None, step: 100, default: 3000 },
        },
        MSRP,
    ],
};

pub const ENGINE_HP_FORM: FormSchema = FormSchema {
    id: "engine-hp",
    fields: &[
        YEAR,
        ENGINE_CYLINDERS,
        TRANSMISSION_TYPE,
        VEHICLE_SIZE,
        HIGHWAY_MPG,
        CITY_MPG,
        MSRP,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_type_features_in_training_order() {
        assert_eq!(
            FUEL_TYPE_FORM.feature_names(),
            vec![
                "Make",
                "Model",
                "Year",
                "Engine HP",
                "Engine Cylinders",
                "Transmission Type",
                "Driven_Wheels",
                "Number of Doors",
                "Market Category",
                "Vehicle Size",
                "Vehicle Style",
                "highway MPG",
                "city mpg",
                "Popularity",
                "MSRP",
            ]
        );
    }

    #[test]
    fn engine_hp_features() {
        assert_eq!(
            ENGINE_HP_FORM.feature_names(),
            vec![
                "Year",
                "Engine Cylinders",
                "Transmission Type",
                "Vehicle Size",
                "highway MPG",
                "city mpg",
                "MSRP",
            ]
        );
    }

    #[test]
    fn integer_defaults_sit_inside_bounds() {
        for schema in [&FUEL_TYPE_FORM, &ENGINE_HP_FORM] {
            for field in schema.fields {
                match field.control {
                    Control::Integer { min, max, default, .. } => {
                        assert!(default >= min, "{}", field.feature);
                        assert!(max.map_or(true, |m| default <= m), "{}", field.feature);
                    }
                    Control::Slider { min, max, step, default } => {
                        assert!((min..=max).contains(&default));
                        assert_eq!((default - min) % step, 0);
                    }
                    _ => {}
                }
            }
        }
    }
}
