//! Cooking unit conversion.
//!
//! Every unit maps to a factor in one shared base: milliliters for volume,
//! grams for weight. The two families share the table and are not kept
//! apart, so a volume-to-weight request converts as if the ingredient had
//! the density of water.

use std::collections::BTreeSet;

/// Factor of each unit in the base unit.
const FACTORS: &[(&str, f64)] = &[
    ("teaspoon", 4.929),
    ("tsp", 4.929),
    ("tablespoon", 14.787),
    ("tbsp", 14.787),
    ("fluid_ounce", 29.574),
    ("fl_oz", 29.574),
    ("cup", 236.588),
    ("pint", 473.176),
    ("quart", 946.353),
    ("gallon", 3785.41),
    ("liter", 1000.0),
    ("l", 1000.0),
    ("milliliter", 1.0),
    ("ml", 1.0),
    ("ounce", 28.35),
    ("oz", 28.35),
    ("pound", 453.592),
    ("lb", 453.592),
    ("gram", 1.0),
    ("g", 1.0),
    ("kilogram", 1000.0),
    ("kg", 1000.0),
];

/// Spoken and plural forms mapped to a unit name.
///
/// Bare "ounce" is read as a fluid ounce, since kitchen questions about
/// ounces are almost always about liquids.
const SYNONYMS: &[(&str, &str)] = &[
    ("cups", "cup"),
    ("tablespoons", "tablespoon"),
    ("teaspoons", "teaspoon"),
    ("milliliters", "milliliter"),
    ("millilitres", "milliliter"),
    ("millilitre", "milliliter"),
    ("liters", "liter"),
    ("litres", "liter"),
    ("litre", "liter"),
    ("gallons", "gallon"),
    ("fl oz", "fl oz"),
    ("floz", "fl oz"),
    ("ounces", "fl oz"),
    ("ounce", "fl oz"),
    ("fluid ounce", "fluid_ounce"),
    ("fluid ounces", "fluid_ounce"),
    ("pints", "pint"),
    ("quarts", "quart"),
    ("grams", "gram"),
    ("kilograms", "kilogram"),
    ("pounds", "pound"),
    ("lbs", "lb"),
];

/// Canonical spelling of a spoken unit token.
///
/// Lower-cases, collapses inner whitespace and resolves plurals and synonyms.
/// Unknown tokens come back lower-cased and otherwise untouched.
pub fn canonical_unit(token: &str) -> String {
    let spoken = token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == spoken)
        .map_or(spoken, |(_, unit)| (*unit).to_string())
}

/// Table key for a unit token: canonical form with spaces as underscores.
fn table_key(token: &str) -> String {
    canonical_unit(token).replace(' ', "_")
}

fn factor(token: &str) -> Option<f64> {
    let key = table_key(token);
    FACTORS.iter().find(|(unit, _)| *unit == key).map(|(_, f)| *f)
}

/// Every supported unit name, sorted, with underscores shown as spaces.
pub fn supported_units() -> Vec<String> {
    FACTORS
        .iter()
        .map(|(unit, _)| unit.replace('_', " "))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from_unit: String,
    pub to_unit: String,
    /// Full precision result.
    pub converted_amount: f64,
}

impl Conversion {
    /// `"2 cup = 32.00 tablespoon"`
    pub fn display(&self) -> String {
        format!(
            "{} {} = {:.2} {}",
            format_amount(self.amount),
            self.from_unit,
            self.converted_amount,
            self.to_unit
        )
    }
}

/// Conversion outcome. A unit miss is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted(Conversion),
    UnsupportedUnit { supported: Vec<String> },
}

impl ConversionOutcome {
    pub fn unsupported_message(supported: &[String]) -> String {
        format!("Unit not supported. Available units: {}", supported.join(", "))
    }
}

/// Convert `amount` of `from_unit` into `to_unit`.
pub fn convert(amount: f64, from_unit: &str, to_unit: &str) -> ConversionOutcome {
    match (factor(from_unit), factor(to_unit)) {
        (Some(from), Some(to)) => ConversionOutcome::Converted(Conversion {
            amount,
            from_unit: from_unit.to_string(),
            to_unit: to_unit.to_string(),
            converted_amount: amount * from / to,
        }),
        _ => ConversionOutcome::UnsupportedUnit {
            supported: supported_units(),
        },
    }
}

/// Render an amount without a trailing `.0` for whole numbers.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{amount:.0}")
    } else {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converted(outcome: ConversionOutcome) -> Conversion {
        match outcome {
            ConversionOutcome::Converted(c) => c,
            ConversionOutcome::UnsupportedUnit { .. } => panic!("unexpected unsupported unit"),
        }
    }

    #[test]
    fn test_cups_to_tablespoons() {
        let c = converted(convert(2.0, "cup", "tablespoon"));
        assert!((c.converted_amount - 31.9988).abs() < 1e-3);
        assert_eq!(c.display(), "2 cup = 32.00 tablespoon");
    }

    #[test]
    fn test_synonyms_and_spacing_normalize() {
        let c = converted(convert(1.0, "Cups", "fl  oz"));
        assert!((c.converted_amount - 8.0).abs() < 0.01);
        assert!(matches!(convert(1.0, "fluid ounce", "ml"), ConversionOutcome::Converted(_)));
        assert!(matches!(convert(3.0, "Pounds", "grams"), ConversionOutcome::Converted(_)));
    }

    #[test]
    fn test_canonical_unit() {
        assert_eq!(canonical_unit("cups"), "cup");
        assert_eq!(canonical_unit("Ounces"), "fl oz");
        assert_eq!(canonical_unit("fl   oz"), "fl oz");
        assert_eq!(canonical_unit("ml"), "ml");
        assert_eq!(canonical_unit("smidgen"), "smidgen");
    }

    #[test]
    fn test_unsupported_unit_lists_all_units() {
        let ConversionOutcome::UnsupportedUnit { supported } = convert(1.0, "smidgen", "cup") else {
            panic!("smidgen should not convert");
        };
        assert!(supported.contains(&"fl oz".to_string()));
        assert!(supported.contains(&"kg".to_string()));
        let mut sorted = supported.clone();
        sorted.sort();
        assert_eq!(sorted, supported);

        let message = ConversionOutcome::unsupported_message(&supported);
        assert!(message.starts_with("Unit not supported. Available units: "));
    }

    #[test]
    fn test_volume_to_weight_uses_shared_table() {
        let c = converted(convert(1.0, "cup", "gram"));
        assert!((c.converted_amount - 236.588).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_law() {
        let units: Vec<&str> = FACTORS.iter().map(|(u, _)| *u).collect();
        for &a in &[0.25, 1.0, 3.5, 250.0] {
            for from in &units {
                for to in &units {
                    let there = converted(convert(a, from, to));
                    let back = converted(convert(there.converted_amount, to, from));
                    assert!(
                        (back.converted_amount - a).abs() < 1e-9 * a.max(1.0),
                        "{a} {from} -> {to} -> {from} gave {}",
                        back.converted_amount
                    );
                }
            }
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2.0), "2");
        assert_eq!(format_amount(1.5), "1.5");
    }
}
