//! Side-by-side comparison of two listings.
//!
//! The comparison is driven by [`FIELDS`], a table of descriptors. Each
//! descriptor knows how to pull one value out of a [`Property`] (including
//! values nested under `prediction`), whether the field is numeric and which
//! direction counts as better, and how to render the raw value. [`compute`]
//! walks the table and produces one [`FieldComparison`] per row.

use crate::error::ComparisonError;
use crate::format;
use crate::models::{ComparisonPair, Property};
use std::fmt;

/// Which way a numeric field improves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric(Direction),
    /// Compared for equality only
    Text,
}

/// A resolved field value. `Unknown` covers absent optional data.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Unknown,
}

impl FieldValue {
    fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Unknown
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Outcome for one row of the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    ABetter,
    BBetter,
    Tie,
    /// Missing data, or a field with no notion of better
    NonComparable,
}

/// One row of the comparison table
pub struct FieldDescriptor {
    /// Dotted name of the attribute, e.g. `prediction.predicted_price`
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    resolve: fn(&Property) -> FieldValue,
    render: fn(&FieldValue) -> String,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl FieldDescriptor {
    pub fn resolve(&self, property: &Property) -> FieldValue {
        (self.resolve)(property)
    }

    pub fn render(&self, value: &FieldValue) -> String {
        (self.render)(value)
    }

    fn judge(&self, a: &FieldValue, b: &FieldValue) -> Verdict {
        match self.kind {
            FieldKind::Text => match (a, b) {
                (FieldValue::Text(x), FieldValue::Text(y)) if x == y => Verdict::Tie,
                _ => Verdict::NonComparable,
            },
            FieldKind::Numeric(direction) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) if x == y => Verdict::Tie,
                (Some(x), Some(y)) => {
                    let a_lower = x < y;
                    match (direction, a_lower) {
                        (Direction::LowerIsBetter, true) | (Direction::HigherIsBetter, false) => {
                            Verdict::ABetter
                        }
                        _ => Verdict::BBetter,
                    }
                }
                _ => Verdict::NonComparable,
            },
        }
    }
}

fn render_plain(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => format::number(*n),
        FieldValue::Text(s) if !s.is_empty() => s.clone(),
        _ => format::NOT_AVAILABLE.to_string(),
    }
}

fn render_currency(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => format::currency(*n),
        _ => format::NOT_AVAILABLE.to_string(),
    }
}

fn predicted_price(property: &Property) -> FieldValue {
    // The service reports a failed prediction as 0
    match &property.prediction {
        Some(p) if p.predicted_price > 0.0 => FieldValue::number(p.predicted_price),
        _ => FieldValue::Unknown,
    }
}

fn listed_price(property: &Property) -> FieldValue {
    property
        .prediction
        .as_ref()
        .and_then(|p| p.listed_price)
        .map_or(FieldValue::Unknown, FieldValue::number)
}

/// Fields shown in the comparison view, in display order
pub static FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: "title",
        label: "Title",
        kind: FieldKind::Text,
        resolve: |p| FieldValue::Text(p.title.clone()),
        render: render_plain,
    },
    FieldDescriptor {
        key: "location",
        label: "Location",
        kind: FieldKind::Text,
        resolve: |p| FieldValue::Text(p.location.clone()),
        render: render_plain,
    },
    FieldDescriptor {
        key: "price",
        label: "Price",
        kind: FieldKind::Numeric(Direction::LowerIsBetter),
        resolve: |p| FieldValue::number(p.price),
        render: render_currency,
    },
    FieldDescriptor {
        key: "bedrooms",
        label: "Bedrooms",
        kind: FieldKind::Numeric(Direction::HigherIsBetter),
        resolve: |p| FieldValue::Number(f64::from(p.bedrooms)),
        render: render_plain,
    },
    FieldDescriptor {
        key: "bathrooms",
        label: "Bathrooms",
        kind: FieldKind::Numeric(Direction::HigherIsBetter),
        resolve: |p| FieldValue::Number(f64::from(p.bathrooms)),
        render: render_plain,
    },
    FieldDescriptor {
        key: "size",
        label: "Size (sqft)",
        kind: FieldKind::Numeric(Direction::HigherIsBetter),
        resolve: |p| FieldValue::number(p.size),
        render: render_plain,
    },
    FieldDescriptor {
        key: "prediction.predicted_price",
        label: "Predicted Price",
        kind: FieldKind::Numeric(Direction::LowerIsBetter),
        resolve: predicted_price,
        render: render_currency,
    },
    FieldDescriptor {
        key: "prediction.listed_price",
        label: "Listed Price",
        kind: FieldKind::Numeric(Direction::LowerIsBetter),
        resolve: listed_price,
        render: render_currency,
    },
];

/// Look a descriptor up by its dotted key
pub fn descriptor(key: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|d| d.key == key)
}

/// Both resolved values for one field plus the verdict
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparison {
    pub field: &'static FieldDescriptor,
    pub a: FieldValue,
    pub b: FieldValue,
    pub verdict: Verdict,
    /// The two sides hold different values (known or not)
    pub differs: bool,
}

impl FieldComparison {
    pub fn display_a(&self) -> String {
        self.field.render(&self.a)
    }

    pub fn display_b(&self) -> String {
        self.field.render(&self.b)
    }
}

/// Aligned view of two listings
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub first: Property,
    pub second: Property,
    pub fields: Vec<FieldComparison>,
}

impl Comparison {
    pub fn field(&self, key: &str) -> Option<&FieldComparison> {
        self.fields.iter().find(|f| f.field.key == key)
    }

    /// Number of rows each side wins
    pub fn score(&self) -> (usize, usize) {
        self.fields.iter().fold((0, 0), |(a, b), f| match f.verdict {
            Verdict::ABetter => (a + 1, b),
            Verdict::BBetter => (a, b + 1),
            _ => (a, b),
        })
    }
}

/// Compare two listings field by field
pub fn compute(a: &Property, b: &Property) -> Result<Comparison, ComparisonError> {
    if a.id == b.id {
        return Err(ComparisonError::InvalidComparisonInput(format!(
            "both sides are property {}",
            a.id
        )));
    }

    let fields = FIELDS
        .iter()
        .map(|field| {
            let va = field.resolve(a);
            let vb = field.resolve(b);
            FieldComparison {
                verdict: field.judge(&va, &vb),
                differs: va != vb,
                field,
                a: va,
                b: vb,
            }
        })
        .collect();

    Ok(Comparison {
        first: a.clone(),
        second: b.clone(),
        fields,
    })
}

/// Compare a slice that must hold exactly two listings
pub fn compute_records(records: &[Property]) -> Result<Comparison, ComparisonError> {
    match records {
        [a, b] => compute(a, b),
        other => Err(ComparisonError::InvalidComparisonInput(format!(
            "expected 2 properties, got {}",
            other.len()
        ))),
    }
}

pub fn compute_pair(pair: &ComparisonPair) -> Result<Comparison, ComparisonError> {
    compute(&pair.first, &pair.second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, Prediction};

    fn pair() -> (Property, Property) {
        (fixtures::property(1), fixtures::property(2))
    }

    #[test]
    fn lower_price_wins() {
        let (mut a, mut b) = pair();
        a.price = 400_000.0;
        b.price = 350_000.0;

        let result = compute(&a, &b).unwrap();
        assert_eq!(result.field("price").unwrap().verdict, Verdict::BBetter);
    }

    #[test]
    fn more_bedrooms_win() {
        let (mut a, mut b) = pair();
        a.bedrooms = 2;
        b.bedrooms = 3;

        let result = compute(&a, &b).unwrap();
        assert_eq!(result.field("bedrooms").unwrap().verdict, Verdict::BBetter);
        assert_eq!(result.field("price").unwrap().verdict, Verdict::Tie);
    }

    #[test]
    fn larger_size_on_a_wins_for_a() {
        let (mut a, b) = pair();
        a.size = 2_000.0;
        let result = compute(&a, &b).unwrap();
        assert_eq!(result.field("size").unwrap().verdict, Verdict::ABetter);
    }

    #[test]
    fn missing_prediction_is_unknown_not_better() {
        let (a, b) = pair();
        let result = compute(&a, &b).unwrap();

        let row = result.field("prediction.predicted_price").unwrap();
        assert_eq!(row.a, FieldValue::Unknown);
        assert_eq!(row.b, FieldValue::Unknown);
        assert_eq!(row.verdict, Verdict::NonComparable);
        assert!(!row.differs);
        assert_eq!(row.display_a(), "N/A");
    }

    #[test]
    fn one_sided_prediction_is_non_comparable() {
        let (a, b) = pair();
        let b = b.with_prediction(Prediction {
            predicted_price: 300_000.0,
            listed_price: Some(310_000.0),
            model_input: None,
        });

        let result = compute(&a, &b).unwrap();
        let row = result.field("prediction.listed_price").unwrap();
        assert_eq!(row.verdict, Verdict::NonComparable);
        assert!(row.differs);
        assert_eq!(row.display_b(), "$310,000");
    }

    #[test]
    fn both_predictions_compare_lower_is_better() {
        let (a, b) = pair();
        let a = a.with_prediction(Prediction {
            predicted_price: 390_000.4,
            listed_price: None,
            model_input: None,
        });
        let b = b.with_prediction(Prediction {
            predicted_price: 420_000.0,
            listed_price: None,
            model_input: None,
        });

        let result = compute(&a, &b).unwrap();
        let row = result.field("prediction.predicted_price").unwrap();
        assert_eq!(row.verdict, Verdict::ABetter);
        assert_eq!(row.display_a(), "$390,000");
    }

    #[test]
    fn zero_prediction_counts_as_missing() {
        let (a, b) = pair();
        let failed = Prediction {
            predicted_price: 0.0,
            listed_price: Some(400_000.0),
            model_input: None,
        };
        let result = compute(&a.with_prediction(failed.clone()), &b.with_prediction(failed)).unwrap();
        let row = result.field("prediction.predicted_price").unwrap();
        assert_eq!(row.verdict, Verdict::NonComparable);
    }

    #[test]
    fn text_fields_flag_difference_only() {
        let (mut a, b) = pair();
        a.location = "Oakland".to_string();

        let result = compute(&a, &b).unwrap();
        let location = result.field("location").unwrap();
        assert!(location.differs);
        assert_eq!(location.verdict, Verdict::NonComparable);

        let title = result.field("title").unwrap();
        assert!(title.differs);

        // same location on both sides is a tie
        let same = compute(&fixtures::property(3), &fixtures::property(4)).unwrap();
        assert_eq!(same.field("location").unwrap().verdict, Verdict::Tie);
    }

    #[test]
    fn non_finite_numbers_are_unknown() {
        let (mut a, b) = pair();
        a.price = f64::NAN;
        let result = compute(&a, &b).unwrap();
        let price = result.field("price").unwrap();
        assert_eq!(price.a, FieldValue::Unknown);
        assert_eq!(price.verdict, Verdict::NonComparable);
    }

    #[test]
    fn compute_is_deterministic() {
        let (mut a, b) = pair();
        a.price = 410_000.0;
        let first = compute(&a, &b).unwrap();
        let second = compute(&a, &b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_wrong_arity_and_same_record() {
        let (a, b) = pair();
        assert!(matches!(
            compute_records(&[a.clone()]),
            Err(ComparisonError::InvalidComparisonInput(_))
        ));
        assert!(matches!(
            compute_records(&[a.clone(), b.clone(), fixtures::property(3)]),
            Err(ComparisonError::InvalidComparisonInput(_))
        ));
        assert!(matches!(
            compute(&a, &a),
            Err(ComparisonError::InvalidComparisonInput(_))
        ));
        assert!(compute_records(&[a, b]).is_ok());
    }

    #[test]
    fn table_rows_follow_display_order() {
        let (a, b) = pair();
        let result = compute(&a, &b).unwrap();
        let keys: Vec<&str> = result.fields.iter().map(|f| f.field.key).collect();
        assert_eq!(
            keys,
            vec![
                "title",
                "location",
                "price",
                "bedrooms",
                "bathrooms",
                "size",
                "prediction.predicted_price",
                "prediction.listed_price",
            ]
        );
        assert!(descriptor("prediction.listed_price").is_some());
        assert!(descriptor("prediction.model_input").is_none());
    }

    #[test]
    fn score_counts_wins() {
        let (mut a, mut b) = pair();
        a.price = 300_000.0;
        b.bedrooms = 4;
        b.bathrooms = 2;
        let result = compute(&a, &b).unwrap();
        assert_eq!(result.score(), (1, 2));
    }
}
