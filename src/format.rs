//! Display helpers. Nothing in the core depends on these; they turn raw
//! values into the strings the terminal front end prints.

use crate::models::Property;

pub const NOT_AVAILABLE: &str = "N/A";

/// Cards list this many amenities before collapsing the rest into `+N`
pub const CARD_AMENITIES: usize = 3;

/// Group the integer part of `value` with `,` every three digits
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$1,234,568`, rounded to whole currency units
pub fn currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("${}", thousands(value.round() as i64))
}

/// Whole numbers print without a fraction, everything else with one decimal
pub fn number(value: f64) -> String {
    if !value.is_finite() {
        NOT_AVAILABLE.to_string()
    } else if value.fract() == 0.0 {
        thousands(value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// First `limit` amenities plus a `+N` marker for the remainder
pub fn amenity_summary(amenities: &[String], limit: usize) -> String {
    let mut shown: Vec<String> = amenities.iter().take(limit).cloned().collect();
    let rest = amenities.len().saturating_sub(limit);
    if rest > 0 {
        shown.push(format!("+{}", rest));
    }
    shown.join(", ")
}

/// One-line card used by list views
pub fn property_card(property: &Property) -> String {
    let mut line = format!(
        "#{} {} | {} | {} | {} bd / {} ba | {} sqft",
        property.id,
        property.title,
        property.location,
        currency(property.price),
        property.bedrooms,
        property.bathrooms,
        number(property.size),
    );
    if !property.amenities.is_empty() {
        line.push_str(" | ");
        line.push_str(&amenity_summary(&property.amenities, CARD_AMENITIES));
    }
    if let Some(prediction) = &property.prediction {
        line.push_str(&format!(" | predicted {}", currency(prediction.predicted_price)));
        if let Some(listed) = prediction.listed_price {
            line.push_str(&format!(" (listed {})", currency(listed)));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
        assert_eq!(thousands(-45_000), "-45,000");
    }

    #[test]
    fn rounds_currency() {
        assert_eq!(currency(512_345.6), "$512,346");
        assert_eq!(currency(f64::NAN), NOT_AVAILABLE);
    }

    #[test]
    fn formats_plain_numbers() {
        assert_eq!(number(1500.0), "1,500");
        assert_eq!(number(2.5), "2.5");
    }

    #[test]
    fn collapses_extra_amenities() {
        let amenities: Vec<String> = ["Pool", "Garage", "Garden", "Gym", "Sauna"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(amenity_summary(&amenities, 3), "Pool, Garage, Garden, +2");
        assert_eq!(amenity_summary(&amenities[..2], 3), "Pool, Garage");
        assert_eq!(amenity_summary(&[], 3), "");
    }

    #[test]
    fn card_mentions_price_and_id() {
        let card = property_card(&fixtures::property(12));
        assert!(card.starts_with("#12 Listing 12"));
        assert!(card.contains("$400,000"));
        assert!(card.contains("Garage"));
    }
}
