use crate::types::Profession;
use serde::{Deserialize, Serialize};

/// Step 1: the offer whose price is never discounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalOffer {
    pub profession: Profession,
    pub name: String,
    /// Free text such as "R$ 1.200,00"; never parsed.
    pub price: String,
}

/// Step 2: the low-cost add-on used instead of a discount.
///
/// Prices and installments are free text. Nothing checks that the minimum is
/// below the maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorOffer {
    pub name: String,
    pub price_min: String,
    pub price_max: String,
    #[serde(default)]
    pub installments_min: String,
    #[serde(default)]
    pub installments_max: String,
}

impl AnchorOffer {
    pub fn price_range(&self) -> String {
        format!("{} - {}", self.price_min, self.price_max)
    }

    pub fn installment_range(&self) -> String {
        format!("{} - {}", self.installments_min, self.installments_max)
    }
}

/// Offer data committed so far. A part is present only once its step has
/// been validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<PrincipalOffer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorOffer>,
}

impl OfferRecord {
    pub fn is_empty(&self) -> bool {
        self.principal.is_none() && self.anchor.is_none()
    }

    /// Both parts, once steps 1 and 2 are committed.
    pub fn completed(&self) -> Option<(&PrincipalOffer, &AnchorOffer)> {
        Some((self.principal.as_ref()?, self.anchor.as_ref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> AnchorOffer {
        AnchorOffer {
            name: "Kit de Manutenção".to_string(),
            price_min: "R$ 200,00".to_string(),
            price_max: "R$ 400,00".to_string(),
            installments_min: String::new(),
            installments_max: "6x".to_string(),
        }
    }

    #[test]
    fn ranges_are_joined_verbatim() {
        let a = anchor();
        assert_eq!(a.price_range(), "R$ 200,00 - R$ 400,00");
        assert_eq!(a.installment_range(), " - 6x");
    }

    #[test]
    fn min_above_max_is_kept_as_entered() {
        let mut a = anchor();
        a.price_min = "R$ 900".to_string();
        assert_eq!(a.price_range(), "R$ 900 - R$ 400,00");
    }

    #[test]
    fn completed_needs_both_parts() {
        let mut record = OfferRecord::default();
        assert!(record.is_empty());
        record.anchor = Some(anchor());
        assert!(record.completed().is_none());
        record.principal = Some(PrincipalOffer {
            profession: Profession::Dentist,
            name: "Clareamento Dental".to_string(),
            price: "R$ 1.200,00".to_string(),
        });
        let (principal, anchor) = record.completed().unwrap();
        assert_eq!(principal.name, "Clareamento Dental");
        assert_eq!(anchor.name, "Kit de Manutenção");
    }

    #[test]
    fn empty_record_serializes_without_parts() {
        let json = serde_json::to_string(&OfferRecord::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
