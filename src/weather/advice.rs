use serde::Serialize;

/// Storage-risk tier for a given ambient temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageRisk {
    High,
    Moderate,
    Favorable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageAdvice {
    pub risk: StorageRisk,
    pub message: &'static str,
}

impl StorageRisk {
    /// `> 30` high, `(25, 30]` moderate, `<= 25` favorable.
    pub fn for_temperature(celsius: f64) -> Self {
        if celsius > 30.0 {
            StorageRisk::High
        } else if celsius > 25.0 {
            StorageRisk::Moderate
        } else {
            StorageRisk::Favorable
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StorageRisk::High => {
                "High temperature! Store medicines in cool, dry place below 25°C"
            }
            StorageRisk::Moderate => "Moderate temperature. Ensure medicines are stored properly",
            StorageRisk::Favorable => "Good temperature for medicine storage",
        }
    }
}

impl StorageAdvice {
    pub fn for_temperature(celsius: f64) -> Self {
        let risk = StorageRisk::for_temperature(celsius);
        Self {
            risk,
            message: risk.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers() {
        assert_eq!(StorageRisk::for_temperature(31.0), StorageRisk::High);
        assert_eq!(StorageRisk::for_temperature(27.0), StorageRisk::Moderate);
        assert_eq!(StorageRisk::for_temperature(20.0), StorageRisk::Favorable);
    }

    #[test]
    fn boundaries_fall_to_the_lower_tier() {
        assert_eq!(StorageRisk::for_temperature(30.0), StorageRisk::Moderate);
        assert_eq!(StorageRisk::for_temperature(25.0), StorageRisk::Favorable);
        assert_eq!(StorageRisk::for_temperature(30.1), StorageRisk::High);
        assert_eq!(StorageRisk::for_temperature(25.1), StorageRisk::Moderate);
    }

    #[test]
    fn advice_carries_tier_message() {
        let advice = StorageAdvice::for_temperature(28.0);
        assert_eq!(advice.risk, StorageRisk::Moderate);
        assert_eq!(
            advice.message,
            "Moderate temperature. Ensure medicines are stored properly"
        );
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["risk"], "moderate");
    }
}
