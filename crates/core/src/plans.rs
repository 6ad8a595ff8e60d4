//! Static pricing catalog shown on the plans screen.

use crate::subscription::{Plan, UNLIMITED_LABEL};

/// One purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOffer {
    pub plan: Plan,
    /// Monthly price in whole US dollars.
    pub price_usd: u32,
    /// Validations per month, `None` for unlimited.
    pub validations: Option<u32>,
    pub features: &'static [&'static str],
    /// Highlighted as the most popular choice.
    pub popular: bool,
}

impl PlanOffer {
    pub fn validations_label(&self) -> String {
        match self.validations {
            Some(n) => n.to_string(),
            None => UNLIMITED_LABEL.to_string(),
        }
    }
}

pub const PLAN_CATALOG: &[PlanOffer] = &[
    PlanOffer {
        plan: Plan::Starter,
        price_usd: 29,
        validations: Some(100),
        features: &[
            "100 validations per month",
            "Reddit + Twitter + LinkedIn analysis",
            "Detailed insights & recommendations",
            "Email notifications",
            "Basic support",
        ],
        popular: false,
    },
    PlanOffer {
        plan: Plan::Pro,
        price_usd: 79,
        validations: Some(500),
        features: &[
            "500 validations per month",
            "Everything in Starter",
            "Priority email support",
            "API access",
            "Export reports (PDF/CSV)",
            "Custom branding",
        ],
        popular: true,
    },
    PlanOffer {
        plan: Plan::Enterprise,
        price_usd: 199,
        validations: None,
        features: &[
            "Unlimited validations",
            "Everything in Pro",
            "Dedicated account manager",
            "Custom integrations",
            "SLA guarantee",
            "White-label option",
        ],
        popular: false,
    },
];

/// Look up the catalog entry for a plan.
pub fn offer_for(plan: Plan) -> Option<&'static PlanOffer> {
    PLAN_CATALOG.iter().find(|offer| offer.plan == plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_plan_has_an_offer() {
        for plan in [Plan::Starter, Plan::Pro, Plan::Enterprise] {
            assert!(offer_for(plan).is_some(), "missing offer for {plan}");
        }
    }

    #[test]
    fn exactly_one_popular_plan() {
        let popular: Vec<_> = PLAN_CATALOG.iter().filter(|o| o.popular).collect();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].plan, Plan::Pro);
    }

    #[test]
    fn enterprise_is_unlimited() {
        let offer = offer_for(Plan::Enterprise).unwrap();
        assert_eq!(offer.validations_label(), "Unlimited");
        assert_eq!(offer_for(Plan::Starter).unwrap().validations_label(), "100");
    }
}
