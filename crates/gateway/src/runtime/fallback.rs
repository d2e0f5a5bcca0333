//! Local replies used when no model answers.
//!
//! Deterministic: the same inputs always give the same text.  Every reply
//! says plainly that the model could not be reached.

use st_domain::catalog::{Domain, Site};

pub struct FallbackInput<'a> {
    pub message: &'a str,
    /// Catalog display name, or the raw endpoint id when uncataloged.
    pub endpoint_name: &'a str,
    pub domain: Option<&'a Domain>,
    pub site: Option<&'a Site>,
    pub prior_messages: usize,
}

/// What a domain specialist would normally draw on, keyed by domain id.
fn specialty(domain_id: &str) -> Option<(&'static str, &'static str)> {
    let entry = match domain_id {
        "mining-ops" => (
            "Mining Operations assistant",
            "With live access I would draw on equipment telemetry, shift reports, and safety \
             metrics to help with production schedules, bottlenecks, and KPI tracking.",
        ),
        "geological" => (
            "Geological Services assistant",
            "With live access I would work from your drill hole, assay, and mapping data to \
             support ore body modelling and grade estimation.",
        ),
        "processing" => (
            "Mineral Processing specialist",
            "With live access I would read plant control data to look at throughput, \
             recovery, and processing parameters.",
        ),
        "sustainability" => (
            "Sustainability & ESG advisor",
            "With live access I would use your monitoring systems for emissions, water use, \
             community impact, and ESG reporting.",
        ),
        "supply-chain" => (
            "Supply Chain analyst",
            "With live access I would connect to ERP and logistics data for inventory, \
             vendor performance, routing, and procurement questions.",
        ),
        "finance" => (
            "Finance & Analytics assistant",
            "With live access I would query financial systems for cost analysis, forecasts, \
             capital allocation, and financial KPIs.",
        ),
        _ => return None,
    };
    Some(entry)
}

pub fn fallback_reply(input: &FallbackInput<'_>) -> String {
    let site = input.site.filter(|s| !s.is_all_sites());

    let mut reply = match input.domain.and_then(|d| specialty(&d.id)) {
        Some((role, capability)) => format!(
            "As your {role}, I could not reach the {endpoint} model just now, so this is a \
             local reply.\n\nRegarding \"{message}\":\n\n{capability}",
            endpoint = input.endpoint_name,
            message = input.message,
        ),
        None => {
            let area = input.domain.map_or("General", |d| d.name.as_str());
            format!(
                "The {endpoint} model could not be reached just now, so this is a local reply \
                 for your {area} question.\n\nYou asked: \"{message}\"\n\nOnce the model \
                 endpoint is available, answers will use domain-specific context.",
                endpoint = input.endpoint_name,
                message = input.message,
            )
        }
    };

    match (input.prior_messages, site) {
        (0, None) => {}
        (0, Some(site)) => reply.push_str(&format!("\n\n*Focused on {}.*", site.name)),
        (n, None) => reply.push_str(&format!(
            "\n\n*{n} previous message(s) in this conversation are available as context.*"
        )),
        (n, Some(site)) => reply.push_str(&format!(
            "\n\n*{n} previous message(s) in this conversation are available as context \
             (focused on {}).*",
            site.name
        )),
    }

    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(id: &str, name: &str) -> Domain {
        Domain {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            system_prompt: String::new(),
            icon: None,
        }
    }

    fn site(id: &str, name: &str) -> Site {
        Site {
            id: id.into(),
            name: name.into(),
            location: "x".into(),
            kind: "y".into(),
        }
    }

    #[test]
    fn domain_template_mentions_message_and_endpoint() {
        let d = domain("mining-ops", "Mining Operations");
        let reply = fallback_reply(&FallbackInput {
            message: "Equipment availability?",
            endpoint_name: "DBRX Instruct",
            domain: Some(&d),
            site: None,
            prior_messages: 0,
        });
        assert!(reply.contains("Mining Operations assistant"));
        assert!(reply.contains("Equipment availability?"));
        assert!(reply.contains("DBRX Instruct"));
        assert!(!reply.contains("previous message"));
    }

    #[test]
    fn unknown_domain_uses_generic_template_with_its_name() {
        let d = domain("legal", "Legal");
        let reply = fallback_reply(&FallbackInput {
            message: "q",
            endpoint_name: "gpt-4-turbo",
            domain: Some(&d),
            site: None,
            prior_messages: 0,
        });
        assert!(reply.contains("Legal question"));
        assert!(reply.contains("gpt-4-turbo"));
    }

    #[test]
    fn prior_count_and_site_are_mentioned() {
        let s = site("kumba", "Kumba Iron Ore");
        let reply = fallback_reply(&FallbackInput {
            message: "q",
            endpoint_name: "e",
            domain: None,
            site: Some(&s),
            prior_messages: 4,
        });
        assert!(reply.contains("4 previous message(s)"));
        assert!(reply.contains("Kumba Iron Ore"));
    }

    #[test]
    fn all_sites_sentinel_is_not_mentioned() {
        let s = site("all-sites", "All Sites");
        let reply = fallback_reply(&FallbackInput {
            message: "q",
            endpoint_name: "e",
            domain: None,
            site: Some(&s),
            prior_messages: 0,
        });
        assert!(!reply.contains("All Sites"));
    }

    #[test]
    fn deterministic() {
        let input = FallbackInput {
            message: "same",
            endpoint_name: "e",
            domain: None,
            site: None,
            prior_messages: 2,
        };
        assert_eq!(fallback_reply(&input), fallback_reply(&input));
    }
}
