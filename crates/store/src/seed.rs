//! Built-in catalog used when no snapshot exists yet.

use st_domain::catalog::{Domain, Endpoint, EndpointKind, Settings, Site};

use crate::catalog::CatalogData;

/// The catalog a fresh deployment starts with.
pub fn default_catalog() -> CatalogData {
    CatalogData {
        domains: default_domains(),
        sites: default_sites(),
        endpoints: default_endpoints(),
        settings: Settings::default(),
    }
}

fn domain(id: &str, name: &str, description: &str, prompt: &str, icon: &str) -> Domain {
    Domain {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        system_prompt: prompt.into(),
        icon: Some(icon.into()),
    }
}

pub fn default_domains() -> Vec<Domain> {
    vec![
        domain(
            "generic",
            "General Assistant",
            "General-purpose assistant for the whole business",
            "You are a helpful AI assistant for a global mining company. Give accurate, professional answers.",
            "Bot",
        ),
        domain(
            "mining-ops",
            "Mining Operations",
            "Production, equipment, and day-to-day mine operations",
            "You are a mining operations specialist. Help with production optimization, equipment management, and operational efficiency.",
            "Pickaxe",
        ),
        domain(
            "geological",
            "Geological Services",
            "Geological analysis, exploration, and resource estimation",
            "You are a geological services expert. Assist with geological analysis, exploration planning, and resource estimation.",
            "Mountain",
        ),
        domain(
            "processing",
            "Mineral Processing",
            "Processing plants, throughput, and recovery",
            "You are a mineral processing specialist. Help optimize plant operations, throughput, and recovery rates.",
            "Factory",
        ),
        domain(
            "sustainability",
            "Sustainability & ESG",
            "Environmental, social, and governance initiatives",
            "You are a sustainability and ESG advisor. Assist with environmental compliance, social responsibility, and governance reporting.",
            "Leaf",
        ),
        domain(
            "supply-chain",
            "Supply Chain",
            "Logistics, procurement, and vendor management",
            "You are a supply chain specialist. Help with logistics optimization, procurement, and vendor management.",
            "Truck",
        ),
        domain(
            "finance",
            "Finance & Analytics",
            "Financial analysis and business analytics",
            "You are a finance and analytics specialist. Assist with financial analysis, budgeting, and business intelligence.",
            "BarChart3",
        ),
    ]
}

fn site(id: &str, name: &str, location: &str, kind: &str) -> Site {
    Site {
        id: id.into(),
        name: name.into(),
        location: location.into(),
        kind: kind.into(),
    }
}

pub fn default_sites() -> Vec<Site> {
    vec![
        site("all-sites", "All Sites", "Global", "Corporate"),
        site("kumba", "Kumba Iron Ore", "South Africa", "Iron Ore"),
        site("sishen", "Sishen Mine", "Northern Cape, South Africa", "Iron Ore"),
        site("mogalakwena", "Mogalakwena", "Limpopo, South Africa", "PGMs"),
        site("unki", "Unki Mine", "Zimbabwe", "PGMs"),
        site("amandelbult", "Amandelbult", "Limpopo, South Africa", "PGMs"),
        site("quellaveco", "Quellaveco", "Peru", "Copper"),
        site("minas-rio", "Minas-Rio", "Brazil", "Iron Ore"),
        site("los-bronces", "Los Bronces", "Chile", "Copper"),
        site("moranbah", "Moranbah", "Queensland, Australia", "Metallurgical Coal"),
        site("sakatti", "Sakatti", "Finland", "Copper-Nickel"),
        site("woodsmith", "Woodsmith", "UK", "Polyhalite"),
    ]
}

pub fn default_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            id: "databricks-dbrx-instruct".into(),
            name: "DBRX Instruct".into(),
            description: "Fast, capable general-purpose foundation model".into(),
            kind: EndpointKind::Foundation,
            is_default: true,
            domain_id: None,
        },
        Endpoint {
            id: "databricks-llama-3-70b".into(),
            name: "Llama 3 70B".into(),
            description: "Meta Llama 3 70B Instruct".into(),
            kind: EndpointKind::Foundation,
            is_default: false,
            domain_id: None,
        },
        Endpoint {
            id: "databricks-mixtral-8x7b".into(),
            name: "Mixtral 8x7B".into(),
            description: "Mistral AI mixture-of-experts model".into(),
            kind: EndpointKind::Foundation,
            is_default: false,
            domain_id: None,
        },
    ]
}
