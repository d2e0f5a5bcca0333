use st_domain::catalog::{Domain, Site};

use crate::report::PromptSource;

/// Pick the system prompt: a non-empty override, else the domain's own
/// prompt, else `fallback`.
pub fn effective_prompt<'a>(
    override_prompt: Option<&'a str>,
    domain: Option<&'a Domain>,
    fallback: &'a str,
) -> (&'a str, PromptSource) {
    if let Some(p) = override_prompt.filter(|p| !p.trim().is_empty()) {
        return (p, PromptSource::Override);
    }
    if let Some(d) = domain {
        return (d.system_prompt.as_str(), PromptSource::Domain);
    }
    (fallback, PromptSource::Fallback)
}

/// Single sentence telling the model which site to focus on.
pub fn site_clause(site: &Site) -> String {
    format!(
        "Focus on data and context specific to {} ({}).",
        site.name, site.location
    )
}

/// Append the site clause unless `site` is absent or the "all sites"
/// sentinel.  Returns whether the prompt was scoped.
pub fn scope_to_site(prompt: &mut String, site: Option<&Site>) -> bool {
    match site {
        Some(site) if !site.is_all_sites() => {
            prompt.push(' ');
            prompt.push_str(&site_clause(site));
            true
        }
        _ => false,
    }
}
