use url::{Host, Url};

/// Reduce a URL or bare hostname to its registrable domain using the
/// Public Suffix List, e.g. `https://mail.example.co.uk/x` -> `example.co.uk`.
///
/// Internationalized names come back in Unicode form (`bücher.de`), however
/// they were written in the log.
///
/// Returns `None` for IP literals, hosts that are themselves a public
/// suffix, and anything `url` refuses to parse.
pub fn registrable_domain(target: &str) -> Option<String> {
    let host = extract_host(target)?;

    psl::domain(host.as_bytes())
        .map(|root| String::from_utf8_lossy(root.as_bytes()).to_string())
        .filter(|root| !root.is_empty())
        .map(to_unicode)
}

/// Grouping key for a log target: the registrable domain when one can be
/// derived, the raw field otherwise.
pub fn domain_key(target: &str) -> String {
    registrable_domain(target).unwrap_or_else(|| target.to_string())
}

// `url` stores IDN hosts as punycode. A label that fails to decode keeps its
// ASCII form.
fn to_unicode(domain: String) -> String {
    if !domain.split('.').any(|label| label.starts_with("xn--")) {
        return domain;
    }
    match idna::domain_to_unicode(&domain) {
        (unicode, Ok(())) => unicode,
        (_, Err(_)) => domain,
    }
}

fn extract_host(target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }

    let url = if target.contains("://") {
        Url::parse(target).ok()?
    } else {
        // Bare hostnames (optionally with port or path) get a scheme so the
        // parser applies host normalization.
        Url::parse(&format!("http://{}", target)).ok()?
    };

    match url.host()? {
        Host::Domain(domain) => Some(domain.trim_end_matches('.').to_string()),
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}
