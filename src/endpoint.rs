use crate::config::DEFAULT_API_BASE_URL;
use crate::credentials::Credentials;

const API_VERSION_SUFFIX: &str = "/v1";

pub fn resolve_endpoint(credentials: &Credentials) -> String {
    match credentials
        .resource_url
        .as_deref()
        .filter(|url| !url.is_empty())
    {
        Some(resource_url) => normalize_resource_url(resource_url),
        None => DEFAULT_API_BASE_URL.to_string(),
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) followed by "://".
fn has_scheme(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn normalize_resource_url(resource_url: &str) -> String {
    let mut endpoint = if has_scheme(resource_url) {
        resource_url.to_string()
    } else {
        format!("https://{resource_url}")
    };

    if !endpoint.ends_with(API_VERSION_SUFFIX) {
        if endpoint.ends_with('/') {
            endpoint.push_str("v1");
        } else {
            endpoint.push_str(API_VERSION_SUFFIX);
        }
    }
    endpoint
}

pub fn chat_completions_url(endpoint: &str) -> String {
    format!("{endpoint}/chat/completions")
}
