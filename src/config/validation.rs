use regex::Regex;
use std::sync::OnceLock;

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

/// Expand `${VAR_NAME}` placeholders using `lookup`; unknown variables are left as-is.
pub fn expand_env_var_in_string<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_placeholder()
        .replace_all(value, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strip trailing slashes so endpoint paths can be appended with a single `/`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_variables() {
        let lookup = |name: &str| (name == "HOST").then(|| "localhost:8080".to_string());
        assert_eq!(
            expand_env_var_in_string("http://${HOST}/v1", lookup),
            "http://localhost:8080/v1"
        );
    }

    #[test]
    fn leaves_unknown_placeholders() {
        assert_eq!(
            expand_env_var_in_string("${MISSING}/x", |_| None),
            "${MISSING}/x"
        );
    }

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(normalize_base_url("https://api.openai.com/v1/"), "https://api.openai.com/v1");
    }
}
