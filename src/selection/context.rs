//! Per-request preference input.

use std::fmt;

/// Channel through which a request can ask for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceSource {
    /// Request (query/form) parameter.
    Param,
    Cookie,
    Header,
}

impl PreferenceSource {
    /// Sources in priority order.
    pub const ALL: [PreferenceSource; 3] = [Self::Param, Self::Cookie, Self::Header];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Param => "req",
            Self::Cookie => "cookie",
            Self::Header => "header",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Param => 0,
            Self::Cookie => 1,
            Self::Header => 2,
        }
    }
}

impl fmt::Display for PreferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the request asked for, plus who sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceContext {
    /// Resolved client address.
    pub client_ip: String,
    prefs: [Vec<String>; 3],
}

impl PreferenceContext {
    pub fn new(client_ip: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            prefs: Default::default(),
        }
    }

    /// Append one requested host for `source`.
    pub fn push(&mut self, source: PreferenceSource, host: impl Into<String>) {
        self.prefs[source.index()].push(host.into());
    }

    /// Builder form of [`push`](Self::push) for several hosts.
    pub fn with<I, S>(mut self, source: PreferenceSource, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefs[source.index()].extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Requested hosts for `source`, in request order.
    pub fn hosts(&self, source: PreferenceSource) -> &[String] {
        &self.prefs[source.index()]
    }

    /// True if no source carries any host.
    pub fn has_preferences(&self) -> bool {
        self.prefs.iter().any(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_kept_apart() {
        let mut ctx = PreferenceContext::new("10.0.0.1").with(PreferenceSource::Cookie, ["b"]);
        ctx.push(PreferenceSource::Header, "c");
        ctx.push(PreferenceSource::Header, "d");

        assert!(ctx.hosts(PreferenceSource::Param).is_empty());
        assert_eq!(ctx.hosts(PreferenceSource::Cookie), ["b"]);
        assert_eq!(ctx.hosts(PreferenceSource::Header), ["c", "d"]);
        assert!(ctx.has_preferences());
        assert!(!PreferenceContext::new("10.0.0.1").has_preferences());
    }

    #[test]
    fn test_source_order_and_names() {
        let names: Vec<_> = PreferenceSource::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["req", "cookie", "header"]);
    }
}
