#![forbid(unsafe_code)]

/// Which browsing context owns the options panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostTarget {
    /// `window.parent`: the module runs in an iframe of the embedding page.
    #[default]
    Parent,
    /// The module's own window.
    Window,
}

impl HostTarget {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Window => "window",
        }
    }

    /// Parse `"parent"` or `"window"`, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" => Some(Self::Parent),
            "window" | "self" => Some(Self::Window),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_parent_frame() {
        assert_eq!(HostTarget::default(), HostTarget::Parent);
    }

    #[test]
    fn parse_accepts_known_names() {
        assert_eq!(HostTarget::parse(" Parent "), Some(HostTarget::Parent));
        assert_eq!(HostTarget::parse("self"), Some(HostTarget::Window));
        assert_eq!(HostTarget::parse("WINDOW"), Some(HostTarget::Window));
        assert_eq!(HostTarget::parse("top"), None);
    }

    #[test]
    fn as_str_parses_back() {
        for target in [HostTarget::Parent, HostTarget::Window] {
            assert_eq!(HostTarget::parse(target.as_str()), Some(target));
        }
    }
}
