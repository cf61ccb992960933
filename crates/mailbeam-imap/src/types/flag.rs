//! Message flags and mailbox name attributes.

/// A message flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// `\Seen`
    Seen,
    /// `\Answered`
    Answered,
    /// `\Flagged`
    Flagged,
    /// `\Deleted`
    Deleted,
    /// `\Draft`
    Draft,
    /// `\Recent`
    Recent,
    /// `\*` in PERMANENTFLAGS: clients may create new keywords.
    Wildcard,
    /// Any other flag or keyword, with its original spelling.
    Custom(String),
}

impl Flag {
    /// Parses a flag atom (with or without the leading backslash).
    #[must_use]
    pub fn parse(atom: &str) -> Self {
        match atom {
            "\\Seen" => Self::Seen,
            "\\Answered" => Self::Answered,
            "\\Flagged" => Self::Flagged,
            "\\Deleted" => Self::Deleted,
            "\\Draft" => Self::Draft,
            "\\Recent" => Self::Recent,
            "\\*" => Self::Wildcard,
            _ => Self::Custom(atom.to_string()),
        }
    }

    /// Returns the wire spelling of the flag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Wildcard => "\\*",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mailbox name attribute from a LIST/LSUB response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxAttribute {
    /// `\Noselect`
    Noselect,
    /// `\Noinferiors`
    Noinferiors,
    /// `\Marked`
    Marked,
    /// `\Unmarked`
    Unmarked,
    /// `\HasChildren`
    HasChildren,
    /// `\HasNoChildren`
    HasNoChildren,
    /// Any other attribute, with its original spelling.
    Unknown(String),
}

impl MailboxAttribute {
    /// Parses a mailbox attribute atom.
    #[must_use]
    pub fn parse(atom: &str) -> Self {
        match atom {
            "\\Noselect" => Self::Noselect,
            "\\Noinferiors" => Self::Noinferiors,
            "\\Marked" => Self::Marked,
            "\\Unmarked" => Self::Unmarked,
            "\\HasChildren" => Self::HasChildren,
            "\\HasNoChildren" => Self::HasNoChildren,
            _ => Self::Unknown(atom.to_string()),
        }
    }

    /// Returns the wire spelling of the attribute.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Noselect => "\\Noselect",
            Self::Noinferiors => "\\Noinferiors",
            Self::Marked => "\\Marked",
            Self::Unmarked => "\\Unmarked",
            Self::HasChildren => "\\HasChildren",
            Self::HasNoChildren => "\\HasNoChildren",
            Self::Unknown(name) => name,
        }
    }
}

impl std::fmt::Display for MailboxAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parse_standard() {
        assert_eq!(Flag::parse("\\Seen"), Flag::Seen);
        assert_eq!(Flag::parse("\\Deleted"), Flag::Deleted);
        assert_eq!(Flag::parse("\\*"), Flag::Wildcard);
    }

    #[test]
    fn test_flag_parse_keyword() {
        assert_eq!(
            Flag::parse("$Forwarded"),
            Flag::Custom("$Forwarded".to_string())
        );
    }

    #[test]
    fn test_flag_round_trip() {
        for atom in ["\\Seen", "\\Answered", "\\Recent", "\\*", "$Junk"] {
            assert_eq!(Flag::parse(atom).as_str(), atom);
        }
    }

    #[test]
    fn test_attribute_parse() {
        assert_eq!(
            MailboxAttribute::parse("\\HasNoChildren"),
            MailboxAttribute::HasNoChildren
        );
        assert_eq!(
            MailboxAttribute::parse("\\Noselect"),
            MailboxAttribute::Noselect
        );
        assert_eq!(
            MailboxAttribute::parse("\\XSpecial"),
            MailboxAttribute::Unknown("\\XSpecial".to_string())
        );
    }
}
