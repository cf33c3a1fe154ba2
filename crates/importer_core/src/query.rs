use std::fmt;
use std::time::Duration;

/// How an element is located on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
    Id(String),
    ClassName(String),
    TagName(String),
}

impl Locator {
    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::XPath(value.into())
    }

    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Locator::ClassName(value.into())
    }

    pub fn tag_name(value: impl Into<String>) -> Self {
        Locator::TagName(value.into())
    }

    /// Equivalent CSS selector, when one exists.
    pub fn to_css(&self) -> Option<String> {
        match self {
            Locator::Css(css) => Some(css.clone()),
            Locator::Id(id) => Some(format!("[id=\"{}\"]", id.replace('"', "\\\""))),
            Locator::ClassName(class) => Some(format!(".{class}")),
            Locator::TagName(tag) => Some(tag.clone()),
            Locator::XPath(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(v) => write!(f, "css `{v}`"),
            Locator::XPath(v) => write!(f, "xpath `{v}`"),
            Locator::Id(v) => write!(f, "id `{v}`"),
            Locator::ClassName(v) => write!(f, "class `{v}`"),
            Locator::TagName(v) => write!(f, "tag `{v}`"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// At least one matching element exists.
    Present,
    /// Same as `Present`, but every match is returned.
    AllPresent,
    /// The first match exists and can receive a click.
    Clickable,
}

/// Immutable description of what the wait engine polls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementQuery {
    pub locator: Locator,
    pub timeout: Duration,
    pub condition: WaitCondition,
}

impl ElementQuery {
    pub fn present(locator: Locator, timeout: Duration) -> Self {
        Self {
            locator,
            timeout,
            condition: WaitCondition::Present,
        }
    }

    pub fn all(locator: Locator, timeout: Duration) -> Self {
        Self {
            locator,
            timeout,
            condition: WaitCondition::AllPresent,
        }
    }

    pub fn clickable(locator: Locator, timeout: Duration) -> Self {
        Self {
            locator,
            timeout,
            condition: WaitCondition::Clickable,
        }
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let condition = match self.condition {
            WaitCondition::Present => "present",
            WaitCondition::AllPresent => "all present",
            WaitCondition::Clickable => "clickable",
        };
        write!(f, "{} ({condition}, {:?})", self.locator, self.timeout)
    }
}
