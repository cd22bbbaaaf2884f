//! UI state shared by the shell

/// Page shown in the main area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Annotation,
    Concordance,
}

impl Page {
    pub fn name(&self) -> &str {
        match self {
            Page::Annotation => "Annotation",
            Page::Concordance => "Concordance",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Page::Annotation => Page::Concordance,
            Page::Concordance => Page::Annotation,
        }
    }

    /// Parse a configured start page, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "annotation" => Some(Page::Annotation),
            "concordance" => Some(Page::Concordance),
            _ => None,
        }
    }
}

/// Main application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Setup,
    Running,
}
