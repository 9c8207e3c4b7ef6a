use std::fmt;

/// The verdict of an equality or conversion check.
pub enum Dec {
    Yes,
    No,
}

pub use Dec::*;

impl Dec {
    pub fn is_yes(&self) -> bool {
        matches!(self, Yes)
    }
}

impl From<bool> for Dec {
    fn from(value: bool) -> Self {
        if value { Yes } else { No }
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => f.debug_tuple("Yes").finish(),
            Self::No => f.debug_tuple("No").finish(),
        }
    }
}
