use crate::colored::Colorize;

/// One of the mutually exclusive outcomes of a question.
///
/// What a color means (a transaction in a conflict set, a block at a height) is up to
/// the caller; the engine only counts them.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Color(pub u32);

impl std::fmt::Debug for Color {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", format!("#{}", self.0).magenta())
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "#{}", self.0)
    }
}

impl From<u32> for Color {
    fn from(n: u32) -> Self {
        Color(n)
    }
}
