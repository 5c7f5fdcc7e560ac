use std::fmt;

/// Opaque reference to a decoration image owned by a decoration library.
///
/// Handles are cheap to copy and never mutate the image they point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationHandle(u32);

impl DecorationHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DecorationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decoration#{}", self.0)
    }
}
