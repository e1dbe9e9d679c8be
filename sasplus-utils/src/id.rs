use std::fmt;
use std::rc::Rc;

/// Opaque identifier for a finite-domain state variable.
///
/// The SAS+ codec names variables by their integer column index (`"var3"`);
/// hand-constructed tasks (tests, fixtures) are free to use any short
/// string. Both forms are represented the same way so that analyses never
/// need to know which source produced a given key.
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarId(Rc<str>);

impl VarId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    /// The conventional key for the `i`-th variable of a parsed SAS+ file.
    pub fn from_index(i: usize) -> Self {
        Self::new(format!("var{i}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

impl From<&str> for VarId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VarId {
    fn from(s: String) -> Self {
        Self(Rc::from(s))
    }
}

/// A value code within a variable's domain.
///
/// Value *names* (the human-readable strings the codec prints after
/// `end_variable`) are kept out of band in a variable-indexed table; they
/// never participate in analysis, only in round-tripping SAS+ text.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ValId(pub u32);

impl ValId {
    pub fn new(v: u32) -> Self {
        Self(v)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ValId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ValId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
