use std::fmt::{Display, Formatter};

/// A predicted class, either its index or its configured name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    Index(usize),
    Name(String),
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Index(index) => write!(f, "{index}"),
            Label::Name(name) if name.contains('\'') && !name.contains('"') => {
                write!(f, "\"{name}\"")
            }
            Label::Name(name) => write!(f, "'{}'", name.replace('\'', "\\'")),
        }
    }
}

/// Ordered labels for the rows of one request.
///
/// Renders as a bracketed list (`[0]`, `[0, 1, 2]`, `['setosa']`). That text
/// is both the HTTP response body and the value stored in the result log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prediction(pub Vec<Label>);

impl Prediction {
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Prediction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{label}")?;
        }
        f.write_str("]")
    }
}

impl FromIterator<Label> for Prediction {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
