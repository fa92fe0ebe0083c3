use super::value::SqlValue;

/// A parameterized `WHERE` body and the arguments for its placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WherePredicate {
    clause: String,
    args: Vec<SqlValue>,
}

impl WherePredicate {
    /// Build `col = ?` fragments joined by `AND`, one per pair, in input order.
    ///
    /// Column names are inserted verbatim, so they must come from code, never
    /// from user input. An empty mapping yields an empty predicate; callers
    /// must not splice that into a statement.
    pub fn build<K, V, I>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SqlValue>,
    {
        let mut fragments = Vec::new();
        let mut args = Vec::new();
        for (column, value) in mapping {
            fragments.push(format!("{} = ?", column.as_ref()));
            args.push(value.into());
        }

        Self {
            clause: fragments.join(" AND "),
            args,
        }
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn into_args(self) -> Vec<SqlValue> {
        self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
