use std::fmt;

/// Column qualified by the alias of the table it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub alias: String,
    pub column: &'static str,
}

impl ColumnRef {
    pub fn new(alias: impl Into<String>, column: &'static str) -> Self {
        Self {
            alias: alias.into(),
            column,
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

/// Represents an INNER JOIN introduced while resolving a relation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: &'static str,
    pub alias: String,
    /// Column on the joined table
    pub joined: ColumnRef,
    /// Column on a table already in scope
    pub parent: ColumnRef,
}

impl Join {
    /// Join `table AS alias` on `alias.joined_column = parent`
    pub fn inner(
        table: &'static str,
        alias: impl Into<String>,
        joined_column: &'static str,
        parent: ColumnRef,
    ) -> Self {
        let alias = alias.into();
        Self {
            table,
            joined: ColumnRef::new(alias.clone(), joined_column),
            alias,
            parent,
        }
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        format!(
            "INNER JOIN {} {} ON {} = {}",
            self.table, self.alias, self.joined, self.parent
        )
    }
}
