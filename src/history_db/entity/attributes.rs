use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::*;
use serde_json::Value;
use std::fmt;
use std::io::Write;

/// Opaque attribute document observed for one version of a path.
/// Any JSON value is accepted (objects, arrays and plain scalars), it is persisted as JSON text.
#[derive(Debug, Clone, PartialEq, FromSqlRow, AsExpression)]
#[sql_type = "Text"]
pub struct Attributes(pub Value);

impl Attributes {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Attributes {
    fn from(value: Value) -> Self {
        Attributes(value)
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<DB> FromSql<Text, DB> for Attributes
where
    DB: Backend,
    String: FromSql<Text, DB>,
{
    fn from_sql(bytes: Option<&DB::RawValue>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, DB>>::from_sql(bytes)?;
        Ok(Attributes(serde_json::from_str(&text)?))
    }
}

impl<DB> ToSql<Text, DB> for Attributes
where
    DB: Backend,
    String: ToSql<Text, DB>,
{
    fn to_sql<W: Write>(&self, out: &mut Output<W, DB>) -> serialize::Result {
        let text = serde_json::to_string(&self.0)?;
        <String as ToSql<Text, DB>>::to_sql(&text, out)
    }
}
