// Copyright 2026 Rowmill Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Key expressions.
//!
//! A join key is an expression evaluated against the current row of one
//! sub-stream, together with the SQL type the planner declared for it. The
//! declared type - not the runtime value - decides the key's encoded width,
//! so both live here side by side.

use crate::core::{Error, Result, Row, SqlType, Value};

/// A key expression: a column reference with its declared type descriptor.
#[derive(Debug, Clone)]
pub struct KeyExpr {
    column: usize,
    descriptor: SqlType,
}

impl KeyExpr {
    /// Key on the given column, declared with the given SQL type.
    pub fn column(column: usize, descriptor: SqlType) -> Self {
        Self { column, descriptor }
    }

    /// The declared SQL type of this key.
    pub fn descriptor(&self) -> SqlType {
        self.descriptor
    }

    /// Evaluate against a row. NULL results are `Value::Null`.
    pub fn evaluate<'a>(&self, row: &'a Row) -> Result<&'a Value> {
        row.get(self.column)
            .ok_or(Error::ColumnIndexOutOfBounds { index: self.column })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_column() {
        let row = Row::from_values(vec![Value::integer(1), Value::text("x")]);
        let key = KeyExpr::column(1, SqlType::VarChar { len: 4, collation: None });
        assert_eq!(key.evaluate(&row).unwrap(), &Value::text("x"));
    }

    #[test]
    fn test_evaluate_out_of_bounds() {
        let row = Row::from_values(vec![Value::integer(1)]);
        let key = KeyExpr::column(3, SqlType::Integer);
        assert_eq!(
            key.evaluate(&row),
            Err(Error::ColumnIndexOutOfBounds { index: 3 })
        );
    }

    #[test]
    fn test_descriptor() {
        let key = KeyExpr::column(0, SqlType::Double);
        assert_eq!(key.descriptor(), SqlType::Double);
    }
}
