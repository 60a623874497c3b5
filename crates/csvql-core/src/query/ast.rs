/// Statement descriptors produced by the parser
///
/// Defines the structure of parsed SELECT, INSERT and DELETE statements.
/// Descriptors are immutable once built and consumed by a single execution.
use super::value::{coerce, parse_number, Value};
use std::fmt;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Delete(DeleteStatement),
}

/// SELECT descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub table: String,
    pub join: Option<Join>,
    pub where_clause: Option<Expression>,
    pub group_by: Option<Vec<String>>,
    pub order_by: Option<Vec<OrderByColumn>>,
    pub limit: Option<LimitClause>,
    /// An aggregate appears in the column list and there is no GROUP BY
    pub has_bare_aggregate: bool,
}

impl SelectStatement {
    /// Every field the statement reads, aggregate labels in ORDER BY excluded.
    pub fn field_references(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        for column in &self.columns {
            match column {
                SelectColumn::Column(name)
                | SelectColumn::Aggregate {
                    argument: AggregateArgument::Column(name),
                    ..
                } => fields.push(name.as_str()),
                _ => {}
            }
        }
        if let Some(join) = &self.join {
            fields.push(join.left_field.as_str());
            fields.push(join.right_field.as_str());
        }
        if let Some(expression) = &self.where_clause {
            fields.extend(expression.conditions().iter().map(|c| c.field.as_str()));
        }
        if let Some(group_by) = &self.group_by {
            fields.extend(group_by.iter().map(String::as_str));
        }
        if let Some(order_by) = &self.order_by {
            fields.extend(
                order_by
                    .iter()
                    .map(|o| o.column.as_str())
                    .filter(|c| !c.contains('(')),
            );
        }
        fields
    }
}

/// INSERT descriptor; `columns` and `values` correspond positionally
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Literal>,
}

/// DELETE descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<Expression>,
}

/// An entry of the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    /// SELECT *
    Wildcard,
    /// SELECT name or SELECT table.name
    Column(String),
    /// SELECT COUNT(*), SUM(column), etc.
    Aggregate {
        function: AggregateFunction,
        argument: AggregateArgument,
    },
}

impl SelectColumn {
    /// Output key of this column, e.g. `name` or `SUM(score)`.
    ///
    /// Aggregate labels use the upper-case function name whatever the
    /// source spelling, so `sum(score)` is keyed `SUM(score)`. ORDER BY
    /// resolves aggregates through the same label, which keeps
    /// `ORDER BY sum(score)` and `SELECT SUM(score)` pointing at one key.
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, SelectColumn::Aggregate { .. })
    }
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }
}

/// Argument of an aggregate call
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateArgument {
    Wildcard,
    Column(String),
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub left_field: String,
    pub right_field: String,
}

/// Types of joins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// Boolean expression for WHERE clauses
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Condition(Condition),
    /// Logical AND/OR
    LogicalOp {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
}

impl Expression {
    /// Leaf conditions in textual order.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Expression::Condition(c) => out.push(c),
            Expression::LogicalOp { left, right, .. } => {
                left.collect_conditions(out);
                right.collect_conditions(out);
            }
            Expression::Not(inner) => inner.collect_conditions(out),
        }
    }
}

/// `field <operator> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: ComparisonOperator,
    pub value: Literal,
}

/// Comparison operators, LIKE included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,   // =
    Ne,   // !=
    Lt,   // <
    Le,   // <=
    Gt,   // >
    Ge,   // >=
    Like, // LIKE
}

impl ComparisonOperator {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            ComparisonOperator::Lt
                | ComparisonOperator::Le
                | ComparisonOperator::Gt
                | ComparisonOperator::Ge
        )
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Literal values in statements
///
/// Numbers and bare words keep their source text; coercion happens at
/// comparison time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted string, quotes removed
    String(String),
    /// Numeric text as written
    Number(String),
    /// Unquoted word used as a value
    Bare(String),
    Null,
}

impl Literal {
    /// Text stored by INSERT.
    pub fn to_cell(&self) -> Value {
        match self {
            Literal::String(s) | Literal::Number(s) | Literal::Bare(s) => Value::Text(s.clone()),
            Literal::Null => Value::Null,
        }
    }

    /// Comparison form of the literal.
    pub fn coerced(&self) -> Value {
        match self {
            Literal::String(s) => match parse_number(s) {
                Some(n) => Value::Number(n),
                None => Value::Text(s.clone()),
            },
            Literal::Number(s) | Literal::Bare(s) => coerce(s),
            Literal::Null => Value::Null,
        }
    }
}

/// A column in ORDER BY (a field or an aggregate label)
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByColumn {
    pub column: String,
    pub direction: OrderDirection,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// LIMIT clause for result limiting
#[derive(Debug, Clone, PartialEq)]
pub struct LimitClause {
    pub count: usize,
    pub offset: Option<usize>,
}

// Display implementations for debugging and error messages

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => write!(f, "{}", s),
            Statement::Insert(s) => write!(f, "{}", s),
            Statement::Delete(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        write_list(f, &self.columns)?;
        write!(f, " FROM {}", self.table)?;
        if let Some(ref join) = self.join {
            write!(f, " {}", join)?;
        }
        if let Some(ref condition) = self.where_clause {
            write!(f, " WHERE {}", condition)?;
        }
        if let Some(ref group_by) = self.group_by {
            write!(f, " GROUP BY ")?;
            write_list(f, group_by)?;
        }
        if let Some(ref order_by) = self.order_by {
            write!(f, " ORDER BY ")?;
            write_list(f, order_by)?;
        }
        if let Some(ref limit) = self.limit {
            write!(f, " {}", limit)?;
        }
        Ok(())
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {} (", self.table)?;
        write_list(f, &self.columns)?;
        write!(f, ") VALUES (")?;
        write_list(f, &self.values)?;
        write!(f, ")")
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(ref condition) = self.where_clause {
            write!(f, " WHERE {}", condition)?;
        }
        Ok(())
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectColumn::Wildcard => write!(f, "*"),
            SelectColumn::Column(name) => write!(f, "{}", name),
            SelectColumn::Aggregate { function, argument } => {
                write!(f, "{}({})", function, argument)
            }
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Count => write!(f, "COUNT"),
            AggregateFunction::Sum => write!(f, "SUM"),
            AggregateFunction::Avg => write!(f, "AVG"),
            AggregateFunction::Min => write!(f, "MIN"),
            AggregateFunction::Max => write!(f, "MAX"),
        }
    }
}

impl fmt::Display for AggregateArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateArgument::Wildcard => write!(f, "*"),
            AggregateArgument::Column(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} JOIN {} ON {} = {}",
            self.join_type, self.table, self.left_field, self.right_field
        )
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Right => write!(f, "RIGHT"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Condition(c) => write!(f, "{}", c),
            Expression::LogicalOp { left, op, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
            Expression::Not(expr) => write!(f, "NOT ({})", expr),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Eq => write!(f, "="),
            ComparisonOperator::Ne => write!(f, "!="),
            ComparisonOperator::Lt => write!(f, "<"),
            ComparisonOperator::Le => write!(f, "<="),
            ComparisonOperator::Gt => write!(f, ">"),
            ComparisonOperator::Ge => write!(f, ">="),
            ComparisonOperator::Like => write!(f, "LIKE"),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Number(s) | Literal::Bare(s) => write!(f, "{}", s),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Display for OrderByColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl fmt::Display for LimitClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.count)?;
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}
