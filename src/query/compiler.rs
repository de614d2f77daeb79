//! Join routing and SQL compilation.
//!
//! Each aggregation compiles into its own CTE over the table owning its
//! value column (aliased `main`). Columns on other tables are reached by a
//! single foreign-key hop, joined once per aggregation with aliases
//! `join0, join1, ...` in first-use order. The CTEs are then composed:
//! the first aggregation drives the result set (`a0`) and each later CTE
//! attaches with a LEFT JOIN across the shared Select columns (or a CROSS
//! JOIN when there are none), preserving rows of the driving aggregation.

use tracing::debug;

use crate::schema::{Column, ResolvedSchema, Table};
use crate::sql::{
    func, param, table_col, BinaryOperator, Cte, Expr, ExprExt, OrderByExpr, SelectExpr,
    SelectStatement, TableRef,
};

use super::filters::FilterParameters;
use super::request::{AggregationFunction, FilterOperator};
use super::spec::{AggregationSpec, BoundColumn, FilterSpec, QueryError, QuerySpec};

/// Alias of the aggregation's own table inside its CTE.
const MAIN_ALIAS: &str = "main";

fn operator_to_sql(operator: FilterOperator) -> BinaryOperator {
    match operator {
        FilterOperator::Eq => BinaryOperator::Eq,
        FilterOperator::Ne => BinaryOperator::Ne,
        FilterOperator::Gt => BinaryOperator::Gt,
        FilterOperator::Lt => BinaryOperator::Lt,
        FilterOperator::Gte => BinaryOperator::Gte,
        FilterOperator::Lte => BinaryOperator::Lte,
        FilterOperator::Like => BinaryOperator::Like,
    }
}

/// One required join: target table, its alias, and the main-table FK used
/// to reach it.
struct JoinEdge<'s> {
    alias: String,
    target: &'s Table,
    foreign_key: &'s Column,
}

/// Routes column references within one aggregation's CTE.
///
/// The alias counter is local to the router, so concurrent compilations
/// never interfere.
struct JoinRouter<'s> {
    main: &'s Table,
    joins: Vec<JoinEdge<'s>>,
}

impl<'s> JoinRouter<'s> {
    fn new(main: &'s Table) -> Self {
        Self {
            main,
            joins: Vec::new(),
        }
    }

    /// Qualify a column with the alias of the table it is read from,
    /// registering a join when the column lives on another table.
    fn qualify(&mut self, column: &BoundColumn<'s>) -> Result<Expr, QueryError> {
        if column.table.name == self.main.name {
            Ok(table_col(MAIN_ALIAS, &column.column.name_in_db))
        } else {
            let alias = self.alias_for(column.table)?;
            Ok(table_col(&alias, &column.column.name_in_db))
        }
    }

    /// The alias joined to `target`, assigning one on first use.
    fn alias_for(&mut self, target: &'s Table) -> Result<String, QueryError> {
        if let Some(edge) = self.joins.iter().find(|e| e.target.name == target.name) {
            return Ok(edge.alias.clone());
        }
        let foreign_key =
            self.main
                .foreign_key_to(&target.name)
                .ok_or_else(|| QueryError::NoJoinPath {
                    from: self.main.name.clone(),
                    to: target.name.clone(),
                })?;
        let alias = format!("join{}", self.joins.len());
        self.joins.push(JoinEdge {
            alias: alias.clone(),
            target,
            foreign_key,
        });
        Ok(alias)
    }

    /// Compile one filter into a predicate against an already-bound
    /// parameter name.
    fn filter_predicate(
        &mut self,
        filter: &FilterSpec<'s>,
        name: &str,
    ) -> Result<Expr, QueryError> {
        let lhs = self.filter_lhs(filter)?;
        Ok(lhs.binary(operator_to_sql(filter.operator), param(name)))
    }

    /// Foreign-key filter shortcut: an equality filter on another table's
    /// id column compares the main table's own FK column instead, skipping
    /// the join entirely.
    fn filter_lhs(&mut self, filter: &FilterSpec<'s>) -> Result<Expr, QueryError> {
        if filter.operator == FilterOperator::Eq
            && filter.column.table.name != self.main.name
            && filter.column.table.is_id_column(filter.column.column)
        {
            if let Some(foreign_key) = self.main.foreign_key_to(&filter.column.table.name) {
                return Ok(table_col(MAIN_ALIAS, &foreign_key.name_in_db));
            }
        }
        self.qualify(&filter.column)
    }

    /// Emit the accumulated joins onto the statement, in first-use order.
    fn apply_joins(
        &self,
        schema: &ResolvedSchema,
        mut stmt: SelectStatement,
    ) -> SelectStatement {
        for edge in &self.joins {
            stmt = stmt.inner_join(
                TableRef::new(&edge.target.name_in_db)
                    .with_schema(&schema.name_in_db)
                    .with_alias(&edge.alias),
                table_col(&edge.alias, &edge.target.id_column.name_in_db)
                    .eq(table_col(MAIN_ALIAS, &edge.foreign_key.name_in_db)),
            );
        }
        stmt
    }
}

/// Build the CTE body for one aggregation.
fn aggregation_cte<'s>(
    spec: &QuerySpec<'s>,
    aggregation: &AggregationSpec<'s>,
    shared_filters: &mut [(&FilterSpec<'s>, Option<String>)],
    params: &mut FilterParameters,
) -> Result<SelectStatement, QueryError> {
    let main = aggregation.column.table;
    let mut router = JoinRouter::new(main);

    let mut select = Vec::new();
    let mut grouping = Vec::new();
    for (i, column) in spec.select.iter().enumerate() {
        let expr = router.qualify(column)?;
        grouping.push(expr.clone());
        select.push(expr.alias(&format!("Select{i}")));
    }

    let value = table_col(MAIN_ALIAS, &aggregation.column.column.name_in_db);
    let value = match aggregation.function.sql_name() {
        Some(name) => func(name, vec![value]),
        None => value,
    };
    select.push(value.alias("Value"));

    // Own filters first, then the shared (query-global and caller-outer)
    // filters. A shared filter binds one parameter on first use and reuses
    // its name in every later CTE.
    let mut predicates = Vec::new();
    for filter in &aggregation.filters {
        let name = params.bind(&filter.value);
        predicates.push(router.filter_predicate(filter, &name)?);
    }
    for (filter, name) in shared_filters.iter_mut() {
        let filter = *filter;
        let name = name.get_or_insert_with(|| params.bind(&filter.value));
        predicates.push(router.filter_predicate(filter, name)?);
    }
    let predicate = predicates.into_iter().reduce(|acc, p| acc.and(p));

    let mut stmt = SelectStatement::new().select(select).from(
        TableRef::new(&main.name_in_db)
            .with_schema(&spec.schema.name_in_db)
            .with_alias(MAIN_ALIAS),
    );
    stmt = router.apply_joins(spec.schema, stmt);
    if let Some(predicate) = predicate {
        stmt = stmt.filter(predicate);
    }
    // A raw pass-through value is not grouped; callers own row uniqueness.
    if aggregation.function != AggregationFunction::None && !grouping.is_empty() {
        stmt = stmt.group_by(grouping);
    }
    Ok(stmt)
}

impl<'s> QuerySpec<'s> {
    /// Compile the query into SQL text, binding every literal filter value
    /// into `params`.
    ///
    /// `outer_filters` are caller-supplied predicates (enforced conditions
    /// such as tenancy) applied to every aggregation on top of the
    /// request's own filters. `limit` caps the final result set.
    pub fn to_sql(
        &self,
        params: &mut FilterParameters,
        outer_filters: &[FilterSpec<'s>],
        limit: u64,
    ) -> Result<String, QueryError> {
        let mut shared_filters: Vec<(&FilterSpec<'s>, Option<String>)> = self
            .filters
            .iter()
            .chain(outer_filters)
            .map(|filter| (filter, None))
            .collect();

        let mut stmt = SelectStatement::new();
        for (i, aggregation) in self.aggregations.iter().enumerate() {
            let cte = aggregation_cte(self, aggregation, &mut shared_filters, params)?;
            stmt = stmt.with_cte(Cte::new(&format!("Aggregation{i}"), cte));
        }

        let mut select: Vec<SelectExpr> = Vec::new();
        for i in 0..self.select.len() {
            select.push(SelectExpr::new(table_col("a0", &format!("Select{i}"))));
        }
        for i in 0..self.aggregations.len() {
            select.push(table_col(&format!("a{i}"), "Value").alias(&format!("Value{i}")));
        }
        stmt = stmt
            .select(select)
            .from(TableRef::new("Aggregation0").with_alias("a0"));

        // The first aggregation drives; later ones must not drop its rows.
        for i in 1..self.aggregations.len() {
            let alias = format!("a{i}");
            let table = TableRef::new(&format!("Aggregation{i}")).with_alias(&alias);
            let on = (0..self.select.len())
                .map(|j| {
                    let name = format!("Select{j}");
                    table_col(&alias, &name).eq(table_col("a0", &name))
                })
                .reduce(|acc, eq| acc.and(eq));
            stmt = match on {
                Some(on) => stmt.left_join(table, on),
                // scalar aggregates carry one row each
                None => stmt.cross_join(table),
            };
        }

        stmt = stmt
            .order_by(vec![OrderByExpr::desc(table_col("a0", "Value"))])
            .limit(limit);

        debug!(
            aggregations = self.aggregations.len(),
            parameters = params.len(),
            "compiled query"
        );
        Ok(stmt.to_sql())
    }
}
