use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition};

/// Case-insensitive substring match, OR'd across every filter that carries a
/// non-blank value. `None` when no filter was supplied.
pub fn contains_any<C: ColumnTrait>(filters: &[(C, Option<&str>)]) -> Option<Condition> {
    let mut cond = Condition::any();
    let mut used = false;
    for (col, value) in filters {
        let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else { continue };
        let pattern = format!("%{}%", v.to_lowercase());
        cond = cond.add(Expr::expr(Func::lower(Expr::col(*col))).like(pattern));
        used = true;
    }
    used.then_some(cond)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::customer;

    #[test]
    fn blank_filters_yield_none() {
        assert!(contains_any(&[(customer::Column::Name, None), (customer::Column::Email, Some("  "))]).is_none());
        assert!(contains_any(&[(customer::Column::Name, Some("ann"))]).is_some());
    }
}
