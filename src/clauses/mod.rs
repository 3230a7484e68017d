//! Dialect clauses with no standard SQL counterpart.
//!
//! Each clause is an immutable value rendered through [`crate::transpiler::ToSql`].

mod array_join;
mod lambda;
mod limit_by;
mod sample;
mod ttl;

pub use self::array_join::ArrayJoin;
pub use self::lambda::Lambda;
pub use self::limit_by::LimitBy;
pub use self::sample::Sample;
pub use self::ttl::{Ttl, TtlAction, render_ttl_list};
