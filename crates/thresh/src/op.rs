//! Comparison operators.

use std::fmt;

use verif_stats::is_eq;

/// Comparison applied between a value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreshOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// Always true.
    Na,
}

// Longest prefixes first so "<=" wins over "<".
const PREFIXES: &[(&str, ThreshOp)] = &[
    ("<=", ThreshOp::Le),
    (">=", ThreshOp::Ge),
    ("==", ThreshOp::Eq),
    ("!=", ThreshOp::Ne),
    ("<", ThreshOp::Lt),
    (">", ThreshOp::Gt),
    ("le", ThreshOp::Le),
    ("ge", ThreshOp::Ge),
    ("eq", ThreshOp::Eq),
    ("ne", ThreshOp::Ne),
    ("lt", ThreshOp::Lt),
    ("gt", ThreshOp::Gt),
];

impl ThreshOp {
    /// Symbolic form, e.g. `>=`. `NA` for [`ThreshOp::Na`].
    pub fn symbol(self) -> &'static str {
        match self {
            ThreshOp::Lt => "<",
            ThreshOp::Le => "<=",
            ThreshOp::Eq => "==",
            ThreshOp::Ne => "!=",
            ThreshOp::Gt => ">",
            ThreshOp::Ge => ">=",
            ThreshOp::Na => "NA",
        }
    }

    /// Splits a leading operator off `s`, returning the operator and the rest.
    pub(crate) fn split_prefix(s: &str) -> Option<(ThreshOp, &str)> {
        let lower = s.to_ascii_lowercase();
        PREFIXES
            .iter()
            .find(|(p, _)| lower.starts_with(p))
            .map(|&(p, op)| (op, &s[p.len()..]))
    }

    /// Applies the comparison `value <op> thresh`.
    pub fn apply(self, value: f64, thresh: f64) -> bool {
        match self {
            ThreshOp::Lt => value < thresh,
            ThreshOp::Le => value <= thresh,
            ThreshOp::Eq => is_eq(value, thresh),
            ThreshOp::Ne => !is_eq(value, thresh),
            ThreshOp::Gt => value > thresh,
            ThreshOp::Ge => value >= thresh,
            ThreshOp::Na => true,
        }
    }

    /// True for the operators that bound a category from above.
    pub fn is_upper_bound(self) -> bool {
        matches!(self, ThreshOp::Lt | ThreshOp::Le)
    }

    /// True for the operators that bound a category from below.
    pub fn is_lower_bound(self) -> bool {
        matches!(self, ThreshOp::Gt | ThreshOp::Ge)
    }
}

impl fmt::Display for ThreshOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
