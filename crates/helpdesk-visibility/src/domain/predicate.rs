//! Predicate tree over ticket attributes
//!
//! Visibility rules and caller filters are both expressed as [`Predicate`]
//! values and combined with [`Predicate::merge_and`], which always nests and
//! never overwrites. The store adapter translates the tree into its own
//! query language; [`Predicate::evaluate`] is the reference semantics.
//!
//! # Invariants
//! - An empty `And` is always true.
//! - An empty `Or` is always false. Use [`Predicate::always_true`] to mean
//!   "no restriction", never an empty `Or`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_objects::{Role, TicketPriority, TicketStatus};

/// Ticket attribute addressable by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// ticket.id
    TicketId,
    /// ticket.ticketNumber
    TicketNumber,
    /// ticket.title
    Title,
    /// ticket.description
    Description,
    /// ticket.status
    Status,
    /// ticket.priority
    Priority,
    /// ticket.createdById
    CreatorId,
    /// ticket.createdBy.name
    CreatorName,
    /// ticket.createdBy.email
    CreatorEmail,
    /// ticket.createdBy.branchId
    CreatorBranchId,
    /// ticket.createdBy.role
    CreatorRole,
    /// ticket.assignedToId
    AssigneeId,
    /// ticket.assignedTo.name
    AssigneeName,
    /// ticket.branchId
    BranchId,
    /// ticket.branch.name
    BranchName,
    /// ticket.branch.code
    BranchCode,
    /// ticket.supportGroupId
    SupportGroupId,
    /// ticket.categoryId
    CategoryId,
    /// ticket.serviceId
    ServiceId,
    /// ticket.service.name
    ServiceName,
    /// ticket.service.supportGroupId
    ServiceSupportGroupId,
    /// ticket.service.categoryId (legacy taxonomy)
    ServiceCategoryId,
    /// ticket.service.tier1CategoryId
    ServiceTier1CategoryId,
    /// ticket.isConfidential
    IsConfidential,
    /// ticket.securityClassification
    SecurityClassification,
    /// ticket.createdAt
    CreatedAt,
    /// ticket.updatedAt
    UpdatedAt,
    /// Some approval record has status APPROVED
    HasApprovedApproval,
}

impl Field {
    /// Dotted attribute path, for logs and store adapters
    pub fn path(&self) -> &'static str {
        match self {
            Self::TicketId => "id",
            Self::TicketNumber => "ticketNumber",
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::CreatorId => "createdById",
            Self::CreatorName => "createdBy.name",
            Self::CreatorEmail => "createdBy.email",
            Self::CreatorBranchId => "createdBy.branchId",
            Self::CreatorRole => "createdBy.role",
            Self::AssigneeId => "assignedToId",
            Self::AssigneeName => "assignedTo.name",
            Self::BranchId => "branchId",
            Self::BranchName => "branch.name",
            Self::BranchCode => "branch.code",
            Self::SupportGroupId => "supportGroupId",
            Self::CategoryId => "categoryId",
            Self::ServiceId => "serviceId",
            Self::ServiceName => "service.name",
            Self::ServiceSupportGroupId => "service.supportGroupId",
            Self::ServiceCategoryId => "service.categoryId",
            Self::ServiceTier1CategoryId => "service.tier1CategoryId",
            Self::IsConfidential => "isConfidential",
            Self::SecurityClassification => "securityClassification",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::HasApprovedApproval => "approvals.some(status = APPROVED)",
        }
    }
}

/// Scalar compared by a leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Identifier, code or free text
    Text(String),
    /// Flag
    Bool(bool),
    /// Instant
    Time(DateTime<Utc>),
}

impl Value {
    /// Text value
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Time(t)
    }
}

impl From<TicketStatus> for Value {
    fn from(s: TicketStatus) -> Self {
        Self::Text(s.code().into())
    }
}

impl From<TicketPriority> for Value {
    fn from(p: TicketPriority) -> Self {
        Self::Text(p.code().into())
    }
}

impl From<&Role> for Value {
    fn from(r: &Role) -> Self {
        Self::Text(r.code().into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Time(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

/// Ordering comparison for range leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
}

/// Boolean predicate tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// All operands hold; empty is always true
    And(Vec<Predicate>),
    /// Any operand holds; empty is always false
    Or(Vec<Predicate>),
    /// Negation
    Not(Box<Predicate>),
    /// field == value
    FieldEq(Field, Value),
    /// field in values; empty set matches nothing
    FieldIn(Field, Vec<Value>),
    /// field is null (`true`) or not null (`false`)
    FieldNull(Field, bool),
    /// Case-insensitive substring match on a text field
    Contains(Field, String),
    /// Ordered comparison
    Compare(Field, Comparison, Value),
}

/// Anything a predicate can be evaluated against
pub trait FieldSource {
    /// Current value of `field`; `None` when null
    fn field(&self, field: Field) -> Option<Value>;
}

impl Predicate {
    /// No restriction
    pub fn always_true() -> Self {
        Self::And(Vec::new())
    }

    /// Matches nothing
    pub fn always_false() -> Self {
        Self::Or(Vec::new())
    }

    /// Empty conjunction
    pub fn is_always_true(&self) -> bool {
        matches!(self, Self::And(terms) if terms.is_empty())
    }

    /// Empty disjunction
    pub fn is_always_false(&self) -> bool {
        matches!(self, Self::Or(terms) if terms.is_empty())
    }

    /// `field == value`
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        Self::FieldEq(field, value.into())
    }

    /// `field in values`
    pub fn one_of<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Self {
        Self::FieldIn(field, values.into_iter().map(Into::into).collect())
    }

    /// `field is null`
    pub fn is_null(field: Field) -> Self {
        Self::FieldNull(field, true)
    }

    /// `field is not null`
    pub fn is_not_null(field: Field) -> Self {
        Self::FieldNull(field, false)
    }

    /// Case-insensitive `field contains needle`
    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Self::Contains(field, needle.into())
    }

    /// `field >= value`
    pub fn at_least(field: Field, value: impl Into<Value>) -> Self {
        Self::Compare(field, Comparison::Gte, value.into())
    }

    /// `field <= value`
    pub fn at_most(field: Field, value: impl Into<Value>) -> Self {
        Self::Compare(field, Comparison::Lte, value.into())
    }

    /// Logical negation
    pub fn negate(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Non-destructive conjunction.
    ///
    /// Both operands survive: nested `And`s are flattened, every `Or` stays a
    /// separate operand, `always_true` is absorbed and an `always_false`
    /// operand makes the whole result `always_false`. Merging a role `Or`
    /// with a search `Or` therefore yields `(role) AND (search)`.
    pub fn merge_and(self, other: Predicate) -> Self {
        let mut terms = Vec::new();
        push_conjunct(&mut terms, self);
        push_conjunct(&mut terms, other);

        if terms.iter().any(Predicate::is_always_false) {
            return Self::always_false();
        }
        match terms.len() {
            1 => terms.remove(0),
            _ => Self::And(terms),
        }
    }

    /// Conjunction of many
    pub fn all_of(terms: impl IntoIterator<Item = Predicate>) -> Self {
        terms
            .into_iter()
            .fold(Self::always_true(), Predicate::merge_and)
    }

    /// Disjunction of many. An empty input is always false.
    pub fn any_of(terms: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for term in terms {
            push_disjunct(&mut flat, term);
        }
        if flat.iter().any(Predicate::is_always_true) {
            return Self::always_true();
        }
        match flat.len() {
            1 => flat.remove(0),
            _ => Self::Or(flat),
        }
    }

    /// Top-level conjunction operands
    pub fn conjuncts(&self) -> Vec<&Predicate> {
        match self {
            Self::And(terms) => terms.iter().collect(),
            other => vec![other],
        }
    }

    /// Whether `term` appears as a top-level conjunct
    pub fn has_conjunct(&self, term: &Predicate) -> bool {
        self.conjuncts().into_iter().any(|t| t == term)
    }

    /// Whether `term` appears anywhere in the tree
    pub fn mentions(&self, term: &Predicate) -> bool {
        if self == term {
            return true;
        }
        match self {
            Self::And(terms) | Self::Or(terms) => terms.iter().any(|t| t.mentions(term)),
            Self::Not(inner) => inner.mentions(term),
            _ => false,
        }
    }

    /// Reference evaluation
    pub fn evaluate(&self, record: &dyn FieldSource) -> bool {
        match self {
            Self::And(terms) => terms.iter().all(|t| t.evaluate(record)),
            Self::Or(terms) => terms.iter().any(|t| t.evaluate(record)),
            Self::Not(inner) => !inner.evaluate(record),
            Self::FieldEq(field, value) => record.field(*field).as_ref() == Some(value),
            Self::FieldIn(field, values) => record
                .field(*field)
                .map(|v| values.contains(&v))
                .unwrap_or(false),
            Self::FieldNull(field, is_null) => record.field(*field).is_none() == *is_null,
            Self::Contains(field, needle) => match record.field(*field) {
                Some(Value::Text(haystack)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
            Self::Compare(field, op, bound) => match (record.field(*field), bound) {
                (Some(Value::Time(actual)), Value::Time(bound)) => match op {
                    Comparison::Gte => actual >= *bound,
                    Comparison::Lte => actual <= *bound,
                },
                (Some(Value::Text(actual)), Value::Text(bound)) => match op {
                    Comparison::Gte => actual.as_str() >= bound.as_str(),
                    Comparison::Lte => actual.as_str() <= bound.as_str(),
                },
                _ => false,
            },
        }
    }
}

fn push_conjunct(terms: &mut Vec<Predicate>, term: Predicate) {
    match term {
        Predicate::And(inner) => {
            for t in inner {
                push_conjunct(terms, t);
            }
        }
        other => {
            if !terms.contains(&other) {
                terms.push(other);
            }
        }
    }
}

fn push_disjunct(terms: &mut Vec<Predicate>, term: Predicate) {
    match term {
        Predicate::Or(inner) => {
            for t in inner {
                push_disjunct(terms, t);
            }
        }
        other => {
            if !terms.contains(&other) {
                terms.push(other);
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, terms: &[Predicate], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, t) in terms.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", t)?;
            }
            write!(f, ")")
        }

        match self {
            Self::And(terms) if terms.is_empty() => write!(f, "TRUE"),
            Self::Or(terms) if terms.is_empty() => write!(f, "FALSE"),
            Self::And(terms) => join(f, terms, "AND"),
            Self::Or(terms) => join(f, terms, "OR"),
            Self::Not(inner) => write!(f, "NOT {}", inner),
            Self::FieldEq(field, v) => write!(f, "{} = {}", field.path(), v),
            Self::FieldIn(field, vs) => {
                write!(f, "{} IN [", field.path())?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Self::FieldNull(field, true) => write!(f, "{} IS NULL", field.path()),
            Self::FieldNull(field, false) => write!(f, "{} IS NOT NULL", field.path()),
            Self::Contains(field, needle) => write!(f, "{} ILIKE %{}%", field.path(), needle),
            Self::Compare(field, Comparison::Gte, v) => write!(f, "{} >= {}", field.path(), v),
            Self::Compare(field, Comparison::Lte, v) => write!(f, "{} <= {}", field.path(), v),
        }
    }
}
