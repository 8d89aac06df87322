//! Pattern structure (`spec.md` §4.5): a Link tree containing variables and
//! optional per-variable type constraints.

use crate::error::MatcherError;
use crate::handle::Handle;
use crate::types::AtomType;
use std::collections::HashSet;

/// One term of a pattern tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternTerm {
    /// A free variable, matched by name — every `Var("$X")` in a pattern
    /// refers to the same binding slot, just as every `VariableNode` of a
    /// given name is equal-by-content in the hypergraph (`spec.md` §4.5).
    Var(String),
    /// A reference to a specific, already-grounded atom (e.g. the `mammal`
    /// node in `InheritanceLink($X, mammal)`): matches only that exact atom.
    Const(Handle),
    /// A nested link pattern: matches any link whose type is `atom_type` or
    /// a subtype of it, and whose outgoing unifies term-by-term (or, for
    /// `And`/`Or`, as a multiset) with `subterms`.
    Link(AtomType, Vec<PatternTerm>),
}

impl PatternTerm {
    fn collect_vars(&self, out: &mut HashSet<String>) {
        match self {
            PatternTerm::Var(name) => {
                out.insert(name.clone());
            }
            PatternTerm::Const(_) => {}
            PatternTerm::Link(_, subterms) => {
                for st in subterms {
                    st.collect_vars(out);
                }
            }
        }
    }

    pub fn link_type(&self) -> Option<AtomType> {
        match self {
            PatternTerm::Link(t, _) => Some(*t),
            _ => None,
        }
    }
}

/// A declared pattern variable, with an optional type constraint
/// (`spec.md` §4.5 "A declared variable list … may be attached").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub name: String,
    pub type_constraint: Option<AtomType>,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, type_constraint: Option<AtomType>) -> Self {
        Self { name: name.into(), type_constraint }
    }

    /// Declare a variable with a type constraint given by name, as a host
    /// integration might receive it from outside the type system. Fails
    /// with `MalformedPattern` if the name is not a recognized type —
    /// `spec.md` §4.5 lists this among the matcher's failure modes.
    pub fn with_type_name(name: impl Into<String>, type_name: &str) -> Result<Self, MatcherError> {
        let ty = AtomType::from_name(type_name)
            .ok_or_else(|| MatcherError::MalformedPattern(format!(
                "type constraint names unknown type '{type_name}'"
            )))?;
        Ok(Self::new(name, Some(ty)))
    }
}

/// A compiled-from pattern: a set of top-level clauses (each a `Link`
/// pattern) plus the declared variable list. Construction validates the
/// declared/used variable sets agree (`spec.md` §4.5 `MalformedPattern`).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) variables: Vec<VarDecl>,
    pub(crate) clauses: Vec<PatternTerm>,
}

impl Pattern {
    pub fn new(variables: Vec<VarDecl>, clauses: Vec<PatternTerm>) -> Result<Self, MatcherError> {
        let pattern = Self { variables, clauses };
        pattern.validate()?;
        Ok(pattern)
    }

    fn validate(&self) -> Result<(), MatcherError> {
        if self.clauses.is_empty() {
            return Err(MatcherError::MalformedPattern(
                "pattern has no clauses".to_string(),
            ));
        }
        for clause in &self.clauses {
            if clause.link_type().is_none() {
                return Err(MatcherError::MalformedPattern(
                    "every top-level clause must be a Link pattern".to_string(),
                ));
            }
        }

        let mut used = HashSet::new();
        for clause in &self.clauses {
            clause.collect_vars(&mut used);
        }
        let declared: HashSet<&str> = self.variables.iter().map(|v| v.name.as_str()).collect();

        for name in &used {
            if !declared.contains(name.as_str()) {
                return Err(MatcherError::MalformedPattern(format!(
                    "variable '{name}' used but not declared"
                )));
            }
        }
        for decl in &self.variables {
            if !used.contains(&decl.name) {
                return Err(MatcherError::MalformedPattern(format!(
                    "variable '{}' declared but not used",
                    decl.name
                )));
            }
        }
        Ok(())
    }

    pub fn type_constraint(&self, name: &str) -> Option<AtomType> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .and_then(|v| v.type_constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_declared_but_unused_variable() {
        let err = Pattern::new(
            vec![VarDecl::new("$Y", None)],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Const(Handle::from_index(0)),
            ])],
        );
        assert!(matches!(err, Err(MatcherError::MalformedPattern(_))));
    }

    #[test]
    fn rejects_used_but_undeclared_variable() {
        let err = Pattern::new(
            vec![],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Const(Handle::from_index(0)),
            ])],
        );
        assert!(matches!(err, Err(MatcherError::MalformedPattern(_))));
    }

    #[test]
    fn unknown_type_name_constraint_is_rejected() {
        let err = VarDecl::with_type_name("$X", "Bind").unwrap_err();
        assert!(matches!(err, MatcherError::MalformedPattern(_)));
    }

    #[test]
    fn accepts_well_formed_pattern() {
        let pattern = Pattern::new(
            vec![VarDecl::new("$X", None)],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Const(Handle::from_index(0)),
            ])],
        );
        assert!(pattern.is_ok());
    }
}
