//! Domain registry: variable names, value domains, and dense integer codes.
//!
//! Every categorical variable is assigned a dense [`VarId`] and every raw
//! value within a variable's domain a dense code `0..r-1`, where `r` is the
//! variable's cardinality. The registry is loaded once per classifier
//! instance and is read-only afterward; all counting and scoring works on
//! codes, never on raw strings.

use rustc_hash::FxHashMap;

use crate::engine::errors::BayesError;

/// A unique identifier for a variable in the domain registry.
///
/// Ids are dense: `VarId(i)` indexes position `i` in the registry's load
/// order.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub u32);

impl VarId {
    /// Returns the id as a usize index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Maps variable names to [`VarId`]s and raw categorical values to dense codes.
///
/// Cardinalities are fixed for the lifetime of the registry.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    /// Variable names in load order; position is the `VarId`.
    names: Vec<String>,
    /// Name → id lookup.
    ids: FxHashMap<String, VarId>,
    /// Per-variable raw value → code lookup.
    codes: Vec<FxHashMap<String, usize>>,
    /// Per-variable code → raw value (inverse of `codes`).
    values: Vec<Vec<String>>,
}

impl DomainRegistry {
    /// Builds a registry from explicit `(variable, ordered values)` mappings.
    ///
    /// Codes are assigned by position in each value list. Duplicate variables
    /// or duplicate values within a variable are a configuration error.
    pub fn from_mappings<N, V, I, VI>(mappings: I) -> Result<Self, BayesError>
    where
        I: IntoIterator<Item = (N, VI)>,
        VI: IntoIterator<Item = V>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut registry = DomainRegistry::default();
        for (name, values) in mappings {
            let var = registry.add_variable(name.as_ref())?;
            for value in values {
                registry.add_value(var, value.as_ref())?;
            }
        }
        Ok(registry)
    }

    /// Builds a registry by scanning records, assigning codes in
    /// first-seen order.
    ///
    /// Variables are registered in the order they first appear; so are values
    /// within each variable's domain. This mirrors how a metadata pass over a
    /// raw dataset discovers cardinalities.
    pub fn from_records<'a, R, I>(records: R) -> Result<Self, BayesError>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = DomainRegistry::default();
        for record in records {
            for (name, value) in record {
                let var = match registry.ids.get(name).copied() {
                    Some(var) => var,
                    None => registry.add_variable(name)?,
                };
                if !registry.codes[var.index()].contains_key(value) {
                    registry.add_value(var, value)?;
                }
            }
        }
        Ok(registry)
    }

    fn add_variable(&mut self, name: &str) -> Result<VarId, BayesError> {
        if self.ids.contains_key(name) {
            return Err(BayesError::Configuration(format!(
                "variable '{}' registered twice",
                name
            )));
        }
        let var = VarId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), var);
        self.codes.push(FxHashMap::default());
        self.values.push(Vec::new());
        Ok(var)
    }

    fn add_value(&mut self, var: VarId, value: &str) -> Result<usize, BayesError> {
        let codes = &mut self.codes[var.index()];
        if codes.contains_key(value) {
            return Err(BayesError::Configuration(format!(
                "value '{}' registered twice for variable '{}'",
                value,
                self.names[var.index()]
            )));
        }
        let code = self.values[var.index()].len();
        codes.insert(value.to_string(), code);
        self.values[var.index()].push(value.to_string());
        Ok(code)
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry has no variables.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Looks up a variable id by name.
    pub fn var(&self, name: &str) -> Option<VarId> {
        self.ids.get(name).copied()
    }

    /// Looks up a variable id by name, failing with a configuration error.
    pub fn require_var(&self, name: &str) -> Result<VarId, BayesError> {
        self.var(name).ok_or_else(|| {
            BayesError::Configuration(format!("unknown variable '{}'", name))
        })
    }

    /// Returns the name of a variable.
    pub fn var_name(&self, var: VarId) -> &str {
        &self.names[var.index()]
    }

    /// Returns the cardinality (domain size) of a variable.
    pub fn cardinality(&self, var: VarId) -> usize {
        self.values[var.index()].len()
    }

    /// Iterates over all variable ids in registry order.
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.names.len() as u32).map(VarId)
    }

    /// Encodes a raw value into its dense code.
    pub fn encode(&self, var: VarId, raw: &str) -> Result<usize, BayesError> {
        self.codes[var.index()]
            .get(raw)
            .copied()
            .ok_or_else(|| BayesError::UnknownValue {
                variable: self.names[var.index()].clone(),
                value: raw.to_string(),
            })
    }

    /// Decodes a dense code back into the raw value it was assigned from.
    pub fn decode(&self, var: VarId, code: usize) -> Option<&str> {
        self.values[var.index()].get(code).map(String::as_str)
    }

    /// Encodes an evidence map of raw `(variable, value)` pairs into codes.
    ///
    /// An unknown variable name is a configuration error; an unknown value is
    /// an [`BayesError::UnknownValue`] for that record only.
    pub fn index_evidence<'a, I>(&self, evidence: I) -> Result<Vec<(VarId, usize)>, BayesError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut indexed = Vec::new();
        for (name, raw) in evidence {
            let var = self.require_var(name)?;
            indexed.push((var, self.encode(var, raw)?));
        }
        Ok(indexed)
    }
}
