//! Named variable definitions and class-based read/write dispatch.
//!
//! Grounded in the original implementation's `mytypes.py` (the
//! `VariableDefinition`/insertion-ordered variable list) and the dispatch
//! branches in `processor.py`'s `perform_register_read`/
//! `perform_register_write` (bit classes vs. numeric classes). The
//! registry itself never touches a transport or a broker — it only knows
//! how to look a name up and decide what kind of operation its register
//! class implies; `fxplc-api` is the layer that turns that decision into
//! an actual request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use fxplc_core::{ClientError, NumberEncoding, RegisterClass, RegisterRef};

/// One entry in a variable file: a friendly name bound to a register,
/// plus the display group and numeric layout used when reading it as a
/// number.
///
/// `register` is kept as text rather than a parsed [`RegisterRef`] so this
/// type stays a plain data shape a loader can deserialize directly from a
/// variable file; [`Registry::new`] is what parses and validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub register: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub number_encoding: NumberEncoding,
    #[serde(default)]
    pub readonly: bool,
}

/// Whether a register class is read/written as a single bit or as a word
/// of numeric data.
///
/// `S, X, Y, M, T` are bit classes; `D, C` are numeric. Grounded in
/// `processor.py`'s `RegisterType` branch lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Bit,
    Numeric,
}

/// Classify a register class for read/write dispatch.
pub fn dispatch_for(class: RegisterClass) -> Dispatch {
    match class {
        RegisterClass::State
        | RegisterClass::Input
        | RegisterClass::Output
        | RegisterClass::Memory
        | RegisterClass::Timer => Dispatch::Bit,
        RegisterClass::Data | RegisterClass::Counter => Dispatch::Numeric,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate variable name: {0}")]
    DuplicateName(String),
    #[error("invalid register {register:?} for variable {name:?}: {source}")]
    InvalidRegister {
        name: String,
        register: String,
        #[source]
        source: ClientError,
    },
    #[error("variable not found: {0}")]
    VariableNotFound(String),
    #[error("variable {0:?} is read-only")]
    ReadOnly(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

struct Entry {
    def: VariableDefinition,
    reference: RegisterRef,
}

/// An insertion-ordered map from variable name to its definition, built
/// once at startup from a variable file and read-only afterward.
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry from a variable file's contents, parsing and
    /// validating every register reference up front.
    ///
    /// Fails on a duplicate name or an unparseable register — unknown
    /// classes or malformed register text should fail fast at load time
    /// rather than surface as a runtime error on first use.
    pub fn new(defs: Vec<VariableDefinition>) -> Result<Self> {
        let mut entries = Vec::with_capacity(defs.len());
        let mut index = HashMap::with_capacity(defs.len());

        for def in defs {
            if index.contains_key(&def.name) {
                return Err(RegistryError::DuplicateName(def.name));
            }
            let reference =
                RegisterRef::parse(&def.register).map_err(|source| RegistryError::InvalidRegister {
                    name: def.name.clone(),
                    register: def.register.clone(),
                    source,
                })?;
            index.insert(def.name.clone(), entries.len());
            entries.push(Entry { def, reference });
        }

        Ok(Self { entries, index })
    }

    pub fn get(&self, name: &str) -> Option<&VariableDefinition> {
        self.index.get(name).map(|&i| &self.entries[i].def)
    }

    /// The parsed register a name resolves to.
    pub fn reference(&self, name: &str) -> Result<RegisterRef> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].reference)
            .ok_or_else(|| RegistryError::VariableNotFound(name.to_string()))
    }

    /// Look a variable up and confirm it may be written.
    ///
    /// A variable with `readonly: true`, or whose register class is `X`
    /// (input — never writable on the physical device regardless of the
    /// file's declaration) fails with `ReadOnly`.
    pub fn check_writable(&self, name: &str) -> Result<&VariableDefinition> {
        let def = self
            .get(name)
            .ok_or_else(|| RegistryError::VariableNotFound(name.to_string()))?;
        let reference = self.reference(name)?;
        if def.readonly || reference.class == RegisterClass::Input {
            return Err(RegistryError::ReadOnly(name.to_string()));
        }
        Ok(def)
    }

    /// All variables, in the order they were declared.
    pub fn iter(&self) -> impl Iterator<Item = &VariableDefinition> {
        self.entries.iter().map(|e| &e.def)
    }

    /// Variables bucketed by `group`, in first-seen group order, entries
    /// within a group kept in declaration order.
    pub fn groups(&self) -> Vec<(Option<String>, Vec<&VariableDefinition>)> {
        let mut order: Vec<Option<String>> = Vec::new();
        let mut buckets: HashMap<Option<String>, Vec<&VariableDefinition>> = HashMap::new();

        for entry in &self.entries {
            let key = entry.def.group.clone();
            buckets.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                Vec::new()
            });
            buckets.get_mut(&key).unwrap().push(&entry.def);
        }

        order
            .into_iter()
            .map(|key| {
                let items = buckets.remove(&key).unwrap_or_default();
                (key, items)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, register: &str, group: Option<&str>) -> VariableDefinition {
        VariableDefinition {
            name: name.to_string(),
            register: register.to_string(),
            group: group.map(str::to_string),
            number_encoding: NumberEncoding::WordSigned,
            readonly: false,
        }
    }

    #[test]
    fn dispatch_classifies_bit_and_numeric_classes() {
        assert_eq!(dispatch_for(RegisterClass::Memory), Dispatch::Bit);
        assert_eq!(dispatch_for(RegisterClass::Input), Dispatch::Bit);
        assert_eq!(dispatch_for(RegisterClass::Data), Dispatch::Numeric);
        assert_eq!(dispatch_for(RegisterClass::Counter), Dispatch::Numeric);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let err = Registry::new(vec![def("pump", "M17", None), def("pump", "M18", None)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(n) if n == "pump"));
    }

    #[test]
    fn malformed_register_is_rejected() {
        let err = Registry::new(vec![def("pump", "Q17", None)]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRegister { .. }));
    }

    #[test]
    fn input_class_is_never_writable() {
        let registry = Registry::new(vec![def("sensor", "X3", None)]).unwrap();
        let err = registry.check_writable("sensor").unwrap_err();
        assert!(matches!(err, RegistryError::ReadOnly(n) if n == "sensor"));
    }

    #[test]
    fn explicit_readonly_flag_blocks_writes() {
        let mut locked = def("setpoint", "D10", None);
        locked.readonly = true;
        let registry = Registry::new(vec![locked]).unwrap();
        assert!(registry.check_writable("setpoint").is_err());
    }

    #[test]
    fn writable_memory_register_passes_check() {
        let registry = Registry::new(vec![def("pump", "M17", None)]).unwrap();
        assert!(registry.check_writable("pump").is_ok());
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let registry = Registry::new(vec![
            def("a", "M1", Some("motors")),
            def("b", "D1", Some("sensors")),
            def("c", "M2", Some("motors")),
            def("d", "M3", None),
        ])
        .unwrap();

        let groups = registry.groups();
        let names: Vec<Option<String>> = groups.iter().map(|(g, _)| g.clone()).collect();
        assert_eq!(
            names,
            vec![
                Some("motors".to_string()),
                Some("sensors".to_string()),
                None,
            ]
        );
        assert_eq!(groups[0].1.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn unknown_variable_is_not_found() {
        let registry = Registry::new(vec![def("pump", "M17", None)]).unwrap();
        assert!(registry.get("missing").is_none());
        assert!(matches!(
            registry.reference("missing"),
            Err(RegistryError::VariableNotFound(_))
        ));
    }
}
