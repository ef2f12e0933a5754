//! Protocol-agnostic request/response facade over the broker and the
//! variable registry.
//!
//! A REST layer (or a CLI, or anything else) is a thin shell around
//! [`Facade`], matching how `server.py`'s route handlers are themselves
//! thin wrappers around `processor.py`'s `do_request` and the
//! `perform_register_*` functions.

use serde::Serialize;

use fxplc_broker::{op, Broker, BrokerError, TransportTarget, Value};
use fxplc_core::{ClientError, Number, NumberEncoding, RegisterRef};
use fxplc_registry::{dispatch_for, Dispatch, Registry, RegistryError, VariableDefinition};

/// A value crossing the facade boundary: input to a write, output of a
/// read. Untagged so it serializes as a bare JSON bool/number rather than
/// a wrapped variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
}

/// The `{name, register, value}` shape returned by every
/// variable-scoped operation.
#[derive(Debug, Clone, Serialize)]
pub struct VariableReport {
    pub name: String,
    pub register: String,
    pub value: ApiValue,
}

/// Everything a caller at the facade boundary can observe.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("too many requests")]
    TooManyRequests,
    #[error("service paused")]
    ServicePaused,
    #[error("request timeout")]
    RequestTimeout,
    #[error("request error: {0}")]
    RequestFailed(String),
    #[error("variable is read-only: {0}")]
    ReadOnly(String),
    #[error("variable not found: {0}")]
    VariableNotFound(String),
}

impl ApiError {
    /// Machine-readable tag for the `{kind, message}` error shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooManyRequests => "queue_full",
            Self::ServicePaused => "service_paused",
            Self::RequestTimeout => "request_timeout",
            Self::RequestFailed(_) => "request_error",
            Self::ReadOnly(_) => "read_only",
            Self::VariableNotFound(_) => "variable_not_found",
        }
    }
}

impl From<BrokerError> for ApiError {
    fn from(e: BrokerError) -> Self {
        match &e {
            BrokerError::QueueFull => return Self::TooManyRequests,
            BrokerError::ServicePaused => return Self::ServicePaused,
            BrokerError::RequestTimeout => return Self::RequestTimeout,
            _ => {}
        }
        Self::RequestFailed(e.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match &e {
            RegistryError::VariableNotFound(name) => return Self::VariableNotFound(name.clone()),
            RegistryError::ReadOnly(name) => return Self::ReadOnly(name.clone()),
            _ => {}
        }
        Self::RequestFailed(e.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        Self::RequestFailed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

fn to_api_value(value: Value) -> ApiValue {
    match value {
        Value::Bool(b) => ApiValue::Bool(b),
        Value::Number(Number::Signed(i)) => ApiValue::Int(i),
        Value::Number(Number::Unsigned(u)) => ApiValue::UInt(u),
        Value::Number(Number::Float(f)) => ApiValue::Float(f),
        Value::Bytes(_) | Value::Unit => {
            unreachable!("the facade never builds an operation that resolves to Bytes or Unit")
        }
    }
}

fn bool_from_api(value: ApiValue) -> bool {
    match value {
        ApiValue::Bool(b) => b,
        ApiValue::Int(i) => i != 0,
        ApiValue::UInt(u) => u != 0,
        ApiValue::Float(f) => f != 0.0,
    }
}

fn number_from_api(value: ApiValue, encoding: NumberEncoding) -> Number {
    match encoding {
        NumberEncoding::WordSigned | NumberEncoding::DoubleWordSigned => Number::Signed(match value {
            ApiValue::Bool(b) => b as i64,
            ApiValue::Int(i) => i,
            ApiValue::UInt(u) => u as i64,
            ApiValue::Float(f) => f as i64,
        }),
        NumberEncoding::WordUnsigned | NumberEncoding::DoubleWordUnsigned => {
            Number::Unsigned(match value {
                ApiValue::Bool(b) => b as u64,
                ApiValue::Int(i) => i as u64,
                ApiValue::UInt(u) => u,
                ApiValue::Float(f) => f as u64,
            })
        }
        NumberEncoding::Float => Number::Float(match value {
            ApiValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            ApiValue::Int(i) => i as f32,
            ApiValue::UInt(u) => u as f32,
            ApiValue::Float(f) => f,
        }),
    }
}

/// Wraps one [`Broker`] and one [`Registry`]; every operation funnels
/// through the broker's single worker thread.
pub struct Facade {
    broker: Broker,
    registry: Registry,
}

impl Facade {
    pub fn new(target: TransportTarget, registry: Registry) -> Self {
        Self {
            broker: Broker::start(target),
            registry,
        }
    }

    fn get_bit(&self, reference: RegisterRef) -> Result<bool> {
        let value = self
            .broker
            .execute(op(move |c| Ok(Value::Bool(c.read_bit(reference)?))))?;
        Ok(matches!(value, Value::Bool(true)))
    }

    fn set_bit(&self, reference: RegisterRef, value: bool) -> Result<bool> {
        self.broker
            .execute(op(move |c| {
                c.write_bit(reference, value)?;
                Ok(Value::Unit)
            }))?;
        Ok(value)
    }

    fn read_reference(&self, reference: RegisterRef, encoding: NumberEncoding) -> Result<ApiValue> {
        let value = match dispatch_for(reference.class) {
            Dispatch::Bit => {
                self.broker
                    .execute(op(move |c| Ok(Value::Bool(c.read_bit(reference)?))))?
            }
            Dispatch::Numeric => self.broker.execute(op(move |c| {
                Ok(Value::Number(c.read_number(reference, encoding)?))
            }))?,
        };
        Ok(to_api_value(value))
    }

    fn write_reference(
        &self,
        reference: RegisterRef,
        value: ApiValue,
        encoding: NumberEncoding,
    ) -> Result<ApiValue> {
        match dispatch_for(reference.class) {
            Dispatch::Bit => {
                let b = bool_from_api(value);
                self.set_bit(reference, b)?;
                Ok(ApiValue::Bool(b))
            }
            Dispatch::Numeric => {
                let number = number_from_api(value, encoding);
                self.broker.execute(op(move |c| {
                    c.write_number(reference, number, encoding)?;
                    Ok(Value::Unit)
                }))?;
                Ok(to_api_value(Value::Number(number)))
            }
        }
    }

    // --- raw register operations ---------------------------------------

    pub fn read_raw(&self, ref_text: &str, encoding: NumberEncoding) -> Result<ApiValue> {
        let reference = RegisterRef::parse(ref_text)?;
        self.read_reference(reference, encoding)
    }

    pub fn write_raw(
        &self,
        ref_text: &str,
        value: ApiValue,
        encoding: NumberEncoding,
    ) -> Result<ApiValue> {
        let reference = RegisterRef::parse(ref_text)?;
        self.write_reference(reference, value, encoding)
    }

    pub fn enable_raw(&self, ref_text: &str) -> Result<bool> {
        self.set_bit(RegisterRef::parse(ref_text)?, true)
    }

    pub fn disable_raw(&self, ref_text: &str) -> Result<bool> {
        self.set_bit(RegisterRef::parse(ref_text)?, false)
    }

    pub fn toggle_raw(&self, ref_text: &str) -> Result<bool> {
        let reference = RegisterRef::parse(ref_text)?;
        let current = self.get_bit(reference)?;
        self.set_bit(reference, !current)
    }

    // --- named variable operations --------------------------------------

    pub fn read_var(&self, name: &str) -> Result<VariableReport> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| ApiError::VariableNotFound(name.to_string()))?
            .clone();
        let reference = self.registry.reference(name)?;
        let value = self.read_reference(reference, def.number_encoding)?;
        Ok(VariableReport {
            name: def.name,
            register: def.register,
            value,
        })
    }

    pub fn write_var(&self, name: &str, value: ApiValue) -> Result<VariableReport> {
        let def = self.registry.check_writable(name)?.clone();
        let reference = self.registry.reference(name)?;
        let value = self.write_reference(reference, value, def.number_encoding)?;
        Ok(VariableReport {
            name: def.name,
            register: def.register,
            value,
        })
    }

    pub fn enable_var(&self, name: &str) -> Result<VariableReport> {
        self.set_var_bit(name, true)
    }

    pub fn disable_var(&self, name: &str) -> Result<VariableReport> {
        self.set_var_bit(name, false)
    }

    pub fn toggle_var(&self, name: &str) -> Result<VariableReport> {
        let def = self.registry.check_writable(name)?.clone();
        let reference = self.registry.reference(name)?;
        let current = self.get_bit(reference)?;
        let value = self.set_bit(reference, !current)?;
        Ok(VariableReport {
            name: def.name,
            register: def.register,
            value: ApiValue::Bool(value),
        })
    }

    fn set_var_bit(&self, name: &str, value: bool) -> Result<VariableReport> {
        let def = self.registry.check_writable(name)?.clone();
        let reference = self.registry.reference(name)?;
        let value = self.set_bit(reference, value)?;
        Ok(VariableReport {
            name: def.name,
            register: def.register,
            value: ApiValue::Bool(value),
        })
    }

    pub fn list_vars(&self) -> Result<Vec<VariableReport>> {
        let names: Vec<String> = self.registry.iter().map(|def| def.name.clone()).collect();
        names.iter().map(|name| self.read_var(name)).collect()
    }

    // --- service control --------------------------------------------------

    pub fn pause(&self) {
        self.broker.pause();
    }

    pub fn resume(&self) {
        self.broker.resume();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(defs: Vec<VariableDefinition>) -> Facade {
        let registry = Registry::new(defs).unwrap();
        Facade::new(TransportTarget::Mock, registry)
    }

    fn def(name: &str, register: &str, encoding: NumberEncoding, readonly: bool) -> VariableDefinition {
        VariableDefinition {
            name: name.to_string(),
            register: register.to_string(),
            group: None,
            number_encoding: encoding,
            readonly,
        }
    }

    #[test]
    fn raw_bit_round_trips() {
        let facade = start(vec![]);
        facade
            .write_raw("M17", ApiValue::Bool(true), NumberEncoding::WordSigned)
            .unwrap();
        let value = facade.read_raw("M17", NumberEncoding::WordSigned).unwrap();
        assert_eq!(value, ApiValue::Bool(true));
    }

    #[test]
    fn raw_numeric_round_trips_with_nonzero_coercion() {
        let facade = start(vec![]);
        facade
            .write_raw("D100", ApiValue::Int(-7), NumberEncoding::WordSigned)
            .unwrap();
        let value = facade.read_raw("D100", NumberEncoding::WordSigned).unwrap();
        assert_eq!(value, ApiValue::Int(-7));
    }

    #[test]
    fn toggle_raw_flips_the_bit() {
        let facade = start(vec![]);
        assert_eq!(facade.toggle_raw("Y12").unwrap(), true);
        assert_eq!(facade.toggle_raw("Y12").unwrap(), false);
    }

    #[test]
    fn read_var_reports_name_and_register() {
        let facade = start(vec![def("pump", "M17", NumberEncoding::WordSigned, false)]);
        facade.enable_var("pump").unwrap();
        let report = facade.read_var("pump").unwrap();
        assert_eq!(report.name, "pump");
        assert_eq!(report.register, "M17");
        assert_eq!(report.value, ApiValue::Bool(true));
    }

    #[test]
    fn write_var_rejects_readonly() {
        let facade = start(vec![def("limit", "D10", NumberEncoding::WordSigned, true)]);
        let err = facade.write_var("limit", ApiValue::Int(1)).unwrap_err();
        assert_eq!(err.kind(), "read_only");
    }

    #[test]
    fn unknown_variable_surfaces_not_found() {
        let facade = start(vec![]);
        let err = facade.read_var("missing").unwrap_err();
        assert_eq!(err.kind(), "variable_not_found");
    }

    #[test]
    fn pause_surfaces_service_paused_kind() {
        let facade = start(vec![]);
        facade.pause();
        let err = facade.read_raw("M1", NumberEncoding::WordSigned).unwrap_err();
        assert_eq!(err.kind(), "service_paused");
    }

    #[test]
    fn list_vars_reports_every_declared_variable() {
        let facade = start(vec![
            def("a", "M1", NumberEncoding::WordSigned, false),
            def("b", "D5", NumberEncoding::WordSigned, false),
        ]);
        let reports = facade.list_vars().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].name, "a");
        assert_eq!(reports[1].name, "b");
    }
}
