use std::net::IpAddr;

use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} is not an IP address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("hardware address must be six hex octets (e.g. 00-11-22-33-44-55): {0}")]
    InvalidHardwareAddress(String),
    #[error("domain label too long (max 63 characters): {0}")]
    LabelTooLong(String),
    #[error("domain name contains an invalid label: {0}")]
    InvalidLabel(String),
    #[error("{record_type} record requires {field}")]
    MissingRecordField {
        record_type: String,
        field: &'static str,
    },
    #[error("record type {0} cannot be managed")]
    UnsupportedRecordType(String),
}

lazy_static::lazy_static! {
    /// `00-11-22-33-44-55`, `00:11:22:33:44:55` or `001122334455`
    static ref HARDWARE_ADDRESS_RE: Regex =
        Regex::new(r"^[0-9A-Fa-f]{2}(?:(?:-[0-9A-Fa-f]{2}){5}|(?::[0-9A-Fa-f]{2}){5}|[0-9A-Fa-f]{10})$")
            .unwrap();
    /// Letters, digits, '-' and '_'; a lone '*' for wildcards
    static ref LABEL_RE: Regex =
        Regex::new(r"^(?:\*|[A-Za-z0-9_](?:[A-Za-z0-9_-]*[A-Za-z0-9_])?)$").unwrap();
}

pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}

pub fn validate_ip_address(field: &'static str, value: &str) -> Result<(), ValidationError> {
    validate_required(field, value)?;
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

pub fn validate_hardware_address(value: &str) -> Result<(), ValidationError> {
    validate_required("hardware_address", value)?;
    if !HARDWARE_ADDRESS_RE.is_match(value) {
        return Err(ValidationError::InvalidHardwareAddress(value.to_string()));
    }
    Ok(())
}

/// Accepts relative or fully-qualified names; a trailing dot is ignored.
pub fn validate_domain_name(field: &'static str, domain: &str) -> Result<(), ValidationError> {
    let d = domain.trim_end_matches('.');
    validate_required(field, d)?;
    for label in d.split('.') {
        if label.len() > 63 {
            return Err(ValidationError::LabelTooLong(label.to_string()));
        }
        if !LABEL_RE.is_match(label) {
            return Err(ValidationError::InvalidLabel(label.to_string()));
        }
    }
    Ok(())
}
