//! Generation controls sent with every request.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=2.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 256..=4096;
pub const TOP_P_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const TOP_K_RANGE: RangeInclusive<u32> = 1..=100;
pub const PRESENCE_PENALTY_RANGE: RangeInclusive<f64> = -2.0..=2.0;

/// Names accepted by [`RequestParameters::set`].
pub const PARAMETER_NAMES: [&str; 5] = [
    "temperature",
    "max_tokens",
    "top_p",
    "top_k",
    "presence_penalty",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RequestParameters {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
    pub presence_penalty: f64,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 0.9,
            top_k: 40,
            presence_penalty: 0.0,
        }
    }
}

impl RequestParameters {
    pub fn validate(&self) -> Result<()> {
        check_f64("temperature", self.temperature, &TEMPERATURE_RANGE)?;
        check_u32("max_tokens", self.max_tokens, &MAX_TOKENS_RANGE)?;
        check_f64("top_p", self.top_p, &TOP_P_RANGE)?;
        check_u32("top_k", self.top_k, &TOP_K_RANGE)?;
        check_f64(
            "presence_penalty",
            self.presence_penalty,
            &PRESENCE_PENALTY_RANGE,
        )?;
        Ok(())
    }

    /// Set one parameter from its textual value. The record is unchanged on error.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<()> {
        let mut next = *self;
        match name {
            "temperature" => next.temperature = parse_f64("temperature", raw)?,
            "max_tokens" => next.max_tokens = parse_u32("max_tokens", raw, &MAX_TOKENS_RANGE)?,
            "top_p" => next.top_p = parse_f64("top_p", raw)?,
            "top_k" => next.top_k = parse_u32("top_k", raw, &TOP_K_RANGE)?,
            "presence_penalty" => next.presence_penalty = parse_f64("presence_penalty", raw)?,
            other => {
                return Err(StoreError::InvalidParameter {
                    name: "parameter",
                    value: other.to_string(),
                    range: PARAMETER_NAMES.join(", "),
                })
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn check_f64(name: &'static str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(StoreError::InvalidParameter {
        name,
        value: value.to_string(),
        range: format!("{}..={}", range.start(), range.end()),
    })
}

fn check_u32(name: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(StoreError::InvalidParameter {
        name,
        value: value.to_string(),
        range: format!("{}..={}", range.start(), range.end()),
    })
}

fn parse_f64(name: &'static str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StoreError::InvalidParameter {
            name,
            value: raw.to_string(),
            range: "a finite number".to_string(),
        })
}

fn parse_u32(name: &'static str, raw: &str, range: &RangeInclusive<u32>) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| StoreError::InvalidParameter {
            name,
            value: raw.to_string(),
            range: format!("{}..={}", range.start(), range.end()),
        })
}
