//! Per-call analysis: normalize, parse, check eligibility, convert, validate.

use crate::error::RegistryResult;
use sr_convert::{ConversionContext, Converter};
use sr_core::marker::{manual, unparsable};
use sr_core::{ConsumptionMode, ParamMap};
use sr_sql::{analyze, check_eligibility, normalize, semantic_signature, SqlParser};

/// Stored marker for calls rejected before parsing mattered.
pub const INELIGIBLE: &str = "INELIGIBLE";

/// Stored marker for SQL the parser rejected.
pub const UNPARSABLE: &str = "UNPARSABLE";

/// Everything the registry stores about a call besides its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub parsed_sql: String,
    pub semantic_signature: String,
    pub generated_code: String,
    pub notes: Option<String>,
    pub eligible: bool,
    pub validated: bool,
    pub ineligibility_reason: Option<String>,
}

impl Outcome {
    fn ineligible(reason: String) -> Self {
        Self {
            parsed_sql: INELIGIBLE.to_string(),
            semantic_signature: INELIGIBLE.to_string(),
            generated_code: manual(&reason),
            notes: Some(reason.clone()),
            eligible: false,
            validated: false,
            ineligibility_reason: Some(reason),
        }
    }
}

/// Holds the SQL parser and converter across calls.
pub struct Analyzer {
    parser: SqlParser,
    converter: Converter,
    table_prefix: String,
}

impl Analyzer {
    pub fn new(parser: SqlParser, table_prefix: impl Into<String>) -> RegistryResult<Self> {
        let table_prefix = table_prefix.into();
        Ok(Self {
            parser,
            converter: Converter::new(table_prefix.clone())?,
            table_prefix,
        })
    }

    pub fn analyze(
        &mut self,
        sql: &str,
        params: Option<&ParamMap>,
        kwargs: Option<&ParamMap>,
        consumption: &ConsumptionMode,
    ) -> Outcome {
        let normalized = normalize(sql);
        let analysis = analyze(&self.parser, &normalized);

        let query = analysis.as_ref().ok().map(|a| &a.query);
        if let Err(reason) = check_eligibility(&normalized, query, params) {
            log::debug!("ineligible: {reason}");
            return Outcome::ineligible(reason);
        }

        let analysis = match analysis {
            Ok(analysis) => analysis,
            Err(e) => {
                log::debug!("unparsable SQL: {e}");
                return Outcome {
                    parsed_sql: UNPARSABLE.to_string(),
                    semantic_signature: UNPARSABLE.to_string(),
                    generated_code: unparsable(e.to_string()),
                    notes: Some(e.to_string()),
                    eligible: true,
                    validated: false,
                    ineligibility_reason: None,
                };
            }
        };

        let ctx = ConversionContext {
            normalized: &normalized,
            params,
            kwargs,
            consumption,
            table_prefix: &self.table_prefix,
        };
        let conversion = self.converter.convert(&analysis.query, &ctx);
        Outcome {
            parsed_sql: analysis.statement.to_string(),
            semantic_signature: semantic_signature(&analysis.statement),
            generated_code: conversion.code,
            notes: conversion.notes,
            eligible: true,
            validated: conversion.validated,
            ineligibility_reason: None,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
