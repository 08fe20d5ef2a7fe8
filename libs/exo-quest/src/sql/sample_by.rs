// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SqlError;

use super::{ExpressionBuilder, SQLBuilder, literal};

/// How SAMPLE BY fills buckets that have no rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    None,
    Null,
    Prev,
    Linear,
    Value(f64),
}

/// Where SAMPLE BY buckets start
#[derive(Debug, Clone, PartialEq)]
pub enum AlignTo {
    /// Align to calendar boundaries, optionally in a time zone (`'Europe/Berlin'`) and with
    /// an offset (`'00:15'`)
    Calendar {
        time_zone: Option<String>,
        offset: Option<String>,
    },
    FirstObservation,
}

impl AlignTo {
    pub fn calendar() -> Self {
        AlignTo::Calendar {
            time_zone: None,
            offset: None,
        }
    }
}

/// Time-bucketed aggregation: `SAMPLE BY <interval> [FILL(...)] [ALIGN TO ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBy {
    pub interval: String,
    pub fill: Vec<Fill>,
    pub align: Option<AlignTo>,
}

impl SampleBy {
    /// Sample by an interval such as `1h`, `15m` or `1M`
    pub fn new(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
            fill: vec![],
            align: None,
        }
    }

    /// Fill strategies, one per aggregate (or a single one for all)
    pub fn fill(mut self, fill: impl IntoIterator<Item = Fill>) -> Self {
        self.fill = fill.into_iter().collect();
        self
    }

    pub fn align_to(mut self, align: AlignTo) -> Self {
        self.align = Some(align);
        self
    }
}

impl ExpressionBuilder for Fill {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        match self {
            Fill::None => builder.push_str("NONE"),
            Fill::Null => builder.push_str("NULL"),
            Fill::Prev => builder.push_str("PREV"),
            Fill::Linear => builder.push_str("LINEAR"),
            Fill::Value(value) => {
                if !value.is_finite() {
                    return Err(SqlError::validation(format!(
                        "FILL value must be finite, got {value}"
                    )));
                }
                builder.push_str(value.to_string());
            }
        }
        Ok(())
    }
}

impl ExpressionBuilder for AlignTo {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        builder.push_str("ALIGN TO ");
        match self {
            AlignTo::Calendar { time_zone, offset } => {
                builder.push_str("CALENDAR");
                if let Some(time_zone) = time_zone {
                    builder.push_str(" TIME ZONE ");
                    builder.push_string_literal(time_zone);
                }
                if let Some(offset) = offset {
                    builder.push_str(" WITH OFFSET ");
                    builder.push_string_literal(offset);
                }
            }
            AlignTo::FirstObservation => builder.push_str("FIRST OBSERVATION"),
        }
        Ok(())
    }
}

impl ExpressionBuilder for SampleBy {
    fn build(&self, builder: &mut SQLBuilder) -> Result<(), SqlError> {
        literal::validate_duration("SAMPLE BY interval", &self.interval)?;

        builder.push_str("SAMPLE BY ");
        builder.push_str(&self.interval);

        if !self.fill.is_empty() {
            builder.push_str(" FILL(");
            builder.push_elems(&self.fill, ", ")?;
            builder.push(')');
        }
        if let Some(align) = &self.align {
            builder.push_space();
            align.build(builder)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain() {
        assert_sql!(SampleBy::new("1h"), "SAMPLE BY 1h");
    }

    #[test]
    fn fill_and_align() {
        let sample_by = SampleBy::new("15m")
            .fill([Fill::Prev, Fill::Value(0.5), Fill::Null])
            .align_to(AlignTo::Calendar {
                time_zone: Some("Europe/Berlin".into()),
                offset: Some("00:15".into()),
            });
        assert_sql!(
            sample_by,
            "SAMPLE BY 15m FILL(PREV, 0.5, NULL) ALIGN TO CALENDAR TIME ZONE 'Europe/Berlin' WITH OFFSET '00:15'"
        );

        assert_sql!(
            SampleBy::new("1d").align_to(AlignTo::FirstObservation),
            "SAMPLE BY 1d ALIGN TO FIRST OBSERVATION"
        );
        assert_sql!(
            SampleBy::new("1d").fill([Fill::Linear]).align_to(AlignTo::calendar()),
            "SAMPLE BY 1d FILL(LINEAR) ALIGN TO CALENDAR"
        );
    }

    #[test]
    fn invalid() {
        assert_sql_err!(SampleBy::new("1 hour"), SqlError::Validation(_));
        assert_sql_err!(
            SampleBy::new("1h").fill([Fill::Value(f64::NAN)]),
            SqlError::Validation(_)
        );
    }
}
