//! Conversions between scale types and the linear scale

use crate::model::ScaleType;

use super::StatsError;

/// Function mapping values of one scale to another
pub type Transform = fn(f64) -> f64;

fn identity(x: f64) -> f64 {
    x
}

fn exp2(x: f64) -> f64 {
    x.exp2()
}

fn exp10(x: f64) -> f64 {
    10f64.powf(x)
}

/// Transform that brings values of `scale` back to the linear scale
pub fn unscaler(scale: ScaleType) -> Result<Transform, StatsError> {
    Ok(match scale {
        ScaleType::Linear | ScaleType::Count | ScaleType::Percent | ScaleType::Percent1 => identity,
        ScaleType::Log1p => f64::exp_m1,
        ScaleType::Log2 => exp2,
        ScaleType::Ln => f64::exp,
        ScaleType::Log10 => exp10,
        ScaleType::LogBaseUnknown => {
            return Err(StatsError::UnsupportedScale {
                scale,
                operation: "unscale",
            })
        }
    })
}

/// Transform that expresses linear values on `scale`
pub fn rescaler(scale: ScaleType) -> Result<Transform, StatsError> {
    Ok(match scale {
        ScaleType::Linear | ScaleType::Count | ScaleType::Percent | ScaleType::Percent1 => identity,
        ScaleType::Log1p => f64::ln_1p,
        ScaleType::Log2 => f64::log2,
        ScaleType::Ln => f64::ln,
        ScaleType::Log10 => f64::log10,
        ScaleType::LogBaseUnknown => {
            return Err(StatsError::UnsupportedScale {
                scale,
                operation: "rescale",
            })
        }
    })
}

/// Bring a single value back to the linear scale
pub fn unscale(value: f64, scale: ScaleType) -> Result<f64, StatsError> {
    Ok(unscaler(scale)?(value))
}

/// Express a single linear value on `scale`
pub fn rescale(value: f64, scale: ScaleType) -> Result<f64, StatsError> {
    Ok(rescaler(scale)?(value))
}
