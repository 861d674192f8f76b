//! Pattern-based extraction of common lab values from report text.
//!
//! Best-effort recognition of demographics and a lipid panel in the
//! extracted text. Values are kept as the strings found in the document;
//! no unit conversion or range checking happens here.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Values recognized in a report, all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triglycerides: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldl_direct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vldl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_hdl: Option<String>,
}

impl LabValues {
    /// Whether nothing was recognized.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Patterns for the lipid panel, matched case-insensitively.
/// Lab printouts put the value right after the analyte name.
static LIPID_PATTERNS: LazyLock<Vec<(Regex, LipidField)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)Cholesterol Total\s+([\d.]+)").unwrap(),
            LipidField::CholesterolTotal,
        ),
        (
            Regex::new(r"(?i)Triglycerides\s+([\d.]+)").unwrap(),
            LipidField::Triglycerides,
        ),
        (
            Regex::new(r"(?i)HDL Cholesterol\s+([\d.]+)").unwrap(),
            LipidField::Hdl,
        ),
        (
            Regex::new(r"(?i)LDL Cholesterol,?\s*Direct\s+([\d.]+)").unwrap(),
            LipidField::LdlDirect,
        ),
        (
            Regex::new(r"(?i)VLDL Cholesterol\s+([\d.]+)").unwrap(),
            LipidField::Vldl,
        ),
        (
            Regex::new(r"(?i)Non-HDL Cholesterol\s+([\d.]+)").unwrap(),
            LipidField::NonHdl,
        ),
    ]
});

static AGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Age\s*[: ]\s*(\d+)").unwrap());

static GENDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Male|Female)\b").unwrap());

#[derive(Debug, Clone, Copy)]
enum LipidField {
    CholesterolTotal,
    Triglycerides,
    Hdl,
    LdlDirect,
    Vldl,
    NonHdl,
}

/// Pick recognizable parameters out of extracted report text.
pub fn extract_parameters(text: &str) -> LabValues {
    let mut values = LabValues::default();

    if let Some(caps) = AGE_PATTERN.captures(text) {
        values.age = Some(caps[1].to_string());
    }
    if let Some(caps) = GENDER_PATTERN.captures(text) {
        values.gender = Some(caps[1].to_string());
    }

    for (pattern, field) in LIPID_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let value = Some(caps[1].to_string());
            match field {
                LipidField::CholesterolTotal => values.cholesterol_total = value,
                LipidField::Triglycerides => values.triglycerides = value,
                LipidField::Hdl => values.hdl = value,
                LipidField::LdlDirect => values.ldl_direct = value,
                LipidField::Vldl => values.vldl = value,
                LipidField::NonHdl => values.non_hdl = value,
            }
        }
    }

    values
}
